use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Tracks in-flight requests of one page to decide when loading has settled.
///
/// The page counts as idle once at most `max_inflight` requests have been
/// pending for a continuous `quiet_period`.
#[derive(Debug)]
pub struct NetworkMonitor {
    inflight: HashSet<String>,
    max_inflight: usize,
    quiet_period: Duration,
    idle_since: Option<Instant>,
}

impl NetworkMonitor {
    pub fn new(max_inflight: usize, quiet_period: Duration, now: Instant) -> Self {
        Self {
            inflight: HashSet::new(),
            max_inflight,
            quiet_period,
            idle_since: Some(now),
        }
    }

    pub fn request_started(&mut self, request_id: &str, now: Instant) {
        // Redirects reuse the request id, so this is a no-op for them.
        self.inflight.insert(request_id.to_string());
        self.update(now);
    }

    pub fn request_settled(&mut self, request_id: &str, now: Instant) {
        self.inflight.remove(request_id);
        self.update(now);
    }

    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_idle(&self, now: Instant) -> bool {
        match self.idle_since {
            Some(since) => now.duration_since(since) >= self.quiet_period,
            None => false,
        }
    }

    fn update(&mut self, now: Instant) {
        if self.inflight.len() > self.max_inflight {
            self.idle_since = None;
        } else if self.idle_since.is_none() {
            self.idle_since = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    #[test]
    fn test_idle_after_quiet_period() {
        let start = Instant::now();
        let mut monitor = NetworkMonitor::new(0, QUIET, start);
        monitor.request_started("1", start);
        assert!(!monitor.is_idle(start + Duration::from_secs(5)));
        monitor.request_settled("1", start + Duration::from_millis(100));
        assert!(!monitor.is_idle(start + Duration::from_millis(400)));
        assert!(monitor.is_idle(start + Duration::from_millis(600)));
    }

    #[test]
    fn test_new_request_resets_quiet_period() {
        let start = Instant::now();
        let mut monitor = NetworkMonitor::new(0, QUIET, start);
        monitor.request_started("1", start);
        monitor.request_settled("1", start + Duration::from_millis(100));
        monitor.request_started("2", start + Duration::from_millis(550));
        monitor.request_settled("2", start + Duration::from_millis(560));
        assert!(!monitor.is_idle(start + Duration::from_millis(700)));
        assert!(monitor.is_idle(start + Duration::from_millis(1100)));
    }

    #[test]
    fn test_allowance_for_long_lived_connections() {
        let start = Instant::now();
        let mut monitor = NetworkMonitor::new(2, QUIET, start);
        monitor.request_started("socket", start);
        monitor.request_started("poll", start);
        assert_eq!(monitor.inflight(), 2);
        assert!(monitor.is_idle(start + QUIET));
        monitor.request_started("img", start + Duration::from_millis(10));
        assert!(!monitor.is_idle(start + Duration::from_secs(2)));
    }
}

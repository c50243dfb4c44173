use chromiumoxide::cdp::browser_protocol::network::ResourceType;
use std::collections::BTreeMap;
use url::Url;

/// The resource kinds worth mirroring next to a captured page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Script,
    Stylesheet,
    Image,
    Font,
}

impl ResourceKind {
    pub fn from_resource_type(resource_type: &ResourceType) -> Option<Self> {
        match resource_type {
            ResourceType::Script => Some(ResourceKind::Script),
            ResourceType::Stylesheet => Some(ResourceKind::Stylesheet),
            ResourceType::Image => Some(ResourceKind::Image),
            ResourceType::Font => Some(ResourceKind::Font),
            _ => None,
        }
    }
}

/// Mirrors the browser's notion of an ok response: no status at all (served
/// from cache or a non-http scheme) or a 2xx code.
pub fn is_ok_status(status: i64) -> bool {
    status == 0 || (200..=299).contains(&status)
}

/// Assets observed while a page was loading, keyed by their remote url.
#[derive(Debug, Default, Clone)]
pub struct ObservedAssets {
    assets: BTreeMap<String, ResourceKind>,
}

impl ObservedAssets {
    /// Records a network response. Returns true when the response was kept.
    pub fn record(&mut self, url: &str, kind: Option<ResourceKind>, status: i64) -> bool {
        let kind = match kind {
            Some(k) => k,
            None => return false,
        };
        if !is_ok_status(status) {
            tracing::debug!("Ignoring {} response for {}", status, url);
            return false;
        }
        match Url::parse(url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            _ => return false,
        }
        if self.assets.contains_key(url) {
            return false;
        }
        tracing::debug!("Observed {:?} asset {}", kind, url);
        self.assets.insert(url.to_string(), kind);
        true
    }

    pub fn merge(&mut self, other: ObservedAssets) {
        for (url, kind) in other.assets {
            self.assets.entry(url).or_insert(kind);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResourceKind)> {
        self.assets.iter()
    }

    #[cfg(test)]
    pub fn contains(&self, url: &str) -> bool {
        self.assets.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_recognized_kinds_are_recorded() {
        let mut assets = ObservedAssets::default();
        for (url, rt) in [
            ("https://example.test/a.js", ResourceType::Script),
            ("https://example.test/a.css", ResourceType::Stylesheet),
            ("https://example.test/a.png", ResourceType::Image),
            ("https://example.test/a.woff2", ResourceType::Font),
            ("https://example.test/", ResourceType::Document),
            ("https://example.test/api", ResourceType::Xhr),
            ("https://example.test/v.mp4", ResourceType::Media),
        ] {
            assets.record(url, ResourceKind::from_resource_type(&rt), 200);
        }
        assert_eq!(assets.len(), 4);
        assert!(!assets.contains("https://example.test/api"));
        assert!(!assets.contains("https://example.test/"));
    }

    #[test]
    fn test_failed_responses_are_ignored() {
        let mut assets = ObservedAssets::default();
        assert!(!assets.record(
            "https://example.test/analytics.js",
            Some(ResourceKind::Script),
            404
        ));
        assert!(!assets.record(
            "https://example.test/broken.css",
            Some(ResourceKind::Stylesheet),
            500
        ));
        assert!(assets.record(
            "https://example.test/moved.css",
            Some(ResourceKind::Stylesheet),
            204
        ));
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn test_duplicate_observations_collapse() {
        let mut assets = ObservedAssets::default();
        assert!(assets.record("https://example.test/logo.png", Some(ResourceKind::Image), 200));
        assert!(!assets.record("https://example.test/logo.png", Some(ResourceKind::Image), 200));
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn test_inline_data_urls_are_not_assets() {
        let mut assets = ObservedAssets::default();
        assert!(!assets.record("data:image/png;base64,iVBORw0KGgo=", Some(ResourceKind::Image), 200));
        assert!(assets.is_empty());
    }
}

use crate::errors::SiteCloneError;
use crate::CaptureRule;
use chromiumoxide::browser::BrowserConfig;
use std::path::PathBuf;
use std::time::Duration;

const CHROME_PATH_ENV: &str = "SITECLONE_CHROME_PATH";

/// Stands in for "no navigation timeout": the CDP handler needs some bound.
const UNBOUNDED_NAVIGATION: Duration = Duration::from_secs(60 * 60 * 24);

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CHROME_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!("{} points to a missing file : {}", CHROME_PATH_ENV, p);
    }

    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

pub fn browser_config(rule: &CaptureRule) -> Result<BrowserConfig, SiteCloneError> {
    let chrome_path = match rule.chrome_executable.clone().or_else(find_chromium) {
        Some(p) => p,
        None => {
            return Err(SiteCloneError::BrowserUnavailable(format!(
                "Chromium not found. Install Chrome/Chromium or set {CHROME_PATH_ENV}."
            )))
        }
    };
    tracing::debug!("Using browser at {}", chrome_path.display());

    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .request_timeout(rule.navigation_timeout.unwrap_or(UNBOUNDED_NAVIGATION))
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions");
    if rule.headless {
        builder = builder.new_headless_mode();
    } else {
        builder = builder.with_head();
    }
    builder
        .build()
        .map_err(|e| SiteCloneError::BrowserUnavailable(format!("failed to build browser config: {e}")))
}

use crate::download::download_asset;
use crate::mapping::{local_asset_path, relative_web_path};
use crate::rewrite::rewrite_references;
use chrono::Utc;
use futures::{stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::Instrument;
use url::Url;

pub use crate::assets::{ObservedAssets, ResourceKind};
pub use crate::download::{build_client, download_into_dir};
pub use crate::errors::SiteCloneError;
pub use crate::mapping::PathMapping;
pub use crate::session::{CaptureSession, Snapshot};
pub use crate::tools::{Tool, ToolRegistry, DEFAULT_OUTPUT_FOLDER};
pub use crate::writer::write_file;

mod assets;
mod browser;
pub mod download;
mod errors;
mod frame;
mod link;
pub mod mapping;
mod network;
pub mod rewrite;
mod session;
pub mod tools;
mod writer;

const ENTRY_DOCUMENT_NAME: &str = "index.html";

#[derive(Debug, Clone)]
pub struct CaptureRule {
    /// Browser binary to use instead of searching for one.
    pub chrome_executable: Option<PathBuf>,
    pub headless: bool,
    /// Requests allowed to stay in flight while the page counts as idle.
    pub idle_connections: usize,
    /// How long the network has to stay idle before the page is captured.
    pub idle_period: Duration,
    /// None lets navigation run until the page settles.
    pub navigation_timeout: Option<Duration>,
    /// Asset downloads issued at once. 1 downloads one after another.
    pub max_concurrent_downloads: usize,
}

impl Default for CaptureRule {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            headless: true,
            idle_connections: 0,
            idle_period: Duration::from_millis(500),
            navigation_timeout: None,
            max_concurrent_downloads: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureOutcome {
    pub success: bool,
    pub message: String,
}

impl std::fmt::Display for CaptureOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.success { "success" } else { "failure" };
        write!(f, "{status} : {}", self.message)
    }
}

/// Clones the page at `url` into `output_folder`: renders it, downloads the
/// assets the browser fetched and points the saved `index.html` at them.
///
/// Never fails; errors are reported through the returned outcome.
pub async fn capture(url: &str, output_folder: &Path, rule: &CaptureRule) -> CaptureOutcome {
    let span = tracing::info_span!(
        "capture",
        session_id = %format!("Capture-{}", Utc::now().timestamp()),
        url = %url
    );
    match try_capture(url, output_folder, rule).instrument(span).await {
        Ok(_) => CaptureOutcome {
            success: true,
            message: format!("Scraped successfully to {}", output_folder.display()),
        },
        Err(e) => {
            tracing::error!("Scraping failed: {}", e);
            CaptureOutcome {
                success: false,
                message: format!("Scraping failed: {e}"),
            }
        }
    }
}

async fn try_capture(url: &str, output_folder: &Path, rule: &CaptureRule) -> Result<(), SiteCloneError> {
    let page_url = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return Err(SiteCloneError::InvalidUrl(url.to_string())),
    };

    if let Err(e) = fs::create_dir_all(output_folder).await {
        tracing::error!("Failed to create destination directory\nError : {}", e);
        return Err(SiteCloneError::ErrorCreatingDestinationDirectory(e.to_string()));
    };

    let session = CaptureSession::launch(rule).await?;
    let snapshot = session.snapshot(&page_url, rule).await;
    session.close().await;
    let snapshot = snapshot?;

    let client = build_client()?;
    mirror_snapshot(&client, &snapshot, output_folder, rule.max_concurrent_downloads).await?;
    Ok(())
}

/// Downloads every observed asset under `output_folder`, rewrites the
/// snapshot's references to the local copies and writes the entry document.
/// Returns the mapping that was applied.
#[tracing::instrument(skip(client, snapshot), fields(base_url = %snapshot.base_url))]
pub async fn mirror_snapshot(
    client: &Client,
    snapshot: &Snapshot,
    output_folder: &Path,
    max_concurrent_downloads: usize,
) -> Result<PathMapping, SiteCloneError> {
    let mut mapping = PathMapping::default();
    // Urls that differ only in their query share a local file; those are
    // downloaded one after another, in registration order, so the file ends
    // up holding the same asset the path key points at.
    let mut downloads: Vec<(PathBuf, Vec<&str>)> = Vec::with_capacity(snapshot.assets.len());
    let mut by_local_path: HashMap<PathBuf, usize> = HashMap::new();
    let mut attempted = 0;

    for (asset_url, kind) in snapshot.assets.iter() {
        let parsed = match Url::parse(asset_url) {
            Ok(u) => u,
            Err(e) => {
                tracing::error!("Could not process asset {}: {}", asset_url, e);
                continue;
            }
        };
        let local_path = local_asset_path(output_folder, &parsed);
        let web_path = match relative_web_path(output_folder, &local_path) {
            Some(p) => p,
            None => {
                tracing::error!("Could not process asset {}: no local path", asset_url);
                continue;
            }
        };
        tracing::debug!("{:?} {} => {}", kind, asset_url, web_path);
        mapping.register(asset_url, parsed.path(), &web_path);
        attempted += 1;
        match by_local_path.get(&local_path) {
            Some(&idx) => downloads[idx].1.push(asset_url.as_str()),
            None => {
                by_local_path.insert(local_path.clone(), downloads.len());
                downloads.push((local_path, vec![asset_url.as_str()]));
            }
        }
    }

    let tasks: Vec<_> = downloads
        .iter()
        .map(|(local_path, asset_urls)| async move {
            let mut written = 0usize;
            for asset_url in asset_urls {
                if download_asset(client, asset_url, local_path).await.is_some() {
                    written += 1;
                }
            }
            written
        })
        .collect();
    let downloaded: usize = stream::iter(tasks)
        .buffer_unordered(max_concurrent_downloads.max(1))
        .collect::<Vec<usize>>()
        .await
        .into_iter()
        .sum();
    tracing::info!("Downloaded {} of {} assets", downloaded, attempted);

    tracing::info!("Rewriting paths in HTML...");
    let html = rewrite_references(&snapshot.html, &mapping);

    let entry_document = output_folder.join(ENTRY_DOCUMENT_NAME);
    write_file(&entry_document, &html).await?;
    Ok(mapping)
}

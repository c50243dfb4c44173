use crate::assets::{ObservedAssets, ResourceKind};
use crate::browser::browser_config;
use crate::errors::SiteCloneError;
use crate::frame::{CaptureContext, FrameProbe, FRAME_PROBE_SCRIPT};
use crate::link::get_full_link;
use crate::network::NetworkMonitor;
use crate::CaptureRule;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent, EventResponseReceived,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use url::Url;

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The rendered document chosen for capture, plus every asset the browser
/// fetched while rendering it.
#[derive(Debug)]
pub struct Snapshot {
    pub html: String,
    /// Url of the captured document (the frame's own url when switched).
    pub base_url: Url,
    pub assets: ObservedAssets,
}

/// One headless browser owned by one capture.
///
/// Call [`CaptureSession::close`] when done; if the session is dropped
/// instead, the browser process is killed along with it.
pub struct CaptureSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl CaptureSession {
    #[tracing::instrument(skip(rule))]
    pub async fn launch(rule: &CaptureRule) -> Result<Self, SiteCloneError> {
        let config = browser_config(rule)?;
        let (browser, mut handler) = match Browser::launch(config).await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!("Failed to launch browser\nError : {}", e);
                return Err(SiteCloneError::BrowserUnavailable(format!(
                    "failed to launch Chromium. {e}"
                )));
            }
        };
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error : {}", e);
                }
            }
        });
        Ok(Self { browser, handler })
    }

    /// Renders `url` until the network is idle and picks the document to
    /// capture: the first iframe's document when it has one, the page
    /// otherwise.
    #[tracing::instrument(skip(self, url, rule), fields(url = %url))]
    pub async fn snapshot(&self, url: &Url, rule: &CaptureRule) -> Result<Snapshot, SiteCloneError> {
        let page = self.browser.new_page("about:blank").await?;
        let mut assets = observe_navigation(&page, url, rule).await?;
        tracing::debug!("Navigation settled with {} observed assets", assets.len());
        let page_url = current_url(&page, url).await;

        let probe = match page.evaluate(FRAME_PROBE_SCRIPT).await {
            Ok(result) => result.into_value::<FrameProbe>().unwrap_or_else(|e| {
                tracing::warn!("Unexpected iframe probe result : {}", e);
                FrameProbe::default()
            }),
            Err(e) => {
                tracing::warn!("Iframe probe failed : {}", e);
                FrameProbe::default()
            }
        };

        let (html, base_url) = match probe.into_context() {
            CaptureContext::MainDocument => (page_content(&page).await?, page_url),
            CaptureContext::Frame { html, url: frame_url } => {
                tracing::info!("Iframe found, switching context to {}", frame_url);
                let base = Url::parse(&frame_url).unwrap_or(page_url);
                (html, base)
            }
            CaptureContext::CrossOriginFrame { src } => {
                match get_full_link(&src, &page_url)
                    .filter(|u| u.scheme() == "http" || u.scheme() == "https")
                {
                    Some(frame_url) => {
                        tracing::info!("Cross-origin iframe found, rendering {}", frame_url);
                        match self.render_frame(&frame_url, rule).await {
                            Ok((html, base, frame_assets)) => {
                                assets.merge(frame_assets);
                                (html, base)
                            }
                            Err(e) => {
                                tracing::warn!(
                                    "Iframe {} could not be rendered, keeping page\nError : {}",
                                    frame_url,
                                    e
                                );
                                (page_content(&page).await?, page_url)
                            }
                        }
                    }
                    None => {
                        tracing::warn!("Iframe source {} can't be rendered, keeping page", src);
                        (page_content(&page).await?, page_url)
                    }
                }
            }
        };

        Ok(Snapshot {
            html,
            base_url,
            assets,
        })
    }

    /// Renders a cross-origin frame's document in its own tab.
    async fn render_frame(
        &self,
        frame_url: &Url,
        rule: &CaptureRule,
    ) -> Result<(String, Url, ObservedAssets), SiteCloneError> {
        let frame_page = self.browser.new_page("about:blank").await?;
        let frame_assets = observe_navigation(&frame_page, frame_url, rule).await?;
        let html = page_content(&frame_page).await?;
        let base = current_url(&frame_page, frame_url).await;
        Ok((html, base, frame_assets))
    }

    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Error closing browser : {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Error waiting for browser exit : {}", e);
        }
        self.handler.abort();
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Navigates `page` to `url` and records successful script, stylesheet,
/// image and font responses until the network goes idle.
async fn observe_navigation(
    page: &Page,
    url: &Url,
    rule: &CaptureRule,
) -> Result<ObservedAssets, SiteCloneError> {
    // Listeners go in before navigation so early subresources are seen.
    let mut responses = page.event_listener::<EventResponseReceived>().await?;
    let mut requests = page.event_listener::<EventRequestWillBeSent>().await?;
    let mut finished = page.event_listener::<EventLoadingFinished>().await?;
    let mut failed = page.event_listener::<EventLoadingFailed>().await?;

    let mut assets = ObservedAssets::default();
    let mut monitor = NetworkMonitor::new(rule.idle_connections, rule.idle_period, Instant::now());
    let mut ticker = tokio::time::interval(IDLE_POLL_INTERVAL);
    let navigation = page.goto(url.as_str());
    tokio::pin!(navigation);
    let mut navigated = false;

    loop {
        tokio::select! {
            result = &mut navigation, if !navigated => {
                if let Err(e) = result {
                    tracing::error!("Navigation to {} failed\nError : {}", url, e);
                    return Err(SiteCloneError::NavigationError {
                        url: url.to_string(),
                        message: e.to_string(),
                    });
                }
                navigated = true;
                tracing::debug!("Page loaded, waiting for network idle");
            }
            Some(event) = requests.next() => {
                monitor.request_started(event.request_id.inner(), Instant::now());
            }
            Some(event) = finished.next() => {
                monitor.request_settled(event.request_id.inner(), Instant::now());
            }
            Some(event) = failed.next() => {
                monitor.request_settled(event.request_id.inner(), Instant::now());
            }
            Some(event) = responses.next() => {
                assets.record(
                    &event.response.url,
                    ResourceKind::from_resource_type(&event.r#type),
                    event.response.status,
                );
            }
            _ = ticker.tick() => {
                if navigated && monitor.is_idle(Instant::now()) {
                    tracing::debug!("Network idle with {} requests in flight", monitor.inflight());
                    break;
                }
            }
        }
    }
    Ok(assets)
}

async fn page_content(page: &Page) -> Result<String, SiteCloneError> {
    page.content()
        .await
        .map_err(|e| SiteCloneError::PageContentError(e.to_string()))
}

async fn current_url(page: &Page, fallback: &Url) -> Url {
    match page.url().await {
        Ok(Some(u)) => Url::parse(&u).unwrap_or_else(|_| fallback.clone()),
        _ => fallback.clone(),
    }
}

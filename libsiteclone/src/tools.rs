//! Tools a model can call by name, each taking one json input.

use crate::download::{build_client, download_into_dir};
use crate::errors::SiteCloneError;
use crate::writer::write_file;
use crate::{capture, CaptureRule};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Folder used when a tool call names a url but no folder.
pub const DEFAULT_OUTPUT_FOLDER: &str = "cloned-site";

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    /// Runs the tool. The returned text is what gets shown to the user and
    /// reported back to the model.
    async fn invoke(&self, input: Value) -> Result<String, SiteCloneError>;
}

pub struct ToolRegistry {
    tools: HashMap<&'static str, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// `scrape`, `downloadAsset` and `writeToFile`.
    pub fn with_builtin_tools(rule: CaptureRule) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ScrapeTool { rule }));
        registry.register(Box::new(DownloadAssetTool));
        registry.register(Box::new(WriteToFileTool));
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.tools.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

fn invalid_input(tool: &str, message: &str) -> SiteCloneError {
    SiteCloneError::InvalidToolInput {
        tool: tool.to_string(),
        message: message.to_string(),
    }
}

/// Reads `(url, folder)` from a bare string, a `[url, folder]` array or an
/// object with `url` and `outputFolder`.
fn url_and_folder(tool: &str, input: &Value) -> Result<(String, String), SiteCloneError> {
    match input {
        Value::String(url) => Ok((url.to_string(), DEFAULT_OUTPUT_FOLDER.to_string())),
        Value::Array(items) => {
            let url = items
                .first()
                .and_then(|v| v.as_str())
                .ok_or_else(|| invalid_input(tool, "expected [url, outputFolder]"))?;
            let folder = items
                .get(1)
                .and_then(|v| v.as_str())
                .unwrap_or(DEFAULT_OUTPUT_FOLDER);
            Ok((url.to_string(), folder.to_string()))
        }
        Value::Object(map) => {
            let url = map
                .get("url")
                .and_then(|v| v.as_str())
                .ok_or_else(|| invalid_input(tool, "missing url"))?;
            let folder = map
                .get("outputFolder")
                .and_then(|v| v.as_str())
                .unwrap_or(DEFAULT_OUTPUT_FOLDER);
            Ok((url.to_string(), folder.to_string()))
        }
        _ => Err(invalid_input(tool, "expected a url or {url, outputFolder}")),
    }
}

pub struct ScrapeTool {
    pub rule: CaptureRule,
}

#[async_trait]
impl Tool for ScrapeTool {
    fn name(&self) -> &'static str {
        "scrape"
    }

    async fn invoke(&self, input: Value) -> Result<String, SiteCloneError> {
        let (url, folder) = url_and_folder(self.name(), &input)?;
        let outcome = capture(&url, Path::new(&folder), &self.rule).await;
        serde_json::to_string(&outcome).map_err(|e| SiteCloneError::UnknownError(e.to_string()))
    }
}

pub struct DownloadAssetTool;

#[async_trait]
impl Tool for DownloadAssetTool {
    fn name(&self) -> &'static str {
        "downloadAsset"
    }

    async fn invoke(&self, input: Value) -> Result<String, SiteCloneError> {
        let (url, folder) = url_and_folder(self.name(), &input)?;
        let client = build_client()?;
        // Download failures are logged by the downloader, not raised.
        Ok(match download_into_dir(&client, &url, Path::new(&folder)).await {
            Some(path) => format!("Downloaded {} to {}", url, path.display()),
            None => format!("Failed to download asset: {url}"),
        })
    }
}

pub struct WriteToFileTool;

#[async_trait]
impl Tool for WriteToFileTool {
    fn name(&self) -> &'static str {
        "writeToFile"
    }

    async fn invoke(&self, input: Value) -> Result<String, SiteCloneError> {
        let (file_name, content) = match &input {
            Value::Array(items) => (
                items.first().and_then(|v| v.as_str()),
                items.get(1).and_then(|v| v.as_str()),
            ),
            Value::Object(map) => (
                map.get("fileName").and_then(|v| v.as_str()),
                map.get("content").and_then(|v| v.as_str()),
            ),
            _ => (None, None),
        };
        match (file_name, content) {
            (Some(file_name), Some(content)) => write_file(Path::new(file_name), content).await,
            _ => Err(invalid_input(self.name(), "expected [fileName, content]")),
        }
    }
}

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step of the model's START → THINK → TOOL → OUTPUT protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "UPPERCASE")]
pub enum Step {
    Start {
        content: String,
    },
    Think {
        content: String,
    },
    Tool {
        tool_name: String,
        #[serde(default)]
        input: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    Output {
        content: String,
    },
}

impl Step {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = strip_code_fence(raw.trim());
        serde_json::from_str(trimmed).map_err(|e| Error::InvalidStep(format!("{e} | {raw}")))
    }
}

/// Models sometimes wrap their json in a ```json fence.
fn strip_code_fence(raw: &str) -> &str {
    let inner = match raw.strip_prefix("```") {
        Some(rest) => rest,
        None => return raw,
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

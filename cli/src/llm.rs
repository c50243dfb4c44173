use crate::config::ModelConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Developer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Anything that can produce the next reply for a conversation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI compatible `/chat/completions` endpoint, asking for
/// json object replies.
pub struct OpenAiCompatClient {
    client: Client,
    config: ModelConfig,
}

impl OpenAiCompatClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::ModelRequest(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatClient {
    #[tracing::instrument(skip(self, messages), fields(model = %self.config.model))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "messages": messages,
            "response_format": { "type": "json_object" },
        });
        let response = match self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Error reaching model endpoint\nError : {}", e);
                return Err(Error::ModelRequest(e.to_string()));
            }
        };
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!("Model endpoint returned {} : {}", status, text);
            return Err(Error::ModelRequest(format!("{status} : {text}")));
        }
        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::ModelRequest(e.to_string()))?;
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

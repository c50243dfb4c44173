use crate::error::{Error, Result};
use std::env;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Where the model lives. Read from the environment (and a `.env` file).
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ModelConfig {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded : {}", e);
        }
        let api_key = env::var("SITECLONE_API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .map_err(|_| Error::Config("set SITECLONE_API_KEY or GEMINI_API_KEY".to_string()))?;
        let base_url = env::var("SITECLONE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("SITECLONE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }
}

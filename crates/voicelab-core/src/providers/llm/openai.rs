use super::LlmClient;
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_KEY_PREFIX: &str = "sk-or-v1-";

/// Chat-completions client for OpenAI-compatible endpoints.
///
/// An OpenRouter key (`sk-or-v1-` prefix) routes to the OpenRouter base URL
/// with attribution headers; anything else goes to OpenAI directly.
pub struct OpenAIClient {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = if api_key.starts_with(OPENROUTER_KEY_PREFIX) {
            std::env::var("OPENROUTER_BASE_URL").unwrap_or_else(|_| OPENROUTER_BASE_URL.into())
        } else {
            OPENAI_BASE_URL.into()
        };
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            model,
            api_key,
            base_url,
            temperature: 0.7,
            max_tokens: 4096,
            client,
        })
    }

    /// Key resolution order: OPENROUTER_API_KEY, then OPENAI_API_KEY.
    pub fn from_env(model: String, timeout: Duration) -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                anyhow::anyhow!("no API key: set OPENROUTER_API_KEY or OPENAI_API_KEY")
            })?;
        Self::new(model, api_key, timeout)
    }

    fn is_openrouter(&self) -> bool {
        self.api_key.starts_with(OPENROUTER_KEY_PREFIX)
    }

    async fn chat(
        &self,
        instructions: &str,
        input: &str,
        json_mode: bool,
    ) -> anyhow::Result<LlmResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": instructions },
                { "role": "user", "content": input },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        if json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let mut req = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if self.is_openrouter() {
            req = req
                .header(
                    "HTTP-Referer",
                    "https://github.com/inquiry-institute/voicelab",
                )
                .header("X-Title", "Voicelab Persona Research");
        }

        let resp = req.json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("chat API error (status {}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        if text.trim().is_empty() {
            // Some upstreams return 200 with a blank choice under load.
            anyhow::bail!("empty response from chat API");
        }

        Ok(LlmResponse {
            text,
            provider: self.provider_name().to_string(),
            model: self.model.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, instructions: &str, input: &str) -> anyhow::Result<LlmResponse> {
        self.chat(instructions, input, false).await
    }

    async fn complete_json(&self, instructions: &str, input: &str) -> anyhow::Result<LlmResponse> {
        self.chat(instructions, input, true).await
    }

    fn provider_name(&self) -> &'static str {
        if self.is_openrouter() {
            "openrouter"
        } else {
            "openai"
        }
    }
}

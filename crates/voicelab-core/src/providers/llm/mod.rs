use crate::model::LlmResponse;
use async_trait::async_trait;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, instructions: &str, input: &str) -> anyhow::Result<LlmResponse>;

    /// Same call with the provider's JSON output mode, where one exists.
    /// The judge path uses this; providers without a JSON mode fall back to
    /// plain completion and rely on the extractor downstream.
    async fn complete_json(&self, instructions: &str, input: &str) -> anyhow::Result<LlmResponse> {
        self.complete(instructions, input).await
    }

    fn provider_name(&self) -> &'static str;
}

pub mod fake;
pub mod openai;

use super::LlmClient;
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Scripted reply for the fake provider.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    /// Fails with quota-style wording, which the retry layer classifies as
    /// transient.
    Transient(String),
    Fatal(String),
}

/// Deterministic offline client. Replies are consumed from the script in
/// order; once the script is empty, plain calls return canned prose and
/// JSON-mode calls return a canned valid judge record.
pub struct FakeLlm {
    script: Mutex<VecDeque<Reply>>,
    calls: AtomicU32,
}

pub const CANNED_JUDGE_JSON: &str = r#"{"voice_accuracy": 4, "style_marker_coverage": 0.75, "persona_consistency": 4, "clarity": 5, "overfitting_to_mbti": 2, "rationales": ["steady diction", "marker coverage solid"], "cues": ["probing question", "defines terms"]}"#;

impl FakeLlm {
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_script(script: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self, default: &str) -> anyhow::Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().unwrap().pop_front();
        let text = match scripted {
            Some(Reply::Text(t)) => t,
            Some(Reply::Transient(msg)) => {
                anyhow::bail!("chat API error (status 402): Insufficient credits: {}", msg)
            }
            Some(Reply::Fatal(msg)) => anyhow::bail!("chat API error (status 400): {}", msg),
            None => default.to_string(),
        };
        Ok(LlmResponse {
            text,
            provider: "fake".into(),
            model: "fake-model".into(),
        })
    }
}

impl Default for FakeLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn complete(&self, _instructions: &str, _input: &str) -> anyhow::Result<LlmResponse> {
        self.next("A measured reply in the persona's voice, for offline runs.")
    }

    async fn complete_json(&self, _instructions: &str, _input: &str) -> anyhow::Result<LlmResponse> {
        self.next(CANNED_JUDGE_JSON)
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

//! LLM-as-judge scoring with in-band degradation.
//!
//! `JudgeService::evaluate` never fails: call errors, unparseable replies,
//! and bounds violations all collapse into a sentinel record whose
//! rationales name what went wrong. A single bad judge reply must not take
//! down a run of hundreds of trials.

pub mod extract;
pub mod schema;

use crate::model::{FallbackScores, JudgeScores, PersonaProfile};
use crate::prompts;
use crate::providers::llm::LlmClient;
use crate::retry::{with_retry, Pacer, RetryPolicy};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct JudgeConfig {
    pub fallback: FallbackScores,
    pub retry: RetryPolicy,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            fallback: FallbackScores::default(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Clone)]
pub struct JudgeService {
    config: JudgeConfig,
    client: Arc<dyn LlmClient>,
}

impl JudgeService {
    pub fn new(config: JudgeConfig, client: Arc<dyn LlmClient>) -> Self {
        Self { config, client }
    }

    pub async fn evaluate(
        &self,
        persona: &PersonaProfile,
        overlay: &str,
        user_prompt: &str,
        generated: &str,
        pacer: &dyn Pacer,
    ) -> JudgeScores {
        let prompt = prompts::judge_prompt(persona, overlay, user_prompt, generated);
        let resp = with_retry(&self.config.retry, pacer, || {
            self.client.complete_json(prompts::JUDGE_INSTRUCTIONS, &prompt)
        })
        .await;

        match resp {
            Ok(r) => self.score_text(&r.text),
            Err(e) => {
                tracing::warn!(error = %e, persona = %persona.key, "judge call failed");
                JudgeScores::sentinel(&format!("judge call failed: {:#}", e), None)
            }
        }
    }

    /// Extract and validate a raw judge reply. Exposed separately so the
    /// parsing path is testable without a client.
    pub fn score_text(&self, text: &str) -> JudgeScores {
        match extract::extract(text, &self.config.fallback) {
            extract::Extraction::Unrecoverable { reason } => {
                JudgeScores::sentinel(&reason, Some(text))
            }
            extract::Extraction::Recovered(fields) => match schema::validate(&fields) {
                Ok(scores) => scores,
                Err(why) => {
                    let raw = serde_json::Value::Object(fields).to_string();
                    JudgeScores::sentinel(&why, Some(&raw))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::llm::fake::{FakeLlm, Reply};
    use crate::retry::NoopPacer;

    fn service(client: FakeLlm) -> JudgeService {
        JudgeService::new(JudgeConfig::default(), Arc::new(client))
    }

    fn persona() -> PersonaProfile {
        crate::catalog::personas().remove(0)
    }

    #[tokio::test]
    async fn valid_reply_scores_normally() {
        let svc = service(FakeLlm::new());
        let s = svc
            .evaluate(&persona(), "INTJ", "Q", "generated text", &NoopPacer)
            .await;
        assert!(!s.is_sentinel());
        assert_eq!(s.voice_accuracy, 4);
    }

    #[tokio::test]
    async fn out_of_bounds_reply_degrades_to_sentinel_with_error_text() {
        let bad = r#"{"voice_accuracy": 9, "style_marker_coverage": 0.5,
            "persona_consistency": 3, "clarity": 3, "overfitting_to_mbti": 2,
            "rationales": ["r"], "cues": ["a", "b"]}"#;
        let svc = service(FakeLlm::with_script(vec![Reply::Text(bad.into())]));
        let s = svc.evaluate(&persona(), "INTJ", "Q", "text", &NoopPacer).await;
        assert!(s.is_sentinel());
        assert!(s.rationales.iter().any(|r| r.contains("out of range")));
        assert!(s.cues[0].contains("voice_accuracy"));
    }

    #[tokio::test]
    async fn exhausted_transient_errors_degrade_to_sentinel() {
        let svc = service(FakeLlm::with_script(vec![
            Reply::Transient("1".into()),
            Reply::Transient("2".into()),
            Reply::Transient("3".into()),
        ]));
        let s = svc.evaluate(&persona(), "NONE", "Q", "text", &NoopPacer).await;
        assert!(s.is_sentinel());
        assert!(s.rationales.iter().any(|r| r.contains("judge call failed")));
    }

    #[tokio::test]
    async fn transient_errors_then_success_records_real_result() {
        let svc = service(FakeLlm::with_script(vec![
            Reply::Transient("quota".into()),
            Reply::Transient("quota".into()),
        ]));
        // Third attempt falls back to the canned valid judge JSON.
        let s = svc.evaluate(&persona(), "ENFP", "Q", "text", &NoopPacer).await;
        assert!(!s.is_sentinel());
        assert_eq!(s.clarity, 5);
    }

    #[test]
    fn score_text_sentinel_keeps_raw_snippet() {
        let svc = service(FakeLlm::new());
        let s = svc.score_text("no json here at all");
        assert!(s.is_sentinel());
        assert_eq!(s.cues[0], "no json here at all");
    }
}

//! Sequential trial runner.
//!
//! One experiment is a fixed matrix: for every persona, a control pass
//! (no overlay) over every prompt, then each overlay label over every
//! prompt. Trials run strictly one at a time with a pacing delay between
//! them, and every finished trial is flushed to disk before the next one
//! starts, so a killed run resumes from the tabular log with no lost work
//! beyond the in-flight trial.

use crate::assess::assess_persona;
use crate::judge::{JudgeConfig, JudgeService};
use crate::log::{load_completed, ResultLog};
use crate::model::{
    ExperimentConfig, PersonaProfile, Settings, TrialKey, TrialRecord, TrialRow, CONTROL_LABEL,
    UNKNOWN_LABEL,
};
use crate::prompts;
use crate::providers::llm::LlmClient;
use crate::retry::{with_retry, Pacer, RetryPolicy};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RunPolicy {
    /// Delay between consecutive trials.
    pub pacing: Duration,
    pub retry: RetryPolicy,
    /// Run the per-persona type assessment pass before the matrix.
    pub assess_types: bool,
}

impl RunPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        let retry = RetryPolicy {
            max_attempts: settings.max_retries.unwrap_or(3),
            base_delay: Duration::from_millis(settings.retry_base_ms.unwrap_or(2000)),
            ..RetryPolicy::default()
        };
        Self {
            pacing: Duration::from_millis(settings.pacing_ms.unwrap_or(1000)),
            retry,
            assess_types: settings.assess_types.unwrap_or(true),
        }
    }
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Trials executed in this invocation.
    pub executed: usize,
    /// Trials skipped because the log already had them.
    pub skipped: usize,
    /// Executed trials that ended in a sentinel score.
    pub degraded: usize,
    /// Distinct trial keys present in the log after the run.
    pub completed: usize,
    /// Full matrix size for this config.
    pub expected: usize,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.completed >= self.expected
    }
}

pub struct Runner {
    generator: Arc<dyn LlmClient>,
    judge_client: Arc<dyn LlmClient>,
    judge: JudgeService,
    pacer: Arc<dyn Pacer>,
    policy: RunPolicy,
}

impl Runner {
    pub fn new(
        generator: Arc<dyn LlmClient>,
        judge_client: Arc<dyn LlmClient>,
        judge_config: JudgeConfig,
        pacer: Arc<dyn Pacer>,
        policy: RunPolicy,
    ) -> Self {
        let judge = JudgeService::new(judge_config, judge_client.clone());
        Self {
            generator,
            judge_client,
            judge,
            pacer,
            policy,
        }
    }

    /// Run (or resume) the full matrix for `personas` x `labels` x the
    /// config's prompts. Returns counts; individual trial failures degrade
    /// in-band and never abort the run.
    pub async fn run_experiment(
        &self,
        cfg: &ExperimentConfig,
        personas: &[PersonaProfile],
        labels: &[&str],
    ) -> anyhow::Result<RunReport> {
        let completed = load_completed(&cfg.output.csv);
        if completed.is_empty() {
            eprintln!("🆕 Starting fresh run: {}", cfg.experiment);
        } else {
            eprintln!(
                "📊 Resuming run: {} ({} trials already logged)",
                cfg.experiment,
                completed.len()
            );
        }

        let mut log = ResultLog::open(&cfg.output.csv, &cfg.output.jsonl)?;
        let mut report = RunReport {
            expected: personas.len() * cfg.prompts.len() * (1 + labels.len()),
            ..RunReport::default()
        };

        let assessed = self.assess_all(personas).await;

        for persona in personas {
            let assessed_type = assessed
                .get(&persona.key)
                .map(String::as_str)
                .unwrap_or(UNKNOWN_LABEL);
            eprintln!("\n🎭 {} ({})", persona.name, persona.domain);

            for overlay in std::iter::once(None).chain(labels.iter().map(|l| Some(*l))) {
                for (prompt_id, prompt) in cfg.prompts.iter().enumerate() {
                    let key = TrialKey {
                        persona_key: persona.key.clone(),
                        prompt_id,
                        overlay: overlay.unwrap_or(CONTROL_LABEL).to_string(),
                        use_overlay: overlay.is_some(),
                    };
                    if completed.contains(&key) {
                        report.skipped += 1;
                        continue;
                    }

                    let record = self
                        .run_trial(cfg, persona, assessed_type, overlay, prompt_id, prompt)
                        .await;
                    if record.row.voice_accuracy < 0 {
                        report.degraded += 1;
                    }
                    log.append(&record)?;
                    report.executed += 1;

                    self.pacer.pause(self.policy.pacing).await;
                }
            }
        }

        report.completed = load_completed(&cfg.output.csv).len();
        Ok(report)
    }

    async fn assess_all(&self, personas: &[PersonaProfile]) -> HashMap<String, String> {
        let mut assessed = HashMap::new();
        if !self.policy.assess_types {
            return assessed;
        }
        eprintln!("🔎 Assessing persona types...");
        for persona in personas {
            let label = assess_persona(
                self.judge_client.as_ref(),
                persona,
                &self.policy.retry,
                self.pacer.as_ref(),
            )
            .await;
            assessed.insert(persona.key.clone(), label);
        }
        assessed
    }

    async fn run_trial(
        &self,
        cfg: &ExperimentConfig,
        persona: &PersonaProfile,
        assessed_type: &str,
        overlay: Option<&str>,
        prompt_id: usize,
        prompt: &str,
    ) -> TrialRecord {
        let overlay_label = overlay.unwrap_or(CONTROL_LABEL);
        eprintln!("  ▶ {} | prompt {}", overlay_label, prompt_id);

        let gen_prompt = prompts::generation_prompt(persona, overlay, prompt);
        let generation = with_retry(&self.policy.retry, self.pacer.as_ref(), || {
            self.generator.complete(prompts::GENERATION_SYSTEM, &gen_prompt)
        })
        .await;

        let (generated_text, scores) = match generation {
            Ok(resp) => {
                let scores = self
                    .judge
                    .evaluate(persona, overlay_label, prompt, &resp.text, self.pacer.as_ref())
                    .await;
                (resp.text, scores)
            }
            Err(e) => {
                tracing::warn!(
                    persona = %persona.key,
                    overlay = overlay_label,
                    prompt_id,
                    error = %e,
                    "generation failed"
                );
                (
                    String::new(),
                    crate::model::JudgeScores::sentinel(
                        &format!("generation failed: {:#}", e),
                        None,
                    ),
                )
            }
        };

        let type_match = match overlay {
            None => "N/A".to_string(),
            Some(_) if assessed_type == UNKNOWN_LABEL => "N/A".to_string(),
            Some(label) if label == assessed_type => "MATCH".to_string(),
            Some(_) => "MISMATCH".to_string(),
        };

        TrialRecord {
            row: TrialRow {
                persona_key: persona.key.clone(),
                persona_name: persona.name.clone(),
                overlay: overlay_label.to_string(),
                assessed_type: assessed_type.to_string(),
                type_match,
                use_overlay: overlay.is_some(),
                prompt_id,
                prompt: prompt.to_string(),
                generated_text,
                voice_accuracy: scores.voice_accuracy,
                style_marker_coverage: scores.style_marker_coverage,
                persona_consistency: scores.persona_consistency,
                clarity: scores.clarity,
                overfitting_to_mbti: scores.overfitting_to_mbti,
                rationales: serde_json::to_string(&scores.rationales).unwrap_or_default(),
                cues: serde_json::to_string(&scores.cues).unwrap_or_default(),
            },
            persona: persona.into(),
            models: cfg.models.clone(),
            timestamp_unix: chrono::Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutputPaths;
    use crate::providers::llm::fake::FakeLlm;
    use crate::retry::NoopPacer;

    fn config(dir: &std::path::Path, prompts: usize) -> ExperimentConfig {
        ExperimentConfig {
            version: 1,
            experiment: "test".into(),
            models: Default::default(),
            settings: Default::default(),
            fallback: Default::default(),
            prompts: (0..prompts).map(|i| format!("prompt {}", i)).collect(),
            output: OutputPaths {
                jsonl: dir.join("r.jsonl"),
                csv: dir.join("r.csv"),
            },
        }
    }

    fn runner() -> Runner {
        let policy = RunPolicy {
            pacing: Duration::ZERO,
            retry: RetryPolicy {
                base_delay: Duration::from_millis(1),
                jitter: Duration::ZERO,
                ..RetryPolicy::default()
            },
            assess_types: false,
        };
        Runner::new(
            Arc::new(FakeLlm::new()),
            Arc::new(FakeLlm::new()),
            JudgeConfig::default(),
            Arc::new(NoopPacer),
            policy,
        )
    }

    fn persona() -> PersonaProfile {
        crate::catalog::personas().remove(0)
    }

    #[tokio::test]
    async fn fresh_run_covers_control_plus_labels_times_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 2);
        let report = runner()
            .run_experiment(&cfg, &[persona()], &["INTJ"])
            .await
            .unwrap();

        // 1 persona x 2 prompts x (control + 1 label)
        assert_eq!(report.expected, 4);
        assert_eq!(report.executed, 4);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.completed, 4);
        assert!(report.is_complete());

        let completed = load_completed(&cfg.output.csv);
        assert!(completed.contains(&TrialKey {
            persona_key: "plato".into(),
            prompt_id: 1,
            overlay: "NONE".into(),
            use_overlay: false,
        }));
        assert!(completed.contains(&TrialKey {
            persona_key: "plato".into(),
            prompt_id: 0,
            overlay: "INTJ".into(),
            use_overlay: true,
        }));
    }

    #[tokio::test]
    async fn second_run_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 2);
        let r = runner();

        r.run_experiment(&cfg, &[persona()], &["INTJ"]).await.unwrap();
        let report = r.run_experiment(&cfg, &[persona()], &["INTJ"]).await.unwrap();

        assert_eq!(report.executed, 0);
        assert_eq!(report.skipped, 4);
        assert_eq!(report.completed, 4);
    }

    #[tokio::test]
    async fn control_rows_record_no_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 1);
        runner()
            .run_experiment(&cfg, &[persona()], &[])
            .await
            .unwrap();

        let mut reader = csv::Reader::from_path(&cfg.output.csv).unwrap();
        let rows: Vec<TrialRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].overlay, "NONE");
        assert!(!rows[0].use_overlay);
        assert_eq!(rows[0].type_match, "N/A");
        assert_eq!(rows[0].assessed_type, "UNKNOWN");
        assert_eq!(rows[0].voice_accuracy, 4);
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Overlay label recorded for the control condition (no style overlay).
pub const CONTROL_LABEL: &str = "NONE";

/// Label recorded when a persona's type assessment could not be obtained.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default, rename = "configVersion", alias = "version")]
    pub version: u32,
    pub experiment: String,
    #[serde(default)]
    pub models: Models,
    #[serde(default, skip_serializing_if = "is_default_settings")]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "is_default_fallback")]
    pub fallback: FallbackScores,
    pub prompts: Vec<String>,
    #[serde(default)]
    pub output: OutputPaths,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Models {
    #[serde(default = "default_model")]
    pub generation: String,
    #[serde(default = "default_model")]
    pub judge: String,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            generation: default_model(),
            judge: default_model(),
        }
    }
}

fn default_model() -> String {
    "openai/gpt-oss-120b".into()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pacing_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assess_types: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_base_ms: Option<u64>,
}

fn is_default_settings(s: &Settings) -> bool {
    s == &Settings::default()
}

/// Neutral scores used when the judge reply parses but omits a field.
///
/// The midpoint defaults mirror the judge rubric's "mixed" anchor. They are
/// configurable because defaulting to the midpoint is a product decision,
/// not a parsing one; see the `fallback:` block in the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallbackScores {
    #[serde(default = "default_mid")]
    pub voice_accuracy: i64,
    #[serde(default = "default_half")]
    pub style_marker_coverage: f64,
    #[serde(default = "default_mid")]
    pub persona_consistency: i64,
    #[serde(default = "default_mid")]
    pub clarity: i64,
    #[serde(default = "default_low")]
    pub overfitting_to_mbti: i64,
}

impl Default for FallbackScores {
    fn default() -> Self {
        Self {
            voice_accuracy: default_mid(),
            style_marker_coverage: default_half(),
            persona_consistency: default_mid(),
            clarity: default_mid(),
            overfitting_to_mbti: default_low(),
        }
    }
}

fn default_mid() -> i64 {
    3
}
fn default_half() -> f64 {
    0.5
}
fn default_low() -> i64 {
    2
}

fn is_default_fallback(f: &FallbackScores) -> bool {
    f == &FallbackScores::default()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputPaths {
    #[serde(default = "default_jsonl")]
    pub jsonl: PathBuf,
    #[serde(default = "default_csv")]
    pub csv: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            jsonl: default_jsonl(),
            csv: default_csv(),
        }
    }
}

fn default_jsonl() -> PathBuf {
    "voice_results.jsonl".into()
}
fn default_csv() -> PathBuf {
    "voice_results.csv".into()
}

/// Static persona catalog entry. Hand-authored, never mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub key: String,
    pub name: String,
    pub domain: String,
    pub era: String,
    pub voice: String,
    pub signature_moves: String,
    pub avoid: String,
    pub style_markers: Vec<String>,
}

/// Identity of one evaluation unit. The set of keys already present in the
/// tabular log is the source of truth for "already completed".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialKey {
    pub persona_key: String,
    pub prompt_id: usize,
    pub overlay: String,
    pub use_overlay: bool,
}

/// Validated judge record. Bounds are enforced by `judge::schema`, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JudgeScores {
    pub voice_accuracy: i64,
    pub style_marker_coverage: f64,
    pub persona_consistency: i64,
    pub clarity: i64,
    pub overfitting_to_mbti: i64,
    pub rationales: Vec<String>,
    pub cues: Vec<String>,
}

impl JudgeScores {
    /// Fixed fallback record used when real scoring cannot be recovered.
    /// The reason travels in-band so the run keeps going and the row stays
    /// inspectable.
    pub fn sentinel(reason: &str, raw: Option<&str>) -> Self {
        let cue = match raw {
            Some(r) if !r.trim().is_empty() => truncate(r, 500),
            _ => "No response".into(),
        };
        Self {
            voice_accuracy: -1,
            style_marker_coverage: -1.0,
            persona_consistency: -1,
            clarity: -1,
            overfitting_to_mbti: -1,
            rationales: vec!["JUDGE_PARSE_ERROR".into(), reason.into()],
            cues: vec![cue],
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.voice_accuracy < 0
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s[..end].to_string()
    }
}

/// Flattened tabular record, one CSV row per trial.
/// `rationales` and `cues` hold JSON-encoded lists so the row stays flat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRow {
    pub persona_key: String,
    pub persona_name: String,
    pub overlay: String,
    pub assessed_type: String,
    pub type_match: String,
    pub use_overlay: bool,
    pub prompt_id: usize,
    pub prompt: String,
    pub generated_text: String,
    pub voice_accuracy: i64,
    pub style_marker_coverage: f64,
    pub persona_consistency: i64,
    pub clarity: i64,
    pub overfitting_to_mbti: i64,
    pub rationales: String,
    pub cues: String,
}

impl TrialRow {
    pub fn key(&self) -> TrialKey {
        TrialKey {
            persona_key: self.persona_key.clone(),
            prompt_id: self.prompt_id,
            overlay: self.overlay.clone(),
            use_overlay: self.use_overlay,
        }
    }
}

/// Full line-delimited record: the row plus the persona block and run
/// provenance. Joins to the tabular form on the trial key fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(flatten)]
    pub row: TrialRow,
    pub persona: PersonaDetail,
    pub models: Models,
    pub timestamp_unix: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaDetail {
    pub domain: String,
    pub era: String,
    pub voice: String,
    pub signature_moves: String,
    pub avoid: String,
    pub style_markers: Vec<String>,
}

impl From<&PersonaProfile> for PersonaDetail {
    fn from(p: &PersonaProfile) -> Self {
        Self {
            domain: p.domain.clone(),
            era: p.era.clone(),
            voice: p.voice.clone(),
            signature_moves: p.signature_moves.clone(),
            avoid: p.avoid.clone(),
            style_markers: p.style_markers.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_carries_reason_and_snippet() {
        let s = JudgeScores::sentinel("validation failed", Some("raw text"));
        assert!(s.is_sentinel());
        assert_eq!(s.rationales[0], "JUDGE_PARSE_ERROR");
        assert_eq!(s.rationales[1], "validation failed");
        assert_eq!(s.cues, vec!["raw text".to_string()]);
    }

    #[test]
    fn sentinel_without_raw_uses_placeholder() {
        let s = JudgeScores::sentinel("empty", None);
        assert_eq!(s.cues, vec!["No response".to_string()]);
    }

    #[test]
    fn sentinel_truncates_long_raw() {
        let raw = "x".repeat(2000);
        let s = JudgeScores::sentinel("too long", Some(&raw));
        assert_eq!(s.cues[0].len(), 500);
    }

    #[test]
    fn fallback_defaults_match_rubric_midpoints() {
        let f = FallbackScores::default();
        assert_eq!(f.voice_accuracy, 3);
        assert_eq!(f.style_marker_coverage, 0.5);
        assert_eq!(f.overfitting_to_mbti, 2);
    }
}

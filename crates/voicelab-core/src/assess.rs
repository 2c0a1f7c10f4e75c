//! Per-persona personality-type assessment.
//!
//! Run once per persona before the trial matrix so every row can record
//! whether the overlay under test matches the type the judge model thinks
//! the persona actually is. Failure here is never fatal: the persona is
//! tagged UNKNOWN and the matrix proceeds.

use crate::catalog;
use crate::model::{PersonaProfile, UNKNOWN_LABEL};
use crate::prompts;
use crate::providers::llm::LlmClient;
use crate::retry::{with_retry, Pacer, RetryPolicy};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct TypeAssessment {
    pub type_label: String,
    pub confidence: i64,
    pub reasoning: String,
}

/// Normalize a possibly-noisy label: exact match after trim/uppercase, else
/// the first valid code embedded anywhere in the string.
pub fn normalize_label(raw: &str) -> Option<&'static str> {
    let up = raw.trim().to_ascii_uppercase();
    catalog::OVERLAY_LABELS
        .iter()
        .copied()
        .find(|l| up == *l)
        .or_else(|| catalog::OVERLAY_LABELS.iter().copied().find(|l| up.contains(l)))
}

pub fn parse_assessment(text: &str) -> Result<TypeAssessment, String> {
    let value: Value = serde_json::from_str(text.trim())
        .or_else(|_| brace_span(text))
        .map_err(|e| format!("assessment not JSON: {}", e))?;
    let obj = value
        .as_object()
        .ok_or_else(|| "assessment is not an object".to_string())?;

    let raw_label = obj
        .get("type_label")
        .or_else(|| obj.get("mbti_type"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| "missing type_label".to_string())?;
    let type_label = normalize_label(raw_label)
        .ok_or_else(|| format!("invalid type label: {}", raw_label))?
        .to_string();

    let confidence = obj
        .get("confidence")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| "missing confidence".to_string())?;
    if !(1..=5).contains(&confidence) {
        return Err(format!("confidence: {} out of range 1..=5", confidence));
    }

    let reasoning = obj
        .get("reasoning")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if reasoning.len() < 50 {
        return Err("reasoning too short (need 50+ chars)".into());
    }

    Ok(TypeAssessment {
        type_label,
        confidence,
        reasoning,
    })
}

fn brace_span(text: &str) -> Result<Value, serde_json::Error> {
    let start = text.find('{').unwrap_or(0);
    let end = text.rfind('}').map(|e| e + 1).unwrap_or(text.len());
    serde_json::from_str(&text[start..end.max(start)])
}

/// Assess one persona's type via the judge model. Degrades to UNKNOWN on
/// any failure, after retrying transient errors.
pub async fn assess_persona(
    client: &dyn LlmClient,
    persona: &PersonaProfile,
    retry: &RetryPolicy,
    pacer: &dyn Pacer,
) -> String {
    let prompt = prompts::assessment_prompt(persona);
    let resp = with_retry(retry, pacer, || {
        client.complete_json(prompts::ASSESSMENT_SYSTEM, &prompt)
    })
    .await;

    match resp {
        Ok(r) => match parse_assessment(&r.text) {
            Ok(a) => {
                eprintln!(
                    "  {}: {} (confidence: {}/5)",
                    persona.name, a.type_label, a.confidence
                );
                a.type_label
            }
            Err(why) => {
                tracing::warn!(persona = %persona.key, error = %why, "assessment validation failed");
                UNKNOWN_LABEL.into()
            }
        },
        Err(e) => {
            tracing::warn!(persona = %persona.key, error = %e, "assessment call failed");
            UNKNOWN_LABEL.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_embedded_labels_normalize() {
        assert_eq!(normalize_label("intj "), Some("INTJ"));
        assert_eq!(normalize_label("Most likely ENFP overall"), Some("ENFP"));
        assert_eq!(normalize_label("nope"), None);
    }

    #[test]
    fn valid_assessment_parses() {
        let text = format!(
            r#"{{"type_label": "INTJ", "confidence": 4, "reasoning": "{}"}}"#,
            "x".repeat(60)
        );
        let a = parse_assessment(&text).unwrap();
        assert_eq!(a.type_label, "INTJ");
        assert_eq!(a.confidence, 4);
    }

    #[test]
    fn legacy_mbti_type_key_is_accepted() {
        let text = format!(
            r#"{{"mbti_type": "ISFP", "confidence": 3, "reasoning": "{}"}}"#,
            "y".repeat(60)
        );
        assert_eq!(parse_assessment(&text).unwrap().type_label, "ISFP");
    }

    #[test]
    fn short_reasoning_is_rejected() {
        let text = r#"{"type_label": "INTJ", "confidence": 4, "reasoning": "brief"}"#;
        assert!(parse_assessment(text).unwrap_err().contains("too short"));
    }

    #[test]
    fn prose_wrapped_assessment_is_recovered() {
        let text = format!(
            r#"Sure: {{"type_label": "ENTP", "confidence": 5, "reasoning": "{}"}} done."#,
            "z".repeat(60)
        );
        assert_eq!(parse_assessment(&text).unwrap().type_label, "ENTP");
    }
}

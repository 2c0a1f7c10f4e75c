//! Bounds validation for the canonical judge record.
//!
//! Out-of-range values are a validation failure, not a clamp: a judge that
//! answers `voice_accuracy: 7` is not following the rubric, and the row
//! should say so rather than silently pretend it scored 5.

use crate::model::JudgeScores;
use serde_json::{Map, Value};

pub fn validate(fields: &Map<String, Value>) -> Result<JudgeScores, String> {
    let voice_accuracy = int_in_range(fields, "voice_accuracy", 1, 5)?;
    let style_marker_coverage = float_in_range(fields, "style_marker_coverage", 0.0, 1.0)?;
    let persona_consistency = int_in_range(fields, "persona_consistency", 1, 5)?;
    let clarity = int_in_range(fields, "clarity", 1, 5)?;
    let overfitting_to_mbti = int_in_range(fields, "overfitting_to_mbti", 1, 5)?;
    let rationales = string_list(fields, "rationales", 1, usize::MAX)?;
    let cues = string_list(fields, "cues", 2, 5)?;

    Ok(JudgeScores {
        voice_accuracy,
        style_marker_coverage,
        persona_consistency,
        clarity,
        overfitting_to_mbti,
        rationales,
        cues,
    })
}

fn int_in_range(fields: &Map<String, Value>, key: &str, min: i64, max: i64) -> Result<i64, String> {
    let v = fields
        .get(key)
        .ok_or_else(|| format!("missing field {}", key))?;
    let n = match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.fract() == 0.0 {
                    f as i64
                } else {
                    return Err(format!("{}: {} is not an integer", key, f));
                }
            }
        }
        other => return Err(format!("{}: expected integer, got {}", key, other)),
    };
    if n < min || n > max {
        return Err(format!("{}: {} out of range {}..={}", key, n, min, max));
    }
    Ok(n)
}

fn float_in_range(
    fields: &Map<String, Value>,
    key: &str,
    min: f64,
    max: f64,
) -> Result<f64, String> {
    let v = fields
        .get(key)
        .ok_or_else(|| format!("missing field {}", key))?;
    let f = v
        .as_f64()
        .ok_or_else(|| format!("{}: expected number, got {}", key, v))?;
    if !(min..=max).contains(&f) {
        return Err(format!("{}: {} out of range {}..={}", key, f, min, max));
    }
    Ok(f)
}

fn string_list(
    fields: &Map<String, Value>,
    key: &str,
    min: usize,
    max: usize,
) -> Result<Vec<String>, String> {
    let v = fields
        .get(key)
        .ok_or_else(|| format!("missing field {}", key))?;
    let items = v
        .as_array()
        .ok_or_else(|| format!("{}: expected list, got {}", key, v))?;
    let out: Vec<String> = items
        .iter()
        .map(|i| match i {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    if out.len() < min {
        return Err(format!("{}: needs at least {} entries, got {}", key, min, out.len()));
    }
    if out.len() > max {
        return Err(format!("{}: at most {} entries allowed, got {}", key, max, out.len()));
    }
    Ok(out)
}

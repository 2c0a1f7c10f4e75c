//! Structured-output recovery for judge replies.
//!
//! Judge models are asked for bare JSON and routinely return something
//! else: prose-wrapped objects, fenced code blocks, nested `evaluation`
//! wrappers, or nothing at all. Recovery is an ordered chain of shape
//! attempts; the first hit is canonicalized into the seven-field judge
//! record, filling absent fields from the configured fallbacks and naming
//! every fill in the rationales. Nothing in here returns an error.

use crate::model::FallbackScores;
use serde_json::{Map, Value};

#[derive(Debug)]
pub enum Extraction {
    /// A canonical seven-field map. Bounds are NOT checked here; that is
    /// the schema validator's job.
    Recovered(Map<String, Value>),
    /// No strategy produced JSON. The caller records a sentinel row.
    Unrecoverable { reason: String },
}

type Strategy = fn(&str) -> Option<Value>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("direct", parse_direct),
    ("fenced", parse_fenced),
    ("brace_span", parse_brace_span),
];

pub fn extract(text: &str, fallback: &FallbackScores) -> Extraction {
    if text.trim().is_empty() {
        return Extraction::Unrecoverable {
            reason: "empty judge response".into(),
        };
    }
    for (name, strategy) in STRATEGIES {
        if let Some(value) = strategy(text) {
            return Extraction::Recovered(canonicalize(value, name, fallback));
        }
    }
    Extraction::Unrecoverable {
        reason: "could not extract JSON from judge response".into(),
    }
}

fn parse_direct(text: &str) -> Option<Value> {
    serde_json::from_str(text.trim()).ok()
}

/// Inside of the first fenced code block, brace span within it. The
/// language tag line (```json and friends) is skipped wholesale.
fn parse_fenced(text: &str) -> Option<Value> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let body = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };
    parse_brace_span(body)
}

/// Last-ditch: first `{` to last `}` in the raw text.
fn parse_brace_span(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

const INT_FIELDS: [(&str, Option<&str>); 4] = [
    ("voice_accuracy", Some("voice_score")),
    ("persona_consistency", Some("consistency")),
    ("clarity", None),
    ("overfitting_to_mbti", Some("overfitting")),
];

fn canonicalize(value: Value, strategy: &str, fallback: &FallbackScores) -> Map<String, Value> {
    let Some(outer) = value.as_object() else {
        let mut out = defaults_map(fallback);
        out.insert(
            "rationales".into(),
            Value::Array(vec![Value::String(format!(
                "non-object JSON response (via {}); all fields defaulted",
                strategy
            ))]),
        );
        out.insert(
            "cues".into(),
            Value::Array(vec![
                Value::String("unspecified cue".into()),
                Value::String("unspecified cue".into()),
            ]),
        );
        return out;
    };

    // Some judges wrap scores in an "evaluation" sub-object, occasionally
    // double-encoded as a JSON string.
    let scores: Map<String, Value> = match outer.get("evaluation") {
        Some(Value::Object(inner)) => inner.clone(),
        Some(Value::String(s)) => serde_json::from_str::<Value>(s)
            .ok()
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default(),
        Some(_) => Map::new(),
        None => outer.clone(),
    };

    let mut notes = Vec::new();
    let mut out = Map::new();

    for (key, alias) in INT_FIELDS {
        match lookup_number(&scores, key, alias) {
            Some(n) => {
                out.insert(key.into(), n);
            }
            None => {
                out.insert(key.into(), Value::from(fallback_int(fallback, key)));
                notes.push(format!("defaulted {}", key));
            }
        }
    }
    match lookup_number(&scores, "style_marker_coverage", None) {
        Some(n) => {
            out.insert("style_marker_coverage".into(), n);
        }
        None => {
            out.insert(
                "style_marker_coverage".into(),
                Value::from(fallback.style_marker_coverage),
            );
            notes.push("defaulted style_marker_coverage".into());
        }
    }

    // Rationales and cues live on the outer object; a "commentary" map is
    // accepted as a stand-in (values as rationales, keys as cues).
    let mut rationales = string_list(outer.get("rationales"));
    let mut cues = string_list(outer.get("cues"));
    if let Some(Value::Object(commentary)) = outer.get("commentary") {
        if rationales.is_empty() {
            rationales = commentary
                .values()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
        }
        if cues.is_empty() {
            cues = commentary.keys().take(5).cloned().collect();
        }
    }

    rationales.extend(notes);
    if rationales.is_empty() {
        rationales.push("no rationale provided".into());
    }
    while cues.len() < 2 {
        cues.push("unspecified cue".into());
    }

    out.insert(
        "rationales".into(),
        Value::Array(rationales.into_iter().map(Value::String).collect()),
    );
    out.insert(
        "cues".into(),
        Value::Array(cues.into_iter().map(Value::String).collect()),
    );
    out
}

/// Numeric field lookup with alias fallback. Strings holding a number are
/// coerced; anything else counts as absent.
fn lookup_number(map: &Map<String, Value>, key: &str, alias: Option<&str>) -> Option<Value> {
    let raw = map.get(key).or_else(|| alias.and_then(|a| map.get(a)))?;
    match raw {
        Value::Number(_) => Some(raw.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(Value::from(i))
            } else if let Ok(f) = s.parse::<f64>() {
                Some(Value::from(f))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn string_list(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .iter()
            .map(|i| match i {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn fallback_int(f: &FallbackScores, key: &str) -> i64 {
    match key {
        "voice_accuracy" => f.voice_accuracy,
        "persona_consistency" => f.persona_consistency,
        "clarity" => f.clarity,
        "overfitting_to_mbti" => f.overfitting_to_mbti,
        _ => unreachable!("unknown int field {key}"),
    }
}

fn defaults_map(f: &FallbackScores) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("voice_accuracy".into(), Value::from(f.voice_accuracy));
    out.insert(
        "style_marker_coverage".into(),
        Value::from(f.style_marker_coverage),
    );
    out.insert(
        "persona_consistency".into(),
        Value::from(f.persona_consistency),
    );
    out.insert("clarity".into(), Value::from(f.clarity));
    out.insert(
        "overfitting_to_mbti".into(),
        Value::from(f.overfitting_to_mbti),
    );
    out
}

pub const CANONICAL_FIELDS: [&str; 7] = [
    "voice_accuracy",
    "style_marker_coverage",
    "persona_consistency",
    "clarity",
    "overfitting_to_mbti",
    "rationales",
    "cues",
];

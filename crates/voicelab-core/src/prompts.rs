//! Prompt templates for generation, judging, and type assessment.

use crate::model::PersonaProfile;

pub const GENERATION_SYSTEM: &str =
    "You are generating the faculty agent's reply. Follow the persona and constraints.";

pub const ASSESSMENT_SYSTEM: &str = "You are an expert in personality psychology and historical \
analysis. Assess the personality type based on documented characteristics.";

pub const JUDGE_INSTRUCTIONS: &str = r#"You are an evaluator judging whether the assistant output matches the intended faculty persona voice.

You MUST return valid JSON only, no other text.

Score "voice_accuracy" on 1-5:
1 = clearly not the voice; generic; mismatched tone/reasoning
3 = mixed; some markers present but inconsistent
5 = strongly matches persona; consistent diction, rhetoric, reasoning habits

Also score:
- "style_marker_coverage" on 0-1 (fraction): how many expected markers appear (paraphrase OK)
- "persona_consistency" on 1-5: sustained voice, avoids out-of-character drift
- "clarity" on 1-5: readable, well-structured
- "overfitting_to_mbti" on 1-5: 1 = natural, 5 = type caricature
Provide short bullet rationales and cite 2-5 specific textual cues (phrases, moves, cadence), but do not quote more than ~15 words total.

Return ONLY valid JSON with this exact structure:
{
  "voice_accuracy": 1-5,
  "style_marker_coverage": 0.0-1.0,
  "persona_consistency": 1-5,
  "clarity": 1-5,
  "overfitting_to_mbti": 1-5,
  "rationales": ["rationale1", "rationale2"],
  "cues": ["cue1", "cue2", "cue3"]
}"#;

fn persona_block(p: &PersonaProfile) -> String {
    format!(
        "Persona:\n\
         - Name: {}\n\
         - Domain: {}\n\
         - Era/Context: {}\n\
         - Voice: {}\n\
         - Signature moves: {}\n\
         - Avoid: {}",
        p.name, p.domain, p.era, p.voice, p.signature_moves, p.avoid
    )
}

const TASK_BLOCK: &str = "Task:\n\
Answer the user prompt in the persona's authentic voice. Stay truthful, avoid fabricating \
sources, and prefer clearly labeled inference over certainty.\n\
Write 200-350 words.";

/// Generation prompt. `overlay = Some(label)` applies the style overlay,
/// `None` is the control variant (persona only).
pub fn generation_prompt(persona: &PersonaProfile, overlay: Option<&str>, user_prompt: &str) -> String {
    match overlay {
        Some(label) => format!(
            "You are a faculty agent for Inquiry Institute.\n\n\
             {}\n\n\
             MBTI style overlay:\n\
             - MBTI: {}\n\
             - Interpretation for prompt engineering (do not mention MBTI explicitly in the output):\n\
             \x20 * I/E affects outward dialog energy and self-reference frequency\n\
             \x20 * S/N affects concrete-vs-abstract emphasis\n\
             \x20 * T/F affects analytic-vs-values framing\n\
             \x20 * J/P affects structure vs exploration\n\
             - Apply these as subtle stylistic constraints without changing factual intent.\n\n\
             {}\n\
             User prompt: {}\n",
            persona_block(persona),
            label,
            TASK_BLOCK,
            user_prompt
        ),
        None => format!(
            "You are a faculty agent for Inquiry Institute.\n\n\
             {}\n\n\
             {}\n\
             User prompt: {}\n",
            persona_block(persona),
            TASK_BLOCK,
            user_prompt
        ),
    }
}

/// Judge prompt: the persona voice spec, the prompt, the overlay used, and
/// the text under evaluation. A JSON-only trailer is appended because judge
/// models routinely wrap their output in prose otherwise.
pub fn judge_prompt(
    persona: &PersonaProfile,
    overlay: &str,
    user_prompt: &str,
    assistant_output: &str,
) -> String {
    let markers = persona
        .style_markers
        .iter()
        .map(|m| format!("- {}", m))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Evaluate the assistant output against the persona voice spec.\n\n\
         Persona: {}\n\
         Voice spec: {}\n\
         Signature moves: {}\n\
         Avoid: {}\n\
         Expected style markers:\n{}\n\n\
         User prompt:\n{}\n\n\
         Style overlay used (for your awareness): {}\n\n\
         Assistant output:\n{}\n\n\
         IMPORTANT: You must respond with ONLY valid JSON, no explanatory text before or after.",
        persona.name,
        persona.voice,
        persona.signature_moves,
        persona.avoid,
        markers,
        user_prompt,
        overlay,
        assistant_output
    )
}

/// Assessment prompt: what type is this persona, based on its voice spec.
pub fn assessment_prompt(persona: &PersonaProfile) -> String {
    format!(
        "Assess the personality type of this historical figure based on their documented \
         characteristics, writing style, and intellectual approach.\n\n\
         Persona: {}\n\
         Domain: {}\n\
         Era/Context: {}\n\
         Voice characteristics: {}\n\
         Signature moves: {}\n\
         Style markers: {}\n\
         What to avoid: {}\n\n\
         Determine the most likely type along the four axes:\n\
         - I/E: Introversion vs Extraversion (preference for internal vs external focus)\n\
         - S/N: Sensing vs Intuition (concrete details vs abstract patterns)\n\
         - T/F: Thinking vs Feeling (logic vs values in decision-making)\n\
         - J/P: Judging vs Perceiving (structured vs flexible approach)\n\n\
         Return ONLY valid JSON with this structure:\n\
         {{\n\
         \x20 \"type_label\": \"INTJ|INTP|ENTJ|ENTP|INFJ|INFP|ENFJ|ENFP|ISTJ|ISFJ|ESTJ|ESFJ|ISTP|ISFP|ESTP|ESFP\",\n\
         \x20 \"confidence\": 1-5,\n\
         \x20 \"reasoning\": \"Detailed explanation of why this type fits (50+ words)\"\n\
         }}",
        persona.name,
        persona.domain,
        persona.era,
        persona.voice,
        persona.signature_moves,
        persona.style_markers.join(", "),
        persona.avoid
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::personas;

    #[test]
    fn overlay_prompt_names_label_and_control_does_not() {
        let p = &personas()[0];
        let with = generation_prompt(p, Some("INTJ"), "Explain X.");
        let without = generation_prompt(p, None, "Explain X.");
        assert!(with.contains("MBTI: INTJ"));
        assert!(with.contains("Explain X."));
        assert!(!without.contains("MBTI"));
        assert!(without.contains(&p.name));
    }

    #[test]
    fn judge_prompt_lists_markers_and_demands_json() {
        let p = &personas()[1];
        let jp = judge_prompt(p, "ENFP", "Q", "A");
        for m in &p.style_markers {
            assert!(jp.contains(m));
        }
        assert!(jp.contains("ONLY valid JSON"));
        assert!(jp.contains("ENFP"));
    }
}

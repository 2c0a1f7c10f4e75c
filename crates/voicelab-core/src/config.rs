use crate::errors::ConfigError;
use crate::model::ExperimentConfig;
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub fn load_config(path: &Path, strict: bool) -> Result<ExperimentConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut ignored_keys = std::collections::HashSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);

    // serde_ignored wrapper to capture unknown fields
    let cfg: ExperimentConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    if !ignored_keys.is_empty() {
        // Whitelist common YAML anchor keys
        let meaningful_unknowns: Vec<_> = ignored_keys
            .iter()
            .filter(|k| *k != "definitions" && !k.starts_with('_') && !k.starts_with("x-"))
            .collect();

        if strict && !meaningful_unknowns.is_empty() {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?} (file: {})",
                meaningful_unknowns,
                path.display()
            )));
        }
        if !meaningful_unknowns.is_empty() {
            eprintln!("WARN: Ignored unknown config fields: {:?}", meaningful_unknowns);
        }
    }

    // Allow 0 (pre-versioned files) or the current version
    if cfg.version != 0 && cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: 0, {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    if cfg.prompts.is_empty() {
        return Err(ConfigError("config has no prompts".into()));
    }

    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"version: 1
experiment: faculty-voice
models:
  generation: openai/gpt-oss-120b
  judge: openai/gpt-oss-120b
settings:
  pacing_ms: 1000
  timeout_seconds: 60
  assess_types: true
  max_retries: 3
  retry_base_ms: 2000
prompts:
  # Keep prompts domain-neutral but rich enough to reveal voice.
  - "Explain, to an intelligent layperson, why people mistake confidence for correctness."
  - "Critique the claim: 'All education is just training.' Provide a nuanced view."
  - "Offer practical advice for maintaining intellectual humility while leading a team."
output:
  jsonl: voice_results.jsonl
  csv: voice_results.csv
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn sample_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voicelab.yaml");
        write_sample_config(&path).unwrap();
        let cfg = load_config(&path, true).unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.prompts.len(), 3);
        assert_eq!(cfg.settings.pacing_ms, Some(1000));
        assert_eq!(cfg.models.generation, "openai/gpt-oss-120b");
    }

    #[test]
    fn empty_prompts_are_rejected() {
        let f = write_temp("version: 1\nexperiment: e\nprompts: []\n");
        let err = load_config(f.path(), false).unwrap_err();
        assert!(err.to_string().contains("no prompts"));
    }

    #[test]
    fn unknown_fields_fail_in_strict_mode_only() {
        let f = write_temp("version: 1\nexperiment: e\nprompts: [\"p\"]\nbogus: 1\n");
        assert!(load_config(f.path(), true).is_err());
        assert!(load_config(f.path(), false).is_ok());
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let f = write_temp("version: 9\nexperiment: e\nprompts: [\"p\"]\n");
        let err = load_config(f.path(), false).unwrap_err();
        assert!(err.to_string().contains("unsupported config version"));
    }

    #[test]
    fn fallback_block_overrides_defaults() {
        let f = write_temp(
            "version: 1\nexperiment: e\nprompts: [\"p\"]\nfallback:\n  voice_accuracy: 1\n",
        );
        let cfg = load_config(f.path(), true).unwrap();
        assert_eq!(cfg.fallback.voice_accuracy, 1);
        // Unspecified fallback fields keep their defaults.
        assert_eq!(cfg.fallback.clarity, 3);
    }
}

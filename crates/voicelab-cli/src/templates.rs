pub const GITIGNORE: &str = "\
# voicelab artifacts
voice_results.csv
voice_results.jsonl
";

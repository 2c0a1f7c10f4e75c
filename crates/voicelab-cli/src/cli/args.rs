use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "voicelab",
    version,
    about = "Persona voice-accuracy experiments with an LLM judge"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run (or resume) the full persona x overlay x prompt matrix
    Run(RunArgs),
    /// Show how much of the matrix the logs already cover
    Status(StatusArgs),
    /// Print mean scores per persona and per overlay from the tabular log
    Summarize(SummarizeArgs),
    /// Write a starter config file
    Init(InitArgs),
    Version,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    #[arg(long, default_value = "voicelab.yaml")]
    pub config: PathBuf,

    /// generation/judge provider (openai|fake)
    #[arg(long, default_value = "openai", env = "VOICELAB_PROVIDER")]
    pub provider: String,

    /// Override the generation model from the config
    #[arg(long, env = "VOICELAB_MODEL")]
    pub model: Option<String>,

    /// Override the judge model from the config
    #[arg(long, env = "VOICELAB_JUDGE_MODEL")]
    pub judge_model: Option<String>,

    /// Delay between trials in milliseconds (overrides config)
    #[arg(long)]
    pub pacing_ms: Option<u64>,

    /// Skip the per-persona type assessment pass
    #[arg(long)]
    pub no_assess: bool,

    /// Reject unknown config fields instead of warning
    #[arg(long)]
    pub strict: bool,

    /// Restrict the run to these persona keys (default: full catalog)
    #[arg(long, value_delimiter = ',')]
    pub personas: Vec<String>,
}

#[derive(Parser, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "voicelab.yaml")]
    pub config: PathBuf,
}

#[derive(Parser, Clone)]
pub struct SummarizeArgs {
    #[arg(long, default_value = "voicelab.yaml")]
    pub config: PathBuf,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "voicelab.yaml")]
    pub config: PathBuf,

    /// generate .gitignore for result artifacts
    #[arg(long)]
    pub gitignore: bool,
}

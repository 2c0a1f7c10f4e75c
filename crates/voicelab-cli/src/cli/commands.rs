use crate::cli::args::{Cli, Command, InitArgs, RunArgs, StatusArgs, SummarizeArgs};
use crate::templates;
use anyhow::bail;
use std::sync::Arc;
use std::time::Duration;

use voicelab_core::catalog;
use voicelab_core::config::load_config;
use voicelab_core::engine::{RunPolicy, Runner};
use voicelab_core::judge::JudgeConfig;
use voicelab_core::log::load_completed;
use voicelab_core::model::ExperimentConfig;
use voicelab_core::providers::llm::fake::FakeLlm;
use voicelab_core::providers::llm::openai::OpenAIClient;
use voicelab_core::providers::llm::LlmClient;
use voicelab_core::report;
use voicelab_core::retry::{NoopPacer, Pacer, TokioPacer};

pub mod exit_codes {
    pub const OK: i32 = 0;
    /// At least one trial degraded to sentinel scores.
    pub const DEGRADED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => cmd_run(args).await,
        Command::Status(args) => cmd_status(args),
        Command::Summarize(args) => cmd_summarize(args),
        Command::Init(args) => cmd_init(args),
        Command::Version => {
            println!("voicelab {}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn load(path: &std::path::Path, strict: bool) -> anyhow::Result<ExperimentConfig> {
    load_config(path, strict).map_err(|e| anyhow::anyhow!("{e}"))
}

fn make_client(
    provider: &str,
    model: &str,
    timeout: Duration,
) -> anyhow::Result<Arc<dyn LlmClient>> {
    match provider {
        "openai" => Ok(Arc::new(OpenAIClient::from_env(model.to_string(), timeout)?)),
        "fake" => Ok(Arc::new(FakeLlm::new())),
        other => bail!("unknown provider: {} (expected openai|fake)", other),
    }
}

async fn cmd_run(args: RunArgs) -> anyhow::Result<i32> {
    let mut cfg = load(&args.config, args.strict)?;
    if let Some(model) = args.model {
        cfg.models.generation = model;
    }
    if let Some(model) = args.judge_model {
        cfg.models.judge = model;
    }
    if let Some(ms) = args.pacing_ms {
        cfg.settings.pacing_ms = Some(ms);
    }
    if args.no_assess {
        cfg.settings.assess_types = Some(false);
    }

    let personas = {
        let all = catalog::personas();
        if args.personas.is_empty() {
            all
        } else {
            for key in &args.personas {
                if !all.iter().any(|p| &p.key == key) {
                    bail!("unknown persona key: {}", key);
                }
            }
            all.into_iter()
                .filter(|p| args.personas.contains(&p.key))
                .collect()
        }
    };

    let timeout = Duration::from_secs(cfg.settings.timeout_seconds.unwrap_or(60));
    let generator = make_client(&args.provider, &cfg.models.generation, timeout)?;
    let judge_client = make_client(&args.provider, &cfg.models.judge, timeout)?;

    let policy = RunPolicy::from_settings(&cfg.settings);
    let pacer: Arc<dyn Pacer> = if args.provider == "fake" {
        Arc::new(NoopPacer)
    } else {
        Arc::new(TokioPacer)
    };
    let judge_config = JudgeConfig {
        fallback: cfg.fallback.clone(),
        retry: policy.retry.clone(),
    };

    let runner = Runner::new(generator, judge_client, judge_config, pacer, policy);
    let rep = runner
        .run_experiment(&cfg, &personas, &catalog::OVERLAY_LABELS)
        .await?;
    report::print_completion(&rep, &cfg.output.csv, &cfg.output.jsonl);

    if rep.degraded > 0 {
        Ok(exit_codes::DEGRADED)
    } else {
        Ok(exit_codes::OK)
    }
}

fn cmd_status(args: StatusArgs) -> anyhow::Result<i32> {
    let cfg = load(&args.config, false)?;
    let completed = load_completed(&cfg.output.csv);
    let expected =
        catalog::personas().len() * cfg.prompts.len() * (1 + catalog::OVERLAY_LABELS.len());
    println!(
        "{}: {} of {} trials logged in {}",
        cfg.experiment,
        completed.len(),
        expected,
        cfg.output.csv.display()
    );
    Ok(exit_codes::OK)
}

fn cmd_summarize(args: SummarizeArgs) -> anyhow::Result<i32> {
    let cfg = load(&args.config, false)?;
    let summary = report::summarize(&cfg.output.csv)?;
    report::print_summary(&summary);
    Ok(exit_codes::OK)
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if args.config.exists() {
        bail!("refusing to overwrite existing {}", args.config.display());
    }
    voicelab_core::config::write_sample_config(&args.config)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("wrote {}", args.config.display());

    if args.gitignore {
        let path = std::path::Path::new(".gitignore");
        if path.exists() {
            eprintln!("skipping .gitignore (already exists)");
        } else {
            std::fs::write(path, templates::GITIGNORE)?;
            println!("wrote .gitignore");
        }
    }
    Ok(exit_codes::OK)
}

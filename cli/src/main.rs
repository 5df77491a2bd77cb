//! CLI entrypoint for postpilot
//!
//! This is the main binary that wires together all layers using
//! dependency injection: config, gateway, tool registry, mediator, and
//! the workflow use case.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use postpilot_application::{
    ChatGateway, Mediator, RunWorkflowInput, RunWorkflowUseCase, ScriptMediator, ToolRegistry,
    WorkflowParams,
};
use postpilot_domain::{ContextSeed, RunOutcome, RunRecord, TraceEntry};
use postpilot_infrastructure::{
    CannedChatGateway, ConfigLoader, FileConfig, HttpSocialApi, InMemorySocialApi, JsonlRunLogger,
    LlmMediator, OpenAiChatGateway, standard_registry,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MediatorKind {
    /// Deterministic rule-based mediator
    Script,
    /// Model-backed mediator (needs an API key)
    Llm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable trace summary
    Text,
    /// Full run record as JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "postpilot", about = "Mediator-driven social content workflow agent")]
struct Cli {
    /// User to run the workflow for
    user_id: String,

    /// Path to a config file (otherwise postpilot.toml / XDG locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip all config files and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Which mediator decides the next action
    #[arg(long, value_enum, default_value = "script")]
    mediator: MediatorKind,

    /// Use the fixture platform and a canned model; no network access
    #[arg(long)]
    offline: bool,

    /// Publish immediately instead of scheduling (script mediator only)
    #[arg(long)]
    auto_publish: bool,

    /// Override the configured step budget
    #[arg(long)]
    max_steps: Option<u32>,

    /// Override the configured per-tool timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// JSON file with a profile to seed the run context with
    #[arg(long)]
    seed_profile: Option<PathBuf>,

    /// Append the finished run record to this JSONL file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    config.validate().context("invalid configuration")?;

    let mut params = config.workflow_params();
    if let Some(max_steps) = cli.max_steps {
        params = params.with_max_steps(max_steps);
    }
    if let Some(secs) = cli.timeout_secs {
        params = params.with_tool_timeout(Duration::from_secs(secs));
    }

    // === Dependency Injection ===
    let gateway = build_gateway(&cli, &config)?;
    let registry = Arc::new(build_registry(&cli, &config, gateway.clone()));

    let seed = load_seed(&cli)?;
    let input = RunWorkflowInput::new(cli.user_id.as_str()).with_seed(seed);

    // Ctrl-C cancels the run between awaits; the partial trace still comes back
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, cancelling run");
                cancel.cancel();
            }
        });
    }

    let record = match cli.mediator {
        MediatorKind::Script => {
            let mediator =
                Arc::new(ScriptMediator::new().with_auto_publish(cli.auto_publish));
            run(mediator, registry, params, cancel, input).await
        }
        MediatorKind::Llm => {
            let mediator = Arc::new(LlmMediator::new(gateway));
            run(mediator, registry, params, cancel, input).await
        }
    };

    if let Some(path) = &cli.log_file
        && let Some(logger) = JsonlRunLogger::new(path)
    {
        logger.log(&record);
    }

    match cli.output {
        OutputFormat::Text => println!("{}", render_text(&record)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
    }

    Ok(())
}

async fn run<M: Mediator>(
    mediator: Arc<M>,
    registry: Arc<ToolRegistry>,
    params: WorkflowParams,
    cancel: CancellationToken,
    input: RunWorkflowInput,
) -> RunRecord {
    RunWorkflowUseCase::new(mediator, registry)
        .with_params(params)
        .with_cancellation(cancel)
        .execute(input)
        .await
}

fn build_gateway(cli: &Cli, config: &FileConfig) -> Result<Arc<dyn ChatGateway>> {
    if cli.offline {
        return Ok(Arc::new(CannedChatGateway::new()));
    }
    let gateway = OpenAiChatGateway::from_env(
        config.llm.base_url.as_str(),
        config.llm.model.as_str(),
        &config.llm.api_key_env,
    )
    .with_context(|| format!("set {} or pass --offline", config.llm.api_key_env))?;
    Ok(Arc::new(gateway))
}

fn build_registry(cli: &Cli, config: &FileConfig, gateway: Arc<dyn ChatGateway>) -> ToolRegistry {
    match (&config.upstream.base_url, cli.offline) {
        (Some(base_url), false) => {
            let api = Arc::new(HttpSocialApi::new(base_url.as_str()));
            standard_registry(api.clone(), api.clone(), api, gateway)
        }
        _ => {
            let api = Arc::new(InMemorySocialApi::new());
            standard_registry(api.clone(), api.clone(), api, gateway)
        }
    }
}

fn load_seed(cli: &Cli) -> Result<ContextSeed> {
    let Some(path) = &cli.seed_profile else {
        return Ok(ContextSeed::new());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let profile = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(ContextSeed::new().with_profile(profile))
}

fn render_text(record: &RunRecord) -> String {
    let outcome = match record.outcome() {
        RunOutcome::Completed => "completed",
        RunOutcome::BudgetExhausted => "stopped at step budget",
        RunOutcome::Failed => "failed",
    };

    let mut lines = vec![
        format!("Run for {}: {}", record.user_id, outcome),
        String::new(),
    ];
    for entry in &record.trace {
        let line = match entry {
            TraceEntry::Done { step, reason, .. } => format!(
                "  {:>3}. done{}",
                step,
                reason.as_deref().map(|r| format!(" ({})", r)).unwrap_or_default()
            ),
            TraceEntry::ToolSuccess { step, tool, .. } => {
                format!("  {:>3}. {} [ok]", step, tool)
            }
            TraceEntry::ToolFailure { step, tool, error, .. } => {
                format!("  {:>3}. {} [failed: {}]", step, tool, error)
            }
            TraceEntry::StepError { step, error } => format!("  {:>3}. [{}]", step, error),
        };
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_is_a_required_positional() {
        assert!(Cli::try_parse_from(["postpilot"]).is_err());

        let cli = Cli::try_parse_from(["postpilot", "dana", "--offline"]).unwrap();
        assert_eq!(cli.user_id, "dana");
        assert!(cli.offline);
    }
}

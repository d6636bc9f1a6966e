//! CLI entrypoint for concierge
//!
//! This is the main binary that wires together all layers using
//! dependency injection: configuration -> registry -> transports ->
//! routing client -> orchestrator.

use anyhow::{bail, Result};
use clap::Parser;
use concierge_application::{
    Orchestrator, OrchestratorParams, ProgressNotifier, SubmitResponse, TraceRecorder,
};
use concierge_domain::{
    Capability, OrchestrationPattern, OrchestrationRequest, RunStatus, SpanId, TraceSpan,
};
use concierge_infrastructure::{
    ConfigLoader, FileConfig, HttpTransport, JsonlSpanExporter, LocalTransport, RoutingAgentClient,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "concierge",
    about = "Coordinate capability-specific worker agents to answer a single request",
    version
)]
struct Cli {
    /// The query to orchestrate
    query: Option<String>,

    /// Orchestration pattern: coordinated (default), sequential,
    /// concurrent, handoff, group_chat
    #[arg(short, long, default_value = "coordinated")]
    pattern: String,

    /// Comma-separated ordered agent list (required for sequential)
    #[arg(short, long)]
    agents: Option<String>,

    /// User identifier attached to every invocation
    #[arg(short, long, default_value = "demo-user")]
    user: String,

    /// Explicit config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ignore config files, use built-in defaults and demo agents
    #[arg(long)]
    no_config: bool,

    /// Print the full envelope as JSON
    #[arg(long)]
    json: bool,

    /// Print the run's trace span tree after the result
    #[arg(long)]
    show_spans: bool,

    /// Report per-invocation progress on stderr while the run executes
    #[arg(long)]
    progress: bool,

    /// List the effective agent registry and exit
    #[arg(long)]
    list_agents: bool,

    /// Write logs to this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,

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

    let _log_guard = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "concierge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
            None
        }
    };

    // Load configuration
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };

    // === Dependency Injection ===
    let registry = Arc::new(build_registry(&config)?);

    if cli.list_agents {
        println!("{:<14} {:<10} {:<42} role", "capability", "mode", "endpoint");
        for descriptor in registry.all() {
            println!(
                "{:<14} {:<10} {:<42} {}",
                descriptor.capability().to_string(),
                descriptor.mode().to_string(),
                descriptor.endpoint(),
                descriptor.role()
            );
        }
        return Ok(());
    }

    let transports: Vec<Arc<dyn concierge_infrastructure::AgentTransport>> = vec![
        Arc::new(HttpTransport::new()),
        Arc::new(LocalTransport::with_demo_agents()),
    ];
    let client = Arc::new(RoutingAgentClient::new(transports));

    let recorder = match &config.trace.jsonl_path {
        Some(path) => match JsonlSpanExporter::new(path) {
            Some(exporter) => Arc::new(TraceRecorder::with_exporter(Arc::new(exporter))),
            None => Arc::new(TraceRecorder::new()),
        },
        None => Arc::new(TraceRecorder::new()),
    };

    let params: OrchestratorParams = config.orchestrator.params();
    let mut builder = Orchestrator::builder(registry, client)
        .params(params)
        .recorder(Arc::clone(&recorder));
    if cli.progress {
        builder = builder.progress(Arc::new(ConsoleProgress));
    }
    let orchestrator = builder.build();

    // Build the request
    let query = match cli.query {
        Some(q) => q,
        None => bail!("A query is required. Use --list-agents to inspect the registry."),
    };
    let pattern: OrchestrationPattern = match cli.pattern.parse() {
        Ok(p) => p,
        Err(e) => bail!("{}", e),
    };

    let mut request = OrchestrationRequest::new(query, cli.user.clone()).with_pattern(pattern);
    if let Some(agents) = &cli.agents {
        request = request.with_agents(
            agents
                .split(',')
                .map(|a| Capability::new(a.trim()))
                .collect(),
        );
    }

    info!(%pattern, "Submitting request");
    let envelope = orchestrator.submit(request).await?;

    if cli.json {
        // The envelope plus the run snapshot served by the status interface.
        let snapshot = orchestrator.status(&envelope.run_id)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "envelope": envelope,
                "run": snapshot,
            }))?
        );
    } else {
        print_envelope(&envelope);
    }

    if cli.show_spans {
        println!();
        println!("trace ({}):", envelope.run_id);
        print_span_tree(&recorder.spans(&envelope.run_id), None, 1);
    }

    if envelope.status == RunStatus::Failed {
        std::process::exit(1);
    }
    Ok(())
}

/// The configured registry, or the built-in demo registry when no agents
/// are configured.
fn build_registry(config: &FileConfig) -> Result<concierge_domain::AgentRegistry> {
    if config.agents.is_empty() {
        info!("No agents configured, using the built-in demo registry");
        return Ok(concierge_domain::AgentRegistry::from_descriptors(
            LocalTransport::demo_descriptors(),
        )?);
    }
    Ok(config.registry()?)
}

/// Per-invocation progress on stderr, keeping stdout for the result.
struct ConsoleProgress;

impl ProgressNotifier for ConsoleProgress {
    fn on_pattern_start(&self, pattern: OrchestrationPattern, planned_agents: usize) {
        eprintln!("[{}] dispatching up to {} agents", pattern, planned_agents);
    }

    fn on_invocation_complete(&self, capability: &Capability, success: bool) {
        eprintln!("  {} {}", if success { "ok " } else { "err" }, capability);
    }

    fn on_pattern_complete(&self, pattern: OrchestrationPattern) {
        eprintln!("[{}] complete", pattern);
    }
}

fn print_envelope(envelope: &SubmitResponse) {
    println!("run:     {}", envelope.run_id);
    println!(
        "status:  {} ({} succeeded, {} failed)",
        envelope.status, envelope.succeeded, envelope.failed
    );
    if let Some(review) = &envelope.result.review {
        println!("review:  {:?}", review);
    }
    if let Some(error) = &envelope.error {
        println!("error:   {}", error);
    }
    if !envelope.result.failed_agents.is_empty() {
        let failed: Vec<String> = envelope
            .result
            .failed_agents
            .iter()
            .map(|c| c.to_string())
            .collect();
        println!("failed:  {}", failed.join(", "));
    }
    if !envelope.result.response.is_empty() {
        println!();
        println!("{}", envelope.result.response);
    }
}

fn print_span_tree(spans: &[TraceSpan], parent: Option<&SpanId>, depth: usize) {
    for span in spans
        .iter()
        .filter(|s| s.parent_id.as_ref() == parent)
    {
        let duration = span.ended_at - span.started_at;
        println!(
            "{}{} [{}ms]",
            "  ".repeat(depth),
            span.label,
            duration.num_milliseconds()
        );
        print_span_tree(spans, Some(&span.span_id), depth + 1);
    }
}

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use haven_config::FlowDef;
use haven_engine::FlowRunner;
use haven_flow::{Flow, LoadOptions};
use haven_host::{
  Capabilities, CompletionProvider, CompletionRouter, OpenAiCompatibleProvider, RecordingHost,
  StaticCompletion,
};
use haven_runtime::{ExecutionContext, ExecutionStatus, Runtime, RuntimeConfig, Variables};

/// Haven - run AI flows from the command line
#[derive(Parser)]
#[command(name = "haven")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.haven)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Runtime configuration file (JSON). Defaults to <data-dir>/config.json
  /// when that file exists.
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Base URL of an OpenAI-compatible completion API
  #[arg(long, global = true, default_value = "https://api.openai.com/v1")]
  provider_url: String,

  /// Additional named completion endpoint as NAME=URL. An ai_call node
  /// whose provider is NAME is sent to URL; unknown names use
  /// --provider-url.
  #[arg(long = "provider", global = true, value_parser = parse_named_provider)]
  providers: Vec<(String, String)>,

  /// API key for the completion API
  #[arg(long, global = true, env = "HAVEN_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  /// Answer every completion with this text instead of calling the API
  #[arg(long, global = true)]
  mock_completion: Option<String>,

  /// Accept dangling successors and cycles when loading the flow
  #[arg(long, global = true)]
  lenient: bool,

  /// Emit logs as JSON
  #[arg(long, global = true)]
  log_json: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a flow or a single node
  Run {
    #[command(subcommand)]
    target: RunTarget,
  },
}

#[derive(Subcommand)]
enum RunTarget {
  /// Run an entire flow from its trigger
  Flow {
    /// Path to the flow file (JSON)
    flow_file: PathBuf,
  },

  /// Run a single node from a flow
  Node {
    /// Path to the flow file (JSON)
    flow_file: PathBuf,

    /// The node ID to execute
    #[arg(long)]
    node: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.log_json);

  let Some(Commands::Run { target }) = &cli.command else {
    println!("haven - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  let ctx = rt.block_on(async {
    match target {
      RunTarget::Flow { flow_file } => run_flow(&cli, flow_file).await,
      RunTarget::Node { flow_file, node } => run_node(&cli, flow_file, node).await,
    }
  })?;

  println!("{}", serde_json::to_string_pretty(&ctx)?);

  if ctx.status == ExecutionStatus::Failed {
    bail!(
      "execution {} failed: {}",
      ctx.execution_id,
      ctx.error.as_deref().unwrap_or("unknown error")
    );
  }
  Ok(())
}

fn init_tracing(json: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr);
  if json {
    builder.json().init();
  } else {
    builder.init();
  }
}

async fn run_flow(cli: &Cli, flow_file: &Path) -> Result<ExecutionContext> {
  let flow = Arc::new(load_flow(cli, flow_file).await?);
  let runtime = Arc::new(build_runtime(cli).await?);
  let payload = read_payload_from_stdin()?;

  let runner = FlowRunner::new(runtime, flow).context("flow cannot be started")?;
  let cancel = cancel_on_ctrl_c();
  Ok(runner.execute_once(payload, cancel).await)
}

async fn run_node(cli: &Cli, flow_file: &Path, node_id: &str) -> Result<ExecutionContext> {
  let flow = load_flow(cli, flow_file).await?;
  let runtime = build_runtime(cli).await?;
  let payload = read_payload_from_stdin()?;

  let cancel = cancel_on_ctrl_c();
  runtime
    .execute_node(&flow, node_id, Variables::from_value(payload), cancel)
    .await
    .context("node execution failed")
}

async fn load_flow(cli: &Cli, flow_file: &Path) -> Result<Flow> {
  let content = tokio::fs::read_to_string(flow_file)
    .await
    .with_context(|| format!("failed to read flow file: {}", flow_file.display()))?;

  let def = FlowDef::from_json(&content)
    .with_context(|| format!("failed to parse flow file: {}", flow_file.display()))?;

  let options = if cli.lenient {
    LoadOptions::lenient()
  } else {
    LoadOptions::default()
  };
  let flow = Flow::load_with(def, options)
    .with_context(|| format!("invalid flow: {}", flow_file.display()))?;

  info!(flow_id = %flow.flow_id, nodes = flow.nodes.len(), "loaded flow '{}'", flow.name);
  Ok(flow)
}

async fn build_runtime(cli: &Cli) -> Result<Runtime> {
  let config = load_runtime_config(cli).await?;

  let capabilities = Capabilities::with_sinks(
    Arc::new(completion_router(cli, &config.default_provider)),
    // Actions are recorded and logged rather than sent anywhere.
    Arc::new(RecordingHost::new()),
  );
  Ok(Runtime::new(capabilities, config))
}

/// Route completions by the node's provider name.
///
/// `--provider-url` serves `default_provider` and any name without its own
/// `--provider` entry. A mock completion answers every name.
fn completion_router(cli: &Cli, default_provider: &str) -> CompletionRouter {
  if let Some(text) = &cli.mock_completion {
    return CompletionRouter::new().with_fallback(Arc::new(StaticCompletion::new(text.clone())));
  }

  if cli.api_key.is_none() {
    warn!("no API key configured for {}", cli.provider_url);
  }
  let default: Arc<dyn CompletionProvider> = Arc::new(OpenAiCompatibleProvider::new(
    cli.provider_url.clone(),
    cli.api_key.clone(),
  ));

  let mut router = CompletionRouter::new()
    .with_provider(default_provider, default.clone())
    .with_fallback(default);
  for (name, url) in &cli.providers {
    info!(provider = %name, url = %url, "registered completion provider");
    router = router.with_provider(
      name.clone(),
      Arc::new(OpenAiCompatibleProvider::new(url.clone(), cli.api_key.clone())),
    );
  }
  router
}

fn parse_named_provider(arg: &str) -> Result<(String, String), String> {
  match arg.split_once('=') {
    Some((name, url)) if !name.is_empty() && !url.is_empty() => {
      Ok((name.to_string(), url.to_string()))
    }
    _ => Err(format!("expected NAME=URL, got '{arg}'")),
  }
}

async fn load_runtime_config(cli: &Cli) -> Result<RuntimeConfig> {
  let path = match &cli.config {
    Some(path) => path.clone(),
    None => {
      let default_path = data_dir(cli)?.join("config.json");
      if !tokio::fs::try_exists(&default_path).await.unwrap_or(false) {
        return Ok(RuntimeConfig::default());
      }
      default_path
    }
  };

  let content = tokio::fs::read_to_string(&path)
    .await
    .with_context(|| format!("failed to read config file: {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse config file: {}", path.display()))
}

fn data_dir(cli: &Cli) -> Result<PathBuf> {
  match &cli.data_dir {
    Some(dir) => Ok(dir.clone()),
    None => dirs::home_dir()
      .map(|home| home.join(".haven"))
      .context("could not determine home directory"),
  }
}

fn cancel_on_ctrl_c() -> CancellationToken {
  let cancel = CancellationToken::new();
  let token = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupted, cancelling run");
      token.cancel();
    }
  });
  cancel
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, use empty object
    Ok(serde_json::json!({}))
  } else {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read payload from stdin")?;

    if input.trim().is_empty() {
      Ok(serde_json::json!({}))
    } else {
      serde_json::from_str(&input).context("failed to parse payload JSON from stdin")
    }
  }
}

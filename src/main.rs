//! TITANS - workspace gateway for the TITANS cognitive architecture
//!
//! Serves the memory, graph and chat API, and runs the local cognitive
//! agent from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use titans::{
    chat::ChatRequest,
    cognition::{demo_scenarios, TitansAgent},
    config::TitansConfig,
    gateway::{Gateway, GatewayBuilder},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "titans")]
#[command(author = "TITANS Project Team")]
#[command(version)]
#[command(about = "TITANS workspace gateway: memory store, knowledge graph and chat routing")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TITANS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Send one chat message through the router
    Chat {
        /// Target agent (`titans` or a configured proxy)
        #[arg(short, long, default_value = "titans")]
        agent: String,

        /// Message text
        #[arg(short, long)]
        message: String,

        /// Context object as JSON
        #[arg(long)]
        context: Option<String>,
    },

    /// Run the reference scenarios through the local agent and print each step
    Trace,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("titans={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => TitansConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TitansConfig::default(),
    };

    match cli.command {
        Commands::Serve { host, port } => {
            run_gateway(config, host, port).await?;
        }
        Commands::Chat {
            agent,
            message,
            context,
        } => {
            send_chat(config, agent, message, context).await?;
        }
        Commands::Trace => {
            run_trace(config).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_gateway(config: TitansConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut builder = GatewayBuilder::new().config(config);
    if let Some(host) = host {
        builder = builder.host(host);
    }
    if let Some(port) = port {
        builder = builder.port(port);
    }
    let gateway: Arc<Gateway> = Arc::new(builder.build().await?);

    let listener = gateway.bind().await?;
    let server = gateway.clone();
    let handle = tokio::spawn(async move { server.serve(listener).await });

    tracing::info!("TITANS gateway is running. Press Ctrl+C to stop.");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down...");
    gateway.stop().await;
    handle.await??;

    Ok(())
}

async fn send_chat(
    config: TitansConfig,
    agent: String,
    message: String,
    context: Option<String>,
) -> Result<()> {
    let gateway = GatewayBuilder::new().config(config).build().await?;

    let mut request = ChatRequest::new(agent, message);
    if let Some(raw) = context {
        let context: serde_json::Value =
            serde_json::from_str(&raw).context("--context must be a JSON object")?;
        request = request.with_context(context);
    }

    let reply = gateway.app_state().chat.route(&request).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

async fn run_trace(config: TitansConfig) -> Result<()> {
    let gateway = GatewayBuilder::new().config(config).build().await?;
    let state = gateway.app_state();
    let agent = TitansAgent::new(
        gateway.config().agents.titans.clone(),
        state.memory.clone(),
        state.traces.clone(),
    );

    for (name, context) in demo_scenarios() {
        println!();
        println!("--- SCENARIO: {} ---", name);
        let run = agent
            .run(&format!("{} input", name.to_lowercase()), Some(&context))
            .await?;
        for step in &run.steps {
            println!(
                "[{}] {:<8} {}  hash={}",
                step.source,
                step.event,
                step.payload,
                &step.hash[..12]
            );
        }
        println!("{}", run.action.decision);
        println!(
            "trace {} verified: {}",
            run.trace_id,
            state.traces.verify(&run.trace_id).await.unwrap_or(false)
        );
    }

    Ok(())
}

fn show_config(config: Option<&TitansConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}

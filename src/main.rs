#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use stepgraph::config::Config;
use stepgraph::gateway;
use stepgraph::service::AgentService;
use stepgraph::tools::default_registry;

#[derive(Parser)]
#[command(name = "stepgraph", version, about = "Plan-and-execute agent service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway.
    Serve,
    /// Answer a single query on the command line and exit.
    Query {
        /// The natural-language request to answer.
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick a process-level TLS crypto provider before any client is built.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("warning: failed to install default crypto provider: {e:?}");
    }

    let config = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone()));
    fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let service = Arc::new(AgentService::new(Arc::new(default_registry())));

    match cli.command {
        Command::Serve => gateway::serve(&config, service).await,
        Command::Query { text } => {
            let response = service.handle_query(&text).await?;
            println!("{}", response.final_answer);
            for warning in &response.warnings {
                eprintln!("warning: {warning}");
            }
            Ok(())
        }
    }
}

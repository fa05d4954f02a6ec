use clap::{Args, Parser, Subcommand};
use jsonata_mcp_core::{EvaluateRequest, JsonataEngine, evaluate};
use jsonata_mcp_server::{ServerConfig, ServerError};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// JSONata MCP server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Server name reported to clients
    #[arg(long, global = true)]
    name: Option<String>,

    /// Server version reported to clients
    #[arg(long, global = true)]
    server_version: Option<String>,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout (default)
    Serve,

    /// Evaluate one expression and print the result text
    Eval(EvalArgs),
}

#[derive(Args)]
struct EvalArgs {
    /// JSONata expression
    #[arg(short, long)]
    expression: String,

    /// JSON document to query
    #[arg(short, long, default_value = "{}")]
    data: String,

    /// JSON object of variable bindings
    #[arg(short, long, default_value = "{}")]
    bindings: String,

    /// Print the whole response envelope instead of just the text
    #[arg(long)]
    json: bool,
}

fn load_config(cli: &Cli) -> Result<ServerConfig, ServerError> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    if let Some(name) = &cli.name {
        config.name = name.clone();
    }
    if let Some(version) = &cli.server_version {
        config.version = version.clone();
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    match &cli.command {
        Some(Commands::Eval(args)) => {
            let request = EvaluateRequest::new(args.expression.clone())
                .with_data(args.data.clone())
                .with_bindings(args.bindings.clone());
            let response = evaluate(&JsonataEngine::new(), &request).await;

            if args.json {
                println!("{}", serde_json::to_string(&response)?);
            } else {
                println!("{}", response.first_text().unwrap_or_default());
            }
            Ok(())
        }
        Some(Commands::Serve) | None => {
            let config = load_config(&cli)?;
            debug!(?config, "Loaded configuration");
            jsonata_mcp_server::start(config).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout carries protocol messages, so logs must go to stderr
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

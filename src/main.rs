// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! tidydrive CLI: serve the web app, check service status, manage config

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use tidydrive::completion::CompletionClient;
use tidydrive::config::AppConfig;
use tidydrive::web;
use tidydrive::Result;

/// tidydrive - AI-assisted cloud drive organizer
#[derive(Parser, Debug)]
#[command(name = "tidydrive")]
#[command(version = "0.3.0")]
#[command(about = "AI-assisted cloud drive organizer with web UI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show drive credential and completion service status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Serve { host, port }) => run_serve(config, host, port).await,
        Some(Commands::Status) => run_status(config).await,
        Some(Commands::Config { action }) => run_config(config, action, &cli.config),
        None => run_serve(config, None, None).await,
    }
}

async fn run_serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.web.host = host;
    }
    if let Some(port) = port {
        config.web.port = port;
    }

    if config.drive.access_token.is_none() {
        warn!("No drive access token configured; API calls will return 401");
    }
    if config.completion.api_key.is_none() {
        warn!("No completion API key configured; AI placement is disabled");
    }

    web::start_server(config).await
}

async fn run_status(config: AppConfig) -> Result<()> {
    if config.drive.access_token.is_some() {
        println!("Drive credential: configured");
    } else {
        println!("Drive credential: missing (set DRIVE_ACCESS_TOKEN)");
    }

    match CompletionClient::from_config(&config.completion) {
        Some(client) => match client.health_check().await {
            Ok(()) => println!("Completion service: reachable ({})", config.completion.model),
            Err(e) => println!("Completion service: unreachable ({})", e),
        },
        None => println!("Completion service: disabled (set OPENAI_API_KEY)"),
    }

    Ok(())
}

fn run_config(config: AppConfig, action: ConfigCommands, path: &PathBuf) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let mut shown = config;
            // Never print credentials
            shown.drive.access_token = shown.drive.access_token.map(|_| "***".to_string());
            shown.completion.api_key = shown.completion.api_key.map(|_| "***".to_string());
            println!("{}", serde_json::to_string_pretty(&shown)?);
            Ok(())
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            info!("Wrote default configuration to {:?}", output);
            Ok(())
        }
        ConfigCommands::Validate => {
            // Load already parsed it; reaching here means it is valid
            println!("Configuration at {:?} is valid", path);
            Ok(())
        }
    }
}

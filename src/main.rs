use std::io;
use std::path::PathBuf;

use allure_lite::{cli, config, context, logging};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "allure-lite")]
#[command(about = "Browse, upload and delete Allure test reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// TOML config file. Defaults to $ALLURE_LITE_CONFIG, then ./allure-lite.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive report browser (default).
    Tui,
    /// Print the reports of the project.
    List,
    /// Upload a zipped allure-results archive.
    Upload {
        file: PathBuf,
        /// Return once the server accepts the upload.
        #[arg(long)]
        no_wait: bool,
    },
    /// Delete a report.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Print the viewer URL of a report.
    Open { id: String },
    /// Check that the API is reachable.
    Health,
    /// Print the effective configuration.
    Config,
}

#[derive(Args, Serialize)]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    server: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    viewer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, short, global = true)]
    project: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    let file = match command {
        Commands::Tui => Some(logging::default_tui_log_path()),
        _ => None,
    };
    logging::init(logging::LogConfig {
        json: cli.json_logs,
        verbose: cli.verbose,
        file,
    })
    .context("Failed to initialise logging")?;

    let config = config::AppConfig::new(cli.config.as_deref(), Some(&cli.overrides))
        .context("Failed to load configuration")?;

    let ctx = context::AppContext::connect(config).context("Failed to create API client")?;

    match command {
        Commands::Tui => cli::tui::run(ctx).await.context("TUI exited with an error")?,
        Commands::List => cli::commands::list(&ctx, &mut io::stdout().lock())
            .await
            .context("Failed to list reports")?,
        Commands::Upload { file, no_wait } => {
            cli::commands::upload(&ctx, &file, !no_wait, &mut io::stdout().lock()).await?
        }
        Commands::Delete { id, yes } => {
            let mut input = io::stdin().lock();
            cli::commands::delete(&ctx, &id, yes, &mut input, &mut io::stdout().lock()).await?
        }
        Commands::Open { id } => {
            cli::commands::open(&ctx.config, &id, &mut io::stdout().lock())?
        }
        Commands::Health => cli::commands::health(&ctx, &mut io::stdout().lock()).await?,
        Commands::Config => cli::commands::show_config(&ctx.config, &mut io::stdout().lock())?,
    }

    Ok(())
}

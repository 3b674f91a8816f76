use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gemtrend::config::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(
    name = "gemtrend",
    version,
    about = "Gemstone search-trend rankings from Naver DataLab",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one refresh from DataLab and print the report
    Refresh {
        /// End date of the lookback window (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: String,
    },

    /// Build the report from a JSON dump of observations
    Analyze {
        /// JSON array of {entity, date, ratio}
        #[arg(short, long)]
        input: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: String,

        /// Entity whose monthly pattern is printed
        #[arg(long)]
        seasonal: Option<String>,
    },

    /// Refresh on a schedule and serve the report over HTTP
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;
    config.validate().context("Invalid configuration")?;

    tracing::info!("gemtrend starting");

    match cli.command {
        Commands::Refresh { date, output } => {
            tracing::info!(date = ?date, output = %output, "Starting refresh command");
            commands::refresh(&config, date, &output).await?;
        }

        Commands::Analyze {
            input,
            output,
            seasonal,
        } => {
            tracing::info!(
                input = %input.display(),
                output = %output,
                seasonal = ?seasonal,
                "Starting analyze command"
            );
            commands::analyze(&config, &input, &output, seasonal.as_deref())?;
        }

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            tracing::info!(
                host = %config.server.host,
                port = config.server.port,
                "Starting serve command"
            );
            commands::serve(config).await?;
        }
    }

    tracing::info!("gemtrend completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("gemtrend=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("gemtrend={level},warn"))
        })
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

//! DailyReel command-line entry point.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use reel_models::{invocation_schema, PublishEvent};
use reel_worker::logging::init_tracing;
use reel_worker::{DailyConfig, PublishJob, PublishServices, RenderJob, RenderServices};

#[derive(Debug, Parser)]
#[command(name = "dailyreel", version, about = "Render and publish the daily video")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate, narrate, compose and store today's video
    Render {
        /// Storage key to write instead of today's date key
        #[arg(long)]
        key: Option<String>,
    },
    /// Upload a stored video to the hosting platform
    Publish {
        /// Storage key to publish; takes precedence over --event
        #[arg(long)]
        key: Option<String>,
        /// Invocation payload, e.g. '{"key":"2025-06-15.mp4"}'
        #[arg(long)]
        event: Option<String>,
    },
    /// Print the JSON Schema of the publish input and response
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    let cli = Cli::parse();
    if let Command::Schema = cli.command {
        println!("{}", serde_json::to_string_pretty(&invocation_schema())?);
        return Ok(());
    }

    let config = DailyConfig::from_env().context("loading configuration")?;
    init_tracing()?;
    info!("Config: {:?}", config);

    let result = match cli.command {
        Command::Render { key } => render(config, key).await,
        Command::Publish { key, event } => publish(config, key, event).await,
        Command::Schema => Ok(()),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

async fn render(config: DailyConfig, key: Option<String>) -> anyhow::Result<()> {
    let services = RenderServices::from_config(&config).await?;
    let outcome = RenderJob::new(config, services).run(key.as_deref()).await?;

    info!(
        "Rendered \"{}\" to {} ({:.1}s)",
        outcome.script.title, outcome.key, outcome.plan.output_duration
    );
    Ok(())
}

async fn publish(
    config: DailyConfig,
    key: Option<String>,
    event: Option<String>,
) -> anyhow::Result<()> {
    let mut event = match event {
        Some(payload) => PublishEvent::from_json(&payload).context("parsing --event")?,
        None => PublishEvent::default(),
    };
    if key.is_some() {
        event.key = key;
    }

    let services = PublishServices::from_config(&config).await?;
    let response = PublishJob::new(config, services).run(&event).await?;

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

#[cfg(test)]
mod tests;

use crate::channels::{SmsSender, TelerivetSender};
use crate::config::credentials::overrides_in_effect;
use crate::config::{Config, load_config};
use crate::gateway::{self, GatewayState};
use crate::providers::base::LLMProvider;
use crate::providers::openai::OpenAIProvider;
use crate::relay::ConversationPipeline;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "smsrelay")]
#[command(about = "Relay SMS conversations to a language model")]
#[command(version = crate::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server
    Serve {
        /// Path to a JSON config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
        /// Override the listen address
        #[arg(long)]
        host: Option<String>,
        /// Override the listen port
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
    /// Validate configuration and print a summary
    Check {
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Local .env for development; real environment variables win.
    match dotenvy::dotenv() {
        Ok(path) => debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("failed to read .env: {}", e),
    }

    match cli.command {
        Commands::Serve { config, host, port } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await?;
        }
        Commands::Check { config } => {
            let config = load_config(config.as_deref())?;
            println!("{}", config_summary(&config));
            let env = overrides_in_effect(&|key| std::env::var(key).ok());
            if !env.is_empty() {
                println!("  env overrides:    {}", env.join(", "));
            }
        }
    }

    Ok(())
}

/// Wire the provider, SMS sender and pipeline from a validated config.
pub(crate) fn build_relay(config: &Config) -> Result<(Arc<ConversationPipeline>, GatewayState)> {
    let provider: Arc<dyn LLMProvider> = Arc::new(OpenAIProvider::from_config(&config.provider));
    let sender = TelerivetSender::new(config.gateways.clone(), config.sms.api_base.clone())?;
    let gateway_count = sender.gateway_count();
    let sms: Arc<dyn SmsSender> = Arc::new(sender);

    let pipeline = Arc::new(ConversationPipeline::new(&config.relay, provider, sms));
    let state = GatewayState::new(pipeline.clone(), gateway_count);
    Ok((pipeline, state))
}

async fn serve(config: Config) -> Result<()> {
    let (pipeline, state) = build_relay(&config)?;
    info!(
        "Starting SMS relay: model={}, gateways={}, allowed senders={}",
        config.provider.model,
        config.gateways.len(),
        config.relay.allow_from.len()
    );

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = gateway::start(&config.server.host, config.server.port, state, async {
        let _ = stop_rx.await;
    })
    .await?;

    let server_exited = tokio::select! {
        _ = tokio::signal::ctrl_c() => false,
        result = &mut server => {
            if let Err(e) = result {
                error!("HTTP server task failed: {}", e);
            }
            true
        }
    };

    println!("\nShutting down...");
    pipeline.shutdown();
    if !server_exited {
        let _ = stop_tx.send(());
        if let Err(e) = server.await {
            error!("HTTP server task failed: {}", e);
        }
    }

    Ok(())
}

/// Human-readable, secret-free summary for `smsrelay check`.
pub(crate) fn config_summary(config: &Config) -> String {
    let mut lines = vec![
        "Configuration OK".to_string(),
        format!("  model:            {}", config.provider.model),
        format!("  model endpoint:   {}", config.provider.api_base),
        format!("  SMS gateways:     {}", config.gateways.len()),
        format!("  allowed senders:  {}", config.relay.allow_from.len()),
        format!("  trigger prefix:   {:?}", config.relay.trigger_prefix),
        format!(
            "  listen:           {}:{}",
            config.server.host, config.server.port
        ),
    ];
    for (i, gw) in config.gateways.iter().enumerate() {
        lines.push(format!(
            "  gateway {}:        project={} phone={}",
            i + 1,
            gw.project_id,
            gw.phone_id
        ));
    }
    lines.join("\n")
}

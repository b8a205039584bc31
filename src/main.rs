// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Main entry point for the chaincode event listener
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

use chaincode_listener::config::{Config, Overrides};
use chaincode_listener::core::models::StartPosition;
use chaincode_listener::listener::{get_client, subscribe_event};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Network connection profile (YAML)
    #[arg(long)]
    network_profile: Option<PathBuf>,

    /// Organization connection profile merged over the network profile
    #[arg(long)]
    org_profile: Option<PathBuf>,

    /// Peer to open the event hub on
    #[arg(long)]
    peer: Option<String>,

    #[arg(long)]
    channel: Option<String>,

    #[arg(long)]
    chaincode_id: Option<String>,

    /// Event name pattern (regular expression)
    #[arg(long)]
    event: Option<String>,

    /// PEM private key of the user
    #[arg(long)]
    private_key: Option<PathBuf>,

    /// PEM certificate of the user
    #[arg(long)]
    signed_cert: Option<PathBuf>,

    /// Receive filtered blocks (events without payloads)
    #[arg(long)]
    filtered: bool,

    /// newest, oldest or a block number
    #[arg(long)]
    start: Option<StartPosition>,

    /// Stop after this block has been delivered
    #[arg(long)]
    end: Option<u64>,

    /// Dry run: prints the effective configuration as JSON and exits.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            network_profile: self.network_profile.clone(),
            org_profile: self.org_profile.clone(),
            peer_name: self.peer.clone(),
            channel_name: self.channel.clone(),
            chaincode_id: self.chaincode_id.clone(),
            chaincode_event: self.event.clone(),
            private_key: self.private_key.clone(),
            signed_cert: self.signed_cert.clone(),
            filtered: self.filtered,
            start: self.start,
            end_block: self.end,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    install_panic_hook();

    let config = Config::from_env_with(cli.overrides()).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    if cli.dry_run {
        let rendered =
            serde_json::to_string_pretty(&config).context("failed to render configuration")?;
        println!("{}", rendered);
        return Ok(());
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to init tracing: {}", e);
    }

    let client = match get_client(&config).await {
        Ok(client) => client,
        Err(e) => {
            error!("failed to build client: {}", e);
            std::process::exit(1);
        }
    };

    let (hub, handle) = match subscribe_event(&client, &config, None).await {
        Ok(subscribed) => subscribed,
        Err(e) => {
            error!("failed to subscribe to chaincode event: {}", e);
            std::process::exit(1);
        }
    };
    info!("chaincode event handler started with handler_id={}", handle);

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("failed to listen for Ctrl-C: {}", e);
            }
            info!("interrupted, disconnecting");
        }
        _ = hub.closed() => {
            info!("event hub closed");
        }
    }
    hub.disconnect().await;

    Ok(())
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("PANIC: {} at {}", message, location);
    }));
}

fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}

// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repliq - comment-to-DM engagement automation.
//!
//! Binary entry point: starts the gateway, runs one-off poll cycles, or
//! generates a vault key.

mod serve;

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use repliq_core::Platform;

/// Repliq - comment-to-DM engagement automation.
#[derive(Parser, Debug)]
#[command(name = "repliq", version, about, long_about = None)]
struct Cli {
    /// Explicit config file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook gateway server.
    Serve,
    /// Run one poll cycle for a platform and print the report.
    Poll {
        /// One of: instagram, facebook, linkedin, twitter.
        platform: String,
    },
    /// Generate a fresh hex vault key for REPLIQ_VAULT_KEY_HEX.
    Keygen,
}

fn load_config(path: Option<&PathBuf>) -> repliq_config::RepliqConfig {
    let result = match path {
        Some(p) => repliq_config::load_config_from_path(p),
        None => repliq_config::load_config(),
    };
    match result {
        Ok(config) => config,
        Err(e) => {
            eprintln!("repliq: configuration error: {e}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.0.clone())),
        )
        .init();

    let outcome = match cli.command {
        Some(Commands::Serve) | None => serve::run(config).await,
        Some(Commands::Poll { platform }) => match Platform::from_str(&platform) {
            Ok(platform) => serve::poll_once(config, platform).await,
            Err(_) => {
                eprintln!("repliq: unknown platform '{platform}'");
                std::process::exit(2);
            }
        },
        Some(Commands::Keygen) => {
            use rand::RngCore;
            let mut key = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut key);
            println!("{}", hex::encode(key));
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("repliq: {e}");
        std::process::exit(1);
    }
}

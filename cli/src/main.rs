//! Submarine CLI - offline tooling for submarine sends

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;


#[cfg(test)]
mod test_vectors;



use commands::*;
use crate::config::{config_path, load_config, parse_address, parse_amount, parse_hex, read_hex_arg};
use submarine::{Witness, H256};

#[derive(Parser)]
#[command(name = "submarine")]
#[command(version = "0.1.0")]
#[command(about = "Submarine sends - commit-reveal transfers with hidden targets")]
#[command(long_about = r#"
Submarine sends let you pay a contract without revealing, until after the
payment is mined, which contract it was or what it will do.

Quick Start:
  1. submarine generate      Derive a one-time address and unlock transaction
  2. (pay the one-time address from your wallet)
  3. submarine verify-proof  Check the inclusion proof before revealing
  4. submarine decode-unlock Inspect the unlock transaction before broadcast
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (default: ~/.submarine/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive a commitment, its one-time address and unlock transaction
    Generate {
        /// Account that will sign the commit transaction
        #[arg(short, long)]
        sender: String,

        /// Contract the funds are ultimately for (default: from config)
        #[arg(short, long)]
        target: Option<String>,

        /// Unlock value in the smallest unit
        #[arg(long)]
        value: String,

        /// Embedded payload for the target, hex
        #[arg(short, long, default_value = "")]
        data: String,

        /// Unlock gas price (default: from config)
        #[arg(long)]
        gas_price: Option<String>,

        /// Unlock gas limit (default: from config)
        #[arg(long)]
        gas_limit: Option<u64>,

        /// Reuse an existing witness instead of generating one, hex
        #[arg(long)]
        witness: Option<String>,
    },

    /// Verify a proof blob against a trusted block hash
    VerifyProof {
        /// Proof blob as hex, or @file
        #[arg(short, long)]
        blob: String,

        /// Block hash the ledger reports for the commit block
        #[arg(long)]
        trusted_hash: String,
    },

    /// Decode an unsigned unlock transaction
    DecodeUnlock {
        /// Raw transaction as hex, or @file
        #[arg(short, long)]
        tx: String,
    },

    /// Show configuration
    Config {
        /// Write a default config file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing config file with --init
        #[arg(short, long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let path = config_path(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate { sender, target, value, data, gas_price, gas_limit, witness } => {
            let settings = load_config(&path)?;
            let target = match target {
                Some(t) => parse_address("target", &t)?,
                None => settings
                    .default_target
                    .context("No --target given and no default_target in config")?,
            };
            let witness = witness
                .map(|w| Witness::from_hex(&w))
                .transpose()
                .context("Invalid witness")?;
            generate::run(
                generate::GenerateOptions {
                    sender: parse_address("sender", &sender)?,
                    target,
                    value: parse_amount("value", &value)?,
                    data: parse_hex("data", &data)?,
                    gas_price: match gas_price {
                        Some(p) => parse_amount("gas-price", &p)?,
                        None => settings.default_gas_price,
                    },
                    gas_limit: gas_limit.unwrap_or(settings.default_gas_limit),
                    witness,
                    protocol: settings.protocol,
                },
                cli.json,
            )?;
        }
        Commands::VerifyProof { blob, trusted_hash } => {
            let blob = read_hex_arg("blob", &blob)?;
            let trusted_hash: H256 = trusted_hash.parse().context("Invalid trusted hash")?;
            verify_proof::run(&blob, &trusted_hash, cli.json)?;
        }
        Commands::DecodeUnlock { tx } => {
            let tx = read_hex_arg("tx", &tx)?;
            decode_unlock::run(&tx, cli.json)?;
        }
        Commands::Config { init, force } => {
            commands::config::run(&path, init, force)?;
        }
    }

    Ok(())
}

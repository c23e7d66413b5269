//! Configuration and argument parsing for the Submarine CLI
//!
//! The config file lives at `~/.submarine/config.json` unless `--config`
//! points elsewhere. A missing file means built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use submarine::{Address, SubmarineConfig};
use thiserror::Error;

const SUBMARINE_DIR: &str = ".submarine";
const CONFIG_FILE: &str = "config.json";

/// Default unlock gas price: 50 gwei
pub const DEFAULT_GAS_PRICE: u128 = 50_000_000_000;

/// Default unlock gas limit, enough for the target's unlock handler
pub const DEFAULT_GAS_LIMIT: u64 = 3_712_394;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid hex for {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("Invalid amount for {field}: {value}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("Invalid address for {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Gas price used for unlock transactions when `--gas-price` is absent
    pub default_gas_price: u128,

    /// Gas limit used for unlock transactions when `--gas-limit` is absent
    pub default_gas_limit: u64,

    /// Target contract used when `--target` is absent
    pub default_target: Option<Address>,

    /// Protocol parameters of the engine the CLI prepares commitments for
    pub protocol: SubmarineConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_gas_price: DEFAULT_GAS_PRICE,
            default_gas_limit: DEFAULT_GAS_LIMIT,
            default_target: None,
            protocol: SubmarineConfig::default(),
        }
    }
}

/// Get the submarine directory path
pub fn submarine_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(SUBMARINE_DIR))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(submarine_dir()?.join(CONFIG_FILE))
}

/// Resolve `--config` or fall back to the default location
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

/// Load the config, using defaults when the file does not exist
pub fn load_config(path: &Path) -> Result<CliConfig> {
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let json = fs::read_to_string(path).context("Failed to read config file")?;
    let config: CliConfig = serde_json::from_str(&json).context("Failed to parse config file")?;
    config.protocol.validate().context("Config file holds invalid protocol parameters")?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &CliConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("Failed to create config directory")?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).context("Failed to write config file")?;
    Ok(())
}

/// Decode hex with an optional `0x` prefix
pub fn parse_hex(field: &'static str, input: &str) -> Result<Vec<u8>, InputError> {
    let trimmed = input.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(stripped).map_err(|e| InputError::InvalidHex { field, reason: e.to_string() })
}

/// Hex given inline, or `@path` naming a file that holds the hex
pub fn read_hex_arg(field: &'static str, input: &str) -> Result<Vec<u8>> {
    match input.strip_prefix('@') {
        Some(path) => {
            let contents = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
            Ok(parse_hex(field, &contents)?)
        }
        None => Ok(parse_hex(field, input)?),
    }
}

pub fn parse_address(field: &'static str, input: &str) -> Result<Address, InputError> {
    input
        .trim()
        .parse()
        .map_err(|_| InputError::InvalidAddress { field, value: input.to_string() })
}

/// Amounts are integers in the ledger's smallest unit
pub fn parse_amount(field: &'static str, input: &str) -> Result<u128, InputError> {
    input
        .trim()
        .replace('_', "")
        .parse()
        .map_err(|_| InputError::InvalidAmount { field, value: input.to_string() })
}

/// `0x`-prefixed lowercase hex for display
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

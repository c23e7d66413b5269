//! Commitment generation
//!
//! Produces everything the sender needs before committing: the
//! commitment id, the one-time address to pay, the amount to pay it, and
//! the unsigned unlock transaction that will later sweep it.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use submarine::{derive, Address, CommitParams, SubmarineConfig, Witness, H256};
use tracing::debug;
use zeroize::Zeroize;

use crate::config::to_hex;

/// Options for commitment generation
pub struct GenerateOptions {
    pub sender: Address,
    pub target: Address,
    /// Unlock value in the ledger's smallest unit
    pub value: u128,
    /// Embedded dapp payload
    pub data: Vec<u8>,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// Reuse a witness instead of drawing a fresh one
    pub witness: Option<Witness>,
    /// Protocol parameters of the receiving engine
    pub protocol: SubmarineConfig,
}

/// Blocks after the commit block in which a reveal is accepted, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevealWindow {
    pub earliest: u64,
    pub latest: u64,
}

impl RevealWindow {
    pub fn for_protocol(protocol: &SubmarineConfig) -> Self {
        Self {
            earliest: protocol.commit_period_length.saturating_add(1),
            latest: protocol.max_reveal_lookback,
        }
    }
}

/// Everything printed by `generate`. Amounts are decimal strings so that
/// JSON consumers never round them.
#[derive(Debug, Serialize)]
pub struct GeneratedCommitment {
    pub commit_id: H256,
    pub one_time_address: Address,
    pub required_commit_amount: String,
    pub witness: String,
    pub sender: Address,
    pub target: Address,
    pub value: String,
    pub gas_price: String,
    pub gas_limit: u64,
    pub data: String,
    pub unlock_tx: String,
    pub unlock_tx_hash: H256,
    pub reveal_window: RevealWindow,
}

impl Drop for GeneratedCommitment {
    fn drop(&mut self) {
        self.witness.zeroize();
    }
}

pub fn build(options: GenerateOptions) -> Result<GeneratedCommitment> {
    let witness = options.witness.unwrap_or_else(Witness::generate);
    let params = CommitParams {
        sender: options.sender,
        target: options.target,
        value: options.value,
        payload: options.data,
        gas_price: options.gas_price,
        gas_limit: options.gas_limit,
    };
    let commitment = derive(&params, &witness).context("Failed to derive commitment")?;
    debug!(commit_id = %commitment.commit_id, "commitment derived");

    Ok(GeneratedCommitment {
        commit_id: commitment.commit_id,
        one_time_address: commitment.one_time_address,
        required_commit_amount: commitment.required_commit_amount().to_string(),
        witness: witness.to_hex(),
        sender: params.sender,
        target: params.target,
        value: params.value.to_string(),
        gas_price: params.gas_price.to_string(),
        gas_limit: params.gas_limit,
        data: to_hex(&params.payload),
        unlock_tx: to_hex(&commitment.unlock_tx_bytes),
        unlock_tx_hash: commitment.unlock_hash,
        reveal_window: RevealWindow::for_protocol(&options.protocol),
    })
}

pub fn run(options: GenerateOptions, json: bool) -> Result<()> {
    let generated = build(options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&generated)?);
        return Ok(());
    }

    println!("{}", "=== Submarine Commitment ===".cyan().bold());
    println!();
    println!("{}:", "Pay this one-time address".cyan());
    println!("  {}", generated.one_time_address.to_string().green().bold());
    println!();
    println!("{}:", "Exactly or more than".cyan());
    println!("  {} (value + unlock gas)", generated.required_commit_amount);
    println!();
    println!("{}:", "Commitment ID".cyan());
    println!("  {}", generated.commit_id);
    println!();
    println!("{}:", "Witness".cyan());
    println!("  {}", generated.witness);
    println!(
        "  {}",
        "Keep this secret until reveal. Without it the commitment cannot be revealed.".yellow()
    );
    println!();
    println!("{}:", "Unsigned unlock transaction".cyan());
    println!("  {}", generated.unlock_tx);
    println!("  hash: {}", generated.unlock_tx_hash);
    println!();
    println!(
        "{}",
        format!(
            "Reveal between {} and {} blocks after the commit transaction is mined.",
            generated.reveal_window.earliest, generated.reveal_window.latest
        )
        .dimmed()
    );

    Ok(())
}

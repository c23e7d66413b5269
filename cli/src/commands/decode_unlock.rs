//! Decode an unsigned unlock transaction

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use submarine::crypto::parse_unlock_payload;
use submarine::{Address, UnsignedTransaction, H256};

use crate::config::to_hex;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UnlockReport {
    pub commit_id: H256,
    pub target: Option<Address>,
    pub value: String,
    pub gas_price: String,
    pub gas_limit: u64,
    pub nonce: u64,
    pub embedded_data: String,
    pub unlock_tx_hash: H256,
}

pub fn decode(tx_bytes: &[u8]) -> Result<UnlockReport> {
    let tx = UnsignedTransaction::decode(tx_bytes).context("Not an unsigned transaction")?;
    let (commit_id, embedded) =
        parse_unlock_payload(&tx.data).context("Transaction data is not an unlock call")?;

    Ok(UnlockReport {
        commit_id,
        target: tx.to,
        value: tx.value.to_string(),
        gas_price: tx.gas_price.to_string(),
        gas_limit: tx.gas_limit,
        nonce: tx.nonce,
        embedded_data: to_hex(embedded),
        unlock_tx_hash: tx.hash(),
    })
}

pub fn run(tx_bytes: &[u8], json: bool) -> Result<()> {
    let report = decode(tx_bytes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Unlock transaction".cyan().bold());
    println!();
    println!("  Commitment ID: {}", report.commit_id);
    match report.target {
        Some(target) => println!("  Target:        {}", target),
        None => println!("  Target:        {}", "(none)".red()),
    }
    println!("  Value:         {}", report.value);
    println!("  Gas:           {} @ {}", report.gas_limit, report.gas_price);
    println!("  Embedded data: {}", report.embedded_data);
    println!("  Hash:          {}", report.unlock_tx_hash);
    if report.nonce != 0 {
        println!("  {}", "Warning: unlock transactions are sent with nonce 0".yellow());
    }

    Ok(())
}

//! Offline proof inspection
//!
//! Checks a proof blob against a block hash the caller trusts and reports
//! the commit transaction it proves. No ledger access is needed.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use submarine::{Address, ProofBlob, SignedTransaction, H256};

use crate::config::to_hex;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProofReport {
    pub block_number: u64,
    pub block_hash: H256,
    pub tx_index: u64,
    pub tx_hash: H256,
    pub sender: Address,
    pub to: Option<Address>,
    pub value: String,
    pub chain_id: Option<u64>,
    pub proof_nodes: usize,
    pub data: String,
}

pub fn inspect(blob_bytes: &[u8], trusted_hash: &H256) -> Result<ProofReport> {
    let blob = ProofBlob::decode(blob_bytes).context("Failed to decode proof blob")?;
    let raw_tx = blob.verify_transaction(trusted_hash).context("Proof does not verify")?;
    let tx = SignedTransaction::decode(&raw_tx).context("Proven transaction is malformed")?;
    let sender = tx.recover_sender().context("Could not recover the transaction signer")?;

    Ok(ProofReport {
        block_number: blob.header.number,
        block_hash: *trusted_hash,
        tx_index: blob.tx_index,
        tx_hash: tx.hash(),
        sender,
        to: tx.tx.to,
        value: tx.tx.value.to_string(),
        chain_id: tx.chain_id(),
        proof_nodes: blob.nodes.len(),
        data: to_hex(&tx.tx.data),
    })
}

pub fn run(blob_bytes: &[u8], trusted_hash: &H256, json: bool) -> Result<()> {
    let report = inspect(blob_bytes, trusted_hash)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Proof verified".green().bold());
    println!();
    println!("  Block:     #{} ({})", report.block_number, report.block_hash);
    println!("  Index:     {} ({} proof nodes)", report.tx_index, report.proof_nodes);
    println!("  Tx hash:   {}", report.tx_hash);
    println!("  From:      {}", report.sender);
    match report.to {
        Some(to) => println!("  To:        {}", to),
        None => println!("  To:        {}", "(contract creation)".dimmed()),
    }
    println!("  Value:     {}", report.value);
    match report.chain_id {
        Some(id) => println!("  Chain ID:  {}", id),
        None => println!("  Chain ID:  {}", "(pre-EIP-155 signature)".dimmed()),
    }

    Ok(())
}

//! Show or initialise the CLI configuration

use std::path::Path;

use anyhow::{bail, Result};
use colored::Colorize;

use crate::config::{load_config, save_config, CliConfig};

pub fn run(path: &Path, init: bool, force: bool) -> Result<()> {
    if init {
        if path.exists() && !force {
            bail!("Config already exists at {}. Use --force to overwrite.", path.display());
        }
        save_config(path, &CliConfig::default())?;
        println!("{} {}", "Wrote default config to".green(), path.display());
        return Ok(());
    }

    let config = load_config(path)?;

    println!();
    println!("{}", "Submarine Configuration".yellow().bold());
    println!();
    println!("{}:", "Config File".cyan());
    if path.exists() {
        println!("  {}", path.display());
    } else {
        println!("  {} {}", path.display(), "(not present, using defaults)".dimmed());
    }
    println!();
    println!("{}:", "Unlock Defaults".cyan());
    println!("  Gas price: {}", config.default_gas_price);
    println!("  Gas limit: {}", config.default_gas_limit);
    match config.default_target {
        Some(target) => println!("  Target:    {}", target),
        None => println!("  Target:    {}", "(none)".dimmed()),
    }
    println!();
    println!("{}:", "Protocol".cyan());
    println!("  Commit period:   {} blocks", config.protocol.commit_period_length);
    println!("  Reveal lookback: {} blocks", config.protocol.max_reveal_lookback);
    println!("  Sweep policy:    {:?}", config.protocol.sweep_policy);

    Ok(())
}

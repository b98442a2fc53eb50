//! `rget config` – show where the config lives and what is in effect.

use anyhow::Result;
use rget_core::config::{self, RgetConfig};
use rget_core::logging;

pub fn run_config(cfg: &RgetConfig) -> Result<()> {
    println!("config:   {}", config::config_path()?.display());
    println!("log file: {}", logging::log_path()?.display());
    println!();
    print!("{}", cfg.to_toml()?);
    Ok(())
}

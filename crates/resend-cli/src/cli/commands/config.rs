//! `resend config` – print the config path and effective settings.

use anyhow::Result;
use resend_core::config::ResendConfig;
use std::path::Path;

pub fn show_config(path: Option<&Path>, cfg: &ResendConfig) -> Result<()> {
    match path {
        Some(p) => println!("# {}", p.display()),
        None => println!("# (no config path)"),
    }
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}

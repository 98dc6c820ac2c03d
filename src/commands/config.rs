use crate::config::ClientConfig;
use crate::core::context::CommandContext;
use crate::error::{AdbError, Result};
use colored::*;
use log::debug;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Show configuration file path only
    #[arg(short = 'p', long = "path")]
    pub path_only: bool,
}

/// `<config dir>/adbw/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AdbError::Config("could not determine config directory".into()))?;
    Ok(config_dir.join("adbw").join("config.toml"))
}

/// Read `path`, falling back to defaults when it does not exist
pub fn load_config(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(ClientConfig::default());
    }
    debug!("Reading config from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    ClientConfig::from_toml_str(&contents)
}

pub async fn run(ctx: &CommandContext, path: &Path, args: ConfigArgs) -> Result<()> {
    if args.path_only {
        println!("{}", path.display());
        return Ok(());
    }

    if path.exists() {
        println!("Read from {}\n", path.display().to_string().bright_cyan());
    } else {
        println!(
            "No config file at {}; using defaults\n",
            path.display().to_string().bright_cyan()
        );
    }

    let effective = toml::to_string_pretty(ctx.client.config())
        .map_err(|e| AdbError::Config(e.to_string()))?;
    println!("{}", effective);
    Ok(())
}

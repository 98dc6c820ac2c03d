pub mod config;
pub mod device;
pub mod devices;
pub mod files;
pub mod forward;
pub mod server;
pub mod shell;

use crate::adb::client::AdbClient;
use crate::cli::{Cli, Commands};
use crate::config::ClientConfig;
use crate::core::context::CommandContext;
use crate::error::Result;
use log::debug;

/// Config file plus command-line overrides
pub fn resolve_config(cli: &Cli) -> Result<(ClientConfig, std::path::PathBuf)> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let mut client_config = config::load_config(&path)?;

    if let Some(host) = &cli.host {
        client_config.host = host.clone();
    }
    if let Some(port) = cli.port {
        client_config.port = port;
    }
    Ok((client_config, path))
}

/// Route the parsed command line to its command
pub async fn run(cli: Cli) -> Result<()> {
    let (client_config, config_path) = resolve_config(&cli)?;
    debug!("Using ADB server at {}", client_config.endpoint());

    let ctx = CommandContext::new(AdbClient::new(client_config))
        .with_serial(cli.serial.clone())
        .with_output_format(cli.output)
        .with_quiet(cli.is_quiet());

    match cli.command() {
        Commands::Devices(args) => devices::run(&ctx, args).await,
        Commands::Version => server::version(&ctx).await,
        Commands::KillServer => server::kill_server(&ctx).await,
        Commands::Connect(args) => server::connect(&ctx, args).await,
        Commands::Disconnect(args) => server::disconnect(&ctx, args).await,
        Commands::Features => device::features(&ctx).await,
        Commands::Shell(args) => shell::run(&ctx, args).await,
        Commands::Ls(args) => files::ls(&ctx, args).await,
        Commands::Stat(args) => files::stat(&ctx, args).await,
        Commands::Push(args) => files::push(&ctx, args).await,
        Commands::Pull(args) => files::pull(&ctx, args).await,
        Commands::Forward { action } => forward::run(&ctx, action, false).await,
        Commands::Reverse { action } => forward::run(&ctx, action, true).await,
        Commands::Reboot(args) => device::reboot(&ctx, args).await,
        Commands::Root => device::root(&ctx).await,
        Commands::Unroot => device::unroot(&ctx).await,
        Commands::Config(args) => config::run(&ctx, &config_path, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_command_line_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = \"10.0.0.1\"\nport = 6000\n").unwrap();
        let path_arg = path.to_str().unwrap();

        let cli = Cli::try_parse_from(["adbw", "--config", path_arg, "-P", "7000", "version"])
            .unwrap();
        let (config, resolved) = resolve_config(&cli).unwrap();

        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.port, 7000);
        assert_eq!(resolved, path);
    }
}

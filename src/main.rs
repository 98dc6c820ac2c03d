use adb_wire::cli::Cli;
use adb_wire::commands;
use adb_wire::output::OutputFormatter;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    if let Err(e) = commands::run(cli).await {
        OutputFormatter::new().error(&format!("Error: {}", e));
        std::process::exit(1);
    }
}

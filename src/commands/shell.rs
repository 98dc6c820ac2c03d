use crate::adb::shell::FnReceiver;
use crate::core::context::CommandContext;
use crate::error::{AdbError, Result};
use log::debug;

#[derive(Debug, Clone, clap::Args)]
pub struct ShellArgs {
    /// Command and arguments, joined with spaces
    #[arg(required = true, allow_hyphen_values = true, trailing_var_arg = true)]
    pub command: Vec<String>,
}

pub async fn run(ctx: &CommandContext, args: ShellArgs) -> Result<()> {
    let device = ctx.target_device().await?;
    let command = args.command.join(" ");

    let mut stream = ctx.client.run_shell(&device, &command).await?;
    let token = stream.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let mut receiver = FnReceiver(|line: &str| println!("{}", line));
    match stream.pump(&mut receiver).await {
        // The remote process keeps running; nothing else to clean up
        Err(AdbError::Cancelled) => {
            debug!("Shell interrupted: {}", command);
            Ok(())
        }
        result => result,
    }
}

use crate::core::context::CommandContext;
use crate::error::Result;

#[derive(Debug, Clone, Default, clap::Args)]
pub struct DevicesArgs {
    /// Keep running and print the list again whenever it changes
    #[arg(long, short = 't')]
    pub track: bool,
}

pub async fn run(ctx: &CommandContext, args: DevicesArgs) -> Result<()> {
    let formatter = ctx.formatter();

    if !args.track {
        let devices = ctx.devices.list_devices().await?;
        if devices.is_empty() {
            formatter.warning("No devices attached");
            return Ok(());
        }
        return formatter.print(ctx.output_format, &devices);
    }

    let mut tracker = ctx.client.track_devices().await?;
    let token = tracker.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    while let Some(devices) = tracker.next_update().await? {
        formatter.print(ctx.output_format, &devices)?;
        formatter.message("");
    }
    Ok(())
}

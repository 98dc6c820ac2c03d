use crate::core::context::CommandContext;
use crate::error::Result;

#[derive(Debug, Clone, clap::Args)]
pub struct RebootArgs {
    /// Boot into `bootloader`, `recovery`, `sideload`, ... instead of the system
    pub target: Option<String>,
}

pub async fn reboot(ctx: &CommandContext, args: RebootArgs) -> Result<()> {
    let device = ctx.target_device().await?;
    ctx.client
        .reboot(&device, args.target.as_deref().unwrap_or_default())
        .await?;
    ctx.formatter().success(&format!("Rebooting {}", device));
    Ok(())
}

pub async fn root(ctx: &CommandContext) -> Result<()> {
    let device = ctx.target_device().await?;
    ctx.client.root(&device).await?;
    ctx.formatter()
        .success(&format!("Restarting adbd as root on {}", device));
    Ok(())
}

pub async fn unroot(ctx: &CommandContext) -> Result<()> {
    let device = ctx.target_device().await?;
    ctx.client.unroot(&device).await?;
    ctx.formatter()
        .success(&format!("Restarting adbd as non-root on {}", device));
    Ok(())
}

pub async fn features(ctx: &CommandContext) -> Result<()> {
    let device = ctx.target_device().await?;
    let features = ctx.client.get_feature_set(&device).await?;
    ctx.formatter().plain(&features)
}

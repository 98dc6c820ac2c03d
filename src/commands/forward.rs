use crate::adb::forward::ForwardSpec;
use crate::core::context::CommandContext;
use crate::error::Result;
use clap::Subcommand;

/// Shared by `forward` and `reverse`. For `forward` the first end is on the
/// host; for `reverse` it is on the device.
#[derive(Subcommand, Clone, Debug)]
pub enum ForwardAction {
    /// Create a forward, e.g. `tcp:0 tcp:5555`
    Add {
        from: String,
        to: String,
        /// Fail instead of replacing an existing forward on the first end
        #[arg(long)]
        no_rebind: bool,
    },
    /// List forwards
    List,
    /// Remove the forward whose first end is `spec`
    Remove { spec: String },
    /// Remove every forward
    RemoveAll,
}

pub async fn run(ctx: &CommandContext, action: ForwardAction, reverse: bool) -> Result<()> {
    let device = ctx.target_device().await?;
    let client = &ctx.client;
    let formatter = ctx.formatter();

    match action {
        ForwardAction::Add { from, to, no_rebind } => {
            let from: ForwardSpec = from.parse()?;
            let to: ForwardSpec = to.parse()?;
            let port = if reverse {
                client
                    .create_reverse_forward(&device, &from, &to, !no_rebind)
                    .await?
            } else {
                client.create_forward(&device, &from, &to, !no_rebind).await?
            };

            match port {
                Some(port) => formatter.message(&port.to_string()),
                None => formatter.success(&format!("{} -> {}", from, to)),
            }
            Ok(())
        }
        ForwardAction::List => {
            let forwards = if reverse {
                client.list_reverse_forward(&device).await?
            } else {
                client.list_forward(&device).await?
            };
            formatter.print(ctx.output_format, &forwards)
        }
        ForwardAction::Remove { spec } => {
            let spec: ForwardSpec = spec.parse()?;
            if reverse {
                client.remove_reverse_forward(&device, &spec).await
            } else {
                client.remove_forward(&device, &spec).await
            }
        }
        ForwardAction::RemoveAll => {
            if reverse {
                client.remove_all_reverse_forwards(&device).await
            } else {
                client.remove_all_forwards(&device).await
            }
        }
    }
}

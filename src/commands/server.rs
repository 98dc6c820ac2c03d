use crate::core::context::CommandContext;
use crate::error::{AdbError, Result};

/// Port adbd listens on for TCP/IP connections
const DEFAULT_DEVICE_PORT: u16 = 5555;

#[derive(Debug, Clone, clap::Args)]
pub struct AddressArgs {
    /// Device address as `host[:port]`
    pub address: String,
}

impl AddressArgs {
    /// Split into host and port, defaulting the port to 5555
    pub fn host_and_port(&self) -> Result<(&str, u16)> {
        match self.address.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse().map_err(|_| {
                    AdbError::InvalidArgument(format!("invalid port in {:?}", self.address))
                })?;
                Ok((host, port))
            }
            None => Ok((self.address.as_str(), DEFAULT_DEVICE_PORT)),
        }
    }
}

pub async fn version(ctx: &CommandContext) -> Result<()> {
    let version = ctx.client.get_adb_version().await?;
    ctx.formatter()
        .message(&format!("Android Debug Bridge version 1.0.{}", version));
    Ok(())
}

pub async fn kill_server(ctx: &CommandContext) -> Result<()> {
    ctx.client.kill_adb().await?;
    ctx.formatter().success("ADB server stopped");
    Ok(())
}

pub async fn connect(ctx: &CommandContext, args: AddressArgs) -> Result<()> {
    let (host, port) = args.host_and_port()?;
    let reply = ctx.client.connect(host, port).await?;
    ctx.formatter().message(reply.trim());
    Ok(())
}

pub async fn disconnect(ctx: &CommandContext, args: AddressArgs) -> Result<()> {
    let (host, port) = args.host_and_port()?;
    let reply = ctx.client.disconnect(host, port).await?;
    ctx.formatter().message(reply.trim());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(s: &str) -> AddressArgs {
        AddressArgs {
            address: s.to_string(),
        }
    }

    #[test]
    fn test_host_and_port() {
        assert_eq!(
            address("192.168.1.20:5556").host_and_port().unwrap(),
            ("192.168.1.20", 5556)
        );
        assert_eq!(
            address("phone.local").host_and_port().unwrap(),
            ("phone.local", 5555)
        );
        assert!(matches!(
            address("phone.local:http").host_and_port(),
            Err(AdbError::InvalidArgument(_))
        ));
    }
}

use crate::commands::{
    config::ConfigArgs,
    device::RebootArgs,
    devices::DevicesArgs,
    files::{LsArgs, PullArgs, PushArgs, StatArgs},
    forward::ForwardAction,
    server::AddressArgs,
    shell::ShellArgs,
};
use crate::output::OutputType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Commands>,

    /// ADB server host (overrides the config file)
    #[arg(long, short = 'H', global = true)]
    pub host: Option<String>,

    /// ADB server port (overrides the config file)
    #[arg(long, short = 'P', global = true)]
    pub port: Option<u16>,

    /// Device serial; a unique part of it is enough
    #[arg(long, short = 's', global = true)]
    pub serial: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputType::Table)]
    pub output: OutputType,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// List connected devices
    Devices(DevicesArgs),

    /// Show the ADB server version
    Version,

    /// Stop the ADB server
    KillServer,

    /// Connect to a device over TCP/IP
    Connect(AddressArgs),

    /// Disconnect a TCP/IP device
    Disconnect(AddressArgs),

    /// Show the feature set shared by the device and server
    Features,

    /// Run a shell command on a device
    Shell(ShellArgs),

    /// List a remote directory
    Ls(LsArgs),

    /// Show metadata of a remote path
    Stat(StatArgs),

    /// Copy a local file to the device
    Push(PushArgs),

    /// Copy a file from the device
    Pull(PullArgs),

    /// Manage host-to-device forwards
    Forward {
        #[command(subcommand)]
        action: ForwardAction,
    },

    /// Manage device-to-host forwards
    Reverse {
        #[command(subcommand)]
        action: ForwardAction,
    },

    /// Reboot a device
    Reboot(RebootArgs),

    /// Restart adbd with root permissions
    Root,

    /// Restart adbd without root permissions
    Unroot,

    /// Show the effective configuration
    Config(ConfigArgs),
}

impl Cli {
    /// `-q` down to silence hides informational output too
    pub fn is_quiet(&self) -> bool {
        self.verbose.log_level().is_none()
    }

    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Devices(DevicesArgs::default()))
    }
}

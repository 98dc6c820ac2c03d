use crate::adb::sync::{SyncService, SyncVersion};
use crate::core::context::CommandContext;
use crate::error::{AdbError, Result};
use crate::output::format_size;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, clap::Args)]
pub struct LsArgs {
    /// Remote directory
    #[arg(default_value = "/sdcard")]
    pub path: String,

    /// Use the v2 sync commands (Android 11+)
    #[arg(long)]
    pub v2: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct StatArgs {
    /// Remote path
    pub path: String,

    /// Use the v2 sync commands (Android 11+)
    #[arg(long)]
    pub v2: bool,

    /// Do not follow a final symlink (v2 only)
    #[arg(long, short = 'L', requires = "v2")]
    pub no_follow: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct PushArgs {
    /// Local file
    pub local: PathBuf,

    /// Remote destination; a trailing `/` keeps the local file name
    pub remote: String,

    #[arg(long)]
    pub v2: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct PullArgs {
    /// Remote file
    pub remote: String,

    /// Local destination file or directory
    #[arg(default_value = ".")]
    pub local: PathBuf,

    #[arg(long)]
    pub v2: bool,
}

fn version(v2: bool) -> SyncVersion {
    if v2 {
        SyncVersion::V2
    } else {
        SyncVersion::V1
    }
}

async fn open_sync(ctx: &CommandContext) -> Result<SyncService> {
    let device = ctx.target_device().await?;
    ctx.client.sync_service(&device).await
}

pub async fn ls(ctx: &CommandContext, args: LsArgs) -> Result<()> {
    let mut sync = open_sync(ctx).await?;
    let formatter = ctx.formatter();

    let result = if args.v2 {
        sync.list_ex(&args.path).await.and_then(|mut entries| {
            entries.retain(|e| e.path != "." && e.path != "..");
            formatter.print(ctx.output_format, &entries)
        })
    } else {
        sync.list(&args.path).await.and_then(|mut entries| {
            entries.retain(|e| e.path != "." && e.path != "..");
            formatter.print(ctx.output_format, &entries)
        })
    };

    sync.close().await;
    result
}

pub async fn stat(ctx: &CommandContext, args: StatArgs) -> Result<()> {
    let mut sync = open_sync(ctx).await?;
    let formatter = ctx.formatter();

    let result = if args.v2 {
        let stat = if args.no_follow {
            sync.lstat_ex(&args.path).await
        } else {
            sync.stat_ex(&args.path).await
        };
        stat.and_then(|stat| {
            if stat.is_error() {
                return Err(AdbError::Server(format!(
                    "{}: errno {}",
                    args.path, stat.error
                )));
            }
            formatter.print(ctx.output_format, &[stat])
        })
    } else {
        sync.stat(&args.path).await.and_then(|stat| {
            if stat.is_missing() {
                return Err(AdbError::Server(format!(
                    "{}: no such file or directory",
                    args.path
                )));
            }
            formatter.print(ctx.output_format, &[stat])
        })
    };

    sync.close().await;
    result
}

pub async fn push(ctx: &CommandContext, args: PushArgs) -> Result<()> {
    let remote = remote_destination(&args.local, &args.remote)?;
    let mut sync = open_sync(ctx).await?;
    sync.set_progress(Some(ctx.progress().file_transfer(0)));

    let result = sync.push_file(&args.local, &remote, version(args.v2)).await;
    sync.close().await;

    let bytes = result?;
    ctx.formatter().success(&format!(
        "{} -> {} ({})",
        args.local.display(),
        remote,
        format_size(bytes)
    ));
    Ok(())
}

pub async fn pull(ctx: &CommandContext, args: PullArgs) -> Result<()> {
    let local = local_destination(&args.remote, &args.local)?;
    let mut sync = open_sync(ctx).await?;
    sync.set_progress(Some(ctx.progress().file_transfer(0)));

    let result = sync.pull_file(&args.remote, &local, version(args.v2)).await;
    sync.close().await;

    let bytes = result?;
    ctx.formatter().success(&format!(
        "{} -> {} ({})",
        args.remote,
        local.display(),
        format_size(bytes)
    ));
    Ok(())
}

/// `remote` itself, or `remote` + the local file name when it ends in `/`
fn remote_destination(local: &Path, remote: &str) -> Result<String> {
    if !remote.ends_with('/') {
        return Ok(remote.to_string());
    }
    let name = local
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            AdbError::InvalidArgument(format!("{} has no file name", local.display()))
        })?;
    Ok(format!("{}{}", remote, name))
}

/// `local` itself, or the remote file name inside `local` when it is a directory
fn local_destination(remote: &str, local: &Path) -> Result<PathBuf> {
    if !local.is_dir() {
        return Ok(local.to_path_buf());
    }
    let name = remote
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AdbError::InvalidArgument(format!("{:?} has no file name", remote)))?;
    Ok(local.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_destination() {
        let local = Path::new("/tmp/build/app.apk");
        assert_eq!(
            remote_destination(local, "/data/local/tmp/").unwrap(),
            "/data/local/tmp/app.apk"
        );
        assert_eq!(
            remote_destination(local, "/data/local/tmp/x.apk").unwrap(),
            "/data/local/tmp/x.apk"
        );
    }

    #[test]
    fn test_local_destination() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            local_destination("/sdcard/DCIM/photo.jpg", dir.path()).unwrap(),
            dir.path().join("photo.jpg")
        );

        let file = dir.path().join("renamed.jpg");
        assert_eq!(
            local_destination("/sdcard/DCIM/photo.jpg", &file).unwrap(),
            file
        );

        assert!(matches!(
            local_destination("/", dir.path()),
            Err(AdbError::InvalidArgument(_))
        ));
    }
}

use crate::adb::sync::SyncService;
use crate::adb::transport::Transport;
use crate::adb::FileStatistics;
use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::core::{TransferDirection, TransferProgress};
use crate::error::{AdbError, Result};
use crate::progress::ProgressFactory;
use crate::utils::expand_path;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::fs::{self, File, Metadata};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Read from standard input when given as a push source
const STDIN_SOURCE: &str = "-";

/// Join a remote directory and a relative name with exactly one `/`.
pub fn remote_join(base: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if base.is_empty() {
        return name.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), name)
}

/// Last component of a remote path, ignoring trailing slashes.
pub fn remote_file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

pub fn local_mode(metadata: &Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o777
    }
    #[cfg(not(unix))]
    {
        if metadata.permissions().readonly() {
            0o444
        } else {
            0o644
        }
    }
}

pub fn local_mtime(metadata: &Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Work out the remote path of every local file a push will upload.
///
/// Directories are walked recursively. When the destination is a directory,
/// or there are several sources, each source keeps its own name below it.
pub fn plan_push(sources: &[PathBuf], destination: &str, destination_is_dir: bool) -> Result<Vec<(PathBuf, String)>> {
    let into_dir = destination_is_dir || sources.len() > 1;
    let mut plan = Vec::new();

    for source in sources {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AdbError::InvalidArgument(format!("invalid source '{}'", source.display())))?;

        if source.is_dir() {
            let root = if into_dir { remote_join(destination, &name) } else { destination.to_string() };
            for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
                let entry = entry.map_err(io::Error::from)?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(source)
                    .map_err(|e| AdbError::InvalidArgument(e.to_string()))?;
                let relative: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                plan.push((entry.path().to_path_buf(), remote_join(&root, &relative.join("/"))));
            }
        } else if source.is_file() {
            let remote = if into_dir { remote_join(destination, &name) } else { destination.to_string() };
            plan.push((source.clone(), remote));
        } else {
            return Err(AdbError::InvalidArgument(format!(
                "local path '{}' does not exist",
                source.display()
            )));
        }
    }

    Ok(plan)
}

/// True if a name from a directory listing is a single plain path component.
pub fn is_safe_entry_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    !name.contains('/')
        && matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
}

fn is_dot_entry(entry: &FileStatistics) -> bool {
    entry.path == "." || entry.path == ".."
}

// =============================================================================
// ls / stat
// =============================================================================

#[derive(Debug, Clone, clap::Args)]
pub struct LsArgs {
    /// Remote directory
    #[arg(default_value = "/sdcard")]
    pub path: String,

    /// Include `.` and `..`
    #[arg(short = 'a', long)]
    pub all: bool,
}

pub struct LsCommand;

impl LsCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for LsCommand {
    type Args = LsArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        let mut sync = ctx.client().sync_service(&serial)?;
        let mut entries = sync.list(&args.path)?;
        sync.close()?;

        if !args.all {
            entries.retain(|e| !is_dot_entry(e));
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        ctx.formatter().list(&entries)
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct StatArgs {
    /// Remote path
    pub path: String,
}

pub struct StatCommand;

impl StatCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for StatCommand {
    type Args = StatArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        let mut sync = ctx.client().sync_service(&serial)?;
        let stats = sync.stat(&args.path)?;
        sync.close()?;

        if !stats.exists() {
            return Err(AdbError::InvalidArgument(format!(
                "remote object '{}' does not exist",
                args.path
            )));
        }
        ctx.formatter().list(&[stats])
    }
}

// =============================================================================
// push
// =============================================================================

#[derive(Debug, Clone, clap::Args)]
pub struct PushArgs {
    /// Local files or directories; `-` reads standard input
    #[arg(required = true)]
    pub src: Vec<String>,

    /// Remote destination path on device
    pub dst: String,
}

pub struct PushCommand;

impl PushCommand {
    pub fn new() -> Self {
        Self
    }

    fn push_stdin<T: Transport>(&self, sync: &mut SyncService<T>, progress: &ProgressFactory, remote: &str) -> Result<()> {
        let reporter = progress.file_transfer(TransferDirection::Push, remote, 0);
        let mut on_progress = |p: &TransferProgress| reporter.update(p);
        let mut stdin = io::stdin().lock();
        sync.push_stream(&mut stdin, remote, 0o644, Utc::now(), Some(&mut on_progress))?;
        reporter.finish();
        Ok(())
    }
}

#[async_trait]
impl SubCommand for PushCommand {
    type Args = PushArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        let mut sync = ctx.client().sync_service(&serial)?;
        let progress = ctx.progress();

        if args.src.iter().any(|s| s == STDIN_SOURCE) {
            if args.src.len() > 1 {
                return Err(AdbError::InvalidArgument(
                    "standard input cannot be combined with other sources".into(),
                ));
            }
            self.push_stdin(&mut sync, &progress, &args.dst)?;
            return sync.close();
        }

        let sources: Vec<PathBuf> = args.src.iter().map(|s| PathBuf::from(expand_path(s))).collect();
        let destination_is_dir = sync.stat(&args.dst)?.is_directory();
        let plan = plan_push(&sources, &args.dst, destination_is_dir)?;
        debug!("Push plan: {:?}", plan);

        let mut total = 0u64;
        for (local, remote) in &plan {
            let metadata = fs::metadata(local)?;
            let mut file = File::open(local)?;

            let reporter = progress.file_transfer(TransferDirection::Push, &local.display().to_string(), metadata.len());
            let mut on_progress = |p: &TransferProgress| reporter.update(p);
            sync.push(
                &mut file,
                remote,
                local_mode(&metadata),
                local_mtime(&metadata),
                Some(&mut on_progress),
            )?;
            reporter.finish();
            total += metadata.len();
        }
        sync.close()?;

        info!("Pushed {} files to {}", plan.len(), serial);
        ctx.formatter()
            .success(&format!("{} file(s) pushed, {} bytes", plan.len(), total))
    }
}

// =============================================================================
// pull
// =============================================================================

#[derive(Debug, Clone, clap::Args)]
pub struct PullArgs {
    /// Remote file or directory
    pub remote: String,

    /// Local destination (defaults to the current directory)
    pub local: Option<String>,
}

pub struct PullCommand;

impl PullCommand {
    pub fn new() -> Self {
        Self
    }

    fn pull_file<T: Transport>(
        &self,
        sync: &mut SyncService<T>,
        progress: &ProgressFactory,
        remote: &str,
        size: u64,
        local: &Path,
    ) -> Result<u64> {
        let reporter = progress.file_transfer(TransferDirection::Pull, remote, size);
        let mut on_progress = |p: &TransferProgress| reporter.update(p);
        let mut file = BufWriter::new(File::create(local)?);
        sync.pull(remote, &mut file, Some(&mut on_progress))?;
        file.flush()?;
        reporter.finish();
        Ok(size)
    }

    /// Pull every file below `remote` into `local`, creating directories as needed.
    pub(crate) fn pull_dir<T: Transport>(
        &self,
        sync: &mut SyncService<T>,
        progress: &ProgressFactory,
        remote: &str,
        local: &Path,
    ) -> Result<(usize, u64)> {
        fs::create_dir_all(local)?;
        let (mut files, mut bytes) = (0, 0);

        for entry in sync.list(remote)? {
            if is_dot_entry(&entry) {
                continue;
            }
            if !is_safe_entry_name(&entry.path) {
                warn!("Skipping unsafe entry name {:?} in {}", entry.path, remote);
                continue;
            }
            let remote_path = remote_join(remote, &entry.path);
            let local_path = local.join(&entry.path);
            if entry.is_directory() {
                let (f, b) = self.pull_dir(sync, progress, &remote_path, &local_path)?;
                files += f;
                bytes += b;
            } else if entry.is_file() {
                bytes += self.pull_file(sync, progress, &remote_path, entry.size as u64, &local_path)?;
                files += 1;
            } else {
                debug!("Skipping {} ({})", remote_path, entry.file_type().as_str());
            }
        }
        Ok((files, bytes))
    }
}

#[async_trait]
impl SubCommand for PullCommand {
    type Args = PullArgs;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()> {
        let serial = ctx.target_serial()?;
        let mut sync = ctx.client().sync_service(&serial)?;
        let progress = ctx.progress();

        let stats = sync.stat(&args.remote)?;
        if !stats.exists() {
            return Err(AdbError::InvalidArgument(format!(
                "remote object '{}' does not exist",
                args.remote
            )));
        }

        let local = PathBuf::from(expand_path(args.local.as_deref().unwrap_or(".")));
        let target = if local.is_dir() {
            local.join(remote_file_name(&args.remote))
        } else {
            local
        };

        let (files, bytes) = if stats.is_directory() {
            self.pull_dir(&mut sync, &progress, &args.remote, &target)?
        } else {
            let size = self.pull_file(&mut sync, &progress, &args.remote, stats.size as u64, &target)?;
            (1, size)
        };
        sync.close()?;

        ctx.formatter().success(&format!(
            "{} file(s) pulled to {}, {} bytes",
            files,
            target.display(),
            bytes
        ))
    }
}

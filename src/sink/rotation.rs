//! Size-based log file rotation

use crate::config::LoggerSettings;
use crate::{LogTeeError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

const DEFAULT_MAX_SIZE_MB: u64 = 500;
const DEFAULT_MAX_BACKUPS: usize = 10;
const DEFAULT_MAX_AGE_DAYS: u32 = 7;

/// Timestamp embedded in backup file names. Colons are not filesystem-safe,
/// so the time-of-day separators are dashes.
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// Rules governing when the log file is rotated and how backups are retained.
///
/// Immutable once the sink is constructed.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    /// Path of the active log file
    pub path: PathBuf,
    /// Maximum file size in megabytes before rotation (0 uses the 500 MB
    /// default)
    pub max_size_mb: u64,
    /// Number of rotated backups retained (0 keeps all)
    pub max_backups: usize,
    /// Maximum age of rotated backups in days (0 disables age pruning)
    pub max_age_days: u32,
    /// Whether rotated backups are gzip-compressed
    pub compress: bool,
}

impl RotationPolicy {
    /// Create a policy for `path` with the default thresholds: 500 MB cap,
    /// 10 backups, 7-day retention, compression disabled.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            max_backups: DEFAULT_MAX_BACKUPS,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            compress: false,
        }
    }

    fn max_bytes(&self) -> u64 {
        let mb = if self.max_size_mb == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            self.max_size_mb
        };
        mb * 1024 * 1024
    }
}

impl From<&LoggerSettings> for RotationPolicy {
    fn from(settings: &LoggerSettings) -> Self {
        Self {
            path: PathBuf::from(settings.log_file_name.trim()),
            max_size_mb: settings.log_file_size_capping_in_mbs,
            max_backups: settings.max_log_backups_count,
            max_age_days: settings.max_old_log_retention_in_days,
            compress: settings.logs_compression_required,
        }
    }
}

/// Append-only log file that rotates itself when the size cap is reached.
///
/// The sink has no internal locking: it is owned and driven by a single
/// writer task. Rotation renames the active file to a timestamped backup,
/// reopens a fresh file, then prunes and optionally compresses backups.
/// Prune and compression failures are reported as `tracing` events and never
/// surface on the write path.
pub struct RotatingFileSink {
    policy: RotationPolicy,
    file: File,
    written: u64,
}

impl RotatingFileSink {
    /// Open the sink, creating parent directories as needed.
    ///
    /// An existing file is appended to; its current length counts toward the
    /// size cap.
    pub async fn open(policy: RotationPolicy) -> Result<Self> {
        if policy.path.as_os_str().is_empty() {
            return Err(LogTeeError::Sink(
                "Rotation policy requires a file path".to_string(),
            ));
        }
        if let Some(parent) = policy.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let file = Self::open_active(&policy.path).await?;
        let written = file.metadata().await?.len();

        Ok(Self {
            policy,
            file,
            written,
        })
    }

    /// Write one encoded record, rotating first if the write would exceed the
    /// size cap.
    ///
    /// A buffer larger than the cap itself is written to a fresh file in one
    /// piece rather than rejected.
    pub async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.policy.max_bytes() {
            self.rotate().await?;
        }
        self.file.write_all(buf).await?;
        self.written += buf.len() as u64;
        Ok(())
    }

    /// Flush buffered data to the active file
    pub async fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush().await
    }

    /// The policy this sink was built with
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    async fn open_active(path: &Path) -> std::io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path).await
    }

    async fn rotate(&mut self) -> std::io::Result<()> {
        self.file.flush().await?;

        // Back-to-back rotations can land in the same millisecond; never
        // rename over an existing backup
        let mut now = Utc::now();
        let mut backup = backup_path(&self.policy.path, now);
        while matches!(fs::try_exists(&backup).await, Ok(true))
            || matches!(fs::try_exists(&gz_path(&backup)).await, Ok(true))
        {
            now += chrono::Duration::milliseconds(1);
            backup = backup_path(&self.policy.path, now);
        }
        fs::rename(&self.policy.path, &backup).await?;

        self.file = Self::open_active(&self.policy.path).await?;
        self.written = 0;

        if self.policy.compress {
            #[cfg(feature = "compression")]
            if let Err(e) = compress_backup(&backup).await {
                tracing::warn!(
                    error = %e,
                    path = %backup.display(),
                    "failed to compress rotated log file"
                );
            }
            #[cfg(not(feature = "compression"))]
            tracing::warn!(
                path = %backup.display(),
                "compression requested but the compression feature is disabled"
            );
        }

        if let Err(e) = prune_backups(&self.policy).await {
            tracing::warn!(error = %e, "failed to prune rotated log files");
        }

        Ok(())
    }
}

/// Path of the compressed form of a backup
fn gz_path(backup: &Path) -> PathBuf {
    let mut name = backup.to_path_buf().into_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

/// Backup name for the active file at `now`, e.g. `app.log` becomes
/// `app-2024-05-01T12-30-05.123.log`.
fn backup_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("log");
    let timestamp = now.format(BACKUP_TIMESTAMP_FORMAT);
    let name = match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, timestamp, ext),
        None => format!("{}-{}", stem, timestamp),
    };
    path.with_file_name(name)
}

/// Parse the rotation timestamp out of a candidate backup of `base`.
///
/// Returns `None` for the active file itself and for unrelated files in the
/// same directory.
fn backup_timestamp(base: &Path, candidate: &Path) -> Option<NaiveDateTime> {
    let name = candidate.file_name()?.to_str()?;
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("log");
    let rest = name.strip_prefix(stem)?.strip_prefix('-')?;
    let rest = rest.strip_suffix(".gz").unwrap_or(rest);
    let ts = match base.extension().and_then(|s| s.to_str()) {
        Some(ext) => {
            let suffix = format!(".{}", ext);
            rest.strip_suffix(suffix.as_str())?
        }
        None => rest,
    };
    NaiveDateTime::parse_from_str(ts, BACKUP_TIMESTAMP_FORMAT).ok()
}

/// Delete backups beyond the retained count and past the retention age
async fn prune_backups(policy: &RotationPolicy) -> std::io::Result<()> {
    if policy.max_backups == 0 && policy.max_age_days == 0 {
        return Ok(());
    }

    let dir = match policy.path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut backups: Vec<(NaiveDateTime, PathBuf)> = Vec::new();
    let mut entries = fs::read_dir(&dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(ts) = backup_timestamp(&policy.path, &path) {
            backups.push((ts, path));
        }
    }

    // Newest first, so the survivors are the head of the list
    backups.sort_by(|a, b| b.0.cmp(&a.0));

    let mut doomed: Vec<PathBuf> = Vec::new();
    if policy.max_backups > 0 && backups.len() > policy.max_backups {
        doomed.extend(
            backups
                .split_off(policy.max_backups)
                .into_iter()
                .map(|(_, path)| path),
        );
    }
    if policy.max_age_days > 0 {
        let cutoff = Utc::now().naive_utc() - chrono::Duration::days(i64::from(policy.max_age_days));
        for (ts, path) in backups {
            if ts < cutoff {
                doomed.push(path);
            }
        }
    }

    for path in doomed {
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!(error = %e, path = %path.display(), "failed to remove rotated log file");
        }
    }

    Ok(())
}

/// Gzip a rotated backup in place, replacing it with a `.gz` file
#[cfg(feature = "compression")]
async fn compress_backup(path: &Path) -> std::io::Result<()> {
    let src = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dst = gz_path(&src);

        let mut input = std::fs::File::open(&src)?;
        let output = std::fs::File::create(&dst)?;
        let mut encoder = GzEncoder::new(output, Compression::default());
        std::io::copy(&mut input, &mut encoder)?;
        encoder.finish()?;

        std::fs::remove_file(&src)
    })
    .await
    .map_err(std::io::Error::other)?
}

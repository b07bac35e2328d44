//! Cross-process run lock: one `run-<date>.lock` file per target date,
//! created with `create_new` and removed on drop.

use chrono::{NaiveDate, Utc};
use parkalloc_core::error::Result;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A lock older than this is left over from a crashed run.
const STALE_AFTER: Duration = Duration::from_secs(15 * 60);

#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    pub fn path_for(dir: &Path, date: NaiveDate) -> PathBuf {
        dir.join(format!("run-{}.lock", date.format("%Y-%m-%d")))
    }

    /// Take the lock for `date`. `Ok(None)` means another invoker holds it.
    pub fn acquire(dir: &Path, date: NaiveDate) -> Result<Option<Self>> {
        std::fs::create_dir_all(dir)?;
        let path = Self::path_for(dir, date);
        match Self::create(&path) {
            Ok(lock) => Ok(Some(lock)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !is_stale(&path) {
                    return Ok(None);
                }
                tracing::warn!("⚠️ Removing stale run lock {}", path.display());
                std::fs::remove_file(&path).ok();
                match Self::create(&path) {
                    Ok(lock) => Ok(Some(lock)),
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create(path: &Path) -> std::io::Result<Self> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        writeln!(file, "pid={} at={}", std::process::id(), Utc::now().to_rfc3339())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("⚠️ Failed to release {}: {e}", self.path.display());
        }
    }
}

fn is_stale(path: &Path) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| SystemTime::now().duration_since(t).ok())
        .is_some_and(|age| age > STALE_AFTER)
}

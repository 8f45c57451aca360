//! Host-wide lock held for the lifetime of the bridge process.
//!
//! A second bridge on the same host would register its own webhook channel
//! for the same calendar, so startup refuses while the lock is taken.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::PathBuf;

/// A lock guard that releases the lock when dropped
pub struct LockGuard {
    _file: File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

fn lock_path() -> Result<PathBuf> {
    let runtime_dir = dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .context("Could not determine runtime directory")?;

    let dir = runtime_dir.join("calbridge");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    Ok(dir.join("server.lock"))
}

/// Acquire an exclusive lock, failing if another instance is running
pub fn acquire_lock() -> Result<LockGuard> {
    acquire_at(lock_path()?)
}

fn acquire_at(path: PathBuf) -> Result<LockGuard> {
    let file = File::create(&path).context("Failed to create lock file")?;

    file.try_lock_exclusive().map_err(|_| {
        anyhow::anyhow!(
            "Another calbridge-server instance is already running.\n\
            If you believe this is an error, remove: {}",
            path.display()
        )
    })?;

    Ok(LockGuard { _file: file, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_lock_fails_until_first_dropped() {
        let path = std::env::temp_dir().join(format!("calbridge-{}.lock", uuid::Uuid::new_v4()));

        let first = acquire_at(path.clone()).unwrap();
        assert_eq!(first.path(), &path);

        let err = acquire_at(path.clone()).err().unwrap();
        assert!(err.to_string().contains("already running"));

        drop(first);
        assert!(acquire_at(path.clone()).is_ok());

        let _ = fs::remove_file(&path);
    }
}

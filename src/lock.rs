//! Single-instance program lock
//!
//! One failover per flavor id at a time. The lock is an exclusive advisory
//! lock on `repfail<flavor>.lock`, held for as long as the guard's file is
//! open. The kernel drops it when the holder exits, however it exits, so a
//! leftover file never blocks a later run. The file records the holder's pid
//! and when it was taken.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use thiserror::Error;

use crate::observability::{log_event, Event};

/// Lock acquisition errors
#[derive(Debug, Error)]
pub enum LockError {
    /// Another run holds the lock
    #[error("WARNING:  Lock in place for repfail with id: {flavor}")]
    Held { flavor: String, path: PathBuf },

    /// Lock file could not be opened, locked or written
    #[error("Cannot lock {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Held program lock. Released on drop.
#[derive(Debug)]
pub struct ProgramLock {
    path: PathBuf,
    flavor: String,
    file: File,
}

fn is_contended(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl ProgramLock {
    /// Lock file name for a flavor id.
    pub fn file_name(flavor: &str) -> String {
        format!("repfail{}.lock", flavor)
    }

    /// Acquire the lock in the system temp directory.
    pub fn acquire(flavor: &str) -> Result<Self, LockError> {
        Self::acquire_in(&std::env::temp_dir(), flavor)
    }

    /// Acquire the lock in `dir`.
    pub fn acquire_in(dir: &Path, flavor: &str) -> Result<Self, LockError> {
        let path = dir.join(Self::file_name(flavor));

        let mut file = match OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(source) => return Err(LockError::Io { path, source }),
        };

        if let Err(e) = file.try_lock_exclusive() {
            if is_contended(&e) {
                let shown = path.display().to_string();
                log_event(Event::LockHeld, &[("flavor", flavor), ("path", shown.as_str())]);
                return Err(LockError::Held {
                    flavor: flavor.to_string(),
                    path,
                });
            }
            return Err(LockError::Io { path, source: e });
        }

        // Contents are only rewritten once the lock is ours.
        let stamp = format!("{} {}\n", std::process::id(), Utc::now().to_rfc3339());
        let written = file
            .set_len(0)
            .and_then(|_| file.write_all(stamp.as_bytes()))
            .and_then(|_| file.sync_all());
        if let Err(source) = written {
            let _ = file.unlock();
            return Err(LockError::Io { path, source });
        }

        let shown = path.display().to_string();
        log_event(Event::LockAcquired, &[("flavor", flavor), ("path", shown.as_str())]);

        Ok(Self {
            path,
            flavor: flavor.to_string(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flavor(&self) -> &str {
        &self.flavor
    }
}

impl Drop for ProgramLock {
    fn drop(&mut self) {
        // The file is left in place so every run locks the same inode.
        let _ = self.file.unlock();
    }
}

//! Append-only writer for the version log
//!
//! A record is acknowledged only after `write_all` and `sync_all` both
//! succeed. There are no in-place updates.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{error, warn};

use super::errors::{StorageError, StorageResult};
use super::record;
use crate::observability::Event;
use crate::versioning::Version;

/// Name of the log file under `<data_dir>/data/`.
pub const LOG_FILE_NAME: &str = "versions.dat";

pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("data").join(LOG_FILE_NAME)
}

pub struct RecordWriter {
    path: PathBuf,
    file: File,
    current_offset: u64,
    /// Set when a failed append could not be rolled back. The log tail is
    /// unknown from then on, so every later append is refused.
    failed: bool,
    #[cfg(test)]
    fail_after_write: bool,
}

impl RecordWriter {
    /// Opens or creates `<data_dir>/data/versions.dat` for appending.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let path = log_path(data_dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to create data directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open version log: {}", path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::write_failed("Failed to read version log metadata", e))?
            .len();

        Ok(Self {
            path,
            file,
            current_offset,
            failed: false,
            #[cfg(test)]
            fail_after_write: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a version and fsyncs. Returns the byte offset of the record.
    ///
    /// On a write or fsync error the file is cut back to the last
    /// acknowledged offset, so a retry never lands behind a stray frame.
    pub fn append(&mut self, version: &Version) -> StorageResult<u64> {
        if self.failed {
            return Err(StorageError::write_failed_no_source(format!(
                "version log {} is in a failed state; restart to re-verify it",
                self.path.display()
            )));
        }

        let frame = record::encode(version)?;
        let offset = self.current_offset;

        if let Err(e) = self.write_and_sync(&frame) {
            self.rollback();
            return Err(StorageError::write_failed(
                format!(
                    "Failed to append version {} of {}",
                    version.number(),
                    version.document_id()
                ),
                e,
            ));
        }

        self.current_offset += frame.len() as u64;
        Ok(offset)
    }

    fn write_and_sync(&mut self, frame: &[u8]) -> io::Result<()> {
        self.file.write_all(frame)?;
        #[cfg(test)]
        if std::mem::take(&mut self.fail_after_write) {
            return Err(io::Error::other("injected fsync failure"));
        }
        self.file.sync_all()
    }

    /// Truncates the log to the last acknowledged offset.
    fn rollback(&mut self) {
        let result = self
            .file
            .set_len(self.current_offset)
            .and_then(|_| self.file.sync_all());

        match result {
            Ok(()) => warn!(
                event = %Event::AppendRolledBack,
                path = %self.path.display(),
                offset = self.current_offset,
                "partial append truncated"
            ),
            Err(e) => {
                self.failed = true;
                error!(
                    event = %Event::WriterFailed,
                    path = %self.path.display(),
                    offset = self.current_offset,
                    error = %e,
                    "could not truncate partial append; refusing further writes"
                );
            }
        }
    }
}

#[cfg(test)]
impl RecordWriter {
    /// Makes the next append fail after its bytes reach the file.
    pub(crate) fn fail_next_append(&mut self) {
        self.fail_after_write = true;
    }

    fn current_offset(&self) -> u64 {
        self.current_offset
    }
}

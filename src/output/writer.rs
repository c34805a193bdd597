//! Size-capped text output
//!
//! Persisted units are appended to `<site>_<index>.txt` files in the output
//! directory. A unit is never split across files: when appending it would
//! push a non-empty file over the cap, the writer moves on to the next index
//! first.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Separator appended after each unit, leaving one blank line between units
pub const UNIT_SEPARATOR: &str = "\n\n";

/// Errors that can occur while writing output files
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to append to {path}: {source}")]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for write operations
pub type WriteResult<T> = Result<T, WriteError>;

/// Appends units to rolling, size-capped files for one site
#[derive(Debug)]
pub struct ChunkedWriter {
    output_dir: PathBuf,
    site_name: String,
    max_file_size: u64,
    index: u32,
    current_size: u64,
    file: Option<File>,
    written: Vec<PathBuf>,
}

impl ChunkedWriter {
    /// Creates a writer; no file is touched until the first write
    pub fn new(
        output_dir: impl Into<PathBuf>,
        site_name: impl Into<String>,
        max_file_size: u64,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            site_name: site_name.into(),
            max_file_size,
            index: 1,
            current_size: 0,
            file: None,
            written: Vec::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the file the next unit goes to, barring rollover
    pub fn current_path(&self) -> PathBuf {
        self.path_for(self.index)
    }

    /// Every file that received at least one unit, in order
    pub fn files_written(&self) -> &[PathBuf] {
        &self.written
    }

    fn path_for(&self, index: u32) -> PathBuf {
        self.output_dir.join(format!("{}_{}.txt", self.site_name, index))
    }

    /// Appends one unit and returns the path it landed in
    ///
    /// Trailing newlines of `content` are replaced by a single separator. The
    /// separator counts towards the size cap.
    pub fn write(&mut self, content: &str) -> WriteResult<PathBuf> {
        let unit = format!("{}{}", content.trim_end_matches('\n'), UNIT_SEPARATOR);
        let unit_len = unit.len() as u64;

        // A later index may already be full from an earlier run
        self.current_file()?;
        while self.current_size > 0 && self.current_size + unit_len > self.max_file_size {
            tracing::debug!(
                "Rolling over {} at {} bytes",
                self.current_path().display(),
                self.current_size
            );
            self.index += 1;
            self.file = None;
            self.current_file()?;
        }

        let path = self.current_path();
        let file = self.current_file()?;
        file.write_all(unit.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|source| WriteError::Append {
                path: path.clone(),
                source,
            })?;

        self.current_size += unit_len;
        if self.written.last() != Some(&path) {
            self.written.push(path.clone());
        }

        Ok(path)
    }

    /// Returns the open handle, opening the current file in append mode if
    /// needed. Opening seeds the size from what is already on disk.
    fn current_file(&mut self) -> WriteResult<&mut File> {
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                let path = self.current_path();
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|source| WriteError::Open {
                        path: path.clone(),
                        source,
                    })?;

                self.current_size = file.metadata().map(|m| m.len()).unwrap_or(0);
                if self.current_size > 0 {
                    tracing::debug!(
                        "Appending to existing {} ({} bytes)",
                        path.display(),
                        self.current_size
                    );
                }
                file
            }
        };

        Ok(self.file.insert(file))
    }
}

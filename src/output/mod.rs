//! Output module for persisted crawl content
//!
//! This module handles:
//! - Suppressing byte-identical duplicate texts
//! - Appending units to size-capped, indexed text files
//! - Recording and printing run statistics
//! - Checking the output directory before a run

mod dedup;
pub mod stats;
mod writer;

pub use dedup::{ContentFingerprint, DedupLedger};
pub use stats::{print_report, CrawlReport};
pub use writer::{ChunkedWriter, WriteError, WriteResult, UNIT_SEPARATOR};

use crate::HarvestError;
use std::fs;
use std::path::Path;

/// Name of the throwaway file used to probe the output directory
const PROBE_FILE: &str = ".docs-harvester-probe";

/// Creates the output directory if needed and checks that it is writable
///
/// Runs before any fetch so an unusable directory aborts the run early.
pub fn prepare_output_dir(dir: &Path) -> Result<(), HarvestError> {
    let unusable = |reason: String| HarvestError::OutputDir {
        path: dir.display().to_string(),
        reason,
    };

    fs::create_dir_all(dir).map_err(|e| unusable(e.to_string()))?;

    let probe = dir.join(PROBE_FILE);
    fs::write(&probe, b"").map_err(|e| unusable(format!("not writable: {}", e)))?;
    if let Err(e) = fs::remove_file(&probe) {
        tracing::debug!("Could not remove {}: {}", probe.display(), e);
    }

    Ok(())
}

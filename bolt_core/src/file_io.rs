//! # File I/O Module
//!
//! Saves and loads bin configurations with safety features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **Write locking**: Two counters saving to the same shared folder cannot
//!   interleave writes to one file
//!
//! ## File Format
//!
//! Configurations are saved as JSON (see [`crate::record`]). The lock is a
//! sibling `<file>.lock` holding the writer's pid and start time; it only
//! exists while a save is in progress.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bolt_core::catalog::BinSize;
//! use bolt_core::file_io::{load_layout, save_layout};
//! use bolt_core::layout::{BinLayoutModel, RowLimits};
//! use std::path::Path;
//!
//! let model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
//! let path = Path::new("bin_config.json");
//!
//! save_layout(&model, path)?;
//! let restored = load_layout(path, RowLimits::default())?;
//! # Ok::<(), bolt_core::errors::LayoutError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{LayoutError, LayoutResult};
use crate::layout::{BinLayoutModel, RowLimits};
use crate::pdf::render_layout_pdf;
use crate::record::PersistentRecord;

/// File name used when the user just presses "Save"
pub const DEFAULT_CONFIG_FILE: &str = "bin_config.json";

/// Metadata written into the lock file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

/// Exclusive write lock on a target file, released when dropped.
///
/// Combines an OS-level advisory lock (via fs2) with a `.lock` file so other
/// tools can see who is writing.
pub struct WriteLock {
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl WriteLock {
    /// Acquire the lock for `path` without blocking.
    ///
    /// Returns `LayoutError::FileLocked` if another process holds it.
    pub fn acquire(path: &Path) -> LayoutResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo {
            pid: std::process::id(),
            locked_at: Utc::now(),
        };

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LayoutError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| LayoutError::FileLocked {
            path: path.display().to_string(),
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(LayoutError::serialization)?;
        lock_file
            .set_len(0)
            .and_then(|_| lock_file.write_all(lock_json.as_bytes()))
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| LayoutError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(WriteLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        // OS lock is released when _lock_file is dropped
    }
}

/// Lock file path for a target file (`bin_config.json` -> `bin_config.json.lock`)
fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock_path = path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// Temp path next to the target (`bin_config.json` -> `bin_config.json.tmp`)
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp_path = path.to_path_buf();
    let extension = tmp_path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp_path.set_extension(extension);
    tmp_path
}

/// Write `bytes` to `path` atomically while holding the write lock.
///
/// 1. Write to a temporary file next to the target
/// 2. Sync to disk (fsync)
/// 3. Rename over the target (atomic on most filesystems)
pub fn write_atomic(path: &Path, bytes: &[u8]) -> LayoutResult<()> {
    let _lock = WriteLock::acquire(path)?;
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        LayoutError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(bytes).map_err(|e| {
        LayoutError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        LayoutError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        LayoutError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Save a record as four-space indented JSON.
pub fn save_record(record: &PersistentRecord, path: &Path) -> LayoutResult<()> {
    let json = record.to_json()?;
    write_atomic(path, json.as_bytes())?;
    info!(path = %path.display(), rows = record.bin_data.len(), "saved configuration");
    Ok(())
}

/// Load a record from a JSON file.
pub fn load_record(path: &Path) -> LayoutResult<PersistentRecord> {
    let contents = fs::read_to_string(path)
        .map_err(|e| LayoutError::file_error("read", path.display().to_string(), e.to_string()))?;

    PersistentRecord::from_json(&contents).map_err(|e| LayoutError::SerializationError {
        reason: format!("Invalid configuration in {}: {}", path.display(), e),
    })
}

/// Snapshot `model` and save it to `path`.
pub fn save_layout(model: &BinLayoutModel, path: &Path) -> LayoutResult<()> {
    save_record(&model.to_persistent_record(), path)
}

/// Load a saved configuration and rebuild the model, re-checking every row.
pub fn load_layout(path: &Path, limits: RowLimits) -> LayoutResult<BinLayoutModel> {
    let record = load_record(path)?;
    BinLayoutModel::from_persistent_record(&record, limits)
}

/// Render the PDF report for `model` and write it to `path`.
pub fn export_pdf(model: &BinLayoutModel, path: &Path) -> LayoutResult<()> {
    let pdf = render_layout_pdf(model)?;
    write_atomic(path, &pdf)?;
    info!(path = %path.display(), bytes = pdf.len(), "exported PDF");
    Ok(())
}

/// Timestamped file name such as `bolt_bin_2026-10-16_14-03-00.pdf`.
pub fn timestamped_filename<Tz: TimeZone>(prefix: &str, extension: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.{}", prefix, at.format("%Y-%m-%d_%H-%M-%S"), extension)
}

/// Timestamped file name for right now, local time
pub fn timestamped_filename_now(prefix: &str, extension: &str) -> String {
    timestamped_filename(prefix, extension, &Local::now())
}

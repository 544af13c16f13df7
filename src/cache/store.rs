//! Reads, backs up, and rewrites the token file.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::cache::record::TokenRecord;
use crate::error::AppError;

/// Result of reading the token file.
///
/// Decode failures are kept apart from a missing file because the previous
/// content, whatever it was, must survive as a backup before a rewrite.
#[derive(Debug)]
pub enum CacheLoad {
    /// No file at the cache path.
    Missing,
    /// A file exists but does not decode as a token record; its raw bytes
    /// are retained for the backup step.
    Malformed(Vec<u8>),
    /// A decodable record, along with the exact bytes it came from.
    Valid { record: TokenRecord, raw: Vec<u8> },
}

/// Reads the cache file. Never fails: anything unreadable is reported as
/// `Missing` or `Malformed` and the refresh carries on.
pub async fn load(path: &Path) -> CacheLoad {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no cached token file");
            return CacheLoad::Missing;
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cached token file unreadable");
            return CacheLoad::Missing;
        }
    };

    match serde_json::from_slice::<TokenRecord>(&raw) {
        Ok(record) => CacheLoad::Valid { record, raw },
        Err(err) => {
            debug!(path = %path.display(), error = %err, "cached token file does not decode");
            CacheLoad::Malformed(raw)
        }
    }
}

/// Moves the current file aside to `<name>.<YYYYMMDDTHHMMSS>.bak` (local
/// wall clock) before a rewrite.
///
/// When the rename is refused, falls back to copying `previous_raw` byte
/// for byte. Returns the backup path, or `None` when there was nothing to
/// back up. Only when both strategies fail does the refresh abort.
pub async fn backup(path: &Path, previous_raw: Option<&[u8]>) -> Result<Option<PathBuf>, AppError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Ok(None),
    }

    let stamp = Local::now().format("%Y%m%dT%H%M%S");
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "token".to_string());
    let backup_path = path.with_file_name(format!("{file_name}.{stamp}.bak"));

    match tokio::fs::rename(path, &backup_path).await {
        Ok(()) => {
            info!(backup = %backup_path.display(), "previous token file moved aside");
            Ok(Some(backup_path))
        }
        Err(rename_err) => {
            warn!(error = %rename_err, "rename failed, copying previous token file instead");
            let Some(raw) = previous_raw else {
                return Err(AppError::Backup { path: backup_path, source: rename_err });
            };
            match tokio::fs::write(&backup_path, raw).await {
                Ok(()) => Ok(Some(backup_path)),
                Err(write_err) => {
                    Err(AppError::Backup { path: backup_path, source: write_err })
                }
            }
        }
    }
}

/// Serializes the record as pretty-printed JSON and rewrites the cache file
/// in place. Not an atomic swap; callers back up the previous file first.
pub async fn persist(path: &Path, record: &TokenRecord) -> Result<(), AppError> {
    let body = serde_json::to_string_pretty(record).map_err(|err| AppError::Persist {
        path: path.to_path_buf(),
        source: err.into(),
    })?;
    tokio::fs::write(path, body).await.map_err(|err| AppError::Persist {
        path: path.to_path_buf(),
        source: err,
    })?;
    info!(path = %path.display(), "token file written");
    Ok(())
}

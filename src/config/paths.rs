//! Sync-directory resolution
//!
//! Finds where the desktop sync tool keeps device backups on this platform.
//!
//! ## Resolution order
//!
//! 1. `PINSEEKER_SYNC_DIR` environment variable (explicit override)
//! 2. macOS: `~/Library/Application Support/MobileSync/Backup`
//! 3. Windows: `%APPDATA%\Apple Computer\MobileSync\Backup`
//!
//! Other platforms have no sync tool, so the backup directory must be
//! passed explicitly there.

use std::path::PathBuf;

use crate::error::PinseekerError;

/// Resolve the directory the sync tool stores backups in.
///
/// # Errors
///
/// Returns an error when the platform location cannot be determined and no
/// override is set.
pub fn default_sync_dir() -> Result<PathBuf, PinseekerError> {
    if let Ok(custom) = std::env::var("PINSEEKER_SYNC_DIR") {
        return Ok(PathBuf::from(custom));
    }
    resolve_platform_path()
}

#[cfg(target_os = "macos")]
fn resolve_platform_path() -> Result<PathBuf, PinseekerError> {
    let home = std::env::var("HOME")
        .map_err(|_| PinseekerError::Config("HOME environment variable not set".into()))?;
    Ok(PathBuf::from(home)
        .join("Library")
        .join("Application Support")
        .join("MobileSync")
        .join("Backup"))
}

#[cfg(windows)]
fn resolve_platform_path() -> Result<PathBuf, PinseekerError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| PinseekerError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata)
        .join("Apple Computer")
        .join("MobileSync")
        .join("Backup"))
}

#[cfg(not(any(target_os = "macos", windows)))]
fn resolve_platform_path() -> Result<PathBuf, PinseekerError> {
    Err(PinseekerError::Config(
        "Could not detect the backup directory for this operating system; pass it explicitly"
            .into(),
    ))
}

//! Backup catalog
//!
//! Discovers device backup directories under one or more sync roots, parses
//! the two metadata property lists every backup carries, classifies each
//! directory, and orders the usable backups by recency.

pub mod record;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{PinseekerError, PinseekerResult};

pub use record::{BackupRecord, BackupStatus};

/// Device metadata file present in every backup directory.
const INFO_PLIST: &str = "Info.plist";

/// Container manifest file present in every backup directory.
const MANIFEST_PLIST: &str = "Manifest.plist";

/// OS versions that moved the restriction passcode out of the backup; the
/// credential format covered here no longer exists on them.
const UNSUPPORTED_VERSION_PREFIXES: &[&str] = &["12.", "13."];

/// Device info fields used for classification and reporting.
#[derive(Debug, Deserialize)]
struct InfoPlist {
    #[serde(rename = "Last Backup Date")]
    last_backup_date: plist::Date,
    #[serde(rename = "Display Name", default)]
    display_name: String,
    #[serde(rename = "Device Name", default)]
    device_name: String,
    #[serde(rename = "Product Name", default)]
    product_name: String,
    #[serde(rename = "Product Type", default)]
    product_type: String,
    #[serde(rename = "Product Version", default)]
    product_version: String,
}

/// Manifest fields. `IsEncrypted` has been written as an integer or a
/// boolean by different sync tool versions, and older manifests omit it.
#[derive(Debug, Deserialize)]
struct ManifestPlist {
    #[serde(rename = "IsEncrypted")]
    is_encrypted: Option<EncryptedFlag>,
}

/// The on-disk representations of the encryption flag, normalized to a
/// plain bool at the parse boundary.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum EncryptedFlag {
    Bool(bool),
    Int(u64),
}

impl EncryptedFlag {
    fn is_set(self) -> bool {
        match self {
            Self::Bool(flag) => flag,
            Self::Int(value) => value != 0,
        }
    }
}

/// Scan each root for backup directories, most recent backup first.
///
/// Subdirectories that are not valid backups are skipped silently; a root
/// that cannot be enumerated at all is fatal since no useful work is
/// possible without it.
pub fn discover(roots: &[PathBuf]) -> PinseekerResult<Vec<BackupRecord>> {
    let mut records = Vec::new();

    for root in roots {
        let entries = std::fs::read_dir(root).map_err(|e| {
            PinseekerError::Discovery(format!("Cannot read backup root {}: {}", root.display(), e))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                PinseekerError::Discovery(format!(
                    "Cannot read entry under {}: {}",
                    root.display(),
                    e
                ))
            })?;
            if let Some(record) = load_single(&entry.path()) {
                records.push(record);
            }
        }
    }

    // Most recent backup first; equal timestamps keep discovery order.
    records.sort_by(|a, b| b.last_backup_time.cmp(&a.last_backup_time));

    Ok(records)
}

/// Load one directory the caller already knows about.
///
/// Returns None when the directory does not carry both metadata files a
/// backup always has. Metadata that exists but cannot be read yields a
/// record with an IoError status, so the failure is reported against this
/// backup without aborting a wider scan.
pub fn load_single(path: &Path) -> Option<BackupRecord> {
    if !path.is_dir() {
        return None;
    }

    let info: InfoPlist = match read_plist(&path.join(INFO_PLIST)) {
        Ok(info) => info,
        Err(PlistReadError::Missing | PlistReadError::Malformed) => return None,
        Err(PlistReadError::Unreadable(detail)) => return Some(BackupRecord::failed(path, detail)),
    };

    let manifest: ManifestPlist = match read_plist(&path.join(MANIFEST_PLIST)) {
        Ok(manifest) => manifest,
        Err(PlistReadError::Missing | PlistReadError::Malformed) => return None,
        Err(PlistReadError::Unreadable(detail)) => return Some(BackupRecord::failed(path, detail)),
    };

    let display_name = if info.display_name.is_empty() {
        info.device_name
    } else {
        info.display_name
    };

    let mut record = BackupRecord {
        path: path.to_path_buf(),
        display_name,
        product_name: info.product_name,
        product_type: info.product_type,
        product_version: info.product_version,
        last_backup_time: Some(DateTime::<Utc>::from(SystemTime::from(
            info.last_backup_date,
        ))),
        is_encrypted: manifest.is_encrypted.map(EncryptedFlag::is_set).unwrap_or(false),
        status: BackupStatus::Unprocessed,
        credential: None,
    };

    if version_unsupported(&record.product_version) {
        record.status = BackupStatus::UnsupportedOsVersion;
    }

    Some(record)
}

/// Why a metadata plist could not be loaded.
enum PlistReadError {
    /// File absent; the directory is not a backup
    Missing,
    /// File present but not a decodable plist
    Malformed,
    /// File present but unreadable
    Unreadable(String),
}

fn read_plist<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PlistReadError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(PlistReadError::Missing),
        Err(e) => {
            return Err(PlistReadError::Unreadable(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    plist::from_reader(BufReader::new(file)).map_err(|_| PlistReadError::Malformed)
}

fn version_unsupported(version: &str) -> bool {
    UNSUPPORTED_VERSION_PREFIXES
        .iter()
        .any(|prefix| version.starts_with(prefix))
}

//! Backup record model
//!
//! One record per discovered backup directory, carrying the device metadata
//! used for reporting and the terminal status assigned during processing.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::restrictions::RestrictionCredential;

/// Terminal outcome for one backup, assigned exactly once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupStatus {
    /// Discovered but not yet examined
    Unprocessed,
    /// The backup holds no restriction credential (restrictions are off)
    NoPasscodeStored,
    /// The device OS version no longer stores the passcode in the backup
    UnsupportedOsVersion,
    /// Backup is encrypted and no password was supplied
    Encrypted,
    /// The supplied backup password was wrong
    IncorrectPassword,
    /// Backup is encrypted and no decryption support is available
    NeedPassword,
    /// The recovered passcode
    Found(String),
    /// Every candidate was tried without reproducing the stored key
    SearchFailed,
    /// A read or parse failure scoped to this backup
    IoError(String),
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unprocessed => write!(f, "not processed"),
            Self::NoPasscodeStored => write!(f, "no passcode stored"),
            Self::UnsupportedOsVersion => write!(f, "OS version not supported"),
            Self::Encrypted => write!(f, "encrypted; supply the backup password"),
            Self::IncorrectPassword => write!(f, "incorrect backup password"),
            Self::NeedPassword => write!(f, "encrypted; decryption support unavailable"),
            Self::Found(passcode) => write!(f, "passcode {}", passcode),
            Self::SearchFailed => write!(f, "searched every candidate without a match"),
            Self::IoError(detail) => write!(f, "error: {}", detail),
        }
    }
}

/// One discovered backup directory.
#[derive(Debug, Clone)]
pub struct BackupRecord {
    /// Filesystem location of the backup
    pub path: PathBuf,
    /// Device name for reporting
    pub display_name: String,
    /// Marketing name of the device
    pub product_name: String,
    /// Hardware model identifier
    pub product_type: String,
    /// Device OS version at backup time
    pub product_version: String,
    /// When the backup was last written; None for records that failed to load
    pub last_backup_time: Option<DateTime<Utc>>,
    /// Whether the backup container is password-encrypted
    pub is_encrypted: bool,
    /// Terminal outcome, set once during processing
    pub status: BackupStatus,
    /// Extracted verification material, kept for failure diagnostics
    pub credential: Option<RestrictionCredential>,
}

impl BackupRecord {
    /// True while the record still needs locate/search processing.
    pub fn is_pending(&self) -> bool {
        matches!(self.status, BackupStatus::Unprocessed)
    }

    /// Record for a directory whose metadata exists but could not be read.
    pub(crate) fn failed(path: &Path, detail: String) -> Self {
        Self {
            path: path.to_path_buf(),
            display_name: String::new(),
            product_name: String::new(),
            product_type: String::new(),
            product_version: String::new(),
            last_backup_time: None,
            is_encrypted: false,
            status: BackupStatus::IoError(detail),
            credential: None,
        }
    }
}

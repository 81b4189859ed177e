//! Restriction credential location and decoding
//!
//! The restriction passcode itself is never written to a backup. A small
//! preference file holds a PBKDF2 verification key and salt instead, stored
//! under a fixed content identifier. Depending on the device OS version the
//! file sits either directly inside the backup directory or inside a
//! two-character-prefix shard subdirectory; both layouts are checked here.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::{BackupRecord, BackupStatus};
use crate::error::{PinseekerError, PinseekerResult};
use crate::unlock::{BackupUnlocker, PasswordProvider, UnlockError};

/// Content identifier of the restrictions preference file, constant across
/// devices and OS versions.
pub const RESTRICTIONS_PLIST_NAME: &str = "398bc9c2aeeab4cb0c12ada0f52eea12cf14f40b";

/// Verification material extracted from one backup.
///
/// Both fields are non-empty whenever a credential exists; the key length
/// matches the derived-key length configured when the backup was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictionCredential {
    pub key: Vec<u8>,
    pub salt: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct RestrictionsPlist {
    #[serde(rename = "RestrictionsPasswordKey")]
    key: plist::Data,
    #[serde(rename = "RestrictionsPasswordSalt")]
    salt: plist::Data,
}

/// Finds and decodes the restriction credential for classified backups.
///
/// Holds the unlock capability and the shared password state so one
/// locator serves every record in a run with at most one password prompt.
pub struct RestrictionLocator {
    unlocker: Box<dyn BackupUnlocker>,
    passwords: Box<dyn PasswordProvider>,
}

impl RestrictionLocator {
    pub fn new(unlocker: Box<dyn BackupUnlocker>, passwords: Box<dyn PasswordProvider>) -> Self {
        Self { unlocker, passwords }
    }

    /// Locate the credential for one record.
    ///
    /// Returns the decoded credential when the backup holds one; otherwise
    /// assigns the terminal status to the record and returns None.
    pub fn locate(&mut self, record: &mut BackupRecord) -> Option<RestrictionCredential> {
        let Some(path) = find_restrictions_file(&record.path) else {
            record.status = BackupStatus::NoPasscodeStored;
            return None;
        };

        if record.is_encrypted {
            return self.locate_encrypted(record);
        }

        match fs::read(&path) {
            Ok(bytes) => decode_into(record, &bytes),
            Err(e) => {
                record.status =
                    BackupStatus::IoError(format!("Failed to read {}: {}", path.display(), e));
                None
            }
        }
    }

    fn locate_encrypted(&mut self, record: &mut BackupRecord) -> Option<RestrictionCredential> {
        let Some(password) = self.passwords.password() else {
            record.status = BackupStatus::Encrypted;
            return None;
        };

        let unlocked = match self.unlocker.unlock(&record.path, &password) {
            Ok(unlocked) => unlocked,
            Err(UnlockError::IncorrectPassword) => {
                record.status = BackupStatus::IncorrectPassword;
                return None;
            }
            Err(UnlockError::NotAttempted) => {
                record.status = BackupStatus::NeedPassword;
                return None;
            }
            Err(UnlockError::Io(detail)) => {
                record.status = BackupStatus::IoError(detail);
                return None;
            }
        };

        match unlocked.read_file(RESTRICTIONS_PLIST_NAME) {
            Ok(Some(bytes)) => decode_into(record, &bytes),
            Ok(None) => {
                record.status = BackupStatus::NoPasscodeStored;
                None
            }
            Err(e) => {
                record.status = BackupStatus::IoError(e.to_string());
                None
            }
        }
    }
}

/// Flat layout first, then the two-character shard layout used by later OS
/// versions.
fn find_restrictions_file(backup_dir: &Path) -> Option<PathBuf> {
    let flat = backup_dir.join(RESTRICTIONS_PLIST_NAME);
    if flat.is_file() {
        return Some(flat);
    }

    let sharded = backup_dir
        .join(&RESTRICTIONS_PLIST_NAME[..2])
        .join(RESTRICTIONS_PLIST_NAME);
    sharded.is_file().then_some(sharded)
}

fn decode_into(record: &mut BackupRecord, bytes: &[u8]) -> Option<RestrictionCredential> {
    match parse_credential(bytes) {
        Ok(credential) => {
            record.credential = Some(credential.clone());
            Some(credential)
        }
        Err(e) => {
            record.status = BackupStatus::IoError(format!(
                "Malformed restrictions file in {}: {}",
                record.path.display(),
                e
            ));
            None
        }
    }
}

/// Decode the key and salt data blobs from a restrictions plist.
pub fn parse_credential(bytes: &[u8]) -> PinseekerResult<RestrictionCredential> {
    let parsed: RestrictionsPlist = plist::from_reader(Cursor::new(bytes))
        .map_err(|e| PinseekerError::Plist(format!("restrictions plist: {}", e)))?;

    let credential = RestrictionCredential {
        key: parsed.key.into(),
        salt: parsed.salt.into(),
    };

    if credential.key.is_empty() || credential.salt.is_empty() {
        return Err(PinseekerError::Plist(
            "restrictions plist has an empty key or salt".into(),
        ));
    }

    Ok(credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unlock::{FixedPassword, UnlockedBackup, UnsupportedUnlocker};
    use std::fs;
    use tempfile::TempDir;

    const PIN_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>RestrictionsPasswordKey</key>
	<data>
	ioN63+yl6OFZ4/C7xl9VejMLDi0=
	</data>
	<key>RestrictionsPasswordSalt</key>
	<data>
	iNciDA==
	</data>
</dict>
</plist>
"#;

    const DATA_KEY: [u8; 20] = [
        0x8a, 0x83, 0x7a, 0xdf, 0xec, 0xa5, 0xe8, 0xe1, 0x59, 0xe3, 0xf0, 0xbb, 0xc6, 0x5f, 0x55,
        0x7a, 0x33, 0x0b, 0x0e, 0x2d,
    ];
    const DATA_SALT: [u8; 4] = [0x88, 0xd7, 0x22, 0x0c];

    fn test_record(path: &Path, encrypted: bool) -> BackupRecord {
        BackupRecord {
            path: path.to_path_buf(),
            display_name: "device".into(),
            product_name: "iPhone 6".into(),
            product_type: "iPhone7,2".into(),
            product_version: "9.3.1".into(),
            last_backup_time: None,
            is_encrypted: encrypted,
            status: BackupStatus::Unprocessed,
            credential: None,
        }
    }

    fn locator_without_unlock() -> RestrictionLocator {
        RestrictionLocator::new(
            Box::new(UnsupportedUnlocker),
            Box::new(FixedPassword::new(None)),
        )
    }

    /// Unlocker standing in for real container decryption: verifies the
    /// password and serves files straight from the backup directory.
    struct DirUnlocker {
        expected_password: &'static str,
    }

    struct DirHandle {
        dir: PathBuf,
    }

    impl UnlockedBackup for DirHandle {
        fn read_file(&self, content_id: &str) -> Result<Option<Vec<u8>>, UnlockError> {
            match fs::read(self.dir.join(content_id)) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(UnlockError::Io(e.to_string())),
            }
        }
    }

    impl BackupUnlocker for DirUnlocker {
        fn unlock(
            &self,
            backup_dir: &Path,
            password: &str,
        ) -> Result<Box<dyn UnlockedBackup>, UnlockError> {
            if password != self.expected_password {
                return Err(UnlockError::IncorrectPassword);
            }
            Ok(Box::new(DirHandle {
                dir: backup_dir.to_path_buf(),
            }))
        }
    }

    #[test]
    fn test_parse_credential() {
        let credential = parse_credential(PIN_PLIST.as_bytes()).unwrap();
        assert_eq!(credential.key, DATA_KEY);
        assert_eq!(credential.salt, DATA_SALT);
    }

    #[test]
    fn test_parse_credential_rejects_garbage() {
        assert!(parse_credential(b"not a plist").is_err());
    }

    #[test]
    fn test_locate_flat_layout() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(RESTRICTIONS_PLIST_NAME), PIN_PLIST).unwrap();

        let mut record = test_record(tmp.path(), false);
        let credential = locator_without_unlock().locate(&mut record).unwrap();
        assert_eq!(credential.key, DATA_KEY);
        assert_eq!(credential.salt, DATA_SALT);
        assert_eq!(record.credential.as_ref(), Some(&credential));
    }

    #[test]
    fn test_locate_sharded_layout() {
        let tmp = TempDir::new().unwrap();
        let shard = tmp.path().join(&RESTRICTIONS_PLIST_NAME[..2]);
        fs::create_dir(&shard).unwrap();
        fs::write(shard.join(RESTRICTIONS_PLIST_NAME), PIN_PLIST).unwrap();

        let mut record = test_record(tmp.path(), false);
        let credential = locator_without_unlock().locate(&mut record).unwrap();
        assert_eq!(credential.key, DATA_KEY);
        assert_eq!(credential.salt, DATA_SALT);
    }

    #[test]
    fn test_locate_missing_means_no_passcode() {
        let tmp = TempDir::new().unwrap();

        let mut record = test_record(tmp.path(), false);
        assert!(locator_without_unlock().locate(&mut record).is_none());
        assert_eq!(record.status, BackupStatus::NoPasscodeStored);
    }

    #[test]
    fn test_locate_malformed_is_io_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(RESTRICTIONS_PLIST_NAME), "not a plist").unwrap();

        let mut record = test_record(tmp.path(), false);
        assert!(locator_without_unlock().locate(&mut record).is_none());
        assert!(matches!(record.status, BackupStatus::IoError(_)));
    }

    #[test]
    fn test_locate_encrypted_without_password() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(RESTRICTIONS_PLIST_NAME), PIN_PLIST).unwrap();

        let mut record = test_record(tmp.path(), true);
        assert!(locator_without_unlock().locate(&mut record).is_none());
        assert_eq!(record.status, BackupStatus::Encrypted);
    }

    #[test]
    fn test_locate_encrypted_without_unlock_support() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(RESTRICTIONS_PLIST_NAME), PIN_PLIST).unwrap();

        let mut locator = RestrictionLocator::new(
            Box::new(UnsupportedUnlocker),
            Box::new(FixedPassword::new(Some("secret".into()))),
        );
        let mut record = test_record(tmp.path(), true);
        assert!(locator.locate(&mut record).is_none());
        assert_eq!(record.status, BackupStatus::NeedPassword);
    }

    #[test]
    fn test_locate_encrypted_wrong_password() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(RESTRICTIONS_PLIST_NAME), PIN_PLIST).unwrap();

        let mut locator = RestrictionLocator::new(
            Box::new(DirUnlocker {
                expected_password: "secret",
            }),
            Box::new(FixedPassword::new(Some("wrong".into()))),
        );
        let mut record = test_record(tmp.path(), true);
        assert!(locator.locate(&mut record).is_none());
        assert_eq!(record.status, BackupStatus::IncorrectPassword);
    }

    #[test]
    fn test_locate_encrypted_success() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(RESTRICTIONS_PLIST_NAME), PIN_PLIST).unwrap();

        let mut locator = RestrictionLocator::new(
            Box::new(DirUnlocker {
                expected_password: "secret",
            }),
            Box::new(FixedPassword::new(Some("secret".into()))),
        );
        let mut record = test_record(tmp.path(), true);
        let credential = locator.locate(&mut record).unwrap();
        assert_eq!(credential.key, DATA_KEY);
        assert_eq!(credential.salt, DATA_SALT);
    }
}

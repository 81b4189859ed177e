//! Encrypted-backup unlock seam
//!
//! Password-encrypted backups wrap their file keys in a keybag; unwrapping
//! it is a separate protocol that lives outside this crate. The traits here
//! define the capability the locator calls into, plus the password sourcing
//! used to drive it. The shipped unlocker reports that decryption was not
//! attempted.

use std::path::Path;

use thiserror::Error;

/// Errors surfaced by a backup unlocker.
#[derive(Error, Debug)]
pub enum UnlockError {
    /// The supplied password did not unwrap the container keys
    #[error("incorrect backup password")]
    IncorrectPassword,

    /// No decryption capability is available in this build
    #[error("backup decryption was not attempted")]
    NotAttempted,

    /// Underlying read failure while unlocking
    #[error("unlock I/O error: {0}")]
    Io(String),
}

/// Read access to the contents of an unlocked backup.
pub trait UnlockedBackup {
    /// Read a file by its content identifier; Ok(None) when the backup does
    /// not contain it.
    fn read_file(&self, content_id: &str) -> Result<Option<Vec<u8>>, UnlockError>;
}

/// Capability to unlock a password-encrypted backup.
pub trait BackupUnlocker {
    fn unlock(
        &self,
        backup_dir: &Path,
        password: &str,
    ) -> Result<Box<dyn UnlockedBackup>, UnlockError>;
}

/// Unlocker used when no decryption support is compiled in.
pub struct UnsupportedUnlocker;

impl BackupUnlocker for UnsupportedUnlocker {
    fn unlock(
        &self,
        _backup_dir: &Path,
        _password: &str,
    ) -> Result<Box<dyn UnlockedBackup>, UnlockError> {
        Err(UnlockError::NotAttempted)
    }
}

/// Source of the backup password.
///
/// A single provider instance is shared across all encrypted backups in a
/// run, so the operator answers at most once.
pub trait PasswordProvider {
    /// The password to try, or None when the operator has none to give.
    fn password(&mut self) -> Option<String>;
}

/// Interactive provider backed by a hidden terminal prompt.
///
/// The first call prompts; the answer (including a blank one) is cached so
/// later encrypted backups never re-prompt.
pub struct PromptPassword {
    cached: Option<Option<String>>,
}

impl PromptPassword {
    pub fn new() -> Self {
        Self { cached: None }
    }
}

impl Default for PromptPassword {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordProvider for PromptPassword {
    fn password(&mut self) -> Option<String> {
        if let Some(answer) = &self.cached {
            return answer.clone();
        }

        let entered = rpassword::prompt_password("Backup password (leave blank to skip): ")
            .ok()
            .filter(|password| !password.is_empty());
        self.cached = Some(entered.clone());
        entered
    }
}

/// Non-interactive provider fed from a CLI flag or a test fixture.
pub struct FixedPassword {
    password: Option<String>,
}

impl FixedPassword {
    pub fn new(password: Option<String>) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
        }
    }
}

impl PasswordProvider for FixedPassword {
    fn password(&mut self) -> Option<String> {
        self.password.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_unlocker_never_attempts() {
        let result = UnsupportedUnlocker.unlock(Path::new("/tmp/backup"), "secret");
        assert!(matches!(result, Err(UnlockError::NotAttempted)));
    }

    #[test]
    fn test_fixed_password_returns_value() {
        let mut provider = FixedPassword::new(Some("hunter2".into()));
        assert_eq!(provider.password().as_deref(), Some("hunter2"));
        // Stable across repeated asks
        assert_eq!(provider.password().as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_fixed_password_blank_means_none() {
        let mut provider = FixedPassword::new(Some(String::new()));
        assert!(provider.password().is_none());

        let mut provider = FixedPassword::new(None);
        assert!(provider.password().is_none());
    }
}

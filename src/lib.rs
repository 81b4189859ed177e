//! pinseeker - restriction passcode recovery from device backups
//!
//! A device's parental-restriction passcode is never written to its backups
//! in plaintext; the backup stores a PBKDF2 verification key and salt
//! instead. This library catalogs the backups kept by the desktop sync tool,
//! extracts that verification material, and searches the 4-digit keyspace
//! until a candidate reproduces the stored key.
//!
//! It never touches the device lock-screen passcode, which is a different
//! credential with different protection.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Sync-directory resolution
//! - `error`: Custom error types
//! - `catalog`: Backup discovery, metadata parsing, and classification
//! - `restrictions`: Locating and decoding the restriction credential
//! - `search`: Parallel keyspace search
//! - `unlock`: Encrypted-backup unlock seam and password sourcing
//! - `display`: Terminal report formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use pinseeker::{catalog, search};
//!
//! let records = catalog::discover(&[sync_dir])?;
//! ```

pub mod catalog;
pub mod config;
pub mod display;
pub mod error;
pub mod restrictions;
pub mod search;
pub mod unlock;

pub use error::PinseekerError;

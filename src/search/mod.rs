//! Passcode keyspace search
//!
//! Recomputes the PBKDF2 verification key for candidate passcodes and
//! compares each against the stored key. The 10,000-candidate space is
//! split into contiguous ranges, one per available execution unit, and a
//! match reported by any worker ends the search immediately.

use std::ops::Range;
use std::sync::mpsc;
use std::thread;

use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;

use crate::error::{PinseekerError, PinseekerResult};
use crate::restrictions::RestrictionCredential;

/// Number of candidate passcodes, "0000" through "9999".
const PASSCODE_SPACE: u32 = 10_000;

/// PBKDF2 iteration count used by the restriction passcode mechanism.
const KDF_ITERATIONS: u32 = 1_000;

/// Result of searching the whole keyspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The candidate whose derived key matched, zero-padded to 4 digits
    Found(String),
    /// Every candidate was tried without a match
    Exhausted,
}

enum WorkerReport {
    Match(String),
    RangeExhausted,
}

/// Search the 4-digit keyspace for the passcode matching `credential`.
///
/// Returns as soon as any worker reports a match; the remaining workers
/// finish their bounded ranges in the background and their late reports are
/// discarded. A well-formed credential matches at most one candidate, so
/// racing workers cannot disagree.
pub fn search(credential: &RestrictionCredential) -> PinseekerResult<SearchOutcome> {
    if credential.key.is_empty() || credential.salt.is_empty() {
        return Err(PinseekerError::Config(
            "Cannot search with an empty verification key or salt".into(),
        ));
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let ranges = partition(PASSCODE_SPACE, workers);
    let worker_count = ranges.len();

    let (tx, rx) = mpsc::channel();
    for range in ranges {
        let tx = tx.clone();
        let key = credential.key.clone();
        let salt = credential.salt.clone();
        thread::spawn(move || {
            // The receiver is gone once another worker has already reported
            // a match; a failed send is discarded.
            let _ = tx.send(search_range(range, &key, &salt));
        });
    }
    drop(tx);

    let mut exhausted = 0;
    while let Ok(report) = rx.recv() {
        match report {
            WorkerReport::Match(passcode) => return Ok(SearchOutcome::Found(passcode)),
            WorkerReport::RangeExhausted => {
                exhausted += 1;
                if exhausted == worker_count {
                    break;
                }
            }
        }
    }

    Ok(SearchOutcome::Exhausted)
}

/// Try every candidate in `range` in ascending order, stopping early on a
/// match.
fn search_range(range: Range<u32>, key: &[u8], salt: &[u8]) -> WorkerReport {
    let mut derived = vec![0u8; key.len()];
    for candidate in range {
        let guess = format!("{:04}", candidate);
        pbkdf2_hmac::<Sha1>(guess.as_bytes(), salt, KDF_ITERATIONS, &mut derived);
        if derived.as_slice() == key {
            return WorkerReport::Match(guess);
        }
    }
    WorkerReport::RangeExhausted
}

/// Split `[0, total)` into at most `workers` contiguous non-overlapping
/// ranges. The final range absorbs the remainder when the division is
/// uneven.
fn partition(total: u32, workers: usize) -> Vec<Range<u32>> {
    let workers = workers.clamp(1, total as usize) as u32;
    let per_worker = total / workers;

    (0..workers)
        .map(|i| {
            let start = i * per_worker;
            let end = if i == workers - 1 {
                total
            } else {
                start + per_worker
            };
            start..end
        })
        .collect()
}

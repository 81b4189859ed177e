//! Backup report formatting
//!
//! One aligned row per processed backup, plus a detail block for any record
//! whose search covered the whole keyspace without a match. The detail
//! block carries the salt and key so the credential can be investigated
//! out of band; nothing else in the backup is exposed.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::catalog::{BackupRecord, BackupStatus};

/// Format one row per record: device, version, backup time, outcome.
pub fn format_backup_list(records: &[BackupRecord]) -> String {
    if records.is_empty() {
        return "No backups found.".to_string();
    }

    // Calculate column widths
    let name_width = records
        .iter()
        .map(|r| display_name(r).len())
        .max()
        .unwrap_or(6)
        .max(6);

    let version_width = records
        .iter()
        .map(|r| r.product_version.len())
        .max()
        .unwrap_or(7)
        .max(7);

    // Build header
    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<version_width$}  {:<19}  {}\n",
        "Device",
        "Version",
        "Backup Time",
        "Result",
        name_width = name_width,
        version_width = version_width,
    ));

    // Separator line
    output.push_str(&format!(
        "{:-<name_width$}  {:-<version_width$}  {:-<19}  {:-<30}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
        version_width = version_width,
    ));

    // Backup rows
    for record in records {
        output.push_str(&format!(
            "{:<name_width$}  {:<version_width$}  {:<19}  {}\n",
            display_name(record),
            record.product_version,
            backup_time(record),
            outcome(record),
            name_width = name_width,
            version_width = version_width,
        ));
    }

    output
}

/// Detail block for a record whose search exhausted the keyspace.
pub fn format_failure_detail(record: &BackupRecord) -> String {
    let mut output = String::new();
    output.push_str(&format!("Search failed for {}\n", display_name(record)));
    output.push_str(&format!("  Product Name:    {}\n", record.product_name));
    output.push_str(&format!("  Product Type:    {}\n", record.product_type));
    output.push_str(&format!("  Product Version: {}\n", record.product_version));

    if let Some(credential) = &record.credential {
        output.push_str(&format!("  Salt:            {}\n", STANDARD.encode(&credential.salt)));
        output.push_str(&format!("  Key:             {}\n", STANDARD.encode(&credential.key)));
    }

    output
}

fn display_name(record: &BackupRecord) -> &str {
    if record.display_name.is_empty() {
        record
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("(unknown)")
    } else {
        &record.display_name
    }
}

fn backup_time(record: &BackupRecord) -> String {
    match record.last_backup_time {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "unknown".to_string(),
    }
}

fn outcome(record: &BackupRecord) -> String {
    match &record.status {
        BackupStatus::Found(passcode) => format!("Passcode: {}", passcode),
        other => other.to_string(),
    }
}

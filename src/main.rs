use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use pinseeker::catalog::{self, BackupRecord, BackupStatus};
use pinseeker::config::paths;
use pinseeker::display::{format_backup_list, format_failure_detail};
use pinseeker::restrictions::RestrictionLocator;
use pinseeker::search::{self, SearchOutcome};
use pinseeker::unlock::{FixedPassword, PasswordProvider, PromptPassword, UnsupportedUnlocker};

#[derive(Parser)]
#[command(
    name = "pinseeker",
    version,
    about = "Recovers the parental restrictions passcode from a device backup",
    long_about = "Pinseeker scans the backups created by the desktop sync tool, \
                  extracts the restriction passcode verification key from each \
                  one, and searches the 4-digit keyspace until a candidate \
                  reproduces it. It never recovers the device lock-screen \
                  passcode, which is a different credential."
)]
struct Cli {
    /// Path to a single backup directory (default: scan the sync directory)
    backup: Option<PathBuf>,

    /// Directory containing backups, when not using the platform default
    #[arg(short = 'd', long)]
    sync_dir: Option<PathBuf>,

    /// Password for encrypted backups (prompts interactively when omitted)
    #[arg(short, long)]
    password: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut records = load_records(&cli)?;
    if records.is_empty() {
        println!("No backups found.");
        return Ok(());
    }

    let passwords: Box<dyn PasswordProvider> = match cli.password {
        Some(password) => Box::new(FixedPassword::new(Some(password))),
        None => Box::new(PromptPassword::new()),
    };
    let mut locator = RestrictionLocator::new(Box::new(UnsupportedUnlocker), passwords);

    for record in &mut records {
        if !record.is_pending() {
            continue;
        }

        let Some(credential) = locator.locate(record) else {
            continue;
        };

        let started = Instant::now();
        record.status = match search::search(&credential)? {
            SearchOutcome::Found(passcode) => {
                println!(
                    "Recovered passcode {} from {} in {:.2?}",
                    passcode,
                    record.path.display(),
                    started.elapsed()
                );
                BackupStatus::Found(passcode)
            }
            SearchOutcome::Exhausted => BackupStatus::SearchFailed,
        };
    }

    println!();
    print!("{}", format_backup_list(&records));

    for record in records.iter().filter(|r| r.status == BackupStatus::SearchFailed) {
        println!();
        print!("{}", format_failure_detail(record));
    }

    Ok(())
}

fn load_records(cli: &Cli) -> Result<Vec<BackupRecord>> {
    if let Some(backup) = &cli.backup {
        return match catalog::load_single(backup) {
            Some(record) => Ok(vec![record]),
            None => anyhow::bail!("{} does not look like a device backup", backup.display()),
        };
    }

    let root = match &cli.sync_dir {
        Some(dir) => dir.clone(),
        None => paths::default_sync_dir()?,
    };
    println!("Searching backups under {}", root.display());
    Ok(catalog::discover(&[root])?)
}

//! FieldVault field-encryption migration tool.
//!
//! Scans every collection with sensitive text fields and replaces plaintext
//! values with encrypted payloads, in place. Safe to re-run: values already
//! in payload form are never touched.
//!
//! Usage:
//!   FIELDVAULT_MASTER_SECRET=... FIELDVAULT_SALTS=current,older \
//!     fieldvault-migrate --data dataset.json [--dry-run]
//!
//! A live run asks for typed confirmation before writing anything. Errors
//! are reported on the console; the process exit code stays zero so one
//! failed collection does not mask the report for the rest.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fieldvault_crypto::FieldCipher;
use fieldvault_migrate::{migrate_all, CollectionReport, MigrationOptions};
use fieldvault_store::JsonFileStore;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "fieldvault-migrate")]
#[command(about = "Encrypt sensitive plaintext fields left by earlier releases")]
struct Args {
    /// Path to the dataset file
    #[arg(short, long, default_value = "fieldvault-data.json")]
    data: PathBuf,

    /// Records fetched and processed per batch
    #[arg(long, default_value = "100")]
    batch_size: u64,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let master_secret = std::env::var("FIELDVAULT_MASTER_SECRET").ok();
    let salts = std::env::var("FIELDVAULT_SALTS").unwrap_or_default();
    let cipher = FieldCipher::initialize(master_secret.as_deref(), &salts);
    if !cipher.is_active() {
        println!("Encryption is not configured (missing FIELDVAULT_MASTER_SECRET or FIELDVAULT_SALTS).");
        println!("Nothing to migrate without key material.");
        return Ok(());
    }

    let store = JsonFileStore::open(&args.data)
        .with_context(|| format!("failed to open dataset {}", args.data.display()))?;

    let options = MigrationOptions {
        batch_size: args.batch_size.max(1),
        dry_run: args.dry_run,
    };

    println!("\n========================================");
    println!("  FieldVault Field Encryption Migration");
    println!("========================================");
    println!("  Dataset:    {}", args.data.display());
    println!("  Batch size: {}", options.batch_size);
    println!(
        "  Mode:       {}",
        if options.dry_run {
            "DRY RUN (no writes)"
        } else {
            "LIVE (records will be rewritten)"
        }
    );
    println!("========================================\n");

    if !options.dry_run && !confirm_live_run()? {
        println!("Aborted; no records were written.");
        return Ok(());
    }

    let reports = migrate_all(&store, &cipher, &options);
    print_reports(&reports);
    Ok(())
}

/// A live run rewrites records in place, so it requires explicit typed
/// confirmation. Anything other than "yes" aborts.
fn confirm_live_run() -> Result<bool> {
    print!("Type \"yes\" to encrypt records in place (or run again with --dry-run): ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read confirmation")?;
    Ok(line.trim() == "yes")
}

fn print_reports(reports: &[CollectionReport]) {
    let mut total = 0u64;
    let mut processed = 0u64;
    let mut encrypted = 0u64;
    let mut failures = 0usize;

    println!("\nResults per collection:");
    for report in reports {
        match &report.outcome {
            Ok(stats) => {
                println!(
                    "  {:<12} total {:>7}  processed {:>7}  encrypted {:>7}",
                    report.collection, stats.total_records, stats.processed_records,
                    stats.encrypted_records
                );
                total += stats.total_records;
                processed += stats.processed_records;
                encrypted += stats.encrypted_records;
            }
            Err(e) => {
                failures += 1;
                println!("  {:<12} FAILED: {e}", report.collection);
            }
        }
    }
    println!(
        "\nTotals: {total} records, {processed} processed, {encrypted} encrypted, {failures} collection(s) failed"
    );
}

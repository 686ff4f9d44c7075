#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI mirroring an IMAP account into a local Maildir

use clap::Parser;
use imap_maildir_fetch::{
    DEFAULT_HOST, FolderReport, ImapClient, ImapConfig, SyncReport, env_password,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imap-fetch", version)]
#[command(about = "Fetches the content of an IMAP4 server into a Maildir")]
struct Args {
    /// Account user name
    user: String,

    /// Root of the local Maildir store
    maildir: PathBuf,

    /// IMAP server
    #[arg(default_value = DEFAULT_HOST)]
    host: String,

    /// Server port (default: 993, or 143 with --starttls)
    #[arg(long)]
    port: Option<u16>,

    /// Connect in plain text and upgrade with STARTTLS
    #[arg(long)]
    starttls: bool,

    /// Accept any server certificate
    #[arg(long)]
    insecure: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

/// Password from `IMAP_PASSWORD` (environment or `.env`), else asked
/// for on the terminal.
fn password(user: &str) -> anyhow::Result<String> {
    if let Some(password) = env_password() {
        return Ok(password);
    }
    Ok(rpassword::prompt_password(format!("Password for '{user}': "))?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if !args.json {
        println!(
            "imap-fetch {} - {}\n",
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_DESCRIPTION")
        );
    }

    let mut config = ImapConfig::new(&args.host, &args.user, password(&args.user)?);
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.starttls {
        config = config.with_starttls();
    }
    config.accept_invalid_certs = args.insecure;

    let client = ImapClient::new(config);
    let report = client.sync(&args.maildir).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &SyncReport) {
    let header = format!(
        "{:<30} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Folder", "Synced", "Linked", "Fetched", "Trashed", "Errors"
    );
    println!("{header}");
    println!("{}", "-".repeat(header.len()));

    for folder in &report.folders {
        print_folder(folder);
    }

    let elapsed = report.finished_at - report.started_at;
    println!(
        "\n{} fetched, {} linked, {} trashed, {} error(s), {} folder(s) skipped in {}s",
        report.fetched(),
        report.linked(),
        report.quarantined(),
        report.failures(),
        report.skipped().count(),
        elapsed.num_seconds()
    );
}

fn print_folder(folder: &FolderReport) {
    let name = truncate(&folder.folder, 30);
    if let Some(reason) = &folder.skipped {
        println!("{name:<30} skipped: {reason}");
        return;
    }
    println!(
        "{:<30} {:>8} {:>8} {:>8} {:>8} {:>8}",
        name,
        folder.already_synced,
        folder.linked,
        folder.fetched,
        folder.quarantined,
        folder.failures.len()
    );
    for failure in &folder.failures {
        let uid = failure.uid.map_or_else(|| "-".to_string(), |uid| uid.to_string());
        let identity = failure.identity.as_deref().unwrap_or("-");
        println!("    UID {uid} {identity}: {}", failure.error);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

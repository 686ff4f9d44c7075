//! IMAP account client

use crate::config::ImapConfig;
use crate::error::Result;
use crate::maildir::Maildir;
use crate::report::SyncReport;
use crate::session::{ImapMailSession, MailSession};
use crate::sync::MaildirSync;
use std::path::PathBuf;
use tracing::{info, warn};

/// Mirrors one IMAP account into a local Maildir
pub struct ImapClient {
    config: ImapConfig,
}

impl ImapClient {
    #[must_use]
    pub const fn new(config: ImapConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ImapConfig {
        &self.config
    }

    /// List all available IMAP folders
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or LIST command fails.
    pub async fn list_folders(&self) -> Result<Vec<String>> {
        let mut session = ImapMailSession::connect(&self.config).await?;
        let names = session.list_folders().await;
        session.logout().await.ok();
        names
    }

    /// Synchronize every folder of the account into the Maildir at
    /// `maildir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened, the connection
    /// or login fails, or the folder list cannot be retrieved. Failures
    /// of single folders or messages are part of the returned report.
    pub async fn sync(&self, maildir: impl Into<PathBuf>) -> Result<SyncReport> {
        let store = Maildir::open(maildir)?;
        info!("Syncing {} into {}", self.config.username, store.root().display());

        let mut session = ImapMailSession::connect(&self.config).await?;
        let report = MaildirSync::new(store).run(&mut session).await;

        if let Err(e) = session.logout().await {
            warn!("{}", e);
        }
        report
    }
}

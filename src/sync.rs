//! Synchronization driver
//!
//! Walks every remote folder, starting at a random one, and for each:
//!
//! 1. selects it and lists `Message-ID`/`Date` headers,
//! 2. reconciles the listing with the local store,
//! 3. downloads what is missing,
//! 4. moves what the server dropped into `no-longer-on-server/`.
//!
//! Folder and message failures are logged and recorded in the
//! [`SyncReport`]; only failing to enumerate folders aborts a run.

use crate::error::Result;
use crate::folder::RemoteFolder;
use crate::maildir::{LocalFolder, Maildir};
use crate::reconcile::{FetchItem, reconcile};
use crate::report::{Failure, FolderReport, SyncReport};
use crate::session::{MailSession, RemoteMessage};
use chrono::Utc;
use rand::Rng;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Rotate `folders` so processing starts at a random position.
///
/// Interrupted runs then do not always starve the same folders.
pub fn rotate_from_random_offset<T, R: Rng>(folders: &mut [T], rng: &mut R) {
    if folders.is_empty() {
        return;
    }
    let offset = rng.gen_range(0..folders.len());
    folders.rotate_left(offset);
}

/// For every local name, the remote folder that owns it: the smallest
/// remote name among those mapping to it, whatever the listing order.
fn local_name_owners(folders: &[RemoteFolder]) -> HashMap<String, String> {
    let mut owners: HashMap<String, String> = HashMap::new();
    for folder in folders {
        let Ok(local) = folder.local_name() else {
            continue;
        };
        let owner = owners
            .entry(local)
            .or_insert_with(|| folder.name().to_string());
        if folder.name() < owner.as_str() {
            *owner = folder.name().to_string();
        }
    }
    owners
}

/// Mirrors a mail account into a [`Maildir`].
#[derive(Debug, Clone)]
pub struct MaildirSync {
    store: Maildir,
}

impl MaildirSync {
    #[must_use]
    pub const fn new(store: Maildir) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &Maildir {
        &self.store
    }

    /// Synchronize every folder the server lists.
    ///
    /// # Errors
    ///
    /// Returns an error only if the folder list cannot be retrieved;
    /// everything after that is reported per folder.
    pub async fn run<S: MailSession>(&self, session: &mut S) -> Result<SyncReport> {
        let started_at = Utc::now();

        let mut folders: Vec<RemoteFolder> = session
            .list_folders()
            .await?
            .into_iter()
            .map(RemoteFolder::from)
            .collect();
        let owners = local_name_owners(&folders);
        rotate_from_random_offset(&mut folders, &mut rand::thread_rng());

        let mut reports = Vec::with_capacity(folders.len());
        for folder in &folders {
            let owner = folder
                .local_name()
                .ok()
                .and_then(|local| owners.get(&local).map(|owner| (local, owner)));
            match owner {
                Some((local, owner)) if owner != folder.name() => {
                    warn!("Skipping {} (local folder {} belongs to {})", folder, local, owner);
                    let mut report = FolderReport::new(folder.name());
                    report.skipped = Some(format!("local folder {local} belongs to {owner}"));
                    reports.push(report);
                }
                _ => reports.push(self.sync_folder(session, folder).await),
            }
        }

        Ok(SyncReport {
            started_at,
            finished_at: Utc::now(),
            folders: reports,
        })
    }

    /// Synchronize a single folder. Never fails; a folder that cannot
    /// be read comes back with `skipped` set.
    pub async fn sync_folder<S: MailSession>(
        &self,
        session: &mut S,
        folder: &RemoteFolder,
    ) -> FolderReport {
        let mut report = FolderReport::new(folder.name());
        info!("Checking {}", folder);

        let (local, listing) = match self.prepare(session, folder).await {
            Ok(prepared) => prepared,
            Err(reason) => {
                info!("Skipping {} ({})", folder, reason);
                report.skipped = Some(reason);
                return report;
            }
        };
        report.local_name = Some(local.name().to_string());
        report.messages = listing.len();

        let index = match self.store.index(&local) {
            Ok(index) => index,
            Err(e) => {
                error!("Skipping {}: cannot index {} ({})", folder, local.name(), e);
                report.skipped = Some(e.to_string());
                return report;
            }
        };

        let plan = reconcile(session, folder, &local, index, &listing, &mut report).await;

        info!(
            "Processing {} (store: {}, trash: {})",
            folder,
            plan.to_fetch.len(),
            plan.stale.len()
        );

        fetch_messages(session, folder, &local, plan.to_fetch, &mut report).await;
        self.quarantine_messages(folder, &local, &plan.stale, &mut report);

        report
    }

    /// Select `folder`, list its headers and make sure its local
    /// directories exist. The error is the reason to skip the folder.
    async fn prepare<S: MailSession>(
        &self,
        session: &mut S,
        folder: &RemoteFolder,
    ) -> std::result::Result<(LocalFolder, Vec<RemoteMessage>), String> {
        let local_name = folder.local_name().map_err(|e| e.to_string())?;

        let exists = session
            .select(folder.name())
            .await
            .map_err(|e| e.to_string())?;
        let listing = if exists == 0 {
            Vec::new()
        } else {
            session.fetch_headers().await.map_err(|e| e.to_string())?
        };

        let local = self.store.folder(&local_name).map_err(|e| {
            error!("Cannot create local folder {}: {}", local_name, e);
            e.to_string()
        })?;
        Ok((local, listing))
    }

    /// Move every stale file of `local` into quarantine.
    fn quarantine_messages(
        &self,
        folder: &RemoteFolder,
        local: &LocalFolder,
        stale: &[String],
        report: &mut FolderReport,
    ) {
        let total = stale.len();
        for (n, name) in stale.iter().enumerate() {
            match self.store.quarantine_message(local, name) {
                Ok(_) => {
                    info!("Trashed {} ({}/{})", folder, n + 1, total);
                    report.quarantined += 1;
                }
                Err(e) => {
                    error!("{}: cannot trash {}: {}", folder, name, e);
                    report.failures.push(Failure::new(None, Some(name.as_str()), &e));
                }
            }
        }
    }
}

/// Download and store every planned message, in listing order.
async fn fetch_messages<S: MailSession>(
    session: &mut S,
    folder: &RemoteFolder,
    local: &LocalFolder,
    items: Vec<FetchItem>,
    report: &mut FolderReport,
) {
    let total = items.len();
    for (n, item) in items.into_iter().enumerate() {
        let body = match session.fetch_body(item.uid).await {
            Ok(body) => body,
            Err(e) => {
                error!("{}: UID {}: {}", folder, item.uid, e);
                report
                    .failures
                    .push(Failure::for_message(item.uid, &item.identity, &e));
                continue;
            }
        };

        match local.write_message(&item.identity, &body) {
            Ok(_) => {
                info!("Stored {} ({}/{})", folder, n + 1, total);
                report.fetched += 1;
            }
            Err(e) => {
                warn!("{}: UID {}: cannot store {}: {}", folder, item.uid, item.identity, e);
                report
                    .failures
                    .push(Failure::for_message(item.uid, &item.identity, &e));
            }
        }
    }
}

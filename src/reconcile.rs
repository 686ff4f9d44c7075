//! Folder reconciliation
//!
//! Compares one remote folder listing with the local store and decides,
//! message by message, whether it is already synced, can be hard-linked
//! from another local folder, or has to be fetched. Local files that no
//! listed message claims are returned as stale.

use crate::error::{Error, Result};
use crate::folder::RemoteFolder;
use crate::identity::MessageIdentity;
use crate::maildir::{LocalFolder, LocalIndex};
use crate::report::{Failure, FolderReport};
use crate::session::{MailSession, RemoteMessage};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// A message that has to be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchItem {
    pub uid: u32,
    pub identity: MessageIdentity,
}

/// Work left for one folder once every listed message is classified.
#[derive(Debug, Default)]
pub struct FolderPlan {
    /// In listing order.
    pub to_fetch: Vec<FetchItem>,
    /// File names in `cur/` that the server no longer lists, sorted.
    /// Empty when some listed message could not be identified.
    pub stale: Vec<String>,
}

/// Derive the identity of `message`, downloading the body when the
/// headers carry nothing usable.
async fn derive_identity<S: MailSession>(
    session: &mut S,
    message: &RemoteMessage,
) -> Result<(MessageIdentity, Option<Vec<u8>>)> {
    match MessageIdentity::from_headers(&message.headers) {
        Ok(Some((identity, source))) => {
            debug!("UID {}: identity from {:?}", message.uid, source);
            return Ok((identity, None));
        }
        Ok(None) => {}
        Err(e) => warn!("UID {}: unreadable headers, hashing body ({})", message.uid, e),
    }

    let body = session.fetch_body(message.uid).await?;
    let identity =
        MessageIdentity::from_body(&body).ok_or(Error::EmptyIdentity { uid: message.uid })?;
    debug!("UID {}: identity from body digest", message.uid);
    Ok((identity, Some(body)))
}

/// Classify every message of `listing`.
///
/// Already-synced messages are ticked off `index.present`; messages
/// found in another folder are hard-linked into `local` right away, and
/// so are bodies downloaded while deriving an identity. Counters and
/// per-message failures go to `report`.
pub async fn reconcile<S: MailSession>(
    session: &mut S,
    folder: &RemoteFolder,
    local: &LocalFolder,
    mut index: LocalIndex,
    listing: &[RemoteMessage],
    report: &mut FolderReport,
) -> FolderPlan {
    let mut handled: HashSet<MessageIdentity> = HashSet::new();
    let mut plan = FolderPlan::default();
    let mut unidentified = 0;

    for message in listing {
        let (identity, body) = match derive_identity(session, message).await {
            Ok(derived) => derived,
            Err(e) => {
                error!("{}: UID {}: {}", folder, message.uid, e);
                report.failures.push(Failure::new(Some(message.uid), None, &e));
                unidentified += 1;
                continue;
            }
        };

        let first_in_listing = handled.insert(identity.clone());
        if !first_in_listing || index.present.remove(identity.as_str()) {
            report.already_synced += 1;
            continue;
        }

        if let Some(src) = index.find_elsewhere(&identity) {
            match local.link_message(&src, &identity) {
                Ok(_) => {
                    info!("Linked {} UID {} from {}", folder, message.uid, src.display());
                    report.linked += 1;
                    continue;
                }
                Err(e @ Error::AlreadyExists(_)) => {
                    warn!("{}: UID {}: {}", folder, message.uid, e);
                    report
                        .failures
                        .push(Failure::for_message(message.uid, &identity, &e));
                    continue;
                }
                Err(e) => {
                    warn!(
                        "{}: UID {}: cannot link {} ({}), fetching instead",
                        folder,
                        message.uid,
                        src.display(),
                        e
                    );
                }
            }
        }

        if let Some(body) = body {
            match local.write_message(&identity, &body) {
                Ok(_) => {
                    info!("Stored {} UID {}", folder, message.uid);
                    report.fetched += 1;
                }
                Err(e) => {
                    warn!("{}: UID {}: cannot store {}: {}", folder, message.uid, identity, e);
                    report
                        .failures
                        .push(Failure::for_message(message.uid, &identity, &e));
                }
            }
            continue;
        }

        plan.to_fetch.push(FetchItem {
            uid: message.uid,
            identity,
        });
    }

    if unidentified > 0 {
        // an unidentified message may be one of the files still in `present`
        warn!(
            "{}: {} message(s) not identified, keeping {} unclaimed file(s)",
            folder,
            unidentified,
            index.present.len()
        );
        return plan;
    }

    plan.stale = index.present.into_iter().collect();
    plan.stale.sort();
    plan
}

//! IMAP to Maildir mirroring library
//!
//! Copies every folder of an IMAP account into a local
//! [Maildir](https://cr.yp.to/proto/maildir.html) store and keeps it in
//! step with the server on every run:
//!
//! - messages already on disk are left alone,
//! - messages the server lists in several folders are downloaded once
//!   and hard-linked into the other folders,
//! - messages the server no longer lists are moved to
//!   `no-longer-on-server/` instead of being deleted.
//!
//! Messages are recognised by their `Message-ID` (or `Date`, or a
//! digest of the content), never by IMAP UIDs, so the store survives
//! UID validity resets and server migrations.

mod client;
mod config;
mod connection;
mod error;
mod folder;
mod identity;
mod maildir;
mod reconcile;
mod report;
mod session;
mod sync;

pub use client::ImapClient;
pub use config::{DEFAULT_HOST, ImapConfig, Security, env_password};
pub use error::{Error, Result};
pub use folder::RemoteFolder;
pub use identity::{IdentitySource, MessageIdentity, SEEN_SUFFIX, sanitize};
pub use maildir::{LocalFolder, LocalIndex, Maildir, QUARANTINE_FOLDER};
pub use reconcile::{FetchItem, FolderPlan, reconcile};
pub use report::{Failure, FolderReport, SyncReport};
pub use session::{ImapMailSession, MailSession, RemoteMessage};
pub use sync::{MaildirSync, rotate_from_random_offset};

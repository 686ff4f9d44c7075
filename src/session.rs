//! Mail session seam
//!
//! The synchronization core only talks to the server through
//! [`MailSession`]. [`ImapMailSession`] implements it on top of an
//! `async-imap` session; tests substitute in-memory servers.

use crate::config::ImapConfig;
use crate::connection::{self, ImapSession};
use crate::error::{Error, Result};
use futures::StreamExt;
use tracing::{debug, warn};

/// Header fields requested for every message of a folder.
const HEADER_QUERY: &str = "(UID BODY.PEEK[HEADER.FIELDS (MESSAGE-ID DATE)])";
/// Full message, without setting `\Seen`.
const BODY_QUERY: &str = "(BODY.PEEK[])";

/// A message as listed by the server: its token within the selected
/// folder and the raw `Message-ID`/`Date` header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMessage {
    pub uid: u32,
    pub headers: Vec<u8>,
}

/// The operations the synchronization core needs from a mail server.
///
/// Calls are issued one at a time over a single session.
#[allow(async_fn_in_trait)]
pub trait MailSession {
    /// Names of every folder on the server.
    async fn list_folders(&mut self) -> Result<Vec<String>>;

    /// Make `folder` the current folder, returning its message count.
    async fn select(&mut self, folder: &str) -> Result<u32>;

    /// Header listing of every message in the current folder.
    async fn fetch_headers(&mut self) -> Result<Vec<RemoteMessage>>;

    /// Complete raw message `uid` of the current folder.
    async fn fetch_body(&mut self, uid: u32) -> Result<Vec<u8>>;

    /// End the session.
    async fn logout(&mut self) -> Result<()>;
}

/// [`MailSession`] over a logged-in IMAP connection.
pub struct ImapMailSession {
    session: ImapSession,
}

impl ImapMailSession {
    /// Connect and log in.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection, TLS handshake or LOGIN fails.
    pub async fn connect(config: &ImapConfig) -> Result<Self> {
        let session = connection::connect(config).await?;
        Ok(Self { session })
    }
}

impl MailSession for ImapMailSession {
    async fn list_folders(&mut self) -> Result<Vec<String>> {
        let mut folder_stream = self
            .session
            .list(Some(""), Some("*"))
            .await
            .map_err(|e| Error::Imap(format!("List folders failed: {e}")))?;

        let mut names = Vec::new();
        while let Some(item) = folder_stream.next().await {
            match item {
                Ok(name) => names.push(name.name().to_string()),
                Err(e) => warn!("Bad LIST response: {}", e),
            }
        }
        drop(folder_stream);

        Ok(names)
    }

    async fn select(&mut self, folder: &str) -> Result<u32> {
        connection::select(&mut self.session, folder).await
    }

    async fn fetch_headers(&mut self) -> Result<Vec<RemoteMessage>> {
        let mut messages = self
            .session
            .uid_fetch("1:*", HEADER_QUERY)
            .await
            .map_err(|e| Error::Imap(format!("Header fetch failed: {e}")))?;

        let mut listing = Vec::new();
        while let Some(item) = messages.next().await {
            let fetch = item.map_err(|e| Error::Imap(format!("Header fetch error: {e}")))?;
            let Some(uid) = fetch.uid else {
                debug!("FETCH response without UID (seq {})", fetch.message);
                continue;
            };
            listing.push(RemoteMessage {
                uid,
                headers: fetch.header().map(<[u8]>::to_vec).unwrap_or_default(),
            });
        }
        drop(messages);

        Ok(listing)
    }

    async fn fetch_body(&mut self, uid: u32) -> Result<Vec<u8>> {
        let uid_set = format!("{uid}");
        let mut messages = self
            .session
            .uid_fetch(&uid_set, BODY_QUERY)
            .await
            .map_err(|e| Error::Imap(format!("Fetch failed: {e}")))?;

        let mut body = None;
        while let Some(item) = messages.next().await {
            let fetch = item.map_err(|e| Error::Imap(format!("Fetch error: {e}")))?;
            if body.is_none() {
                body = fetch.body().map(<[u8]>::to_vec);
            }
        }
        drop(messages);

        body.ok_or_else(|| Error::Imap(format!("No body found for UID {uid}")))
    }

    async fn logout(&mut self) -> Result<()> {
        self.session
            .logout()
            .await
            .map_err(|e| Error::Imap(format!("Logout failed: {e}")))
    }
}

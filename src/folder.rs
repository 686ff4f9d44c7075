//! Remote folder names
//!
//! A [`RemoteFolder`] wraps the server-assigned mailbox name and knows
//! the directory it maps to in the local store.

use crate::error::{Error, Result};
use crate::identity::sanitize;
use crate::maildir::QUARANTINE_FOLDER;
use std::fmt;

/// An IMAP mailbox as reported by `LIST`.
///
/// # Examples
///
/// ```
/// use imap_maildir_fetch::RemoteFolder;
///
/// let folder = RemoteFolder::new("[Gmail]/All Mail");
/// assert_eq!(folder.name(), "[Gmail]/All Mail");
/// assert_eq!(folder.local_name().unwrap(), "-Gmail--All-Mail");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteFolder {
    name: String,
}

impl RemoteFolder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The name as the server knows it, used for `SELECT`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sanitized directory name under the store root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFolder`] if the name sanitizes to nothing
    /// or to the reserved quarantine folder.
    pub fn local_name(&self) -> Result<String> {
        let local = sanitize(&self.name);
        if local.is_empty() || local == QUARANTINE_FOLDER {
            return Err(Error::InvalidFolder(self.name.clone()));
        }
        Ok(local)
    }
}

impl fmt::Display for RemoteFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for RemoteFolder {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RemoteFolder {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

//! Error types for imap-maildir-fetch

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("Header parsing error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    /// No usable identity could be derived for a message.
    #[error("empty message identity (uid {uid})")]
    EmptyIdentity { uid: u32 },

    /// The destination of a link, write or quarantine move is taken.
    #[error("file exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// A remote folder that cannot be mapped onto the local store.
    #[error("invalid folder name {0:?}")]
    InvalidFolder(String),
}

impl Error {
    /// Map an [`std::io::Error`] raised while creating `path`, keeping
    /// "already exists" distinguishable from other failures.
    pub(crate) fn from_io_at(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == std::io::ErrorKind::AlreadyExists {
            Self::AlreadyExists(path.into())
        } else {
            Self::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Message identities
//!
//! A [`MessageIdentity`] is the file name a message is stored under in
//! a folder's `cur/` directory. It is derived from the `Message-ID`
//! header, else the `Date` header, else a SHA-256 digest of the raw
//! message, so the same message gets the same name in every folder and
//! on every run.

use crate::error::{Error, Result};
use mailparse::MailHeaderMap;
use sha2::{Digest, Sha256};
use std::fmt;

/// Replacement for every character that is unsafe in a file name.
pub const SUBSTITUTE: char = '-';

/// Maildir info suffix: version 2, flag `S` (seen).
pub const SEEN_SUFFIX: &str = ":2,S";

const UNSAFE_CHARS: [char; 9] = ['/', '*', '@', '\n', ' ', '<', '>', '[', ']'];

/// Make `raw` usable as a single path component.
///
/// Unsafe characters become [`SUBSTITUTE`], carriage returns are
/// dropped and a leading `.` is replaced so the result is never hidden
/// and never `.` or `..`.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .filter(|c| *c != '\r')
        .map(|c| if UNSAFE_CHARS.contains(&c) { SUBSTITUTE } else { c })
        .collect();

    if out.starts_with('.') {
        out.replace_range(..1, SUBSTITUTE.encode_utf8(&mut [0; 4]));
    }
    out
}

/// Which piece of the message an identity was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    MessageId,
    Date,
    Digest,
}

/// Stable, filesystem-safe name of a message, seen suffix included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageIdentity(String);

impl MessageIdentity {
    /// Sanitize `raw` and append the seen suffix.
    ///
    /// Returns `None` when nothing is left after sanitizing.
    #[must_use]
    pub fn from_raw(raw: &str) -> Option<Self> {
        let clean = sanitize(raw.trim());
        if clean.is_empty() {
            return None;
        }
        Some(Self(clean + SEEN_SUFFIX))
    }

    /// Derive an identity from a header block holding at least the
    /// `Message-ID` and `Date` fields.
    ///
    /// Returns `Ok(None)` when neither header carries a usable value,
    /// in which case the caller falls back to [`Self::from_body`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the header block is malformed.
    pub fn from_headers(raw: &[u8]) -> Result<Option<(Self, IdentitySource)>> {
        let (headers, _) =
            mailparse::parse_headers(raw).map_err(|e| Error::Parse(e.to_string()))?;

        let candidates = [
            ("Message-ID", IdentitySource::MessageId),
            ("Date", IdentitySource::Date),
        ];
        Ok(candidates.into_iter().find_map(|(name, source)| {
            headers
                .get_first_value(name)
                .and_then(|value| Self::from_raw(&value))
                .map(|identity| (identity, source))
        }))
    }

    /// Derive an identity from the digest of a complete raw message.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Option<Self> {
        Self::from_raw(&hex::encode(Sha256::digest(body)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

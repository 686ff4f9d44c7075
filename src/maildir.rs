//! Local Maildir store
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<folder>/{cur,new,tmp}/
//! <root>/no-longer-on-server/{cur,new,tmp}/
//! ```
//!
//! Synced messages live in `cur/` under their [`MessageIdentity`].
//! Writes are staged in `tmp/` and published into `cur/` without ever
//! replacing an existing file, so a message file is either complete or
//! absent.

use crate::error::{Error, Result};
use crate::identity::MessageIdentity;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Folder that receives messages the server no longer reports.
pub const QUARANTINE_FOLDER: &str = "no-longer-on-server";

const SUBDIRS: [&str; 3] = ["cur", "new", "tmp"];

/// Create a directory, treating "already exists" as success.
fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => {
            debug!("Created {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// A store root holding one Maildir per remote folder.
#[derive(Debug, Clone)]
pub struct Maildir {
    root: PathBuf,
}

impl Maildir {
    /// Open the store at `root`, creating it and the quarantine folder
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let store = Self { root };
        store.quarantine()?;
        Ok(store)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The folder named `local_name`, created on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if one of its directories cannot be created.
    pub fn folder(&self, local_name: &str) -> Result<LocalFolder> {
        let folder = LocalFolder {
            name: local_name.to_string(),
            path: self.root.join(local_name),
        };
        ensure_dir(&folder.path)?;
        for sub in SUBDIRS {
            ensure_dir(&folder.path.join(sub))?;
        }
        Ok(folder)
    }

    /// The quarantine folder.
    ///
    /// # Errors
    ///
    /// Returns an error if one of its directories cannot be created.
    pub fn quarantine(&self) -> Result<LocalFolder> {
        self.folder(QUARANTINE_FOLDER)
    }

    /// Snapshot the store as seen from `folder`: what `folder` already
    /// holds, and where else a message might be found.
    ///
    /// # Errors
    ///
    /// Returns an error if the store root or `folder`'s `cur/` cannot be
    /// read.
    pub fn index(&self, folder: &LocalFolder) -> Result<LocalIndex> {
        let present = folder.messages()?;

        let mut elsewhere = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_name() == folder.name.as_str() {
                continue;
            }
            let cur = entry.path().join("cur");
            if cur.is_dir() {
                elsewhere.push(cur);
            }
        }
        elsewhere.sort();

        Ok(LocalIndex { present, elsewhere })
    }

    /// Move `file_name` out of `folder` into the quarantine folder as
    /// `<folder>@<file_name>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the quarantine already holds
    /// that name, or an I/O error if the rename fails.
    pub fn quarantine_message(&self, folder: &LocalFolder, file_name: &str) -> Result<PathBuf> {
        let quarantine = self.quarantine()?;
        let src = folder.cur().join(file_name);
        let dst = quarantine.cur().join(format!("{}@{file_name}", folder.name));

        // rename(2) silently replaces its target
        if dst.try_exists()? {
            return Err(Error::AlreadyExists(dst));
        }
        fs::rename(&src, &dst)?;
        Ok(dst)
    }
}

/// One Maildir inside the store.
#[derive(Debug, Clone)]
pub struct LocalFolder {
    name: String,
    path: PathBuf,
}

impl LocalFolder {
    /// Directory name under the store root.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Active area holding synced messages.
    #[must_use]
    pub fn cur(&self) -> PathBuf {
        self.path.join("cur")
    }

    /// Staging area for writes in progress.
    #[must_use]
    pub fn tmp(&self) -> PathBuf {
        self.path.join("tmp")
    }

    #[must_use]
    pub fn message_path(&self, identity: &MessageIdentity) -> PathBuf {
        self.cur().join(identity.as_str())
    }

    /// Names of all regular files in `cur/`.
    ///
    /// # Errors
    ///
    /// Returns an error if `cur/` cannot be read.
    pub fn messages(&self) -> Result<HashSet<String>> {
        let mut names = HashSet::new();
        for entry in fs::read_dir(self.cur())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => {
                    names.insert(name);
                }
                Err(name) => debug!("Ignoring non UTF-8 file {:?} in {}", name, self.name),
            }
        }
        Ok(names)
    }

    /// Hard-link `src` into `cur/` under `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the destination exists, or an
    /// I/O error if the link cannot be made (e.g. across volumes).
    pub fn link_message(&self, src: &Path, identity: &MessageIdentity) -> Result<PathBuf> {
        let dst = self.message_path(identity);
        fs::hard_link(src, &dst).map_err(|e| Error::from_io_at(e, &dst))?;
        Ok(dst)
    }

    /// Store `raw` under `identity` with carriage returns removed.
    ///
    /// The content is written to `tmp/` first and only then linked into
    /// `cur/`, so a failure leaves nothing behind in `cur/`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if `cur/` already holds
    /// `identity`, or an I/O error if writing fails.
    pub fn write_message(&self, identity: &MessageIdentity, raw: &[u8]) -> Result<PathBuf> {
        let dst = self.message_path(identity);
        let content: Vec<u8> = raw.iter().copied().filter(|b| *b != b'\r').collect();

        let mut staged = NamedTempFile::new_in(self.tmp())?;
        staged.write_all(&content)?;
        staged.as_file().sync_all()?;
        staged
            .persist_noclobber(&dst)
            .map_err(|e| Error::from_io_at(e.error, &dst))?;
        Ok(dst)
    }
}

/// What the store holds, as seen from one folder.
#[derive(Debug)]
pub struct LocalIndex {
    /// File names in the folder's own `cur/`.
    pub present: HashSet<String>,
    /// `cur/` directories of every other folder.
    pub elsewhere: Vec<PathBuf>,
}

impl LocalIndex {
    /// First other folder holding `identity`.
    #[must_use]
    pub fn find_elsewhere(&self, identity: &MessageIdentity) -> Option<PathBuf> {
        self.elsewhere
            .iter()
            .map(|cur| cur.join(identity.as_str()))
            .find(|path| path.is_file())
    }
}

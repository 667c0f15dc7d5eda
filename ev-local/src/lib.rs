#![warn(missing_docs)]
//! A single-device backend for the contest.
//!
//! [`LocalStore`] keeps three independent JSON documents: the submissions
//! collection, the vote map and the category list. Each is read once when
//! the store is opened and rewritten in full whenever it changes. Without a
//! directory the documents only live in memory.
//!
//! Unlike the shared backend, the aggregate of a submission is a stored field
//! that the engine moves by the delta of every vote, so the seeded example
//! totals survive alongside the votes cast on this device.

use ev_core::models::{Category, Submission};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::Mutex;
use tracing::{Level, event};

pub mod config;
pub mod document;
mod impls;

use config::LocalConfig;
use document::{CATEGORIES_FILE, StoredSubmission, StoredVotes, SUBMISSIONS_FILE, VOTES_FILE, VoteMap};

/// Failures of the local store.
#[derive(Debug, thiserror::Error)]
pub enum LocalError {
    /// Reading or writing a document failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be (de)serialized
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub(crate) struct Documents {
    pub(crate) submissions: Vec<Submission>,
    pub(crate) votes: VoteMap,
    pub(crate) categories: Vec<Category>,
}

/// The local, single-device store.
///
/// Clones share the same documents. Every operation holds the lock for its
/// whole duration, so writes are serialized; a write that fails on disk is
/// not applied in memory either.
#[derive(Clone)]
pub struct LocalStore {
    documents: Arc<Mutex<Documents>>,
    directory: Option<Arc<PathBuf>>,
}

impl LocalStore {
    /// Open the store described by `config`, loading whatever documents exist.
    ///
    /// A submission without a category loads as `mizah`. Tags carried by the
    /// loaded submissions are added to the category list. Documents written
    /// with short ids or a flat vote map are rewritten in the current shape.
    /// If no submissions document exists yet and `config.seed` is set, the
    /// example entries are written.
    pub async fn open(config: &LocalConfig) -> Result<Self, LocalError> {
        let directory = config.directory.clone().map(Arc::new);
        if let Some(dir) = &directory {
            tokio::fs::create_dir_all(dir.as_path()).await?;
        }

        let store = Self {
            documents: Arc::default(),
            directory,
        };

        let stored: Option<Vec<StoredSubmission>> = store.read(SUBMISSIONS_FILE).await?;
        let votes: Option<StoredVotes> = store.read(VOTES_FILE).await?;
        let categories: Option<Vec<Category>> = store.read(CATEGORIES_FILE).await?;

        let migrated = stored
            .as_ref()
            .is_some_and(|stored| stored.iter().any(StoredSubmission::has_legacy_id))
            || votes.as_ref().is_some_and(StoredVotes::is_legacy);

        let seeded = stored.is_none() && config.seed;
        let submissions: Vec<Submission> = match stored {
            Some(stored) => stored.into_iter().map(Submission::from).collect(),
            None if config.seed => document::seed(ev_core::models::Timestamp::now()),
            None => Vec::new(),
        };
        let votes = votes.map(StoredVotes::into_vote_map).unwrap_or_default();

        let mut categories = categories.unwrap_or_default();
        let mut grown = false;
        for submission in &submissions {
            let tag = &submission.category;
            if !tag.is_base() && !categories.contains(tag) {
                categories.push(tag.clone());
                grown = true;
            }
        }

        // legacy ids resolve the same way on every read, so a partial
        // rewrite still loads consistently
        if migrated {
            store.write(VOTES_FILE, &votes).await?;
        }
        if seeded || migrated {
            store.write(SUBMISSIONS_FILE, &stored_form(&submissions)).await?;
        }
        if grown {
            store.write(CATEGORIES_FILE, &categories).await?;
        }

        event!(
            Level::INFO,
            directory = ?config.directory,
            submissions = submissions.len(),
            voters = votes.len(),
            seeded,
            migrated,
            "opened local store"
        );

        *store.documents.lock().await = Documents {
            submissions,
            votes,
            categories,
        };

        Ok(store)
    }

    /// An in-memory store with no submissions.
    pub fn empty() -> Self {
        Self {
            documents: Arc::default(),
            directory: None,
        }
    }

    pub(crate) fn documents(&self) -> &Mutex<Documents> {
        &self.documents
    }

    fn path(&self, name: &str) -> Option<PathBuf> {
        self.directory.as_ref().map(|dir| dir.join(name))
    }

    async fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, LocalError> {
        let Some(path) = self.path(name) else {
            return Ok(None);
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Replace a document in full.
    ///
    /// The bytes go to a sibling file first and are renamed over the
    /// document, so a failure never leaves a truncated document behind.
    pub(crate) async fn write<T: Serialize + ?Sized>(
        &self,
        name: &str,
        document: &T,
    ) -> Result<(), LocalError> {
        let Some(path) = self.path(name) else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(document)?;
        let staging = staging_path(&path);
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &path).await?;
        event!(Level::DEBUG, path = %path.display(), "wrote document");
        Ok(())
    }

    /// Write two documents as a unit: if the second write fails, the first
    /// document is put back to `previous`.
    pub(crate) async fn write_both<A, B>(
        &self,
        (first, next, previous): (&str, &A, &A),
        (second, document): (&str, &B),
    ) -> Result<(), LocalError>
    where
        A: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        self.write(first, next).await?;
        if let Err(err) = self.write(second, document).await {
            if let Err(restore) = self.write(first, previous).await {
                event!(Level::ERROR, document = first, err = restore.to_string(), "failed to restore document");
            }
            return Err(err);
        }
        Ok(())
    }
}

pub(crate) fn stored_form(submissions: &[Submission]) -> Vec<StoredSubmission> {
    submissions.iter().map(StoredSubmission::from).collect()
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

//! File-backed vote store.
//!
//! The whole ledger lives in one JSON document. Every operation reads the
//! document, applies one change and writes it back through a temp file and a
//! rename. A single mutex is held for the full cycle so concurrent requests in
//! this process cannot lose each other's writes; other processes writing the
//! same file are not coordinated with.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use shared::{ledger, Document, Leaderboard, Settings, TallyEntry, Vote, VoteMetadata, VoterStats};
use tempfile::NamedTempFile;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid vote: {0}")]
    Validation(String),
    #[error("Vote store lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BallotOutcome {
    Recorded { votes: usize, cast_at: OffsetDateTime },
    AlreadyVoted,
}

enum Loaded {
    Missing,
    Parsed(Document),
    Malformed(serde_json::Error),
}

#[derive(Debug)]
pub struct VoteStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl VoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the document if missing and adds the settings section to
    /// documents written before it existed. Running it again changes nothing.
    pub fn initialize(&self) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        match self.load()? {
            Loaded::Missing => {
                info!("📂 Creating vote store at {}", self.path.display());
                self.write(&Document::default())
            }
            Loaded::Parsed(mut document) => {
                if document.settings.is_none() {
                    info!("Adding default settings to {}", self.path.display());
                    document.settings = Some(Settings::default());
                    self.write(&document)?;
                }
                debug!(votes = document.votes.len(), "Vote store ready");
                Ok(())
            }
            Loaded::Malformed(e) => {
                warn!("Vote store {} is malformed ({}); starting empty", self.path.display(), e);
                self.preserve_corrupt();
                self.write(&Document::default())
            }
        }
    }

    /// Appends one vote stamped with the current time, storing the names
    /// exactly as given. Does not check whether the voter already voted.
    pub fn record_vote(
        &self,
        category: &str,
        candidate: &str,
        voter: &str,
        metadata: Option<VoteMetadata>,
    ) -> Result<Vote, StoreError> {
        require("category", category)?;
        require("candidate", candidate)?;
        require("voter", voter)?;

        let vote = Vote::new(category, candidate, voter, metadata);
        self.update(|document| document.votes.push(vote.clone()))?;
        debug!(category, candidate, voter, "Recorded vote");
        Ok(vote)
    }

    /// Appends one vote per nomination, all sharing a timestamp, unless the
    /// voter already has a vote in the ledger. The check and the append happen
    /// under the same lock.
    pub fn record_ballot(
        &self,
        voter: &str,
        nominations: &BTreeMap<String, String>,
        metadata: Option<VoteMetadata>,
    ) -> Result<BallotOutcome, StoreError> {
        require("voter", voter)?;
        for (category, candidate) in nominations {
            require("category", category)?;
            require("candidate", candidate)?;
        }

        let _guard = self.guard()?;
        let mut document = self.read(true)?;
        if ledger::has_voted(&document.votes, voter) {
            return Ok(BallotOutcome::AlreadyVoted);
        }

        let cast_at = OffsetDateTime::now_utc();
        document.votes.extend(nominations.iter().map(|(category, candidate)| {
            Vote::at(category.as_str(), candidate.as_str(), voter, metadata.clone(), cast_at)
        }));
        self.write(&document)?;

        Ok(BallotOutcome::Recorded { votes: nominations.len(), cast_at })
    }

    pub fn has_voted(&self, voter: &str) -> Result<bool, StoreError> {
        self.view(|document| ledger::has_voted(&document.votes, voter))
    }

    pub fn list_voters(&self) -> Result<Vec<String>, StoreError> {
        self.view(|document| ledger::voters(&document.votes))
    }

    pub fn get_candidates(&self, category: &str) -> Result<Vec<String>, StoreError> {
        self.view(|document| ledger::candidates(&document.votes, category))
    }

    /// Removes every vote cast by `voter`, returning how many went.
    pub fn delete_votes_for_voter(&self, voter: &str) -> Result<usize, StoreError> {
        let removed = self.update(|document| {
            let before = document.votes.len();
            document.votes.retain(|v| !v.is_by(voter));
            before - document.votes.len()
        })?;
        info!(voter, removed, "Deleted votes for voter");
        Ok(removed)
    }

    /// Empties the ledger. Settings are kept.
    pub fn clear_all_votes(&self) -> Result<usize, StoreError> {
        let removed = self.update(|document| std::mem::take(&mut document.votes).len())?;
        info!(removed, "Cleared all votes");
        Ok(removed)
    }

    pub fn get_tally(&self) -> Result<Vec<TallyEntry>, StoreError> {
        self.view(|document| ledger::tally(&document.votes))
    }

    pub fn get_leaderboard(&self, categories: &[String]) -> Result<Leaderboard, StoreError> {
        self.view(|document| ledger::leaderboard(&document.votes, categories))
    }

    pub fn get_voter_stats(&self) -> Result<Vec<VoterStats>, StoreError> {
        self.view(|document| ledger::voter_stats(&document.votes))
    }

    pub fn get_settings(&self) -> Result<Settings, StoreError> {
        self.view(Document::settings)
    }

    /// Replaces the settings record wholesale.
    pub fn update_settings(&self, settings: Settings) -> Result<Settings, StoreError> {
        self.update(|document| document.settings = Some(settings))?;
        info!(results_locked = settings.results_locked, "Settings updated");
        Ok(settings)
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.lock.lock().map_err(|_| {
            error!("Vote store lock poisoned");
            StoreError::LockPoisoned
        })
    }

    fn view<T>(&self, project: impl FnOnce(&Document) -> T) -> Result<T, StoreError> {
        let _guard = self.guard()?;
        let document = self.read(false)?;
        Ok(project(&document))
    }

    fn update<T>(&self, apply: impl FnOnce(&mut Document) -> T) -> Result<T, StoreError> {
        let _guard = self.guard()?;
        let mut document = self.read(true)?;
        let result = apply(&mut document);
        self.write(&document)?;
        Ok(result)
    }

    /// Missing or malformed documents read as empty. When the caller is about
    /// to overwrite, a malformed file is copied aside first.
    fn read(&self, before_write: bool) -> Result<Document, StoreError> {
        match self.load()? {
            Loaded::Parsed(document) => Ok(document),
            Loaded::Missing => Ok(Document::default()),
            Loaded::Malformed(e) => {
                warn!("Vote store {} is malformed ({}); treating as empty", self.path.display(), e);
                if before_write {
                    self.preserve_corrupt();
                }
                Ok(Document::default())
            }
        }
    }

    fn load(&self) -> Result<Loaded, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Loaded::Missing),
            Err(e) => return Err(self.unavailable(e)),
        };

        Ok(match serde_json::from_str(&raw) {
            Ok(document) => Loaded::Parsed(document),
            Err(e) => Loaded::Malformed(e),
        })
    }

    fn write(&self, document: &Document) -> Result<(), StoreError> {
        let mut document = document.clone();
        document.settings.get_or_insert_with(Settings::default);

        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| self.unavailable(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| self.unavailable(e))?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| self.unavailable(e))?;
        tmp.write_all(&bytes).map_err(|e| self.unavailable(e))?;
        tmp.as_file().sync_all().map_err(|e| self.unavailable(e))?;
        tmp.persist(&self.path).map_err(|e| self.unavailable(e.error))?;
        Ok(())
    }

    fn preserve_corrupt(&self) {
        let backup = self.corrupt_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => warn!("Kept unreadable vote store as {}", backup.display()),
            Err(e) => error!("Failed to keep unreadable vote store as {}: {}", backup.display(), e),
        }
    }

    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    fn unavailable(&self, source: io::Error) -> StoreError {
        error!("Vote store I/O failure at {}: {}", self.path.display(), source);
        StoreError::StorageUnavailable {
            path: self.path.clone(),
            source,
        }
    }
}

/// Rejects blank names. Values are stored untouched, so lookups must use the
/// same string that was recorded.
fn require(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{field} is empty")));
    }
    Ok(())
}

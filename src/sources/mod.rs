use crate::model::EntryDraft;
use anyhow::Result;
use std::path::PathBuf;

/// A managed launcher file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedEntry {
    pub path: PathBuf,
    pub draft: EntryDraft,
}

pub trait Source {
    fn scan(&self) -> Result<Vec<ManagedEntry>>;
}

pub mod desktop;

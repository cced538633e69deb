use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Categories accepted when strict category validation is enabled.
pub const CATEGORY_OPTIONS: [&str; 8] = [
    "Development",
    "Utility",
    "Office",
    "Graphics",
    "Network",
    "AudioVideo",
    "System",
    "Game",
];

pub const DEFAULT_CATEGORY: &str = "Utility";
pub const DEFAULT_ENTRY_NAME: &str = "Untitled Entry";

// Limits are counted in characters, not bytes.
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_PATH_LENGTH: usize = 4096;
pub const MAX_CATEGORIES_COUNT: usize = 10;

/// A launcher entry before it has been given an identity.
///
/// Missing fields deserialize to their blank values, so a partial draft
/// can still be generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryDraft {
    pub name: String,          // Display name
    pub exec_path: String,     // Command line, program first
    pub icon_path: String,     // Icon path or theme icon name
    pub description: String,   // Written as `Comment=`
    pub terminal: bool,
    pub categories: Vec<String>,
}

/// Identity and timestamps supplied by whoever persists the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntryMetadata {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A persisted entry: a draft plus identity.
///
/// Serializes as a single flat object, so anything that reads an
/// [`EntryDraft`] can also read an `Entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    #[serde(flatten)]
    pub draft: EntryDraft,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(id: impl Into<String>, draft: EntryDraft, now: DateTime<Utc>) -> Self {
        Self::from_parts(draft, EntryMetadata::new(id, now))
    }

    pub fn from_parts(draft: EntryDraft, metadata: EntryMetadata) -> Self {
        Self {
            id: metadata.id,
            draft,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
        }
    }

    /// Returns a new entry carrying `draft`, keeping the identity and
    /// creation time and stamping `updated_at` with `now`.
    pub fn with_draft(&self, draft: EntryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id.clone(),
            draft,
            created_at: self.created_at,
            updated_at: now,
        }
    }

    pub fn to_draft(&self) -> EntryDraft {
        self.draft.clone()
    }
}

//! Author, validate and round-trip the `.desktop` launcher entries that
//! DeskCrafter manages.
//!
//! The codec and validators are pure: they do no I/O and hold no state, so
//! they can be called from anywhere. [`sources`] and [`config`] are the only
//! modules that touch the filesystem.

pub mod codec;
pub mod config;
pub mod model;
pub mod sanitize;
pub mod sources;
pub mod validators;

pub use codec::{
    GenerateOptions, ParseError, generate, looks_like_valid_format, parse, parse_bytes,
    parse_with_metadata,
};
pub use model::{Entry, EntryDraft, EntryMetadata};
pub use sanitize::{normalize_categories, sanitize_single_line};
pub use validators::{
    EntryValidation, Field, FieldValidation, has_required_fields, validate_entry_draft,
    validate_entry_value,
};

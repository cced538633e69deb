//! Field and whole-entry validation.
//!
//! Validators never fail: each one reports a [`FieldValidation`], and the
//! composite validators collect every failing field in a single pass so a
//! form can show all problems at once.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::model::{
    CATEGORY_OPTIONS, EntryDraft, MAX_CATEGORIES_COUNT, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
    MAX_PATH_LENGTH,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldValidation {
    pub fn ok() -> Self {
        Self { valid: true, error: None }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }
}

/// Draft fields, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    ExecPath,
    IconPath,
    Description,
    Terminal,
    Categories,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::ExecPath => "execPath",
            Field::IconPath => "iconPath",
            Field::Description => "description",
            Field::Terminal => "terminal",
            Field::Categories => "categories",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::ExecPath => "Executable path",
            Field::IconPath => "Icon path",
            Field::Description => "Description",
            Field::Terminal => "Terminal",
            Field::Categories => "Categories",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryValidation {
    pub valid: bool,
    pub errors: BTreeMap<Field, String>,
}

impl EntryValidation {
    fn from_results(results: impl IntoIterator<Item = (Field, FieldValidation)>) -> Self {
        let errors: BTreeMap<Field, String> = results
            .into_iter()
            .filter_map(|(field, result)| result.error.map(|e| (field, e)))
            .collect();
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn has_newline(value: &str) -> bool {
    value.contains(['\n', '\r'])
}

fn validate_required(field: Field, value: &str, max: usize) -> FieldValidation {
    let label = field.label();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return FieldValidation::invalid(format!("{label} is required"));
    }
    if trimmed.chars().count() > max {
        return FieldValidation::invalid(format!("{label} must be {max} characters or less"));
    }
    if has_newline(value) {
        return FieldValidation::invalid(format!("{label} must not contain newlines"));
    }
    FieldValidation::ok()
}

fn validate_optional(field: Field, value: &str, max: usize) -> FieldValidation {
    let label = field.label();
    if value.is_empty() {
        return FieldValidation::ok();
    }
    if value.chars().count() > max {
        return FieldValidation::invalid(format!("{label} must be {max} characters or less"));
    }
    if has_newline(value) {
        return FieldValidation::invalid(format!("{label} must not contain newlines"));
    }
    FieldValidation::ok()
}

pub fn validate_name(value: &str) -> FieldValidation {
    validate_required(Field::Name, value, MAX_NAME_LENGTH)
}

pub fn validate_exec_path(value: &str) -> FieldValidation {
    validate_required(Field::ExecPath, value, MAX_PATH_LENGTH)
}

pub fn validate_icon_path(value: &str) -> FieldValidation {
    validate_optional(Field::IconPath, value, MAX_PATH_LENGTH)
}

pub fn validate_description(value: &str) -> FieldValidation {
    validate_optional(Field::Description, value, MAX_DESCRIPTION_LENGTH)
}

/// Checks that an untyped terminal flag is a boolean.
pub fn validate_terminal(value: &Value) -> FieldValidation {
    if value.is_boolean() {
        FieldValidation::ok()
    } else {
        FieldValidation::invalid("Terminal must be a boolean value")
    }
}

/// Checks a single category. Strict mode only accepts [`CATEGORY_OPTIONS`],
/// compared exactly.
pub fn validate_category(value: &str, strict: bool) -> FieldValidation {
    if value.trim().is_empty() {
        return FieldValidation::invalid("Category must be a non-empty string");
    }
    if strict && !CATEGORY_OPTIONS.iter().any(|option| *option == value) {
        return FieldValidation::invalid(format!(
            "Category must be one of: {}",
            CATEGORY_OPTIONS.join(", ")
        ));
    }
    FieldValidation::ok()
}

// `None` marks an element that was not a string.
fn validate_category_items<'a, I>(items: I, strict: bool) -> FieldValidation
where
    I: ExactSizeIterator<Item = Option<&'a str>>,
{
    if items.len() > MAX_CATEGORIES_COUNT {
        return FieldValidation::invalid(format!(
            "Maximum {MAX_CATEGORIES_COUNT} categories allowed"
        ));
    }
    for (index, item) in items.enumerate() {
        let result = match item {
            Some(value) => validate_category(value, strict),
            None => FieldValidation::invalid("Category must be a non-empty string"),
        };
        if let Some(error) = result.error {
            return FieldValidation::invalid(format!("Category at index {index}: {error}"));
        }
    }
    FieldValidation::ok()
}

pub fn validate_categories<S: AsRef<str>>(categories: &[S], strict: bool) -> FieldValidation {
    validate_category_items(categories.iter().map(|c| Some(c.as_ref())), strict)
}

/// Untyped variant of [`validate_categories`] that also rejects non-arrays.
pub fn validate_categories_value(value: &Value, strict: bool) -> FieldValidation {
    match value.as_array() {
        Some(items) => validate_category_items(items.iter().map(Value::as_str), strict),
        None => FieldValidation::invalid("Categories must be an array"),
    }
}

pub fn validate_entry_draft(draft: &EntryDraft, strict_categories: bool) -> EntryValidation {
    EntryValidation::from_results([
        (Field::Name, validate_name(&draft.name)),
        (Field::ExecPath, validate_exec_path(&draft.exec_path)),
        (Field::IconPath, validate_icon_path(&draft.icon_path)),
        (Field::Description, validate_description(&draft.description)),
        (Field::Terminal, validate_terminal(&Value::Bool(draft.terminal))),
        (
            Field::Categories,
            validate_categories(draft.categories.as_slice(), strict_categories),
        ),
    ])
}

fn validate_string_value(
    value: &Value,
    field: Field,
    check: fn(&str) -> FieldValidation,
) -> FieldValidation {
    match value.get(field.as_str()).and_then(Value::as_str) {
        Some(text) => check(text),
        None => FieldValidation::invalid(format!("{} must be a string", field.label())),
    }
}

/// Validates an entry received as JSON, reporting wrong-typed or missing
/// fields instead of refusing to read them.
pub fn validate_entry_value(value: &Value, strict_categories: bool) -> EntryValidation {
    let terminal = value.get("terminal").unwrap_or(&Value::Null);
    let categories = value.get("categories").unwrap_or(&Value::Null);
    EntryValidation::from_results([
        (Field::Name, validate_string_value(value, Field::Name, validate_name)),
        (
            Field::ExecPath,
            validate_string_value(value, Field::ExecPath, validate_exec_path),
        ),
        (
            Field::IconPath,
            validate_string_value(value, Field::IconPath, validate_icon_path),
        ),
        (
            Field::Description,
            validate_string_value(value, Field::Description, validate_description),
        ),
        (Field::Terminal, validate_terminal(terminal)),
        (
            Field::Categories,
            validate_categories_value(categories, strict_categories),
        ),
    ])
}

/// Cheap gate on the two fields an entry cannot be saved without.
pub fn has_required_fields(draft: &EntryDraft) -> bool {
    validate_name(&draft.name).valid && validate_exec_path(&draft.exec_path).valid
}

/// Structural check that `value` has every draft field with the right type.
pub fn is_entry_draft(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let is_str = |key: &str| object.get(key).is_some_and(Value::is_string);

    is_str("name")
        && is_str("execPath")
        && is_str("iconPath")
        && is_str("description")
        && object.get("terminal").is_some_and(Value::is_boolean)
        && object
            .get("categories")
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().all(Value::is_string))
}

/// Like [`is_entry_draft`], additionally requiring the identity fields.
pub fn is_entry(value: &Value) -> bool {
    is_entry_draft(value)
        && ["id", "createdAt", "updatedAt"]
            .iter()
            .all(|key| value.get(key).is_some_and(Value::is_string))
}

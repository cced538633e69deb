//! Reading and writing managed `.desktop` files.
//!
//! [`parse`] is deliberately lenient about layout (malformed lines are
//! skipped, the last duplicate key wins) but strict about ownership: only
//! files carrying `X-DeskCrafter=true` are accepted. [`generate`] always
//! emits the same canonical line order.

use log::{debug, trace};
use serde::Deserialize;
use thiserror::Error;

use crate::model::{DEFAULT_CATEGORY, Entry, EntryDraft, EntryMetadata};
use crate::sanitize::{normalize_categories, sanitize_single_line};

pub const DESKTOP_ENTRY_HEADER: &str = "[Desktop Entry]";
pub const DESKTOP_ENTRY_VERSION: &str = "1.0";
pub const DESKTOP_ENTRY_TYPE: &str = "Application";
pub const MANAGED_FLAG_KEY: &str = "X-DeskCrafter";
pub const MANAGED_FLAG_VALUE: &str = "true";
pub const STARTUP_WM_CLASS: &str = "DeskCrafter";

const CATEGORY_SEPARATOR: &str = ";";
const KEY_VALUE_SEPARATOR: char = '=';
const COMMENT_PREFIX: char = '#';
const TERMINAL_TRUE: &str = "true";
const TERMINAL_FALSE: &str = "false";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Content must be text")]
    NotText,
    #[error("Not a DeskCrafter-managed desktop entry")]
    NotManaged,
}

/// Which optional lines [`generate`] writes.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    #[serde(default = "default_true")]
    pub include_managed_flag: bool,
    #[serde(default = "default_true")]
    pub include_try_exec: bool,
    #[serde(default = "default_true")]
    pub include_startup_class: bool,
}

fn default_true() -> bool { true }

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            include_managed_flag: true,
            include_try_exec: true,
            include_startup_class: true,
        }
    }
}

impl GenerateOptions {
    /// Applies command-line opt-outs on top of these options. A flag can only
    /// switch a line off; it never re-enables one the config disabled.
    pub fn with_overrides(self, no_managed_flag: bool, no_try_exec: bool, no_startup_class: bool) -> Self {
        Self {
            include_managed_flag: self.include_managed_flag && !no_managed_flag,
            include_try_exec: self.include_try_exec && !no_try_exec,
            include_startup_class: self.include_startup_class && !no_startup_class,
        }
    }
}

/// Keys the parser understands. Anything else is read and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Name,
    Comment,
    Exec,
    Icon,
    Categories,
    Terminal,
    ManagedFlag,
    Other,
}

impl Key {
    fn from_name(name: &str) -> Self {
        match name {
            "Name" => Key::Name,
            "Comment" => Key::Comment,
            "Exec" => Key::Exec,
            "Icon" => Key::Icon,
            "Categories" => Key::Categories,
            "Terminal" => Key::Terminal,
            MANAGED_FLAG_KEY => Key::ManagedFlag,
            _ => Key::Other,
        }
    }
}

#[derive(Debug, Default)]
struct RawFields {
    name: Option<String>,
    comment: Option<String>,
    exec: Option<String>,
    icon: Option<String>,
    categories: Option<String>,
    terminal: Option<String>,
    managed_flag: Option<String>,
}

impl RawFields {
    fn set(&mut self, key: Key, value: String) {
        let slot = match key {
            Key::Name => &mut self.name,
            Key::Comment => &mut self.comment,
            Key::Exec => &mut self.exec,
            Key::Icon => &mut self.icon,
            Key::Categories => &mut self.categories,
            Key::Terminal => &mut self.terminal,
            Key::ManagedFlag => &mut self.managed_flag,
            Key::Other => return,
        };
        *slot = Some(value);
    }

    fn read(content: &str) -> Self {
        let mut fields = Self::default();
        for (number, line) in content.lines().enumerate() {
            if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }
            let Some((key, value)) = line.split_once(KEY_VALUE_SEPARATOR) else {
                trace!("Skipping line {} without a key/value separator", number + 1);
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                trace!("Skipping line {} with an empty key", number + 1);
                continue;
            }
            fields.set(Key::from_name(key), value.trim().to_string());
        }
        fields
    }

    fn is_managed(&self) -> bool {
        self.managed_flag.as_deref() == Some(MANAGED_FLAG_VALUE)
    }

    fn into_draft(self) -> EntryDraft {
        let categories = self
            .categories
            .map(|raw| {
                let pieces: Vec<&str> = raw
                    .split(CATEGORY_SEPARATOR)
                    .filter(|piece| !piece.is_empty())
                    .collect();
                normalize_categories(&pieces[..])
            })
            .unwrap_or_default();

        EntryDraft {
            name: self.name.unwrap_or_default(),
            exec_path: self.exec.unwrap_or_default(),
            icon_path: self.icon.unwrap_or_default(),
            description: self.comment.unwrap_or_default(),
            terminal: self.terminal.as_deref() == Some(TERMINAL_TRUE),
            categories: or_default_category(categories),
        }
    }
}

fn or_default_category(categories: Vec<String>) -> Vec<String> {
    if categories.is_empty() {
        vec![DEFAULT_CATEGORY.to_string()]
    } else {
        categories
    }
}

/// Parses `.desktop` text into a draft.
///
/// Fails only when the text is not marked as managed; missing fields come
/// back empty and a missing or empty category list falls back to
/// [`DEFAULT_CATEGORY`].
pub fn parse(content: &str) -> Result<EntryDraft, ParseError> {
    let fields = RawFields::read(content);
    if !fields.is_managed() {
        debug!("Rejecting desktop entry without {}={}", MANAGED_FLAG_KEY, MANAGED_FLAG_VALUE);
        return Err(ParseError::NotManaged);
    }
    Ok(fields.into_draft())
}

/// Same as [`parse`] for raw file contents, failing with
/// [`ParseError::NotText`] when the bytes are not UTF-8.
pub fn parse_bytes(content: &[u8]) -> Result<EntryDraft, ParseError> {
    let text = std::str::from_utf8(content).map_err(|_| ParseError::NotText)?;
    parse(text)
}

/// Parses `content` and attaches identity and timestamps to the result.
pub fn parse_with_metadata(content: &str, metadata: EntryMetadata) -> Result<Entry, ParseError> {
    let draft = parse(content)?;
    Ok(Entry::from_parts(draft, metadata))
}

fn try_exec(exec_path: &str) -> &str {
    exec_path
        .split(' ')
        .find(|piece| !piece.is_empty())
        .unwrap_or("")
}

/// Serializes a draft into canonical `.desktop` text.
///
/// Every field is sanitized first, so the output never spans extra lines
/// whatever the draft contains.
pub fn generate(draft: &EntryDraft, options: &GenerateOptions) -> String {
    let name = sanitize_single_line(&draft.name);
    let comment = sanitize_single_line(&draft.description);
    let exec_path = sanitize_single_line(&draft.exec_path);
    let icon_path = sanitize_single_line(&draft.icon_path);
    let categories = or_default_category(normalize_categories(&draft.categories[..]));
    let terminal = if draft.terminal { TERMINAL_TRUE } else { TERMINAL_FALSE };

    let mut lines = vec![
        DESKTOP_ENTRY_HEADER.to_string(),
        format!("Version={DESKTOP_ENTRY_VERSION}"),
        format!("Type={DESKTOP_ENTRY_TYPE}"),
        format!("Name={name}"),
        format!("Comment={comment}"),
        format!("Exec={exec_path}"),
    ];

    let first_token = try_exec(&exec_path);
    if options.include_try_exec && !first_token.is_empty() {
        lines.push(format!("TryExec={first_token}"));
    }

    lines.push(format!("Icon={icon_path}"));
    lines.push(format!(
        "Categories={}{CATEGORY_SEPARATOR}",
        categories.join(CATEGORY_SEPARATOR)
    ));
    lines.push(format!("Terminal={terminal}"));

    if options.include_managed_flag {
        lines.push(format!("{MANAGED_FLAG_KEY}={MANAGED_FLAG_VALUE}"));
    }
    if options.include_startup_class {
        lines.push(format!("StartupWMClass={STARTUP_WM_CLASS}"));
    }

    // Trailing newline.
    lines.push(String::new());
    lines.join("\n")
}

/// Quick syntactic check: the first non-blank line is the header and at
/// least one line holds a `key=value` pair.
///
/// This does not look for the ownership marker, so foreign desktop files
/// pass here and are still rejected by [`parse`].
pub fn looks_like_valid_format(content: &str) -> bool {
    if content.trim().is_empty() {
        return false;
    }

    let first = content.lines().find(|line| !line.trim().is_empty());
    if first != Some(DESKTOP_ENTRY_HEADER) {
        return false;
    }

    content.lines().any(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty()
            && !trimmed.starts_with(COMMENT_PREFIX)
            && trimmed.find(KEY_VALUE_SEPARATOR).is_some_and(|index| index > 0)
    })
}

pub fn looks_like_valid_format_bytes(content: &[u8]) -> bool {
    std::str::from_utf8(content).is_ok_and(looks_like_valid_format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SAMPLE: &str = "[Desktop Entry]
Name=Test App
Exec=/usr/bin/test-app
Categories=Utility;Development;
Terminal=false
X-DeskCrafter=true
";

    fn draft() -> EntryDraft {
        EntryDraft {
            name: "My App".to_string(),
            exec_path: "/opt/app/bin/app --verbose".to_string(),
            icon_path: "/opt/app/icon.png".to_string(),
            description: "Does things".to_string(),
            terminal: true,
            categories: vec!["Development".to_string(), "Utility".to_string()],
        }
    }

    #[test]
    fn test_parse_sample() {
        let parsed = parse(SAMPLE).unwrap();
        assert_eq!(
            parsed,
            EntryDraft {
                name: "Test App".to_string(),
                exec_path: "/usr/bin/test-app".to_string(),
                icon_path: String::new(),
                description: String::new(),
                terminal: false,
                categories: vec!["Utility".to_string(), "Development".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_crlf() {
        let crlf = SAMPLE.replace('\n', "\r\n");
        assert_eq!(parse(&crlf).unwrap(), parse(SAMPLE).unwrap());
    }

    #[test]
    fn test_requires_managed_flag() {
        let foreign = "[Desktop Entry]\nName=Firefox\nExec=firefox %u\n";
        assert_eq!(parse(foreign), Err(ParseError::NotManaged));

        let wrong_value = SAMPLE.replace("X-DeskCrafter=true", "X-DeskCrafter=TRUE");
        assert_eq!(parse(&wrong_value), Err(ParseError::NotManaged));

        assert_eq!(parse(""), Err(ParseError::NotManaged));
    }

    #[test]
    fn test_managed_flag_value_is_trimmed() {
        let spaced = SAMPLE.replace("X-DeskCrafter=true", "X-DeskCrafter = true  ");
        assert!(parse(&spaced).is_ok());
    }

    #[test]
    fn test_terminal_only_exact_true() {
        for (raw, expected) in [
            ("true", true),
            ("false", false),
            ("True", false),
            ("TRUE", false),
            ("1", false),
            ("", false),
        ] {
            let text = SAMPLE.replace("Terminal=false", &format!("Terminal={raw}"));
            assert_eq!(parse(&text).unwrap().terminal, expected, "Terminal={raw}");
        }
        let missing = SAMPLE.replace("Terminal=false\n", "");
        assert!(!parse(&missing).unwrap().terminal);
    }

    #[test]
    fn test_missing_or_empty_categories_default() {
        let missing = SAMPLE.replace("Categories=Utility;Development;\n", "");
        assert_eq!(parse(&missing).unwrap().categories, vec![DEFAULT_CATEGORY]);

        let empty = SAMPLE.replace("Categories=Utility;Development;", "Categories=");
        assert_eq!(parse(&empty).unwrap().categories, vec![DEFAULT_CATEGORY]);

        let separators = SAMPLE.replace("Categories=Utility;Development;", "Categories=;; ;");
        assert_eq!(parse(&separators).unwrap().categories, vec![DEFAULT_CATEGORY]);
    }

    #[test]
    fn test_categories_normalized_on_parse() {
        let text = SAMPLE.replace(
            "Categories=Utility;Development;",
            "Categories=Game; Game ;;Office",
        );
        assert_eq!(parse(&text).unwrap().categories, vec!["Game", "Office"]);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let text = "[Desktop Entry]
this line has no separator
=orphan value
   = also orphan
Name=Still Works
X-DeskCrafter=true
";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.name, "Still Works");
    }

    #[test]
    fn test_comments_are_skipped() {
        let text = "#Name=Commented\n[Desktop Entry]\nName=Real\nX-DeskCrafter=true\n";
        assert_eq!(parse(text).unwrap().name, "Real");
    }

    #[test]
    fn test_last_duplicate_key_wins() {
        let text = format!("{SAMPLE}Name=Second\n");
        assert_eq!(parse(&text).unwrap().name, "Second");
    }

    #[test]
    fn test_value_keeps_later_separators() {
        let text = SAMPLE.replace("Exec=/usr/bin/test-app", "Exec=env FOO=bar /usr/bin/test-app");
        assert_eq!(parse(&text).unwrap().exec_path, "env FOO=bar /usr/bin/test-app");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let text = format!("{SAMPLE}NoDisplay=true\nName[de]=Test Anwendung\n");
        assert_eq!(parse(&text).unwrap().name, "Test App");
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        assert_eq!(parse_bytes(&[0xff, 0xfe, 0x00]), Err(ParseError::NotText));
        assert!(parse_bytes(SAMPLE.as_bytes()).is_ok());
    }

    #[test]
    fn test_parse_with_metadata() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let entry = parse_with_metadata(SAMPLE, EntryMetadata::new("test-app", now)).unwrap();
        assert_eq!(entry.id, "test-app");
        assert_eq!(entry.created_at, now);
        assert_eq!(entry.updated_at, now);
        assert_eq!(entry.draft, parse(SAMPLE).unwrap());

        let foreign = "[Desktop Entry]\nName=x\n";
        assert_eq!(
            parse_with_metadata(foreign, EntryMetadata::new("x", now)),
            Err(ParseError::NotManaged)
        );
    }

    #[test]
    fn test_generate_canonical_layout() {
        let text = generate(&draft(), &GenerateOptions::default());
        assert_eq!(
            text,
            "[Desktop Entry]
Version=1.0
Type=Application
Name=My App
Comment=Does things
Exec=/opt/app/bin/app --verbose
TryExec=/opt/app/bin/app
Icon=/opt/app/icon.png
Categories=Development;Utility;
Terminal=true
X-DeskCrafter=true
StartupWMClass=DeskCrafter
"
        );
    }

    #[test]
    fn test_generate_sanitizes_fields() {
        let messy = EntryDraft {
            name: "  Messy   Name  ".to_string(),
            exec_path: "/usr/bin/app\t--flag".to_string(),
            categories: vec!["Dev".to_string(), "Dev".to_string()],
            ..EntryDraft::default()
        };
        let text = generate(&messy, &GenerateOptions::default());
        assert!(text.contains("\nName=Messy Name\n"));
        assert!(text.contains("\nExec=/usr/bin/app --flag\n"));
        assert!(text.contains("\nCategories=Dev;\n"));
    }

    #[test]
    fn test_generate_collapses_newlines() {
        let sneaky = EntryDraft {
            name: "Evil\nX-DeskCrafter=false".to_string(),
            ..draft()
        };
        let text = generate(&sneaky, &GenerateOptions::default());
        assert!(text.contains("\nName=Evil X-DeskCrafter=false\n"));
        assert!(parse(&text).is_ok());
    }

    #[test]
    fn test_generate_empty_draft() {
        let text = generate(&EntryDraft::default(), &GenerateOptions::default());
        assert!(text.contains("\nName=\n"));
        assert!(text.contains("\nExec=\n"));
        assert!(!text.contains("TryExec="));
        assert!(text.contains("\nCategories=Utility;\n"));
        assert!(text.contains("\nTerminal=false\n"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_generate_respects_options() {
        let options = GenerateOptions {
            include_managed_flag: false,
            include_try_exec: false,
            include_startup_class: false,
        };
        let text = generate(&draft(), &options);
        assert!(!text.contains("X-DeskCrafter"));
        assert!(!text.contains("TryExec"));
        assert!(!text.contains("StartupWMClass"));
        assert!(text.ends_with("Terminal=true\n"));
        assert_eq!(parse(&text), Err(ParseError::NotManaged));
    }

    #[test]
    fn test_options_from_partial_config() {
        let options: GenerateOptions =
            toml::from_str("include_try_exec = false\nsomething_else = 3").unwrap();
        assert!(options.include_managed_flag);
        assert!(!options.include_try_exec);
        assert!(options.include_startup_class);
    }

    #[test]
    fn test_overrides_only_switch_lines_off() {
        let all = GenerateOptions::default();
        assert_eq!(all.with_overrides(false, false, false), all);

        let merged = all.with_overrides(true, false, true);
        assert!(!merged.include_managed_flag);
        assert!(merged.include_try_exec);
        assert!(!merged.include_startup_class);

        let from_config = GenerateOptions {
            include_try_exec: false,
            ..GenerateOptions::default()
        };
        assert!(!from_config.with_overrides(false, false, false).include_try_exec);
    }

    #[test]
    fn test_generate_partial_json_draft() {
        let draft: EntryDraft =
            serde_json::from_str(r#"{"name":"App","execPath":"/bin/app"}"#).unwrap();
        let text = generate(&draft, &GenerateOptions::default());
        assert!(text.contains("\nName=App\n"));
        assert!(text.contains("\nTryExec=/bin/app\n"));
        assert!(text.contains("\nIcon=\n"));
        assert!(text.contains("\nCategories=Utility;\n"));
        assert!(text.contains("\nTerminal=false\n"));
    }

    #[test]
    fn test_try_exec_skips_leading_spaces() {
        assert_eq!(try_exec("  /bin/app  --x"), "/bin/app");
        assert_eq!(try_exec(""), "");
    }

    #[test]
    fn test_round_trip() {
        let original = draft();
        let text = generate(&original, &GenerateOptions::default());
        assert_eq!(parse(&text).unwrap(), original);
    }

    #[test]
    fn test_format_precheck() {
        assert!(looks_like_valid_format(SAMPLE));
        assert!(looks_like_valid_format("\n\n[Desktop Entry]\nName=x"));
        assert!(!looks_like_valid_format(""));
        assert!(!looks_like_valid_format("   \n  "));
        assert!(!looks_like_valid_format("Name=x\n[Desktop Entry]\n"));
        assert!(!looks_like_valid_format("  [Desktop Entry]\nName=x"));
        assert!(!looks_like_valid_format("[Desktop Entry]\n# Name=x\n=x\n"));
        assert!(!looks_like_valid_format_bytes(&[0xff, 0xfe]));
    }

    #[test]
    fn test_precheck_ignores_ownership() {
        let foreign = "[Desktop Entry]\nName=Firefox\nExec=firefox %u\n";
        assert!(looks_like_valid_format(foreign));
        assert_eq!(parse(foreign), Err(ParseError::NotManaged));
    }
}

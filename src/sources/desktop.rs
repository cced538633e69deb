use crate::codec::{self, ParseError};
use crate::model::DEFAULT_ENTRY_NAME;
use crate::sanitize::sanitize_single_line;
use crate::sources::{ManagedEntry, Source};
use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use log::{info, debug, warn};

/// Finds the `.desktop` files this tool owns in a set of directories.
pub struct DesktopSource {
    dirs: Vec<PathBuf>,
}

impl DesktopSource {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }
}

impl Source for DesktopSource {
    fn scan(&self) -> Result<Vec<ManagedEntry>> {
        let mut entries = Vec::new();

        for dir in &self.dirs {
            if !dir.exists() {
                debug!("Applications directory {:?} does not exist, skipping", dir);
                continue;
            }
            debug!("Scanning desktop files in {:?}", dir);
            for entry in fs::read_dir(dir)?.flatten() {
                let path = entry.path();
                if !is_desktop_file(&path) {
                    continue;
                }
                let content = match fs::read(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        warn!("Could not read {:?}: {}", path, e);
                        continue;
                    }
                };
                match codec::parse_bytes(&content) {
                    Ok(draft) => entries.push(ManagedEntry { path, draft }),
                    Err(ParseError::NotManaged) => debug!("{:?} is not managed, skipping", path),
                    Err(ParseError::NotText) => warn!("{:?} is not valid text, skipping", path),
                }
            }
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        info!("DesktopSource: found {} managed entries", entries.len());
        Ok(entries)
    }
}

fn is_desktop_file(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("desktop")
}

/// Conventional file name for an entry, built from the same sanitized name
/// that goes on the `Name=` line: lowercased, spaces and path separators
/// replaced by underscores. Names that would be empty, `.` or `..` fall
/// back to [`DEFAULT_ENTRY_NAME`].
pub fn desktop_file_name(name: &str) -> String {
    let stem = file_stem(&sanitize_single_line(name));
    let stem = if matches!(stem.as_str(), "" | "." | "..") {
        file_stem(DEFAULT_ENTRY_NAME)
    } else {
        stem
    };
    format!("{}.desktop", stem)
}

fn file_stem(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| *c != '\0')
        .map(|c| if c == ' ' || c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

/// Where `generate --output` writes: inside `output` under the entry's file
/// name when it is a directory, otherwise `output` itself.
pub fn output_target(output: &Path, name: &str) -> PathBuf {
    if output.is_dir() {
        output.join(desktop_file_name(name))
    } else {
        output.to_path_buf()
    }
}

/// Writes launcher text to `target` and marks it executable (0755) so
/// desktop environments treat it as trusted.
pub fn write_desktop_file(target: &Path, content: &str) -> Result<()> {
    fs::write(target, content).with_context(|| format!("writing {}", target.display()))?;
    fs::set_permissions(target, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("setting permissions on {}", target.display()))?;
    info!("Wrote {:?}", target);
    Ok(())
}

//! Parameter-file editing.
//!
//! The code under test reads a `key = value` parameter file; each case
//! rewrites the recognized keys with the combination's chosen values
//! before the run. The transform itself is pure (content in, content
//! out) so it can be tested without touching the filesystem; the
//! orchestrator wraps it with backup-then-write.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::domain::models::Combination;

/// Rewrite every recognized `key = value` line with the combination's
/// chosen value. Unrecognized lines (including comments) pass through
/// byte-identical, and the input's trailing-newline state is kept.
/// Returns the new content and the number of lines rewritten.
pub fn apply_combination(content: &str, combination: &Combination) -> (String, usize) {
    let mut edited = 0usize;
    let mut out = String::with_capacity(content.len());

    for line in content.lines() {
        let trimmed = line.trim_start();
        let is_comment = trimmed.starts_with('#') || trimmed.starts_with('!');
        let rewritten = if is_comment {
            None
        } else {
            line.split_once('=').and_then(|(key_part, _)| {
                combination
                    .get(key_part.trim())
                    .map(|value| format!("{}= {}", key_part, value))
            })
        };

        match rewritten {
            Some(new_line) => {
                edited += 1;
                out.push_str(&new_line);
            }
            None => out.push_str(line),
        }
        out.push('\n');
    }
    if !content.ends_with('\n') {
        out.pop();
    }

    (out, edited)
}

/// Read back the values of `keys` from parameter-file content.
pub fn read_values(content: &str, keys: &[&str]) -> IndexMap<String, String> {
    let mut values = IndexMap::new();
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }
        if let Some((key_part, value_part)) = line.split_once('=') {
            let key = key_part.trim();
            if keys.contains(&key) {
                values.insert(key.to_string(), value_part.trim().to_string());
            }
        }
    }
    values
}

/// Apply a combination to the parameter file on disk.
///
/// A pristine backup (`<file>.orig`) is written once before the first
/// edit; subsequent cases re-edit from the backup so edits never stack.
pub fn edit_file(path: &Path, combination: &Combination) -> Result<usize> {
    let backup = backup_path(path);
    if !backup.exists() {
        let original = std::fs::read_to_string(path)
            .with_context(|| format!("reading parameter file {}", path.display()))?;
        std::fs::write(&backup, original)
            .with_context(|| format!("writing backup {}", backup.display()))?;
    }

    let base = std::fs::read_to_string(&backup)
        .with_context(|| format!("reading backup {}", backup.display()))?;
    let (edited, count) = apply_combination(&base, combination);
    std::fs::write(path, edited)
        .with_context(|| format!("writing parameter file {}", path.display()))?;
    Ok(count)
}

fn backup_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".orig");
    path.with_file_name(name)
}

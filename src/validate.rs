//! Pure validation of upload options and file selections.
//!
//! Both checks return `None` for "all clear" and `Some(errors)` otherwise,
//! leaving emission to the orchestrator. Error shapes serialize to the wire
//! format callers already consume: internally tagged on `type`, with the
//! violated rule and the offending value alongside.

use serde::Serialize;

use crate::config::{UploadOptions, UploadRules};
use crate::contract::FileDescriptor;

/// Sentinel `FileError::name` for errors about the options themselves.
pub const OPTIONS_ERROR_NAME: &str = "_options";

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuleError {
    /// File type matched none of the allowed MIME patterns.
    Type { rule: String, given: String },
    /// File size exceeded the configured ceiling.
    Size { rule: u64, given: u64 },
    /// No `reference` configured.
    RefRequired,
    /// No `script` (endpoint URL) configured.
    ScriptRequired,
}

/// All errors collected for one file (or for the options sentinel).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileError {
    pub name: String,
    pub errors: Vec<RuleError>,
}

fn options_error(error: RuleError) -> Vec<FileError> {
    vec![FileError {
        name: OPTIONS_ERROR_NAME.to_string(),
        errors: vec![error],
    }]
}

/// Check the options are complete enough to build a request. Reports exactly
/// one error per call, preferring a missing reference over a missing script.
pub fn validate_options(options: &UploadOptions) -> Option<Vec<FileError>> {
    if options.reference.as_deref().map_or(true, str::is_empty) {
        return Some(options_error(RuleError::RefRequired));
    }
    if options.script.as_deref().map_or(true, str::is_empty) {
        return Some(options_error(RuleError::ScriptRequired));
    }
    None
}

/// Run every configured rule over the selection. Files with no errors are
/// omitted; `None` means the whole selection passed. Entries preserve
/// selection order, and a file's errors come type rule first, size second.
pub fn validate_files(rules: &UploadRules, files: &[FileDescriptor]) -> Option<Vec<FileError>> {
    let failed: Vec<FileError> = files
        .iter()
        .filter_map(|file| {
            let mut errors = Vec::new();
            if let Some(allowed) = rules.allowed_file_types.as_deref() {
                errors.extend(allowed_file_type_check(allowed, file));
            }
            if let Some(max_size) = rules.max_size {
                errors.extend(max_size_check(max_size, file));
            }
            if errors.is_empty() {
                None
            } else {
                Some(FileError {
                    name: file.name.clone(),
                    errors,
                })
            }
        })
        .collect();

    if failed.is_empty() {
        None
    } else {
        Some(failed)
    }
}

/// Match the file's MIME type against a comma-separated pattern list.
/// A pattern ending in `/*` matches any subtype of its primary category.
pub fn allowed_file_type_check(rule: &str, file: &FileDescriptor) -> Option<RuleError> {
    let matched = rule.split(',').map(str::trim).any(|pattern| {
        match pattern.strip_suffix("/*") {
            Some(category) => file.content_type.split('/').next() == Some(category),
            None => file.content_type == pattern,
        }
    });

    if matched {
        None
    } else {
        Some(RuleError::Type {
            rule: rule.to_string(),
            given: file.content_type.clone(),
        })
    }
}

/// Sizes at the ceiling pass; only strictly larger files fail.
pub fn max_size_check(max_size: u64, file: &FileDescriptor) -> Option<RuleError> {
    if file.size > max_size {
        Some(RuleError::Size {
            rule: max_size,
            given: file.size,
        })
    } else {
        None
    }
}

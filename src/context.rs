//! Per-dispatcher request context.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FILE_EXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.([^./\\]+)$").expect("valid regex"));

/// Extract the file type (extension without the dot) from a path.
///
/// Only the final path component is considered, so `src.d/Makefile` has no
/// file type. Returns an empty string when there is no extension.
pub fn extract_file_type(file_path: &str) -> String {
    let name = file_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_path);

    FILE_EXT
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// State derived from the most recent request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub file_path: String,
    pub file_type: String,
    pub user_query: String,
    pub last_persona: Option<String>,
    pub last_command: Option<String>,
}

impl Context {
    /// Record a new file path and re-derive the file type
    pub fn set_file_path(&mut self, file_path: &str) {
        self.file_path = file_path.to_string();
        self.file_type = extract_file_type(file_path);
    }

    pub fn set_user_query(&mut self, user_query: &str) {
        self.user_query = user_query.to_string();
    }

    /// Record a command hit; clears the persona
    pub fn record_command(&mut self, key: &str) {
        self.last_command = Some(key.to_string());
        self.last_persona = None;
    }

    /// Record a persona selection; clears the command
    pub fn record_persona(&mut self, key: &str) {
        self.last_persona = Some(key.to_string());
        self.last_command = None;
    }
}

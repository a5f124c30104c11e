//! Persona file loader.
//!
//! Loads persona profiles from a directory of Markdown files. Each file has
//! YAML frontmatter with the match rules; the Markdown body is the prompt
//! template.
//!
//! ```text
//! ---
//! key: ops
//! display_name: Ops
//! extensions: [tf, yml]
//! keywords: [deploy, terraform]
//! order: 10
//! ---
//! You are an operations engineer. {{query}}
//! ```

use crate::config::PersonaProfile;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Parsed YAML frontmatter from a persona file
#[derive(Debug, Deserialize)]
struct PersonaFrontmatter {
    key: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    order: i32,
}

/// Split YAML frontmatter from the Markdown body
fn parse_frontmatter<T: for<'de> Deserialize<'de>>(content: &str) -> Result<(T, String), String> {
    let content = content.trim();
    if !content.starts_with("---") {
        return Err("Missing YAML frontmatter delimiter".to_string());
    }

    let after_first = &content[3..];
    let end_pos = after_first
        .find("\n---")
        .ok_or_else(|| "Missing closing YAML frontmatter delimiter".to_string())?;

    let yaml_str = &after_first[..end_pos];
    let body_start = end_pos + 4; // Skip "\n---"
    let body = after_first[body_start..].trim().to_string();

    let frontmatter: T = serde_yaml::from_str(yaml_str)
        .map_err(|e| format!("Failed to parse YAML frontmatter: {}", e))?;

    Ok((frontmatter, body))
}

/// Load a single persona file, returning its sort order with the profile
pub fn load_persona_file(path: &Path) -> Result<(i32, PersonaProfile), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let (frontmatter, body): (PersonaFrontmatter, String) =
        parse_frontmatter(&content).map_err(|message| ConfigError::Frontmatter {
            path: path.to_path_buf(),
            message,
        })?;

    if body.is_empty() {
        return Err(ConfigError::Frontmatter {
            path: path.to_path_buf(),
            message: "Persona template body is empty".to_string(),
        });
    }

    // Use display_name if provided, otherwise capitalize the key
    let display_name = frontmatter.display_name.unwrap_or_else(|| {
        let mut chars = frontmatter.key.chars();
        match chars.next() {
            None => String::new(),
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        }
    });

    Ok((
        frontmatter.order,
        PersonaProfile {
            key: frontmatter.key,
            display_name,
            description: frontmatter.description,
            extensions: frontmatter.extensions,
            keywords: frontmatter.keywords,
            template: body,
        },
    ))
}

/// Load every `*.md` persona in a directory, sorted by `order` then file name
pub fn load_persona_dir(dir: &Path) -> Result<Vec<PersonaProfile>, ConfigError> {
    let entries = fs::read_dir(dir).map_err(|source| ConfigError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().map(|e| e == "md").unwrap_or(false) {
            paths.push(path);
        }
    }
    // read_dir order is platform dependent
    paths.sort();

    let mut loaded = Vec::with_capacity(paths.len());
    for path in &paths {
        loaded.push(load_persona_file(path)?);
    }

    // Stable sort keeps file-name order within equal `order` values
    loaded.sort_by_key(|(order, _)| *order);

    tracing::debug!(dir = %dir.display(), count = loaded.len(), "Loaded persona files");

    Ok(loaded.into_iter().map(|(_, profile)| profile).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frontmatter() {
        let content = r#"---
key: test
order: 1
keywords: [alpha, beta]
---

This is the body content."#;

        let (fm, body): (PersonaFrontmatter, String) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.key, "test");
        assert_eq!(fm.order, 1);
        assert_eq!(fm.keywords, vec!["alpha", "beta"]);
        assert_eq!(body, "This is the body content.");
    }

    #[test]
    fn test_parse_frontmatter_missing_delimiter() {
        let result: Result<(PersonaFrontmatter, String), String> =
            parse_frontmatter("key: test\nbody");
        assert!(result.is_err());

        let result: Result<(PersonaFrontmatter, String), String> =
            parse_frontmatter("---\nkey: test\nbody");
        assert!(result.unwrap_err().contains("closing"));
    }

    #[test]
    fn test_load_persona_file_capitalizes_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ops.md");
        fs::write(&path, "---\nkey: ops\nextensions: [tf]\n---\nOps {{query}}").unwrap();

        let (order, profile) = load_persona_file(&path).unwrap();
        assert_eq!(order, 0);
        assert_eq!(profile.display_name, "Ops");
        assert_eq!(profile.extensions, vec!["tf"]);
        assert_eq!(profile.template, "Ops {{query}}");
    }

    #[test]
    fn test_load_persona_file_empty_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.md");
        fs::write(&path, "---\nkey: empty\n---\n").unwrap();

        assert!(matches!(
            load_persona_file(&path),
            Err(ConfigError::Frontmatter { .. })
        ));
    }

    #[test]
    fn test_load_persona_dir_ordering() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "---\nkey: b\norder: 1\n---\nB").unwrap();
        fs::write(dir.path().join("a.md"), "---\nkey: a\norder: 1\n---\nA").unwrap();
        fs::write(dir.path().join("z.md"), "---\nkey: z\norder: -5\n---\nZ").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let personas = load_persona_dir(dir.path()).unwrap();
        let keys: Vec<_> = personas.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "b"]);
    }

    #[test]
    fn test_load_persona_dir_missing() {
        let err = load_persona_dir(Path::new("/nonexistent/personas")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

//! Persona and command configuration.
//!
//! A `Config` is the raw, deserializable form (TOML file or built-in
//! defaults). It becomes usable only after `Catalog::new` validates it;
//! the rest of the crate only ever sees a `Catalog`.

use crate::error::ConfigError;
use crate::persona::loader;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "PROMPTROUTE_CONFIG";

/// Weights used when scoring personas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScoringWeights {
    /// Added once when the file extension is in the persona's list
    #[serde(default = "default_extension_weight")]
    pub extension: u32,
    /// Added per keyword found in the query text
    #[serde(default = "default_keyword_weight")]
    pub keyword: u32,
}

fn default_extension_weight() -> u32 {
    2
}

fn default_keyword_weight() -> u32 {
    1
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            extension: default_extension_weight(),
            keyword: default_keyword_weight(),
        }
    }
}

/// A persona: match rules plus a prompt template
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PersonaProfile {
    pub key: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// File extensions without the leading dot
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Case-insensitive substrings searched for in the query
    #[serde(default)]
    pub keywords: Vec<String>,
    pub template: String,
}

/// A slash command: trigger token plus a prompt template
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommandSpec {
    pub key: String,
    #[serde(default)]
    pub display_name: String,
    pub trigger: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub template: String,
}

/// Raw configuration as written in a config file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Persona used when nothing scores above zero (first persona if unset)
    #[serde(default)]
    pub default_persona: Option<String>,
    #[serde(default)]
    pub scoring: ScoringWeights,
    #[serde(default)]
    pub personas: Vec<PersonaProfile>,
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
    /// Directory of Markdown persona files appended after `personas`
    #[serde(default)]
    pub persona_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration, searching the usual locations.
    ///
    /// Order: `$PROMPTROUTE_CONFIG`, `<config dir>/promptroute/config.toml`,
    /// `.promptroute/config.toml` in the working directory, then the
    /// built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::builtin()),
        }
    }

    /// Load configuration from a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if let Some(dir) = config.persona_dir.clone() {
            let dir = if dir.is_relative() {
                path.parent().unwrap_or_else(|| Path::new(".")).join(dir)
            } else {
                dir
            };
            config.personas.extend(loader::load_persona_dir(&dir)?);
        }

        tracing::debug!(
            path = %path.display(),
            personas = config.personas.len(),
            commands = config.commands.len(),
            "Loaded configuration"
        );

        Ok(config)
    }

    /// The configuration shipped with the crate
    pub fn builtin() -> Self {
        crate::defaults::builtin_config()
    }
}

/// Find the config file to load, if any
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    if let Some(dir) = dirs::config_dir() {
        let path = dir.join("promptroute").join("config.toml");
        if path.exists() {
            return Some(path);
        }
    }

    let local = PathBuf::from(".promptroute").join("config.toml");
    if local.exists() {
        return Some(local);
    }

    None
}

/// Validated, immutable configuration
#[derive(Debug, Clone)]
pub struct Catalog {
    personas: Vec<PersonaProfile>,
    commands: Vec<CommandSpec>,
    default_persona: usize,
    scoring: ScoringWeights,
}

impl Catalog {
    /// Validate a raw config.
    ///
    /// Extensions are lowercased with any leading dot removed, keywords
    /// and triggers are lowercased, and empty display names fall back to
    /// the key.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        if config.personas.is_empty() {
            return Err(ConfigError::NoPersonas);
        }
        if config.commands.is_empty() {
            return Err(ConfigError::NoCommands);
        }

        let mut seen = HashSet::new();
        let mut personas = Vec::with_capacity(config.personas.len());
        for mut persona in config.personas {
            if !seen.insert(persona.key.clone()) {
                return Err(ConfigError::DuplicatePersona(persona.key));
            }
            persona.extensions = persona
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect();
            persona.keywords = persona
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            if persona.display_name.is_empty() {
                persona.display_name = persona.key.clone();
            }
            personas.push(persona);
        }

        let mut seen = HashSet::new();
        let mut commands = Vec::with_capacity(config.commands.len());
        for mut command in config.commands {
            if !seen.insert(command.key.clone()) {
                return Err(ConfigError::DuplicateCommand(command.key));
            }
            command.trigger = command.trigger.trim().to_lowercase();
            if command.trigger.is_empty() {
                return Err(ConfigError::EmptyTrigger(command.key));
            }
            command.aliases = command
                .aliases
                .iter()
                .map(|a| a.trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect();
            if command.display_name.is_empty() {
                command.display_name = command.key.clone();
            }
            commands.push(command);
        }

        let default_persona = match config.default_persona {
            None => 0,
            Some(key) => personas
                .iter()
                .position(|p| p.key == key)
                .ok_or(ConfigError::UnknownDefaultPersona(key))?,
        };

        Ok(Self {
            personas,
            commands,
            default_persona,
            scoring: config.scoring,
        })
    }

    /// Personas in declaration order
    pub fn personas(&self) -> &[PersonaProfile] {
        &self.personas
    }

    /// Commands in declaration order
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn default_persona(&self) -> &PersonaProfile {
        &self.personas[self.default_persona]
    }

    pub fn scoring(&self) -> ScoringWeights {
        self.scoring
    }

    /// Look up a persona by key
    pub fn persona(&self, key: &str) -> Option<&PersonaProfile> {
        self.personas.iter().find(|p| p.key == key)
    }

    /// Look up a command by key
    pub fn command(&self, key: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|c| c.key == key)
    }
}

impl TryFrom<Config> for Catalog {
    type Error = ConfigError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        Catalog::new(config)
    }
}

//! Slash command detection and prompt rendering.

use crate::config::{Catalog, CommandSpec};
use crate::template::render_template;
use serde::Serialize;

/// Command summary exposed to hosts for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandListing {
    pub key: String,
    pub display_name: String,
    pub trigger: String,
    pub description: String,
}

/// Result of command detection and rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandMatch {
    pub command: String,
    pub prompt: String,
}

/// Detects commands in user text and renders their templates
pub struct CommandHandler<'a> {
    catalog: &'a Catalog,
}

impl<'a> CommandHandler<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Find the first command whose trigger or alias is a token of the text.
    ///
    /// Tokens are whitespace-delimited and compared case-insensitively, so
    /// both `/test foo` and `please /test foo` match `/test`.
    pub fn detect_command(&self, user_text: &str) -> Option<&'a CommandSpec> {
        let tokens: Vec<String> = user_text
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if tokens.is_empty() {
            return None;
        }

        self.catalog
            .commands()
            .iter()
            .find(|command| tokens.iter().any(|t| matches_trigger(command, t)))
    }

    /// Detect and render in one step
    pub fn match_command(&self, user_text: &str) -> Option<CommandMatch> {
        let command = self.detect_command(user_text)?;
        Some(CommandMatch {
            command: command.key.clone(),
            prompt: self.generate_command_prompt(&command.key, user_text),
        })
    }

    /// Render a command's template for the given text.
    ///
    /// The first trigger token is stripped and the remainder becomes
    /// `{{args}}`. An unknown command name returns the text unchanged.
    pub fn generate_command_prompt(&self, name: &str, user_text: &str) -> String {
        let Some(command) = self.catalog.command(name) else {
            tracing::warn!(command = name, "Unknown command, passing input through");
            return user_text.to_string();
        };

        let args = strip_trigger(command, user_text);
        let help = if command.template.contains("{{help}}") {
            self.generate_help_text()
        } else {
            String::new()
        };

        render_template(
            &command.template,
            &[
                ("command", command.display_name.as_str()),
                ("help", help.as_str()),
                ("args", args.as_str()),
                ("query", user_text),
            ],
        )
    }

    /// All commands in declaration order
    pub fn commands_list(&self) -> Vec<CommandListing> {
        self.catalog
            .commands()
            .iter()
            .map(|c| CommandListing {
                key: c.key.clone(),
                display_name: c.display_name.clone(),
                trigger: c.trigger.clone(),
                description: c.description.clone(),
            })
            .collect()
    }

    /// Formatted list of triggers and descriptions
    pub fn generate_help_text(&self) -> String {
        let commands = self.catalog.commands();
        let width = commands.iter().map(|c| c.trigger.chars().count()).max().unwrap_or(0);

        let mut lines = vec!["Available commands:".to_string()];
        for command in commands {
            lines.push(format!(
                "  {:<width$}  - {}",
                command.trigger,
                command.description,
                width = width
            ));
        }
        lines.join("\n")
    }
}

fn matches_trigger(command: &CommandSpec, token: &str) -> bool {
    command.trigger == token || command.aliases.iter().any(|a| a == token)
}

/// Remove the first token naming this command and trim what remains.
///
/// Everything around the removed token is kept as typed, including
/// line breaks and indentation.
fn strip_trigger(command: &CommandSpec, user_text: &str) -> String {
    let mut start = None;
    let boundaries = user_text
        .char_indices()
        .chain(std::iter::once((user_text.len(), ' ')));

    for (i, c) in boundaries {
        if !c.is_whitespace() {
            start.get_or_insert(i);
            continue;
        }
        let Some(s) = start.take() else {
            continue;
        };
        if matches_trigger(command, &user_text[s..i].to_lowercase()) {
            let mut rest = String::with_capacity(user_text.len() - (i - s));
            rest.push_str(&user_text[..s]);
            rest.push_str(&user_text[i..]);
            return rest.trim().to_string();
        }
    }

    user_text.trim().to_string()
}

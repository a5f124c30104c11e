//! Persona scoring.
//!
//! Each persona earns the extension weight once if the file type is in its
//! extension list, plus the keyword weight for every keyword found in the
//! query. The highest score wins; ties go to the persona declared first.
//! When nothing scores, the catalog's default persona is used.

use crate::config::{Catalog, PersonaProfile};
use crate::context::extract_file_type;
use crate::template::render_template;
use serde::Serialize;

/// Result of persona selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaMatch {
    /// Key of the selected persona
    pub persona: String,
    /// Combined score; zero means the default persona was used
    pub score: u32,
    /// Rendered persona prompt
    pub prompt: String,
}

/// Selects the best persona for a file and query
pub struct PersonaSelector<'a> {
    catalog: &'a Catalog,
}

impl<'a> PersonaSelector<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Score a single persona against a file type and lowercased query
    fn score(&self, persona: &PersonaProfile, file_type: &str, query: &str) -> u32 {
        let weights = self.catalog.scoring();
        let mut score = 0;

        if !file_type.is_empty() && persona.extensions.iter().any(|e| e == file_type) {
            score += weights.extension;
        }

        let hits = persona
            .keywords
            .iter()
            .filter(|k| query.contains(k.as_str()))
            .count() as u32;
        score += hits * weights.keyword;

        score
    }

    /// Pick the best persona and render its prompt. Never fails.
    pub fn select_optimal_persona(&self, file_path: &str, user_text: &str) -> PersonaMatch {
        let file_type = extract_file_type(file_path);
        let normalized_type = file_type.to_lowercase();
        let query = user_text.to_lowercase();

        let mut best: Option<(&PersonaProfile, u32)> = None;
        for persona in self.catalog.personas() {
            let score = self.score(persona, &normalized_type, &query);
            // Strict comparison keeps the earliest persona on ties
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((persona, score));
            }
        }

        let (persona, score) = best.unwrap_or((self.catalog.default_persona(), 0));

        tracing::debug!(persona = %persona.key, score, file_type = %file_type, "Selected persona");

        PersonaMatch {
            persona: persona.key.clone(),
            score,
            prompt: render_persona(persona, file_path, &file_type, user_text),
        }
    }

    /// Render the prompt for a selection.
    ///
    /// The match already carries a rendered prompt; this re-renders from the
    /// catalog so callers holding only a key get the same text.
    pub fn generate_persona_prompt(
        &self,
        selected: &PersonaMatch,
        file_path: &str,
        user_text: &str,
    ) -> String {
        match self.catalog.persona(&selected.persona) {
            Some(persona) => {
                render_persona(persona, file_path, &extract_file_type(file_path), user_text)
            }
            None => user_text.to_string(),
        }
    }
}

fn render_persona(
    persona: &PersonaProfile,
    file_path: &str,
    file_type: &str,
    user_text: &str,
) -> String {
    render_template(
        &persona.template,
        &[
            ("persona_name", persona.display_name.as_str()),
            ("file_path", file_path),
            ("file_type", file_type),
            ("query", user_text),
        ],
    )
}

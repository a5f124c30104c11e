//! Persona selection.
//!
//! A persona is a behavior profile chosen per request from the active file's
//! type and the words in the user's query:
//! - `selector`: scores personas and renders the winner's template
//! - `loader`: reads persona profiles from Markdown files with YAML frontmatter

pub mod loader;
pub mod selector;

pub use loader::load_persona_dir;
pub use selector::{PersonaMatch, PersonaSelector};

use crate::config::PersonaProfile;
use serde::Serialize;

/// Persona summary exposed to hosts for listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaListing {
    pub key: String,
    pub display_name: String,
    pub description: String,
    pub extensions: Vec<String>,
    pub keywords: Vec<String>,
    pub template: String,
}

impl From<&PersonaProfile> for PersonaListing {
    fn from(profile: &PersonaProfile) -> Self {
        Self {
            key: profile.key.clone(),
            display_name: profile.display_name.clone(),
            description: profile.description.clone(),
            extensions: profile.extensions.clone(),
            keywords: profile.keywords.clone(),
            template: profile.template.clone(),
        }
    }
}

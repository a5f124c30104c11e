//! JSON protocol between a host runtime and the dispatcher.
//! One request per line in, one response per line out (NDJSON).

use crate::commands::CommandListing;
use crate::context::Context;
use crate::error::DispatchError;
use crate::persona::PersonaListing;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request from the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Action name, e.g. `processInput`
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub user_text: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    /// Reserved for host-specific flags; accepted and ignored
    #[serde(default)]
    pub options: Option<Value>,
}

impl Request {
    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn new(action: Action) -> Self {
        Self {
            action: action.as_str().to_string(),
            ..Default::default()
        }
    }

    /// Create a processInput request
    pub fn process_input(user_text: &str, file_path: &str) -> Self {
        Self {
            action: Action::ProcessInput.as_str().to_string(),
            user_text: Some(user_text.to_string()),
            file_path: Some(file_path.to_string()),
            options: None,
        }
    }
}

/// Actions the dispatcher understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ProcessInput,
    GetPersonas,
    GetCommands,
    GenerateHelp,
    Reset,
}

impl Action {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "processInput" => Some(Action::ProcessInput),
            "getPersonas" => Some(Action::GetPersonas),
            "getCommands" => Some(Action::GetCommands),
            "generateHelp" => Some(Action::GenerateHelp),
            "reset" => Some(Action::Reset),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ProcessInput => "processInput",
            Action::GetPersonas => "getPersonas",
            Action::GetCommands => "getCommands",
            Action::GenerateHelp => "generateHelp",
            Action::Reset => "reset",
        }
    }
}

/// Payload of a response; flattened next to `success`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Prompt {
        prompt: String,
        context: Context,
    },
    Personas {
        personas: Vec<PersonaListing>,
    },
    Commands {
        commands: Vec<CommandListing>,
    },
    Help {
        #[serde(rename = "helpText")]
        help_text: String,
    },
    Message {
        message: String,
    },
    Error {
        error: String,
    },
}

/// Uniform response shape: `{"success": bool, ...data}`
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(flatten)]
    pub data: ResponseData,
}

impl Response {
    pub fn ok(data: ResponseData) -> Self {
        Self {
            success: true,
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: ResponseData::Error {
                error: message.into(),
            },
        }
    }

    /// Error message, if this is a failure response
    pub fn error_message(&self) -> Option<&str> {
        match &self.data {
            ResponseData::Error { error } => Some(error),
            _ => None,
        }
    }

    /// Serialize to NDJSON line (with trailing newline)
    pub fn to_ndjson(&self) -> Result<String, DispatchError> {
        let mut json = serde_json::to_string(self)?;
        json.push('\n');
        Ok(json)
    }
}

//! Request dispatcher.
//!
//! Owns the validated catalog and the request context. The catalog is
//! built lazily on first use; until that succeeds every input passes
//! through unchanged. Faults never cross `handle_request`: they come back
//! as `{"success": false, "error": ...}` responses.

use crate::commands::CommandHandler;
use crate::config::{Catalog, Config};
use crate::context::Context;
use crate::error::{ConfigError, DispatchError};
use crate::logging::{report_failure, LogProfile};
use crate::persona::{PersonaListing, PersonaSelector};
use crate::protocol::{Action, Request, Response, ResponseData};
use once_cell::unsync::OnceCell;

/// Routes user input to command or persona prompts
pub struct Dispatcher {
    config: Config,
    catalog: OnceCell<Catalog>,
    context: Context,
    profile: LogProfile,
}

/// Validate the config into the cell on first call
fn load_catalog<'c>(
    cell: &'c OnceCell<Catalog>,
    config: &Config,
    profile: LogProfile,
) -> Result<&'c Catalog, ConfigError> {
    if let Some(catalog) = cell.get() {
        return Ok(catalog);
    }

    tracing::info!("Initializing");
    let result = cell.get_or_try_init(|| Catalog::new(config.clone()));
    match &result {
        Ok(catalog) => tracing::info!(
            personas = catalog.personas().len(),
            commands = catalog.commands().len(),
            "Initialized successfully"
        ),
        Err(e) => report_failure(profile, "Configuration is invalid", e),
    }
    result
}

impl Dispatcher {
    /// Create an uninitialized dispatcher; the config is validated on first use
    pub fn new(config: Config, profile: LogProfile) -> Self {
        Self {
            config,
            catalog: OnceCell::new(),
            context: Context::default(),
            profile,
        }
    }

    /// Create a dispatcher around an already validated catalog
    pub fn from_catalog(catalog: Catalog, profile: LogProfile) -> Self {
        Self {
            config: Config::default(),
            catalog: OnceCell::with_value(catalog),
            context: Context::default(),
            profile,
        }
    }

    /// Validate the configuration. Returns false and logs on failure.
    pub fn initialize(&mut self) -> bool {
        load_catalog(&self.catalog, &self.config, self.profile).is_ok()
    }

    pub fn is_initialized(&self) -> bool {
        self.catalog.get().is_some()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn profile(&self) -> LogProfile {
        self.profile
    }

    /// Restore the context to its initial empty state
    pub fn reset(&mut self) {
        self.context = Context::default();
    }

    /// Turn user input into a prompt, or return it unchanged if the
    /// dispatcher cannot initialize.
    pub fn process_user_input(&mut self, user_text: &str, file_path: &str) -> String {
        match self.try_process_user_input(user_text, file_path) {
            Ok(prompt) => prompt,
            Err(_) => user_text.to_string(),
        }
    }

    /// Like `process_user_input`, but reports initialization failure.
    ///
    /// Commands take precedence over persona selection.
    pub fn try_process_user_input(
        &mut self,
        user_text: &str,
        file_path: &str,
    ) -> Result<String, DispatchError> {
        let catalog = load_catalog(&self.catalog, &self.config, self.profile)?;

        self.context.set_user_query(user_text);
        self.context.set_file_path(file_path);

        let commands = CommandHandler::new(catalog);
        if let Some(matched) = commands.match_command(user_text) {
            tracing::info!(command = %matched.command, "Command detected");
            self.context.record_command(&matched.command);
            return Ok(matched.prompt);
        }

        let selected = PersonaSelector::new(catalog).select_optimal_persona(file_path, user_text);
        tracing::info!(persona = %selected.persona, score = selected.score, "Persona selected");
        self.context.record_persona(&selected.persona);
        Ok(selected.prompt)
    }

    /// Single entry point for hosts. Never fails; errors become failure responses.
    pub fn handle_request(&mut self, request: &Request) -> Response {
        match self.try_handle(request) {
            Ok(data) => Response::ok(data),
            Err(e) => {
                tracing::warn!(action = %request.action, "Request failed: {}", e);
                Response::error(e.to_string())
            }
        }
    }

    /// Parse a JSON request line and handle it
    pub fn handle_json(&mut self, line: &str) -> Response {
        match Request::from_json(line) {
            Ok(request) => self.handle_request(&request),
            Err(e) => Response::error(DispatchError::InvalidRequest(e.to_string()).to_string()),
        }
    }

    fn try_handle(&mut self, request: &Request) -> Result<ResponseData, DispatchError> {
        let action = Action::parse(&request.action)
            .ok_or_else(|| DispatchError::UnknownAction(request.action.clone()))?;

        match action {
            Action::ProcessInput => {
                let user_text = request.user_text.as_deref().unwrap_or("");
                let file_path = request.file_path.as_deref().unwrap_or("");
                let prompt = self.process_user_input(user_text, file_path);
                Ok(ResponseData::Prompt {
                    prompt,
                    context: self.context.clone(),
                })
            }
            Action::GetPersonas => {
                let catalog = load_catalog(&self.catalog, &self.config, self.profile)?;
                Ok(ResponseData::Personas {
                    personas: catalog.personas().iter().map(PersonaListing::from).collect(),
                })
            }
            Action::GetCommands => {
                let catalog = load_catalog(&self.catalog, &self.config, self.profile)?;
                Ok(ResponseData::Commands {
                    commands: CommandHandler::new(catalog).commands_list(),
                })
            }
            Action::GenerateHelp => {
                let catalog = load_catalog(&self.catalog, &self.config, self.profile)?;
                Ok(ResponseData::Help {
                    help_text: CommandHandler::new(catalog).generate_help_text(),
                })
            }
            Action::Reset => {
                self.reset();
                Ok(ResponseData::Message {
                    message: "Context reset".to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommandSpec, PersonaProfile};
    use serde_json::Value;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Config::builtin(), LogProfile::Standard)
    }

    fn to_json(resp: &Response) -> Value {
        serde_json::to_value(resp).unwrap()
    }

    #[test]
    fn test_lazy_initialization() {
        let mut d = dispatcher();
        assert!(!d.is_initialized());
        d.process_user_input("hello", "");
        assert!(d.is_initialized());
    }

    #[test]
    fn test_persona_path_sets_context() {
        let mut d = dispatcher();
        let prompt = d.process_user_input("explain this function", "app.ts");

        assert!(prompt.contains("frontend engineer"));
        assert!(prompt.contains("explain this function"));
        let ctx = d.context();
        assert_eq!(ctx.file_type, "ts");
        assert_eq!(ctx.file_path, "app.ts");
        assert_eq!(ctx.user_query, "explain this function");
        assert_eq!(ctx.last_persona.as_deref(), Some("frontend"));
        assert!(ctx.last_command.is_none());
    }

    #[test]
    fn test_command_takes_precedence() {
        let mut d = dispatcher();
        d.process_user_input("explain", "app.ts");
        assert!(d.context().last_persona.is_some());

        // Matches the /test command and the qa/security persona keywords
        let prompt = d.process_user_input("/test the auth security module", "app.ts");
        assert!(prompt.starts_with("Write focused tests"));
        assert!(prompt.ends_with("the auth security module"));
        assert_eq!(d.context().last_command.as_deref(), Some("test"));
        assert!(d.context().last_persona.is_none());
    }

    #[test]
    fn test_command_keeps_pasted_code_layout() {
        let mut d = dispatcher();
        let code = "fn add(a: i32) -> i32 {\n    a + 1\n}";
        let prompt = d.process_user_input(&format!("/refactor\n{}\n", code), "lib.rs");
        assert!(prompt.ends_with(&format!("Code: {}", code)));
        assert_eq!(d.context().last_command.as_deref(), Some("improve"));
    }

    #[test]
    fn test_help_command_returns_help_text() {
        let mut d = dispatcher();
        let prompt = d.process_user_input("/help", "");
        let catalog = Catalog::new(Config::builtin()).unwrap();
        assert_eq!(prompt, CommandHandler::new(&catalog).generate_help_text());
        assert_eq!(d.context().last_command.as_deref(), Some("help"));
    }

    #[test]
    fn test_empty_input_uses_default_persona() {
        let mut d = dispatcher();
        d.process_user_input("", "");
        assert_eq!(d.context().last_persona.as_deref(), Some("general"));
        assert_eq!(d.context().file_type, "");
    }

    #[test]
    fn test_invalid_config_passes_through() {
        let config = Config {
            personas: vec![PersonaProfile {
                key: "only".to_string(),
                display_name: String::new(),
                description: String::new(),
                extensions: vec!["js".to_string()],
                keywords: vec![],
                template: "persona".to_string(),
            }],
            ..Default::default()
        };
        let mut d = Dispatcher::new(config, LogProfile::Production);

        assert!(!d.initialize());
        assert_eq!(d.process_user_input("hi", "x.js"), "hi");
        assert!(!d.is_initialized());
        assert_eq!(d.context(), &Context::default());

        let err = d.try_process_user_input("hi", "x.js").unwrap_err();
        assert!(matches!(
            err,
            DispatchError::NotInitialized(ConfigError::NoCommands)
        ));
    }

    #[test]
    fn test_handle_process_input() {
        let mut d = dispatcher();
        let resp = d.handle_request(&Request::process_input("optimize this slow query, latency is high", "db.sql"));
        let json = to_json(&resp);

        assert_eq!(json["success"], true);
        assert!(json["prompt"].as_str().unwrap().contains("latency is high"));
        assert_eq!(json["context"]["fileType"], "sql");
        assert_eq!(json["context"]["lastPersona"], "performance");
        assert_eq!(json["context"]["lastCommand"], Value::Null);
    }

    #[test]
    fn test_handle_process_input_missing_fields() {
        let mut d = dispatcher();
        let resp = d.handle_request(&Request::new(Action::ProcessInput));
        let json = to_json(&resp);
        assert_eq!(json["success"], true);
        assert_eq!(json["context"]["lastPersona"], "general");
    }

    #[test]
    fn test_handle_listing_actions() {
        let mut d = dispatcher();

        let json = to_json(&d.handle_request(&Request::new(Action::GetPersonas)));
        assert_eq!(json["success"], true);
        assert_eq!(json["personas"][0]["key"], "architect");
        assert!(json["personas"][0]["displayName"].is_string());

        let json = to_json(&d.handle_request(&Request::new(Action::GetCommands)));
        assert_eq!(json["commands"][0]["trigger"], "/help");

        let json = to_json(&d.handle_request(&Request::new(Action::GenerateHelp)));
        assert!(json["helpText"]
            .as_str()
            .unwrap()
            .starts_with("Available commands:"));
    }

    #[test]
    fn test_handle_reset() {
        let mut d = dispatcher();
        d.process_user_input("/help", "notes.md");
        assert_ne!(d.context(), &Context::default());

        let json = to_json(&d.handle_request(&Request::new(Action::Reset)));
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Context reset");
        assert_eq!(d.context(), &Context::default());
    }

    #[test]
    fn test_unknown_action() {
        let mut d = dispatcher();
        let request = Request {
            action: "fly".to_string(),
            ..Default::default()
        };
        let resp = d.handle_request(&request);
        assert!(!resp.success);
        assert_eq!(resp.error_message(), Some("Unknown action: fly"));
    }

    #[test]
    fn test_listing_with_invalid_config_fails() {
        let config = Config {
            commands: vec![CommandSpec {
                key: "help".to_string(),
                display_name: String::new(),
                trigger: "/help".to_string(),
                aliases: vec![],
                description: String::new(),
                template: "{{help}}".to_string(),
            }],
            ..Default::default()
        };
        let mut d = Dispatcher::new(config, LogProfile::Production);
        let resp = d.handle_request(&Request::new(Action::GetPersonas));
        assert!(!resp.success);
        assert!(resp.error_message().unwrap().contains("no personas"));
    }

    #[test]
    fn test_handle_json() {
        let mut d = dispatcher();

        let resp = d.handle_json(r#"{"action":"processInput","userText":"/doc the api"}"#);
        assert!(resp.success);
        assert_eq!(d.context().last_command.as_deref(), Some("document"));

        let resp = d.handle_json("not json");
        assert!(!resp.success);
        assert!(resp.error_message().unwrap().starts_with("Invalid request"));
    }

    #[test]
    fn test_fixture_config_routing() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/promptroute.toml");
        let mut d = Dispatcher::new(Config::load_from(&path).unwrap(), LogProfile::Standard);

        let prompt = d.process_user_input("why does the borrow checker complain", "src/main.rs");
        assert!(prompt.starts_with("You are a Rust expert reviewing src/main.rs."));
        assert_eq!(d.context().last_persona.as_deref(), Some("rustacean"));

        let prompt = d.process_user_input("/cr  add retry loop", "src/main.rs");
        assert_eq!(
            prompt,
            "Review the following change for correctness and style.\n\nadd retry loop"
        );

        let prompt = d.process_user_input("deploy it", "infra/main.tf");
        assert!(prompt.contains("infra/main.tf (tf)"));
        assert_eq!(d.context().last_persona.as_deref(), Some("ops"));
    }

    #[test]
    fn test_from_catalog_is_initialized() {
        let catalog = Catalog::new(Config::builtin()).unwrap();
        let mut d = Dispatcher::from_catalog(catalog, LogProfile::Development);
        assert!(d.is_initialized());
        assert!(d.initialize());
    }
}

//! Host integration hook.
//!
//! A `Preprocessor` is held by the host for the lifetime of a session. It
//! builds its dispatcher on first use and turns each user prompt into a
//! persona or command prompt. Any failure, including a panic, yields the
//! original text so the host pipeline keeps working.

use crate::config::Config;
use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::error::ConfigError;
use crate::logging::{report_failure, LogProfile};
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

type ConfigLoader = Box<dyn Fn() -> Result<Config, ConfigError>>;

/// Extra information the host passes with a prompt
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookContext {
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Input for prompt-submit hook mode (JSON on stdin)
#[derive(Debug, Clone, Deserialize)]
pub struct PromptSubmitInput {
    pub prompt: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

/// Output for prompt-submit hook mode (JSON on stdout)
#[derive(Debug, Clone, Serialize)]
pub struct PromptSubmitOutput {
    pub decision: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_prompt: Option<String>,
}

/// Lazily built dispatcher that degrades to identity on failure
pub struct Preprocessor {
    loader: ConfigLoader,
    profile: LogProfile,
    // None inside the cell: construction was attempted and failed
    slot: OnceCell<Option<Dispatcher>>,
}

impl Preprocessor {
    /// Create a preprocessor that loads its config on first use
    pub fn new<F>(loader: F, profile: LogProfile) -> Self
    where
        F: Fn() -> Result<Config, ConfigError> + 'static,
    {
        Self {
            loader: Box::new(loader),
            profile,
            slot: OnceCell::new(),
        }
    }

    /// Create a preprocessor around an in-memory config
    pub fn with_config(config: Config, profile: LogProfile) -> Self {
        Self::new(move || Ok(config.clone()), profile)
    }

    /// Create a preprocessor that searches the usual config locations
    pub fn from_default_locations(profile: LogProfile) -> Self {
        Self::new(Config::load, profile)
    }

    fn build(&self) -> Option<Dispatcher> {
        let config = match (self.loader)() {
            Ok(config) => config,
            Err(e) => {
                report_failure(self.profile, "Initialization failed", &e);
                return None;
            }
        };

        let mut dispatcher = Dispatcher::new(config, self.profile);
        if !dispatcher.initialize() {
            return None;
        }
        Some(dispatcher)
    }

    fn dispatcher(&mut self) -> Option<&mut Dispatcher> {
        if self.slot.get().is_none() {
            let built = self.build();
            let _ = self.slot.set(built);
        }
        self.slot.get_mut().and_then(|d| d.as_mut())
    }

    /// Whether a usable dispatcher exists (builds it if needed)
    pub fn is_ready(&mut self) -> bool {
        self.dispatcher().is_some()
    }

    /// Context of the underlying dispatcher, if it has been built
    pub fn context(&self) -> Option<&Context> {
        self.slot
            .get()
            .and_then(|d| d.as_ref())
            .map(|d| d.context())
    }

    /// Transform a prompt, or return it unchanged on any failure
    pub fn preprocess(&mut self, user_text: &str, ctx: &HookContext) -> String {
        let profile = self.profile;
        let file_path = ctx.file_path.as_deref().unwrap_or("");

        let Some(dispatcher) = self.dispatcher() else {
            return user_text.to_string();
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            dispatcher.try_process_user_input(user_text, file_path)
        }));

        match outcome {
            Ok(Ok(prompt)) => prompt,
            Ok(Err(e)) => {
                report_failure(profile, "Preprocessing failed", &e);
                user_text.to_string()
            }
            Err(_) => {
                tracing::error!("Preprocessing panicked; passing input through");
                user_text.to_string()
            }
        }
    }

    /// Handle one prompt-submit hook invocation.
    ///
    /// Malformed input allows the prompt through unchanged.
    pub fn run_prompt_hook(&mut self, input_json: &str) -> PromptSubmitOutput {
        let input: PromptSubmitInput = match serde_json::from_str(input_json) {
            Ok(input) => input,
            Err(e) => {
                report_failure(self.profile, "Invalid hook input", &e);
                return PromptSubmitOutput {
                    decision: "allow",
                    updated_prompt: None,
                };
            }
        };

        let file_path = input.file_path.map(|p| match &input.cwd {
            Some(cwd) if !p.is_empty() && PathBuf::from(&p).is_relative() => {
                cwd.join(&p).display().to_string()
            }
            _ => p,
        });

        let prompt = self.preprocess(&input.prompt, &HookContext { file_path });
        PromptSubmitOutput {
            decision: "allow",
            updated_prompt: Some(prompt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;

    fn ctx(path: &str) -> HookContext {
        HookContext {
            file_path: Some(path.to_string()),
        }
    }

    #[test]
    fn test_preprocess_selects_persona() {
        let mut pre = Preprocessor::with_config(Config::builtin(), LogProfile::Standard);
        let prompt = pre.preprocess("explain this function", &ctx("app.ts"));
        assert!(prompt.contains("frontend engineer"));
        assert_eq!(
            pre.context().unwrap().last_persona.as_deref(),
            Some("frontend")
        );
    }

    #[test]
    fn test_preprocess_without_file_path() {
        let mut pre = Preprocessor::with_config(Config::builtin(), LogProfile::Standard);
        let prompt = pre.preprocess("/explain ownership", &HookContext::default());
        assert!(prompt.ends_with("Topic: ownership"));
    }

    #[test]
    fn test_invalid_config_returns_input() {
        let mut pre = Preprocessor::with_config(Config::default(), LogProfile::Production);
        assert_eq!(pre.preprocess("hi", &ctx("x.js")), "hi");
        assert!(!pre.is_ready());
        assert!(pre.context().is_none());
    }

    #[test]
    fn test_loader_error_returns_input() {
        let mut pre = Preprocessor::new(
            || Config::load_from(Path::new("/nonexistent/promptroute.toml")),
            LogProfile::Development,
        );
        assert_eq!(pre.preprocess("/help", &ctx("")), "/help");
    }

    #[test]
    fn test_loader_called_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut pre = Preprocessor::new(
            move || {
                counter.set(counter.get() + 1);
                Ok(Config::default())
            },
            LogProfile::Production,
        );

        pre.preprocess("a", &ctx(""));
        pre.preprocess("b", &ctx(""));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_prompt_hook() {
        let mut pre = Preprocessor::with_config(Config::builtin(), LogProfile::Standard);
        let output = pre.run_prompt_hook(r#"{"prompt":"/help","cwd":"/work"}"#);
        assert_eq!(output.decision, "allow");
        assert!(output
            .updated_prompt
            .unwrap()
            .starts_with("Available commands:"));

        let output = pre.run_prompt_hook(r#"{"prompt":"tidy up","file_path":"main.rs","cwd":"/work"}"#);
        assert!(output.updated_prompt.unwrap().contains("/work/main.rs"));
        assert_eq!(pre.context().unwrap().file_type, "rs");
    }

    #[test]
    fn test_prompt_hook_malformed_input() {
        let mut pre = Preprocessor::with_config(Config::builtin(), LogProfile::Production);
        let output = pre.run_prompt_hook("{not json");
        assert_eq!(output.decision, "allow");
        assert!(output.updated_prompt.is_none());

        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(json, r#"{"decision":"allow"}"#);
    }
}

use crate::{
    commands::CommandHandler,
    config::{Catalog, Config},
    dispatcher::Dispatcher,
    logging::LogProfile,
    persona::PersonaSelector,
    preprocess::Preprocessor,
};
use anyhow::Result;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

/// promptroute - persona and command prompt preprocessor
#[derive(Parser, Debug, Clone)]
#[command(
    name = "promptroute",
    about = "Turn user input into persona or command prompts"
)]
pub struct Args {
    #[arg(short, long, help = "One-shot prompt mode")]
    pub prompt: Option<String>,

    #[arg(short, long, help = "Active file path used for persona selection")]
    pub file: Option<String>,

    #[arg(long, help = "Path to config file (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Serve NDJSON requests on stdin, responses on stdout")]
    pub serve: bool,

    #[arg(long, help = "Run as a prompt-submit hook (JSON on stdin and stdout)")]
    pub hook: bool,

    #[arg(long, help = "List configured personas and exit")]
    pub list_personas: bool,

    #[arg(long, help = "List configured commands and exit")]
    pub list_commands: bool,

    #[arg(
        long = "env",
        env = "PROMPTROUTE_ENV",
        value_name = "NAME",
        help = "Deployment environment (development|production)"
    )]
    pub environment: Option<String>,

    #[arg(long, env = "PROMPTROUTE_DEBUG", help = "Debug output")]
    pub debug: bool,

    #[arg(short, long, help = "Verbose output")]
    pub verbose: bool,
}

impl Args {
    pub fn log_profile(&self) -> LogProfile {
        LogProfile::resolve(self.environment.as_deref(), self.debug)
    }

    /// Load the configuration selected by `--config` or the default search
    pub fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        Ok(config)
    }
}

/// Interactive session state
pub struct Session {
    pub dispatcher: Dispatcher,
    pub file_path: String,
}

/// Get the path to the history file
fn history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".promptroute")
        .join("history")
}

pub fn run_once(session: &mut Session, prompt: &str) -> Result<()> {
    let file_path = session.file_path.clone();
    let output = session.dispatcher.process_user_input(prompt, &file_path);
    println!("{}", output);
    Ok(())
}

pub fn run_repl(mut session: Session) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    // Load command history
    let history_file = history_path();
    let _ = rl.load_history(&history_file);

    println!("promptroute - /exit to quit, /file <path> to set the active file");

    loop {
        match rl.readline(">>> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                if line.starts_with('/') && handle_local_command(&mut session, line) {
                    break;
                }
                if is_local_command(line) {
                    continue;
                }

                let file_path = session.file_path.clone();
                let output = session.dispatcher.process_user_input(line, &file_path);
                println!("{}", output);
                let ctx = session.dispatcher.context();
                if let Some(command) = &ctx.last_command {
                    eprintln!("[command: {}]", command);
                } else if let Some(persona) = &ctx.last_persona {
                    eprintln!("[persona: {}]", persona);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    // Save command history (create parent directory if needed)
    if let Some(parent) = history_file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.save_history(&history_file);

    Ok(())
}

const LOCAL_COMMANDS: &[&str] = &["/exit", "/quit", "/file", "/context", "/reset"];

fn is_local_command(line: &str) -> bool {
    let head = line.split_whitespace().next().unwrap_or("");
    LOCAL_COMMANDS.contains(&head)
}

/// Handle REPL-only commands. Returns true when the REPL should exit.
/// Anything else starting with `/` goes to the dispatcher as a prompt command.
fn handle_local_command(session: &mut Session, cmd: &str) -> bool {
    let parts: Vec<&str> = cmd.splitn(2, ' ').collect();
    match parts[0] {
        "/exit" | "/quit" => return true,
        "/file" => {
            if parts.len() > 1 {
                session.file_path = parts[1].trim().to_string();
                println!("Active file: {}", session.file_path);
            } else if session.file_path.is_empty() {
                println!("No active file. Use /file <path>");
            } else {
                println!("Active file: {}", session.file_path);
            }
        }
        "/context" => {
            let ctx = session.dispatcher.context();
            match serde_json::to_string_pretty(ctx) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        "/reset" => {
            session.dispatcher.reset();
            println!("Context reset");
        }
        _ => {}
    }
    false
}

/// Read NDJSON requests from stdin until EOF, answering each on stdout
pub fn run_serve(dispatcher: &mut Dispatcher) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = dispatcher.handle_json(&line);
        stdout.write_all(response.to_ndjson()?.as_bytes())?;
        stdout.flush()?;
    }

    Ok(())
}

/// Read one hook payload from stdin and write the hook output to stdout
pub fn run_hook(preprocessor: &mut Preprocessor) -> Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let output = preprocessor.run_prompt_hook(&input);
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

pub fn print_personas(catalog: &Catalog) {
    let default_key = &catalog.default_persona().key;
    println!("Personas:");
    for persona in catalog.personas() {
        let marker = if &persona.key == default_key {
            " (default)"
        } else {
            ""
        };
        println!("  {}{}: {}", persona.key, marker, persona.description);
        if !persona.extensions.is_empty() {
            println!("    extensions: {}", persona.extensions.join(", "));
        }
        if !persona.keywords.is_empty() {
            println!("    keywords: {}", persona.keywords.join(", "));
        }
    }
}

pub fn print_commands(catalog: &Catalog) {
    println!("{}", CommandHandler::new(catalog).generate_help_text());
}

/// Explain which persona a file/query pair would select (used by --verbose one-shot)
pub fn explain_selection(catalog: &Catalog, file_path: &str, prompt: &str) {
    let selected = PersonaSelector::new(catalog).select_optimal_persona(file_path, prompt);
    eprintln!("[persona: {} | score: {}]", selected.persona, selected.score);
}

//! promptroute - persona and command prompt preprocessing
//!
//! Given user input and the active file, either renders a slash command's
//! prompt or picks the persona that best fits the file type and query and
//! renders its template. Hosts embed a `Preprocessor`, drive a `Dispatcher`
//! with JSON requests, or run the `promptroute` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
mod defaults;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod persona;
pub mod preprocess;
pub mod protocol;
pub mod template;

pub use cli::Args;
pub use config::{Catalog, Config};
pub use dispatcher::Dispatcher;
pub use preprocess::{HookContext, Preprocessor};

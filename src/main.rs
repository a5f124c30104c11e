use anyhow::Result;
use clap::Parser;
use promptroute::cli::{self, Args, Session};
use promptroute::config::{Catalog, Config};
use promptroute::dispatcher::Dispatcher;
use promptroute::logging;
use promptroute::preprocess::Preprocessor;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let profile = args.log_profile();
    logging::init(profile, args.verbose);
    tracing::debug!(profile = profile.as_str(), "Starting promptroute");

    // Hook mode must never fail the host: config errors degrade to pass-through
    if args.hook {
        let config_path = args.config.clone();
        let mut preprocessor = Preprocessor::new(
            move || match &config_path {
                Some(path) => Config::load_from(path),
                None => Config::load(),
            },
            profile,
        );
        return cli::run_hook(&mut preprocessor);
    }

    let config = args.load_config()?;

    if args.list_personas || args.list_commands {
        let catalog = Catalog::new(config)?;
        if args.list_personas {
            cli::print_personas(&catalog);
        }
        if args.list_commands {
            cli::print_commands(&catalog);
        }
        return Ok(());
    }

    if args.verbose {
        if let (Some(prompt), Ok(catalog)) = (&args.prompt, Catalog::new(config.clone())) {
            cli::explain_selection(&catalog, args.file.as_deref().unwrap_or(""), prompt);
        }
    }

    let mut dispatcher = Dispatcher::new(config, profile);

    if args.serve {
        return cli::run_serve(&mut dispatcher);
    }

    let mut session = Session {
        dispatcher,
        file_path: args.file.clone().unwrap_or_default(),
    };

    if let Some(prompt) = &args.prompt {
        cli::run_once(&mut session, prompt)
    } else {
        cli::run_repl(session)
    }
}

// src/main.rs
use clap::Parser;
use pocktag::cli::args::{Cli, Commands};
use pocktag::cli::{commands, execute_command};
use pocktag::config::{generate_default_config, load_settings};
use pocktag::exitcode;
use pocktag::infrastructure::di::ServiceContainer;
use std::process;
use tracing_subscriber::filter::EnvFilter;

fn setup_logging(verbosity: u8) {
    let base_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over the -d flags; reqwest internals stay quiet either way
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},reqwest=warn,hyper=warn,rustls=warn",
            base_level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    if cli.generate_config {
        match generate_default_config() {
            Ok(path) => {
                println!("Wrote default config to {}", path.display());
                process::exit(exitcode::OK);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(exitcode::USAGE);
            }
        }
    }

    // create-db targets an explicit path; don't touch the configured database
    if let Some(Commands::CreateDb { path }) = &cli.command {
        match commands::create_db(path) {
            Ok(()) => process::exit(exitcode::OK),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(exitcode::SOFTWARE);
            }
        }
    }

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(exitcode::USAGE);
        }
    };

    let container = match ServiceContainer::new(settings) {
        Ok(container) => container,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(exitcode::SOFTWARE);
        }
    };

    if let Err(e) = execute_command(&container, cli) {
        eprintln!("Error: {}", e);
        process::exit(exitcode::SOFTWARE);
    }
}

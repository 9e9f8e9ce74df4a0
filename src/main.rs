//! Review checklist CLI entry point.

use clap::Parser;
use rck::cli::commands;
use rck::cli::{Cli, Commands};
use rck::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,hyper=info,reqwest=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config = cli.config.as_deref();
    let overrides = cli.overrides();
    let json = cli.json;

    match &cli.command {
        Commands::List => commands::list::execute(config, &overrides, json),
        Commands::Add { category, content } => {
            commands::items::add(category, content, config, &overrides, json)
        }
        Commands::Remove { category, index } => {
            commands::items::remove(category, *index, config, &overrides, json)
        }
        Commands::Watch { interval } => {
            commands::watch::execute(*interval, config, &overrides, json)
        }
        Commands::Check => commands::check::execute(config, &overrides, json),
        Commands::Fmt { path, dialect } => commands::fmt::execute(path.as_deref(), *dialect, json),
        Commands::Config { command } => {
            commands::config::execute(command, config, &overrides, json)
        }
        Commands::Completions { shell } => commands::completions::execute(shell),
        Commands::Version => commands::version::execute(json),
    }
}

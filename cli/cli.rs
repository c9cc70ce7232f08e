mod cli_args;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::process;

use cli_args::Cli;
use monotenant_core::AppError;

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            // Map the root AppError (through any anyhow context) to an exit code.
            let exit_code = match e.downcast_ref::<AppError>() {
                // Filesystem
                Some(AppError::DirectoryNotFound { .. }) => 2,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::FileWrite { .. }) => 2,
                Some(AppError::DirCreation { .. }) => 2,
                // Bad --steps / --phase
                Some(AppError::StepParse(_)) => 5,
                Some(AppError::InvalidArgument(_)) => 5,
                // Report serialization
                Some(AppError::JsonSerialize(_)) => 6,
                Some(AppError::YamlError(_)) => 6,
                Some(_) => 1,
                None => 1, // Not an AppError (e.g. stdout write failure)
            };
            // Failures are always surfaced, even with --quiet.
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off // Summary and errors are printed directly, not logged
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,  // Default: Show warnings and errors
            1 => log::LevelFilter::Info,  // -v
            2 => log::LevelFilter::Debug, // -vv
            _ => log::LevelFilter::Trace, // -vvv and up
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli) -> Result<()> {
    // --completions short-circuits generation.
    if let Some(shell) = cli.completions {
        log::debug!("Executing completion generation...");
        return commands::completion::handle_completion_command(shell);
    }

    log::debug!("Executing template generation...");
    commands::generate::handle_generate_command(
        &cli.selection,
        &cli.project,
        &cli.report,
        cli.quiet,
    )
}

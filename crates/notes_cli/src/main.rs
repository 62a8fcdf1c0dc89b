//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notes_core` linkage and print the navigation route table.
//! - Optionally open the store described by a JSON config file.

use clap::Parser;
use notes_core::routes::{note_destination, note_route_pattern};
use notes_core::{CoreConfig, Screen};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Print the notes core version and route table, then optionally open a store.
#[derive(Parser, Debug)]
#[command(name = "notes_cli", version, long_about = None)]
struct Cli {
    /// JSON config file (`db_path`, `notes_collection`, `log_level`, `log_dir`).
    /// Without it only the route table is printed.
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    println!("notes_core ping={}", notes_core::ping());
    println!("notes_core version={}", notes_core::core_version());
    for screen in Screen::ALL {
        println!("route {:?}={}", screen, screen.route());
    }
    println!("route pattern={}", note_route_pattern());
    println!("route new_note={}", note_destination(None));

    let Some(config_path) = cli.config else {
        return ExitCode::SUCCESS;
    };

    match run_with_config(&config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run_with_config(config_path: &Path) -> Result<(), String> {
    let config = CoreConfig::from_json_file(config_path).map_err(|err| err.to_string())?;
    if config.init_logging()? {
        log::info!("event=cli_start module=cli status=ok");
    }

    let repo = config.open_repository().map_err(|err| err.to_string())?;
    println!(
        "store ok db_path={} collection={}",
        config
            .db_path
            .as_deref()
            .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string()),
        repo.collection()
    );
    Ok(())
}

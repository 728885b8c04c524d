//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging
//! - loads the dataset once
//! - dispatches to the dashboard or the scripting commands

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DashArgs, ReportArgs};
use crate::domain::{DashboardConfig, SelectionState};
use crate::error::AppError;

pub mod pipeline;

/// Environment variable holding the log filter (`tracing_subscriber::EnvFilter` syntax).
pub const LOG_ENV: &str = "AUTODASH_LOG";

/// Entry point for the `autodash` binary.
pub fn run() -> Result<(), AppError> {
    // We want `autodash` and `autodash -r recession` to behave like `autodash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Report(args) => handle_report(args),
        Command::Years => {
            init_logging(LogTarget::Stderr)?;
            print!("{}", crate::report::format_year_list());
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Off,
}

fn init_logging(target: LogTarget<'_>) -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogTarget::File(path) => {
            let file = File::create(path).map_err(|e| {
                AppError::io(format!("Failed to create log file '{}': {e}", path.display()))
            })?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        LogTarget::Off => {}
    }
    Ok(())
}

fn handle_tui(args: DashArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args);
    let target = match &config.log_file {
        Some(path) => LogTarget::File(path),
        None => LogTarget::Off,
    };
    init_logging(target)?;
    crate::tui::run(config)
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    init_logging(LogTarget::Stderr)?;
    let mut config = dashboard_config_from_args(&args.dash);
    config.export_json = args.json.clone();
    config.export_csv = args.csv.clone();

    let response = pipeline::run_report(&config)?;
    print!("{}", crate::report::format_response(&response));

    let Some(bundle) = &response.bundle else {
        if config.export_json.is_some() || config.export_csv.is_some() {
            tracing::warn!("selection produced no charts; skipping exports");
        }
        return Ok(());
    };
    if let Some(path) = &config.export_json {
        crate::io::export::write_bundle_json(path, bundle)?;
        tracing::info!(path = %path.display(), "wrote JSON export");
    }
    if let Some(path) = &config.export_csv {
        crate::io::export::write_bundle_csv(path, bundle)?;
        tracing::info!(path = %path.display(), "wrote CSV export");
    }
    Ok(())
}

pub fn dashboard_config_from_args(args: &DashArgs) -> DashboardConfig {
    DashboardConfig {
        source: crate::data::resolve_source_uri(args.source.as_deref()),
        selection: SelectionState::from_raw(Some(args.report_type.value()), Some(args.year)),
        log_file: args.log_file.clone(),
        export_json: None,
        export_csv: None,
    }
}

/// Rewrite argv so `autodash` defaults to `autodash tui`.
///
/// Rules:
/// - `autodash`                      -> `autodash tui`
/// - `autodash -r recession ...`     -> `autodash tui -r recession ...`
/// - `autodash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "report" | "years");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReportType;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(args(&["autodash"])), args(&["autodash", "tui"]));
        assert_eq!(
            rewrite_args(args(&["autodash", "-r", "recession"])),
            args(&["autodash", "tui", "-r", "recession"])
        );
        assert_eq!(rewrite_args(args(&["autodash", "--help"])), args(&["autodash", "--help"]));
        assert_eq!(rewrite_args(args(&["autodash", "years"])), args(&["autodash", "years"]));
    }

    #[test]
    fn config_maps_out_of_range_year_to_unset() {
        let dash = DashArgs {
            source: Some("sales.csv".to_string()),
            report_type: ReportType::Yearly,
            year: 2014,
            log_file: None,
        };
        let config = dashboard_config_from_args(&dash);
        assert_eq!(config.source, "sales.csv");
        assert_eq!(config.selection.report_type, Some(ReportType::Yearly));
        assert_eq!(config.selection.year, None);
    }
}

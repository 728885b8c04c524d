//! Command-line parsing for the automobile sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DEFAULT_YEAR, ReportType};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "autodash", version, about = "Automobile Sales Dashboard (historical sales, 1980-2013)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    ///
    /// Pick a report type and a year; the four charts update on every change.
    Tui(DashArgs),
    /// Print the four charts of one selection as tables, optionally exporting them.
    Report(ReportArgs),
    /// Print the years offered by the year selector.
    Years,
}

/// Dataset and initial selection options shared by all views.
#[derive(Debug, Parser, Clone)]
pub struct DashArgs {
    /// Dataset CSV: http(s) URL, file:// URI or local path.
    ///
    /// Falls back to `AUTODASH_SOURCE` (environment or `.env`), then to the
    /// published historical automobile sales CSV.
    #[arg(short = 's', long)]
    pub source: Option<String>,

    /// Report type (yearly or recession).
    #[arg(short = 'r', long = "report", value_enum, default_value_t = ReportType::Yearly)]
    pub report_type: ReportType,

    /// Year for yearly statistics. Years outside 1980-2013 select nothing.
    #[arg(short = 'y', long, default_value_t = DEFAULT_YEAR)]
    pub year: i32,

    /// Write logs to this file (the dashboard never logs to the terminal).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Options for the `report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub dash: DashArgs,

    /// Export the bundle as JSON.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Export the bundle as long-format CSV.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

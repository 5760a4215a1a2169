//! Command-line argument parsing.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use feeapp_core::{parse_admission_date, FeeNotice, StudentId};
use std::path::PathBuf;

/// Track students' monthly fee cycle and send fee notices.
#[derive(Parser, Debug, Clone)]
#[command(name = "feeapp", version)]
pub struct Args {
    /// SQLite database file (overrides FEEAPP_DB_PATH)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides FEEAPP_LOG_LEVEL)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files (overrides FEEAPP_LOG_DIR)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a new student
    Add {
        name: String,
        phone: String,
        /// Admission date as YYYY-MM-DD
        admission_date: String,
    },
    /// List students with their current fee month
    List {
        /// Evaluate fee months at this date instead of today
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },
    /// Preview a due/paid fee notice for one student
    Notify {
        id: StudentId,
        /// due|paid
        #[arg(value_parser = parse_notice)]
        notice: FeeNotice,
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },
    /// Preview a free-form message to a student, selected by name
    Message { name: String, text: String },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_admission_date(value).map_err(|err| err.to_string())
}

fn parse_notice(value: &str) -> Result<FeeNotice, String> {
    FeeNotice::parse(value).ok_or_else(|| format!("unknown notice `{value}`; expected due|paid"))
}

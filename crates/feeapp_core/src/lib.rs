//! Core domain logic for the monthly fee tracker.
//! This crate is the single source of truth for student records and fee-cycle
//! invariants; presentation and message transport live outside it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::student::{
    month_name, parse_admission_date, AdmissionDateError, AdmissionDateFault, Student,
    StudentError, StudentId, StudentValidationError,
};
pub use notify::message::{compose_fee_message, FeeNotice};
pub use notify::notifier::{
    Notifier, NotifyError, NotifyResult, OutboundMessage, PreviewNotifier, UnavailableNotifier,
};
pub use repo::student_repo::{
    LenientLoad, RepoError, RepoResult, SkippedRow, SqliteStudentRepository, StudentRepository,
};
pub use service::student_service::{
    FeeSummary, SentNotice, ServiceError, ServiceResult, StudentService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

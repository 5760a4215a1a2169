//! Student roster and fee-notice use-case service.
//!
//! # Responsibility
//! - Register and update students through the store.
//! - Keep a read-through roster for presentation layers.
//! - Compose fee notices and hand them to the injected notifier.
//!
//! # Invariants
//! - The store is the single source of truth; the roster is only replaced by
//!   reloading from the store, never edited in place.
//! - Notification outcomes never change stored student state.
//! - A committed save is always reported as success; a failed reload after it
//!   only marks the roster stale.

use crate::model::student::{Student, StudentError, StudentId};
use crate::notify::message::{compose_fee_message, FeeNotice};
use crate::notify::notifier::{ensure_addressable, Notifier, NotifyResult};
use crate::repo::student_repo::{RepoError, StudentRepository};
use chrono::{Month, NaiveDate};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a roster write or reload.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any persistence attempt.
    Student(StudentError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Student(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<StudentError> for ServiceError {
    fn from(value: StudentError) -> Self {
        Self::Student(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Current fee position of one rostered student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSummary<'a> {
    pub student: &'a Student,
    pub elapsed_months: u32,
    pub fee_month: Month,
}

/// A fee notice accepted by the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotice {
    pub recipient: String,
    pub message: String,
    pub fee_month: Month,
    pub notice: FeeNotice,
}

/// Use-case service over a student store and a notifier.
pub struct StudentService<R: StudentRepository, N: Notifier> {
    repo: R,
    notifier: N,
    roster: Vec<Student>,
    roster_stale: bool,
}

impl<R: StudentRepository, N: Notifier> StudentService<R, N> {
    /// Creates the service and loads the initial roster from the store.
    pub fn open(repo: R, notifier: N) -> ServiceResult<Self> {
        let roster = repo.load_all()?;
        info!(
            "event=roster_load module=service status=ok count={}",
            roster.len()
        );
        Ok(Self {
            repo,
            notifier,
            roster,
            roster_stale: false,
        })
    }

    /// Validates, persists and returns a new student.
    ///
    /// # Errors
    /// - `ServiceError::Student` for blank fields or a malformed date; nothing
    ///   is written in that case.
    /// - `ServiceError::Repo` when storage fails.
    pub fn add_student(
        &mut self,
        name: impl Into<String>,
        phone: impl Into<String>,
        admission_date: &str,
    ) -> ServiceResult<Student> {
        let student = Student::create(name, phone, admission_date)?;
        self.save(&student)
    }

    /// Overwrites an already persisted student.
    ///
    /// A student without an id is inserted instead.
    pub fn update_student(&mut self, student: &Student) -> ServiceResult<Student> {
        self.save(student)
    }

    fn save(&mut self, student: &Student) -> ServiceResult<Student> {
        let saved = self.repo.save(student)?;
        let id = saved.id.unwrap_or_default();
        info!("event=student_save module=service status=ok id={id}");

        if let Err(err) = self.refresh() {
            warn!("event=roster_load module=service status=stale after_save_id={id} error={err}");
        }
        Ok(saved)
    }

    /// Replaces the roster with the store's current contents.
    ///
    /// On failure the previous roster is kept and marked stale.
    pub fn refresh(&mut self) -> ServiceResult<()> {
        match self.repo.load_all() {
            Ok(roster) => {
                self.roster = roster;
                self.roster_stale = false;
                Ok(())
            }
            Err(err) => {
                self.roster_stale = true;
                Err(err.into())
            }
        }
    }

    /// Whether the last reload failed, so `roster()` may miss saved students.
    pub fn is_roster_stale(&self) -> bool {
        self.roster_stale
    }

    /// Students as of the last save or refresh, in store order.
    pub fn roster(&self) -> &[Student] {
        &self.roster
    }

    /// First rostered student whose name matches exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&Student> {
        self.roster.iter().find(|student| student.name == name)
    }

    pub fn find_by_id(&self, id: StudentId) -> Option<&Student> {
        self.roster.iter().find(|student| student.id == Some(id))
    }

    /// Fee month of every rostered student at `now`.
    pub fn fee_summaries(&self, now: NaiveDate) -> Vec<FeeSummary<'_>> {
        self.roster
            .iter()
            .map(|student| FeeSummary {
                student,
                elapsed_months: student.elapsed_months(now),
                fee_month: student.current_fee_month(now),
            })
            .collect()
    }

    /// Sends a due/paid notice for the student's current fee month.
    pub fn notify_fee(
        &self,
        student: &Student,
        notice: FeeNotice,
        now: NaiveDate,
    ) -> NotifyResult<SentNotice> {
        let fee_month = student.current_fee_month(now);
        let message = compose_fee_message(&student.name, fee_month, notice);

        self.deliver(student, &message, notice.as_str())?;
        Ok(SentNotice {
            recipient: student.phone.clone(),
            message,
            fee_month,
            notice,
        })
    }

    /// Sends a free-form message to the student.
    pub fn send_custom(&self, student: &Student, message: &str) -> NotifyResult<()> {
        ensure_addressable(&student.phone, message)?;
        self.deliver(student, message, "custom")
    }

    fn deliver(&self, student: &Student, message: &str, kind: &str) -> NotifyResult<()> {
        let id = student.id.unwrap_or_default();
        match self.notifier.send(&student.phone, message) {
            Ok(()) => {
                info!("event=notice_send module=service status=ok kind={kind} id={id}");
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=notice_send module=service status=error kind={kind} id={id} error={err}"
                );
                Err(err)
            }
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

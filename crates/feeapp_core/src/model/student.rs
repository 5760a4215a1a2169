//! Student domain model and fee-cycle computation.
//!
//! # Responsibility
//! - Define the canonical student record persisted by the store.
//! - Compute which calendar month's fee is currently due.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one, then never changes.
//! - `name` and `phone` are never empty or whitespace-only.
//! - `admission_date` is always a valid calendar date; no partially built
//!   record is ever returned.
//! - Fee months are whole calendar months; day-of-month is ignored.

use chrono::{Datelike, Local, Month, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned stable identifier.
pub type StudentId = i64;

/// Accepted admission date layout (`YYYY-MM-DD`).
pub const ADMISSION_DATE_FORMAT: &str = "%Y-%m-%d";

// chrono's `%Y` alone also takes short, signed or padded years.
static ADMISSION_DATE_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}$").expect("valid admission date regex")
});

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Student enrolled on the monthly fee cycle.
///
/// Deserialization goes through the same checks as [`Student::from_stored`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StudentRecord")]
pub struct Student {
    /// Assigned by the store on first save.
    pub id: Option<StudentId>,
    pub name: String,
    /// Opaque addressing token handed to the notifier.
    pub phone: String,
    /// Anchors the fee cycle. Serialized as `YYYY-MM-DD`.
    pub admission_date: NaiveDate,
}

/// Rejected field values at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentValidationError {
    EmptyName,
    EmptyPhone,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "student name must not be empty"),
            Self::EmptyPhone => write!(f, "student phone must not be empty"),
        }
    }
}

impl Error for StudentValidationError {}

/// Why an admission date string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDateFault {
    /// Not four year digits, `-`, month digits, `-`, day digits.
    Layout,
    /// Right layout, but not a calendar date (e.g. `2023-02-30`).
    Calendar(chrono::ParseError),
}

/// Admission date text that is not a valid `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionDateError {
    pub value: String,
    pub fault: AdmissionDateFault,
}

impl Display for AdmissionDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.fault {
            AdmissionDateFault::Layout => write!(
                f,
                "invalid admission date `{}`: expected YYYY-MM-DD",
                self.value
            ),
            AdmissionDateFault::Calendar(err) => write!(
                f,
                "invalid admission date `{}` (expected YYYY-MM-DD): {err}",
                self.value
            ),
        }
    }
}

impl Error for AdmissionDateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.fault {
            AdmissionDateFault::Layout => None,
            AdmissionDateFault::Calendar(err) => Some(err),
        }
    }
}

/// Construction failure for [`Student`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentError {
    Validation(StudentValidationError),
    Parse(AdmissionDateError),
}

impl Display for StudentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Parse(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StudentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<StudentValidationError> for StudentError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AdmissionDateError> for StudentError {
    fn from(value: AdmissionDateError) -> Self {
        Self::Parse(value)
    }
}

impl Student {
    /// Creates a new, not yet persisted student.
    ///
    /// # Errors
    /// - `StudentError::Validation` when `name` or `phone` is blank.
    /// - `StudentError::Parse` when `admission_date` is not `YYYY-MM-DD`.
    pub fn create(
        name: impl Into<String>,
        phone: impl Into<String>,
        admission_date: &str,
    ) -> Result<Self, StudentError> {
        Self::build(None, name.into(), phone.into(), admission_date)
    }

    /// Rebuilds a persisted student from its stored column values.
    ///
    /// Applies the same validation and date parsing as [`Student::create`].
    pub fn from_stored(
        id: StudentId,
        name: impl Into<String>,
        phone: impl Into<String>,
        admission_date: &str,
    ) -> Result<Self, StudentError> {
        Self::build(Some(id), name.into(), phone.into(), admission_date)
    }

    fn build(
        id: Option<StudentId>,
        name: String,
        phone: String,
        admission_date: &str,
    ) -> Result<Self, StudentError> {
        validate_fields(&name, &phone)?;
        Ok(Self {
            id,
            name,
            phone,
            admission_date: parse_admission_date(admission_date)?,
        })
    }

    /// Checks field invariants. The store re-runs this before every write.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        validate_fields(&self.name, &self.phone)
    }

    /// Returns a copy carrying the store-assigned id.
    pub(crate) fn with_id(&self, id: StudentId) -> Self {
        Self {
            id: Some(id),
            ..self.clone()
        }
    }

    /// Admission date in its persisted `YYYY-MM-DD` text form.
    pub fn admission_date_iso(&self) -> String {
        self.admission_date.format(ADMISSION_DATE_FORMAT).to_string()
    }

    /// Whole calendar months between the admission month and `now`.
    ///
    /// Returns `0` when `now` falls before the admission month.
    pub fn elapsed_months(&self, now: NaiveDate) -> u32 {
        let years = i64::from(now.year()) - i64::from(self.admission_date.year());
        let months = i64::from(now.month()) - i64::from(self.admission_date.month());
        let elapsed = (years * 12 + months).max(0);
        u32::try_from(elapsed).unwrap_or(u32::MAX)
    }

    /// Calendar month whose fee is due at `now`.
    ///
    /// Total over every valid admission date and every `now`.
    pub fn current_fee_month(&self, now: NaiveDate) -> Month {
        advance_month(self.admission_date.month0(), self.elapsed_months(now))
    }

    /// [`Student::current_fee_month`] evaluated at the local system date.
    pub fn current_fee_month_today(&self) -> Month {
        self.current_fee_month(Local::now().date_naive())
    }
}

/// Parses an admission date in `YYYY-MM-DD` form.
///
/// The year must be exactly four digits; no sign or surrounding whitespace.
pub fn parse_admission_date(value: &str) -> Result<NaiveDate, AdmissionDateError> {
    let fail = |fault| AdmissionDateError {
        value: value.to_string(),
        fault,
    };

    if !ADMISSION_DATE_SHAPE_RE.is_match(value) {
        return Err(fail(AdmissionDateFault::Layout));
    }
    NaiveDate::parse_from_str(value, ADMISSION_DATE_FORMAT)
        .map_err(|err| fail(AdmissionDateFault::Calendar(err)))
}

/// Serde-side shape of [`Student`], validated on conversion.
#[derive(Deserialize)]
pub struct StudentRecord {
    #[serde(default)]
    id: Option<StudentId>,
    name: String,
    phone: String,
    admission_date: String,
}

impl TryFrom<StudentRecord> for Student {
    type Error = StudentError;

    fn try_from(record: StudentRecord) -> Result<Self, Self::Error> {
        Self::build(record.id, record.name, record.phone, &record.admission_date)
    }
}

fn validate_fields(name: &str, phone: &str) -> Result<(), StudentValidationError> {
    if name.trim().is_empty() {
        return Err(StudentValidationError::EmptyName);
    }
    if phone.trim().is_empty() {
        return Err(StudentValidationError::EmptyPhone);
    }
    Ok(())
}

/// Human-readable English month name, e.g. `"March"`.
pub fn month_name(month: Month) -> &'static str {
    month.name()
}

fn advance_month(start_month0: u32, elapsed: u32) -> Month {
    let index = (u64::from(start_month0) + u64::from(elapsed)) % 12;
    // `index` is always < 12.
    MONTHS[index as usize]
}

#[cfg(test)]
mod tests {
    use super::{advance_month, MONTHS};
    use chrono::Month;

    #[test]
    fn month_table_matches_chrono_ordering() {
        for (index, month) in MONTHS.iter().enumerate() {
            assert_eq!(month.number_from_month() as usize, index + 1);
        }
    }

    #[test]
    fn advance_month_wraps_with_true_modulo() {
        assert_eq!(advance_month(0, 0), Month::January);
        assert_eq!(advance_month(11, 1), Month::January);
        assert_eq!(advance_month(5, 12 * 40 + 3), Month::September);
        // (11 + 4294967295) % 12 == 2
        assert_eq!(advance_month(11, u32::MAX), Month::March);
    }
}

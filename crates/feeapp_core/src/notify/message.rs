//! Fee-status message composition.

use chrono::Month;

/// Kind of fee-status notice sent to a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeNotice {
    /// Current month's fee is outstanding.
    Due,
    /// Current month's fee has been received.
    Paid,
}

impl FeeNotice {
    /// Stable lowercase id (`due|paid`), used by CLI input and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Paid => "paid",
        }
    }

    /// Parses `due|paid`, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "due" => Some(Self::Due),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

/// Builds the notice text for `name` and fee `month`.
pub fn compose_fee_message(name: &str, month: Month, notice: FeeNotice) -> String {
    let month = month.name();
    match notice {
        FeeNotice::Due => format!("Dear {name}, your fee for {month} is due. Please pay."),
        FeeNotice::Paid => {
            format!("Dear {name}, your fee for {month} has been paid. Thank you.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_fee_message, FeeNotice};
    use chrono::Month;

    #[test]
    fn due_message_names_student_and_month() {
        assert_eq!(
            compose_fee_message("Asha", Month::March, FeeNotice::Due),
            "Dear Asha, your fee for March is due. Please pay."
        );
    }

    #[test]
    fn paid_message_names_student_and_month() {
        assert_eq!(
            compose_fee_message("Asha", Month::December, FeeNotice::Paid),
            "Dear Asha, your fee for December has been paid. Thank you."
        );
    }

    #[test]
    fn parse_accepts_known_values_only() {
        assert_eq!(FeeNotice::parse(" DUE "), Some(FeeNotice::Due));
        assert_eq!(FeeNotice::parse("paid"), Some(FeeNotice::Paid));
        assert_eq!(FeeNotice::parse("overdue"), None);
    }
}

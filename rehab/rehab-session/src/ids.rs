//! Document ids.
//!
//! Records are keyed `Session{NNN}-{ddmmyy}` and `Trajectory{NNN}-{ddmmyy}`,
//! where `NNN` is the 1-based ordinal for the patient, zero padded to three
//! digits.

use chrono::NaiveDate;

/// Id for the `number`-th session of a patient, recorded on `date`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rehab_session::session_id;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
/// assert_eq!(session_id(4, date), "Session004-070324");
/// ```
#[must_use]
pub fn session_id(number: u32, date: NaiveDate) -> String {
    format!("Session{number:03}-{}", date.format("%d%m%y"))
}

/// Id for the `number`-th trajectory of a patient, recorded on `date`.
#[must_use]
pub fn trajectory_id(number: u32, date: NaiveDate) -> String {
    format!("Trajectory{number:03}-{}", date.format("%d%m%y"))
}

/// True when `id` can be used as a document key: non-empty, no path
/// separators, not `.` or `..`.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.chars().any(|c| matches!(c, '/' | '\\' | '\0'))
}

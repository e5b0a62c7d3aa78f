//! Monthly payroll period model.
//!
//! Payroll is settled once per calendar month. [`PayPeriod`] identifies that
//! month and exposes its first and last calendar dates.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawPayPeriod {
    year: i32,
    month: u32,
}

/// A calendar month for which payroll is settled.
///
/// # Example
///
/// ```
/// use ledger_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::new(2024, 2).unwrap();
/// assert_eq!(period.start_date(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(period.end_date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert_eq!(period.to_string(), "2024-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPayPeriod")]
pub struct PayPeriod {
    year: i32,
    month: u32,
}

impl PayPeriod {
    /// Creates a period, rejecting months outside 1..=12 and years chrono
    /// cannot represent.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::invalid_input(
                "period",
                format!("{}-{} is not a valid calendar month", year, month),
            ));
        }
        Ok(Self { year, month })
    }

    /// The period's year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The period's month (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month.
    pub fn end_date(&self) -> NaiveDate {
        let start = self.start_date();
        start
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Checks if a date falls inside this period.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl TryFrom<RawPayPeriod> for PayPeriod {
    type Error = EngineError;

    fn try_from(raw: RawPayPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.month)
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

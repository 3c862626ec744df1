use chrono::{Months, NaiveDate};

use crate::errors::{LedgerError, Result};

/// add calendar months, clamping to the last valid day of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LedgerError::InvalidDate {
            message: format!("{} + {} months is out of range", date, months),
        })
}

/// whole calendar days from `due` to `paid`, zero when paid on or before `due`
pub fn days_late(due: NaiveDate, paid: NaiveDate) -> u32 {
    let days = (paid - due).num_days();
    if days > 0 {
        u32::try_from(days).unwrap_or(u32::MAX)
    } else {
        0
    }
}

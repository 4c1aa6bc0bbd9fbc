//! Time utilities: the calendar provider behind "today", "this week", "this month".

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Source of the current calendar date.
pub trait Clock {
    fn today(&self) -> NaiveDate;

    /// ISO week number of today (1-53).
    fn current_week(&self) -> u32 {
        self.today().iso_week().week()
    }

    /// Month of today (1-12).
    fn current_month(&self) -> u32 {
        self.today().month()
    }

    fn current_year(&self) -> i32 {
        self.today().year()
    }
}

/// Wall clock, resolved in an IANA timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build from an IANA name like "Africa/Nairobi".
    pub fn from_name(tz: &str) -> Result<Self> {
        let tz: Tz = tz
            .parse()
            .map_err(|_| Error::InvalidTimezone(tz.to_string()))?;
        Ok(Self::new(tz))
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// English month name for 1-12.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Inverse of [`month_name`], case-insensitive; also accepts three-letter abbreviations.
pub fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim().to_lowercase();
    if name.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|m| {
            let m = m.to_lowercase();
            m == name || (name.len() == 3 && m.starts_with(&name))
        })
        .map(|i| i as u32 + 1)
}

//! # Temporal Types — SII Wire Formatting
//!
//! Dates and timestamps as the SII schema carries them: dates as
//! `YYYY-MM-DD`, timestamps as local-naive `YYYY-MM-DDTHH:MM:SS` with no
//! zone suffix and no sub-second component. The stamp and signature
//! timestamps are part of the signed canonical bytes, so formatting must be
//! deterministic to the second.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::DteError;

/// A calendar date in SII wire form (`YYYY-MM-DD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiiDate(pub NaiveDate);

impl SiiDate {
    /// Parse from the wire form.
    pub fn parse(s: &str) -> Result<Self, DteError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(SiiDate)
            .map_err(|e| DteError::Xml(format!("invalid date {s:?}: {e}")))
    }

    /// Build from calendar components.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(SiiDate)
    }

    /// Today's date in the local timezone.
    pub fn today() -> Self {
        SiiDate(Local::now().date_naive())
    }

    /// The tax period (`YYYY-MM`) this date belongs to.
    pub fn period(&self) -> String {
        format!("{:04}-{:02}", self.0.year(), self.0.month())
    }

    /// Inner `NaiveDate`.
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for SiiDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A local-naive timestamp in SII wire form (`YYYY-MM-DDTHH:MM:SS`),
/// truncated to seconds at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiiTimestamp(NaiveDateTime);

impl SiiTimestamp {
    /// Current local time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_naive(Local::now().naive_local())
    }

    /// Build from a `NaiveDateTime`, truncating sub-seconds.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        let truncated = dt.with_nanosecond(0).unwrap_or(dt);
        SiiTimestamp(truncated)
    }

    /// Parse from the wire form. Sub-second components are rejected.
    pub fn parse(s: &str) -> Result<Self, DteError> {
        NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S")
            .map(SiiTimestamp)
            .map_err(|e| DteError::Xml(format!("invalid timestamp {s:?}: {e}")))
    }

    /// The date component.
    pub fn date(&self) -> SiiDate {
        SiiDate(self.0.date())
    }
}

impl std::fmt::Display for SiiTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
    }
}

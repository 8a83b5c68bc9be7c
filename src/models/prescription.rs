use chrono::{NaiveTime, Timelike};
use thiserror::Error;

use super::user::User;

pub type PrescriptionId = i64;

const TIMING_SEPARATOR: char = ',';
const MIDNIGHT_ALIAS: &str = "24:00";
const MIDNIGHT: &str = "00:00";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid dose timing {raw:?}")]
pub struct TimingParseError {
    pub raw: String,
}

/// Time of day at which a dose is due. Always truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DoseTiming(NaiveTime);

impl DoseTiming {
    pub fn new(inner: NaiveTime) -> Self {
        let normalized_time = inner.with_nanosecond(0).expect("Will never fail.");
        Self(normalized_time)
    }

    pub fn time(&self) -> &NaiveTime {
        &self.0
    }

    pub fn parse(raw: &str) -> Result<Self, TimingParseError> {
        let trimmed = raw.trim();
        let normalized = if trimmed == MIDNIGHT_ALIAS {
            MIDNIGHT
        } else {
            trimmed
        };

        NaiveTime::parse_from_str(normalized, "%H:%M")
            .map(Self::new)
            .map_err(|_| TimingParseError {
                raw: raw.to_owned(),
            })
    }
}

/// Splits a comma separated timings column. Empty segments are ignored,
/// every other segment yields either a timing or the error for that segment.
pub fn parse_timings(raw: &str) -> Vec<Result<DoseTiming, TimingParseError>> {
    raw.split(TIMING_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(DoseTiming::parse)
        .collect()
}

#[derive(Debug, Clone)]
pub struct Prescription {
    pub id: PrescriptionId,
    pub medicine_name: String,
    pub dosage: String,
    pub timings: String,
    pub user: User,
}

impl Prescription {
    pub fn description(&self) -> String {
        format!("{} ({})", self.medicine_name, self.dosage)
    }

    pub fn timings(&self) -> Vec<Result<DoseTiming, TimingParseError>> {
        parse_timings(&self.timings)
    }
}

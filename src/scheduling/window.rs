use std::time::Duration;

use anyhow::ensure;
use chrono::{NaiveDateTime, TimeDelta};

use crate::models::prescription::DoseTiming;

/// Half-open span `(start, end]` of wall-clock time covered by one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanBounds {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ScanBounds {
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, timing: &DoseTiming) -> bool {
        if self.is_empty() {
            return false;
        }

        self.start
            .date()
            .iter_days()
            .take_while(|date| *date <= self.end.date())
            .map(|date| date.and_time(*timing.time()))
            .any(|due_at| self.start < due_at && due_at <= self.end)
    }
}

/// Scan window sized to the scan cadence.
///
/// A scan that follows another one starts exactly where the previous one
/// ended, so scan jitter can neither open a gap nor an overlap. Only the
/// first scan, or one after a gap longer than the catch-up limit, falls
/// back to a plain `(now - length, now]` lookback.
#[derive(Debug, Clone, Copy)]
pub struct ScanWindow {
    length: TimeDelta,
}

impl ScanWindow {
    pub fn new(length: Duration) -> anyhow::Result<Self> {
        let length = TimeDelta::from_std(length)?;
        ensure!(length > TimeDelta::zero(), "Scan window must not be empty");
        ensure!(
            length < TimeDelta::days(1),
            "Scan window must be shorter than a day"
        );

        Ok(Self { length })
    }

    pub fn lookback(&self, now: NaiveDateTime) -> ScanBounds {
        ScanBounds {
            start: now - self.length,
            end: now,
        }
    }

    /// Bounds of a scan at `now` when earlier scans covered everything up to
    /// `covered_until`.
    pub fn following(
        &self,
        covered_until: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> ScanBounds {
        let Some(covered_until) = covered_until else {
            return self.lookback(now);
        };

        if now <= covered_until {
            // Wall clock went back (e.g. DST fall-back); that span was already scanned.
            return ScanBounds {
                start: covered_until,
                end: covered_until,
            };
        }

        let gap = now - covered_until;
        if gap > self.max_catch_up() {
            log::warn!(
                "Last scan covered up to {covered_until}, {}s ago. Reminders in between are skipped",
                gap.num_seconds()
            );
            return self.lookback(now);
        }

        ScanBounds {
            start: covered_until,
            end: now,
        }
    }

    /// Long enough for a skipped tick or a failed cycle, and for the hour a
    /// DST spring-forward jumps over.
    fn max_catch_up(&self) -> TimeDelta {
        (self.length * 3).max(TimeDelta::hours(2))
    }
}

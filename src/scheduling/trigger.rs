use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Wall clock the scanner compares prescription timings against.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock of `timezone`. Goes back an hour on DST fall-back and
/// jumps an hour on spring-forward; the scanner's contiguous windows absorb both.
pub struct ZonedClock {
    timezone: Tz,
}

impl ZonedClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }
}

/// Source of scan ticks. The scanner runs once per returned tick.
#[async_trait]
pub trait CadenceTrigger: Send + 'static {
    async fn next_tick(&mut self);
}

pub struct IntervalTrigger {
    interval: Interval,
}

impl IntervalTrigger {
    /// Ticks right away, then every `cadence`.
    pub fn new(cadence: Duration) -> Self {
        Self::from_interval(time::interval(cadence))
    }

    /// Ticks halfway between cadence boundaries of the wall clock, so scans
    /// land away from the whole minutes dose timings sit on.
    pub fn aligned(cadence: Duration, now: DateTime<Utc>) -> Self {
        let start = Instant::now() + start_delay(cadence, now);
        Self::from_interval(time::interval_at(start, cadence))
    }

    fn from_interval(mut interval: Interval) -> Self {
        // A slow scan must not be followed by a burst of catch-up scans.
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self { interval }
    }
}

/// Time from `now` until the next mid-cadence point.
fn start_delay(cadence: Duration, now: DateTime<Utc>) -> Duration {
    let cadence_ms = i64::try_from(cadence.as_millis())
        .unwrap_or(i64::MAX)
        .max(1);
    let into_cadence = now.timestamp_millis().rem_euclid(cadence_ms);
    let delay_ms = (cadence_ms / 2 - into_cadence).rem_euclid(cadence_ms);

    Duration::from_millis(delay_ms.unsigned_abs())
}

#[async_trait]
impl CadenceTrigger for IntervalTrigger {
    async fn next_tick(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc_millis(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn start_delay_reaches_next_half_minute() {
        let minute = Duration::from_secs(60);

        assert_eq!(start_delay(minute, utc_millis(50_000)), Duration::from_secs(40));
        assert_eq!(start_delay(minute, utc_millis(10_000)), Duration::from_secs(20));
        assert_eq!(start_delay(minute, utc_millis(30_000)), Duration::ZERO);
        assert_eq!(start_delay(minute, utc_millis(29_999)), Duration::from_millis(1));
        assert_eq!(
            start_delay(minute, utc_millis(1_748_682_000_003)),
            Duration::from_millis(29_997)
        );
    }

    #[test]
    fn start_delay_follows_longer_cadence() {
        let five_minutes = Duration::from_secs(300);

        assert_eq!(
            start_delay(five_minutes, utc_millis(60_000)),
            Duration::from_secs(90)
        );
        assert_eq!(
            start_delay(five_minutes, utc_millis(200_000)),
            Duration::from_secs(250)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn aligned_trigger_waits_for_mid_cadence() {
        let mut trigger = IntervalTrigger::aligned(Duration::from_secs(60), utc_millis(50_000));
        let started = Instant::now();

        trigger.next_tick().await;
        assert_eq!(started.elapsed(), Duration::from_secs(40));

        trigger.next_tick().await;
        assert_eq!(started.elapsed(), Duration::from_secs(100));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_cadence_starting_immediately() {
        let mut trigger = IntervalTrigger::new(Duration::from_secs(60));
        let started = Instant::now();

        trigger.next_tick().await;
        assert_eq!(started.elapsed(), Duration::ZERO);

        trigger.next_tick().await;
        trigger.next_tick().await;
        assert_eq!(started.elapsed(), Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn missed_ticks_are_skipped() {
        let mut trigger = IntervalTrigger::new(Duration::from_secs(60));
        let started = Instant::now();
        trigger.next_tick().await;

        time::sleep(Duration::from_secs(150)).await;
        trigger.next_tick().await;
        trigger.next_tick().await;

        assert_eq!(started.elapsed(), Duration::from_secs(180));
    }
}

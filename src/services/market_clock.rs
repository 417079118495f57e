//! Market-hours gating for the evaluation loop.

use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

/// Trading session window variant.
///
/// `Strict` is the regular NYSE session. `Extended` widens both edges for
/// coarse-grained external schedulers (cron ticks rarely land exactly on
/// the bell).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionVariant {
    /// 09:30-16:00 local.
    Strict,
    /// 09:00-16:30 local. Like `Strict` the window is half-open, so
    /// 16:30:00 itself already counts as closed.
    Extended,
}

impl SessionVariant {
    fn open(&self) -> NaiveTime {
        match self {
            SessionVariant::Strict => NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            SessionVariant::Extended => NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        }
    }

    fn close(&self) -> NaiveTime {
        match self {
            SessionVariant::Strict => NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            SessionVariant::Extended => NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
        }
    }
}

/// Exchange-calendar clock. Weekends are always closed; holidays are not
/// modeled, which errs on the side of running an evaluation that finds
/// nothing.
#[derive(Debug, Clone)]
pub struct MarketClock {
    tz: Tz,
    session: SessionVariant,
}

impl MarketClock {
    pub fn new(tz: Tz, session: SessionVariant) -> Self {
        Self { tz, session }
    }

    fn is_weekend(weekday: Weekday) -> bool {
        matches!(weekday, Weekday::Sat | Weekday::Sun)
    }

    /// Whether `now` falls inside the trading session, half-open
    /// `[open, close)` in local exchange time.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.tz);
        if Self::is_weekend(local.weekday()) {
            return false;
        }
        let time = local.time();
        time >= self.session.open() && time < self.session.close()
    }

    /// The next session start at or after `now`.
    ///
    /// Today's open when `now` is a weekday before the open; otherwise the
    /// next weekday's open, skipping weekends. A session boundary that
    /// cannot be represented in local time (DST gap) fails open and
    /// returns `now` so the loop evaluates rather than stalling.
    pub fn next_open(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.tz);

        let mut day = local.date_naive();
        if Self::is_weekend(local.weekday()) || local.time() >= self.session.open() {
            day = day.checked_add_days(Days::new(1)).unwrap_or(day);
            while Self::is_weekend(day.weekday()) {
                day = day.checked_add_days(Days::new(1)).unwrap_or(day);
            }
        }

        match self
            .tz
            .from_local_datetime(&day.and_time(self.session.open()))
            .earliest()
        {
            Some(open) => open.with_timezone(&Utc),
            None => now,
        }
    }
}

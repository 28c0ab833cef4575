use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

/// Calendar arithmetic in the reporting timezone, a fixed offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingCalendar {
    offset: FixedOffset,
}

impl ReportingCalendar {
    /// Offsets outside chrono's accepted range fall back to UTC; config
    /// validation rejects them before they get here.
    pub fn new(utc_offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    pub fn utc_offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// Calendar date of `now` in the reporting timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Epoch seconds of local midnight at the start of `date`.
    pub fn day_start(&self, date: NaiveDate) -> i64 {
        date.and_time(NaiveTime::MIN).and_utc().timestamp()
            - i64::from(self.offset.local_minus_utc())
    }

    /// The date `days` calendar days before `today`.
    pub fn days_before(&self, today: NaiveDate, days: u32) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Every date from `start` to `end`, both inclusive, ascending.
pub fn dates_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}

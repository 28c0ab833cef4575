use super::calendar::dates_inclusive;
use super::{ReportError, ReportingEngine};
use crate::lesson_store::Collection;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthSeries {
    pub user_growth: Vec<DailyCount>,
    pub lesson_growth: Vec<DailyCount>,
}

/// Expands sparse per-date counts into one entry per date of `[start, end]`.
/// Dates outside the range are dropped.
fn gap_fill(sparse: Vec<(String, u64)>, start: NaiveDate, end: NaiveDate) -> Vec<DailyCount> {
    let counts: HashMap<String, u64> = sparse.into_iter().collect();
    dates_inclusive(start, end)
        .map(|date| {
            let date = date.format(DATE_FORMAT).to_string();
            let count = counts.get(&date).copied().unwrap_or(0);
            DailyCount { date, count }
        })
        .collect()
}

impl ReportingEngine {
    /// Daily signups and lesson creations over the `days` calendar days before
    /// today plus today itself, so `days + 1` entries per series.
    ///
    /// `days` is expected to be normalized already (see [`ReportingEngine::growth_days`]);
    /// it is capped at the configured maximum regardless.
    pub async fn growth_series(
        &self,
        now: DateTime<Utc>,
        days: u32,
    ) -> Result<GrowthSeries, ReportError> {
        let days = days.min(self.settings.max_growth_days);
        let today = self.calendar.today(now);
        let window_start = self.calendar.days_before(today, days);
        let since = self.calendar.day_start(window_start);
        let offset = self.calendar.utc_offset_minutes();
        debug!(
            "Building growth series over {} days ({} to {})",
            days, window_start, today
        );

        self.bounded(async {
            let (users, lessons) = tokio::try_join!(
                self.query(move |s| s.daily_creation_counts(Collection::Users, since, offset)),
                self.query(move |s| s.daily_creation_counts(Collection::Lessons, since, offset)),
            )?;

            Ok::<_, ReportError>(GrowthSeries {
                user_growth: gap_fill(users, window_start, today),
                lesson_growth: gap_fill(lessons, window_start, today),
            })
        })
        .await
    }
}

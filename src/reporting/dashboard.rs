use super::{ReportError, ReportingEngine};
use crate::lesson_store::{Collection, Lesson, TopContributor};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

pub const TOP_CONTRIBUTORS_LIMIT: usize = 5;
pub const TODAY_LESSONS_LIMIT: usize = 10;

/// Point-in-time platform totals for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_users: u64,
    pub new_users_today: u64,
    pub total_lessons: u64,
    pub new_lessons_today: u64,
    /// Distinct lessons with at least one pending report.
    pub reported_lessons: u64,
    /// Likes plus favorites across all lessons.
    pub total_engagement: i64,
    pub top_contributors: Vec<TopContributor>,
    pub today_lessons: Vec<Lesson>,
}

impl ReportingEngine {
    /// Builds the dashboard summary as of `now`.
    ///
    /// "Today" starts at local midnight in the reporting timezone and has no upper
    /// bound, so future-dated rows count as today. All sub-queries run
    /// concurrently and any single failure fails the whole summary.
    pub async fn dashboard_summary(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, ReportError> {
        let today = self.calendar.today(now);
        let today_start = self.calendar.day_start(today);
        debug!("Building dashboard summary for {} (from {})", today, today_start);

        self.bounded(async {
            let (users, lessons, reported_lessons, total_engagement, top_contributors, today_lessons) =
                tokio::try_join!(
                    self.query(move |s| s.collection_counts(Collection::Users, today_start)),
                    self.query(move |s| s.collection_counts(Collection::Lessons, today_start)),
                    self.query(|s| s.count_reported_lessons()),
                    self.query(|s| s.total_engagement()),
                    self.query(|s| s.top_contributors(TOP_CONTRIBUTORS_LIMIT)),
                    self.query(move |s| s.lessons_created_since(today_start, TODAY_LESSONS_LIMIT)),
                )?;

            Ok::<_, ReportError>(DashboardSummary {
                total_users: users.total,
                new_users_today: users.created_since,
                total_lessons: lessons.total,
                new_lessons_today: lessons.created_since,
                reported_lessons,
                total_engagement,
                top_contributors,
                today_lessons,
            })
        })
        .await
    }
}

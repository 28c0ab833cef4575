//! Admin reporting engine.
//!
//! Builds the dashboard summary, growth series and the moderation/report/activity
//! pagers on top of a [`LessonStore`]. Builders hold no state: every call reads the
//! store afresh, fanning independent queries out onto the blocking pool.

mod activity;
mod calendar;
mod dashboard;
mod growth;
mod lessons;
mod pagination;
mod report_queue;

pub use activity::ActivityLogPage;
pub use calendar::{dates_inclusive, ReportingCalendar};
pub use dashboard::{DashboardSummary, TODAY_LESSONS_LIMIT, TOP_CONTRIBUTORS_LIMIT};
pub use growth::{DailyCount, GrowthSeries};
pub use lessons::LessonModerationPage;
pub use pagination::{
    non_empty, parse_days, parse_flag, parse_limit, parse_page, total_pages, Pagination,
};
pub use report_queue::ReportQueuePage;

use crate::config::ReportingSettings;
use crate::lesson_store::{LessonFilter, LessonStore, PageRequest};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Store query failed: {0:#}")]
    Store(#[from] anyhow::Error),

    #[error("Report not built within {0:?}")]
    Timeout(Duration),

    #[error("Query task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// The report types served by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Dashboard,
    Growth,
    LessonModeration,
    ReportQueue,
    AdminActivity,
}

impl ReportKind {
    /// Label used in metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Dashboard => "dashboard",
            ReportKind::Growth => "growth",
            ReportKind::LessonModeration => "lesson_moderation",
            ReportKind::ReportQueue => "report_queue",
            ReportKind::AdminActivity => "admin_activity",
        }
    }

    /// Message returned to clients when the report cannot be built.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ReportKind::Dashboard => "Failed to build dashboard summary",
            ReportKind::Growth => "Failed to build growth series",
            ReportKind::LessonModeration => "Failed to build lesson moderation page",
            ReportKind::ReportQueue => "Failed to build report queue",
            ReportKind::AdminActivity => "Failed to build admin activity log",
        }
    }
}

#[derive(Clone)]
pub struct ReportingEngine {
    store: Arc<dyn LessonStore>,
    settings: ReportingSettings,
    calendar: ReportingCalendar,
}

impl ReportingEngine {
    pub fn new(store: Arc<dyn LessonStore>, settings: ReportingSettings) -> Self {
        let calendar = ReportingCalendar::new(settings.report_utc_offset_minutes);
        Self {
            store,
            settings,
            calendar,
        }
    }

    /// Normalizes raw `page`/`limit` query values.
    pub fn page_request(&self, page: Option<&str>, limit: Option<&str>) -> PageRequest {
        PageRequest {
            page: parse_page(page),
            limit: parse_limit(
                limit,
                self.settings.default_page_limit,
                self.settings.max_page_limit,
            ),
        }
    }

    /// Normalizes a raw `days` query value.
    pub fn growth_days(&self, days: Option<&str>) -> u32 {
        parse_days(
            days,
            self.settings.default_growth_days,
            self.settings.max_growth_days,
        )
    }

    /// Builds a lesson filter from raw query values.
    pub fn lesson_filter(
        &self,
        category: Option<&str>,
        visibility: Option<&str>,
        is_featured: Option<&str>,
        review_status: Option<&str>,
    ) -> LessonFilter {
        LessonFilter {
            category: non_empty(category),
            visibility: non_empty(visibility),
            is_featured: parse_flag(is_featured),
            review_status: non_empty(review_status),
        }
    }

    /// Runs `f` against the store on the blocking pool.
    fn query<T, F>(&self, f: F) -> impl Future<Output = Result<T, ReportError>>
    where
        T: Send + 'static,
        F: FnOnce(&dyn LessonStore) -> anyhow::Result<T> + Send + 'static,
    {
        let store = self.store.clone();
        async move {
            let result = tokio::task::spawn_blocking(move || f(store.as_ref())).await?;
            Ok(result?)
        }
    }

    /// Bounds a whole report build by the configured query timeout.
    async fn bounded<T>(
        &self,
        build: impl Future<Output = Result<T, ReportError>>,
    ) -> Result<T, ReportError> {
        let limit = self.settings.query_timeout;
        match tokio::time::timeout(limit, build).await {
            Ok(result) => result,
            Err(_) => Err(ReportError::Timeout(limit)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::ReportingSettings;
    use crate::lesson_store::*;
    use anyhow::{bail, Result};
    use chrono::{DateTime, Utc};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    use super::ReportingEngine;

    pub struct TestEngine {
        pub engine: ReportingEngine,
        pub store: Arc<SqliteLessonStore>,
        _temp_dir: TempDir,
    }

    pub fn create_test_engine(settings: ReportingSettings) -> TestEngine {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteLessonStore::new(temp_dir.path().join("lessons.db"), 2).unwrap());
        let engine = ReportingEngine::new(store.clone(), settings);
        TestEngine {
            engine,
            store,
            _temp_dir: temp_dir,
        }
    }

    pub fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    pub fn user_at(email: &str, created_at: DateTime<Utc>) -> User {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: email.split('@').next().unwrap_or_default().to_string(),
            role: UserRole::User,
            is_premium: false,
            created_at,
        }
    }

    pub fn lesson_at(id: &str, creator: &str, created_at: DateTime<Utc>) -> Lesson {
        Lesson {
            id: id.to_string(),
            title: format!("Lesson {}", id),
            creator_email: creator.to_string(),
            category: "growth".to_string(),
            visibility: Visibility::Public,
            is_featured: false,
            review_status: "approved".to_string(),
            likes_count: 0,
            favorites_count: 0,
            views_count: 0,
            created_at,
        }
    }

    pub fn pending_report(lesson_id: &str, created_at: DateTime<Utc>) -> Report {
        Report {
            id: uuid::Uuid::new_v4().to_string(),
            lesson_id: lesson_id.to_string(),
            lesson_title: format!("Lesson {}", lesson_id),
            reason: "inappropriate".to_string(),
            status: ReportStatus::Pending,
            created_at,
        }
    }

    /// Which store call misbehaves.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub enum Fault {
        Engagement,
        TopContributors,
        SlowEngagement(Duration),
        /// Every report read sleeps before touching the database.
        SlowReads(Duration),
    }

    /// Wraps a real store, injecting a failure or delay into its queries.
    pub struct FaultyStore {
        pub inner: SqliteLessonStore,
        pub fault: Fault,
    }

    impl FaultyStore {
        fn slow_read(&self) {
            if let Fault::SlowReads(delay) = self.fault {
                std::thread::sleep(delay);
            }
        }
    }

    pub fn create_faulty_engine(
        fault: Fault,
        settings: ReportingSettings,
    ) -> (ReportingEngine, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let inner = SqliteLessonStore::new(temp_dir.path().join("lessons.db"), 2).unwrap();
        let store = Arc::new(FaultyStore { inner, fault });
        (ReportingEngine::new(store, settings), temp_dir)
    }

    impl LessonStore for FaultyStore {
        fn insert_user(&self, user: &User) -> Result<()> {
            self.inner.insert_user(user)
        }
        fn insert_lesson(&self, lesson: &Lesson) -> Result<()> {
            self.inner.insert_lesson(lesson)
        }
        fn insert_report(&self, report: &Report) -> Result<()> {
            self.inner.insert_report(report)
        }
        fn get_lesson(&self, id: &str) -> Result<Option<Lesson>> {
            self.inner.get_lesson(id)
        }
        fn collection_counts(
            &self,
            collection: Collection,
            since: i64,
        ) -> Result<CollectionCounts> {
            self.slow_read();
            self.inner.collection_counts(collection, since)
        }
        fn count_reported_lessons(&self) -> Result<u64> {
            self.slow_read();
            self.inner.count_reported_lessons()
        }
        fn total_engagement(&self) -> Result<i64> {
            match self.fault {
                Fault::Engagement => bail!("disk I/O error"),
                Fault::SlowEngagement(delay) => {
                    std::thread::sleep(delay);
                    self.inner.total_engagement()
                }
                Fault::SlowReads(delay) => {
                    std::thread::sleep(delay);
                    self.inner.total_engagement()
                }
                Fault::TopContributors => self.inner.total_engagement(),
            }
        }
        fn top_contributors(&self, limit: usize) -> Result<Vec<TopContributor>> {
            if self.fault == Fault::TopContributors {
                panic!("contributors query exploded");
            }
            self.slow_read();
            self.inner.top_contributors(limit)
        }
        fn lessons_created_since(&self, since: i64, limit: usize) -> Result<Vec<Lesson>> {
            self.slow_read();
            self.inner.lessons_created_since(since, limit)
        }
        fn daily_creation_counts(
            &self,
            collection: Collection,
            since: i64,
            utc_offset_minutes: i32,
        ) -> Result<Vec<(String, u64)>> {
            self.slow_read();
            self.inner
                .daily_creation_counts(collection, since, utc_offset_minutes)
        }
        fn lesson_moderation_facet(
            &self,
            filter: &LessonFilter,
            page: PageRequest,
        ) -> Result<LessonFacet> {
            self.inner.lesson_moderation_facet(filter, page)
        }
        fn pending_report_groups(&self, page: PageRequest) -> Result<ReportGroupPage> {
            self.inner.pending_report_groups(page)
        }
        fn list_admin_activity(
            &self,
            action_type: Option<AdminActionType>,
            page: PageRequest,
        ) -> Result<ActivityPage> {
            self.inner.list_admin_activity(action_type, page)
        }
        fn update_lesson_moderation(
            &self,
            id: &str,
            update: &LessonModerationUpdate,
            activity: &AdminActivity,
        ) -> Result<bool> {
            self.inner.update_lesson_moderation(id, update, activity)
        }
        fn delete_lesson(&self, id: &str, activity: &AdminActivity) -> Result<bool> {
            self.inner.delete_lesson(id, activity)
        }
        fn set_pending_reports_status(
            &self,
            lesson_id: &str,
            status: ReportStatus,
            activity: &AdminActivity,
        ) -> Result<Option<usize>> {
            self.inner
                .set_pending_reports_status(lesson_id, status, activity)
        }
    }
}

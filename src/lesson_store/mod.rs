mod models;
mod schema;
mod sqlite_lesson_store;

pub use models::*;
pub use schema::LESSON_VERSIONED_SCHEMAS;
pub use sqlite_lesson_store::SqliteLessonStore;

use anyhow::Result;

/// Access to the `users`, `lessons`, `reports` and `admin_activity` collections.
///
/// Timestamps passed in are epoch seconds (UTC).
pub trait LessonStore: Send + Sync {
    // Documents
    fn insert_user(&self, user: &User) -> Result<()>;
    fn insert_lesson(&self, lesson: &Lesson) -> Result<()>;
    fn insert_report(&self, report: &Report) -> Result<()>;
    fn get_lesson(&self, id: &str) -> Result<Option<Lesson>>;

    // Dashboard aggregates
    /// Total row count of a collection plus the rows with `created_at >= since`.
    fn collection_counts(&self, collection: Collection, since: i64) -> Result<CollectionCounts>;
    /// Number of distinct lessons with at least one pending report.
    fn count_reported_lessons(&self) -> Result<u64>;
    /// Sum of likes and favorites across all lessons.
    fn total_engagement(&self) -> Result<i64>;
    fn top_contributors(&self, limit: usize) -> Result<Vec<TopContributor>>;
    /// Lessons with `created_at >= since`, newest first.
    fn lessons_created_since(&self, since: i64, limit: usize) -> Result<Vec<Lesson>>;

    // Growth
    /// Sparse `(YYYY-MM-DD, count)` pairs for rows created at or after `since`,
    /// bucketed by calendar day at the given UTC offset.
    fn daily_creation_counts(
        &self,
        collection: Collection,
        since: i64,
        utc_offset_minutes: i32,
    ) -> Result<Vec<(String, u64)>>;

    // Pagers
    fn lesson_moderation_facet(&self, filter: &LessonFilter, page: PageRequest)
        -> Result<LessonFacet>;
    fn pending_report_groups(&self, page: PageRequest) -> Result<ReportGroupPage>;
    fn list_admin_activity(
        &self,
        action_type: Option<AdminActionType>,
        page: PageRequest,
    ) -> Result<ActivityPage>;

    // Moderation writes, each one logs `activity` in the same transaction
    /// Returns false if the lesson does not exist.
    fn update_lesson_moderation(
        &self,
        id: &str,
        update: &LessonModerationUpdate,
        activity: &AdminActivity,
    ) -> Result<bool>;
    /// Returns false if the lesson does not exist. Reports are left in place.
    fn delete_lesson(&self, id: &str, activity: &AdminActivity) -> Result<bool>;
    /// Moves every pending report of `lesson_id` to `status`.
    /// Returns `None` when neither the lesson nor any pending report for it exists.
    fn set_pending_reports_status(
        &self,
        lesson_id: &str,
        status: ReportStatus,
        activity: &AdminActivity,
    ) -> Result<Option<usize>>;
}

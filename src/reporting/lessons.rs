use super::{Pagination, ReportError, ReportingEngine};
use crate::lesson_store::{Lesson, LessonFilter, ModerationStats, PageRequest};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonModerationPage {
    pub lessons: Vec<Lesson>,
    pub stats: ModerationStats,
    pub pagination: Pagination,
}

impl ReportingEngine {
    /// One page of lessons matching `filter`, newest first, with stats over the
    /// whole filtered set. `reportedLessons` in the stats ignores the filter.
    pub async fn lesson_moderation_page(
        &self,
        filter: LessonFilter,
        page: PageRequest,
    ) -> Result<LessonModerationPage, ReportError> {
        debug!("Building lesson moderation page {:?} for {:?}", page, filter);

        self.bounded(async {
            let facet = self
                .query(move |s| s.lesson_moderation_facet(&filter, page))
                .await?;

            Ok::<_, ReportError>(LessonModerationPage {
                lessons: facet.lessons,
                stats: facet.stats,
                pagination: Pagination::new(facet.total, page),
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::ReportingSettings;
    use crate::lesson_store::{LessonStore, Visibility};

    #[tokio::test]
    async fn reported_stat_ignores_category_filter() {
        let test = create_test_engine(ReportingSettings::default());
        let now = instant("2024-06-10T15:00:00Z");

        let mut grief = lesson_at("g1", "a@x", now);
        grief.category = "grief".to_string();
        let mut career = lesson_at("c1", "a@x", now);
        career.category = "career".to_string();
        test.store.insert_lesson(&grief).unwrap();
        test.store.insert_lesson(&career).unwrap();

        for _ in 0..3 {
            test.store.insert_report(&pending_report("c1", now)).unwrap();
        }

        let filter = test.engine.lesson_filter(Some("grief"), None, None, None);
        let page = test.engine.page_request(None, None);
        let result = test.engine.lesson_moderation_page(filter, page).await.unwrap();

        assert_eq!(result.lessons.len(), 1);
        assert_eq!(result.lessons[0].id, "g1");
        assert_eq!(result.stats.total_lessons, 1);
        assert_eq!(result.stats.reported_lessons, 1);
    }

    #[tokio::test]
    async fn page_beyond_end_is_empty_with_total() {
        let test = create_test_engine(ReportingSettings::default());
        let now = instant("2024-06-10T15:00:00Z");
        for i in 0..7 {
            test.store
                .insert_lesson(&lesson_at(&format!("l{}", i), "a@x", now))
                .unwrap();
        }

        let page = test.engine.page_request(Some("4"), Some("3"));
        let result = test
            .engine
            .lesson_moderation_page(LessonFilter::default(), page)
            .await
            .unwrap();

        assert!(result.lessons.is_empty());
        assert_eq!(
            result.pagination,
            Pagination {
                total: 7,
                page: 4,
                limit: 3,
                total_pages: 3,
            }
        );
        assert_eq!(result.stats.total_lessons, 7);
    }

    #[tokio::test]
    async fn stats_break_down_filtered_set() {
        let test = create_test_engine(ReportingSettings::default());
        let now = instant("2024-06-10T15:00:00Z");
        let mut private = lesson_at("p", "a@x", now);
        private.visibility = Visibility::Private;
        private.is_featured = true;
        let mut featured = lesson_at("f", "a@x", now);
        featured.is_featured = true;
        let plain = lesson_at("x", "a@x", now);
        for lesson in [&private, &featured, &plain] {
            test.store.insert_lesson(lesson).unwrap();
        }

        let filter = test.engine.lesson_filter(None, None, Some("true"), None);
        let result = test
            .engine
            .lesson_moderation_page(filter, test.engine.page_request(None, None))
            .await
            .unwrap();

        assert_eq!(
            result.stats,
            ModerationStats {
                total_lessons: 2,
                public_lessons: 1,
                private_lessons: 1,
                featured_lessons: 2,
                reported_lessons: 0,
            }
        );
        assert_eq!(result.pagination.total, 2);
    }
}

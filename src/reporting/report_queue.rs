use super::{Pagination, ReportError, ReportingEngine};
use crate::lesson_store::{PageRequest, ReportGroup};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQueuePage {
    pub reported_lessons: Vec<ReportGroup>,
    pub pagination: Pagination,
}

impl ReportingEngine {
    /// Pending reports grouped per lesson, most reported lessons first.
    /// Paging is over groups; `total` is the number of distinct reported lessons.
    pub async fn report_queue_page(&self, page: PageRequest) -> Result<ReportQueuePage, ReportError> {
        debug!("Building report queue page {:?}", page);

        self.bounded(async {
            let groups = self.query(move |s| s.pending_report_groups(page)).await?;

            Ok::<_, ReportError>(ReportQueuePage {
                reported_lessons: groups.groups,
                pagination: Pagination::new(groups.total, page),
            })
        })
        .await
    }
}

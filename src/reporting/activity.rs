use super::{Pagination, ReportError, ReportingEngine};
use crate::lesson_store::{AdminActionType, AdminActivity, PageRequest};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogPage {
    pub activities: Vec<AdminActivity>,
    pub pagination: Pagination,
}

impl ReportingEngine {
    /// Admin activity log, newest first. An unknown `action_type` string lists everything.
    pub async fn admin_activity_page(
        &self,
        action_type: Option<&str>,
        page: PageRequest,
    ) -> Result<ActivityLogPage, ReportError> {
        let action_type = action_type.and_then(AdminActionType::parse);

        self.bounded(async {
            let log = self
                .query(move |s| s.list_admin_activity(action_type, page))
                .await?;

            Ok::<_, ReportError>(ActivityLogPage {
                activities: log.entries,
                pagination: Pagination::new(log.total, page),
            })
        })
        .await
    }
}

//! Admin moderation actions.
//!
//! Every successful action is recorded in the admin activity log within the same
//! store transaction as the change itself.

use crate::lesson_store::{
    AdminActionType, AdminActivity, LessonModerationUpdate, LessonStore, ReportStatus,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Lesson {0} not found")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),

    #[error("Moderation task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn LessonStore>,
}

impl ModerationService {
    pub fn new(store: Arc<dyn LessonStore>) -> Self {
        Self { store }
    }

    /// Changes featured flag, visibility or review status of a lesson.
    pub async fn moderate_lesson(
        &self,
        admin_email: &str,
        lesson_id: &str,
        update: LessonModerationUpdate,
    ) -> Result<(), ModerationError> {
        if update.is_empty() {
            return Err(ModerationError::InvalidInput(
                "at least one of isFeatured, visibility, reviewStatus is required".to_string(),
            ));
        }
        if update
            .review_status
            .as_deref()
            .is_some_and(|s| s.trim().is_empty())
        {
            return Err(ModerationError::InvalidInput(
                "reviewStatus must not be empty".to_string(),
            ));
        }

        let activity = AdminActivity::new(
            admin_email,
            AdminActionType::Moderated,
            describe_update(lesson_id, &update),
        );
        let store = self.store.clone();
        let id = lesson_id.to_string();
        let found = tokio::task::spawn_blocking(move || {
            store.update_lesson_moderation(&id, &update, &activity)
        })
        .await??;

        if !found {
            return Err(ModerationError::NotFound(lesson_id.to_string()));
        }
        info!("{} moderated lesson {}", admin_email, lesson_id);
        Ok(())
    }

    /// Deletes a lesson. Its reports remain and keep pointing at the old id.
    pub async fn delete_lesson(
        &self,
        admin_email: &str,
        lesson_id: &str,
    ) -> Result<(), ModerationError> {
        let activity = AdminActivity::new(
            admin_email,
            AdminActionType::Deleted,
            format!("Deleted lesson {}", lesson_id),
        );
        let store = self.store.clone();
        let id = lesson_id.to_string();
        let found = tokio::task::spawn_blocking(move || store.delete_lesson(&id, &activity)).await??;

        if !found {
            return Err(ModerationError::NotFound(lesson_id.to_string()));
        }
        info!("{} deleted lesson {}", admin_email, lesson_id);
        Ok(())
    }

    /// Closes every pending report of a lesson as `ignored` or `resolved`.
    /// Returns the number of reports moved.
    pub async fn review_reports(
        &self,
        admin_email: &str,
        lesson_id: &str,
        status: ReportStatus,
    ) -> Result<usize, ModerationError> {
        if status == ReportStatus::Pending {
            return Err(ModerationError::InvalidInput(
                "status must be ignored or resolved".to_string(),
            ));
        }

        let activity = AdminActivity::new(
            admin_email,
            AdminActionType::ReportReviewed,
            format!(
                "Marked reports of lesson {} as {}",
                lesson_id,
                status.as_str()
            ),
        );
        let store = self.store.clone();
        let id = lesson_id.to_string();
        let moved = tokio::task::spawn_blocking(move || {
            store.set_pending_reports_status(&id, status, &activity)
        })
        .await??;

        match moved {
            Some(count) => {
                info!(
                    "{} marked {} reports of lesson {} as {}",
                    admin_email,
                    count,
                    lesson_id,
                    status.as_str()
                );
                Ok(count)
            }
            None => Err(ModerationError::NotFound(lesson_id.to_string())),
        }
    }
}

fn describe_update(lesson_id: &str, update: &LessonModerationUpdate) -> String {
    let mut changes = Vec::new();
    if let Some(is_featured) = update.is_featured {
        changes.push(format!("isFeatured={}", is_featured));
    }
    if let Some(visibility) = update.visibility {
        changes.push(format!("visibility={}", visibility.as_str()));
    }
    if let Some(review_status) = &update.review_status {
        changes.push(format!("reviewStatus={}", review_status));
    }
    format!("Updated lesson {}: {}", lesson_id, changes.join(", "))
}

use axum::extract::FromRef;

use crate::lesson_store::LessonStore;
use crate::moderation::ModerationService;
use crate::reporting::ReportingEngine;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedLessonStore = Arc<dyn LessonStore>;
pub type GuardedReportingEngine = Arc<ReportingEngine>;
pub type GuardedModerationService = Arc<ModerationService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub reporting: GuardedReportingEngine,
    pub moderation: GuardedModerationService,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedReportingEngine {
    fn from_ref(input: &ServerState) -> Self {
        input.reporting.clone()
    }
}

impl FromRef<ServerState> for GuardedModerationService {
    fn from_ref(input: &ServerState) -> Self {
        input.moderation.clone()
    }
}

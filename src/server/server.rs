use anyhow::{Context, Result};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tower_http::services::ServeDir;
use tracing::info;

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::{
    admin_routes::make_admin_routes, log_requests, metrics::metrics_handler, state::*,
    ServerConfig,
};
use crate::config::ReportingSettings;
use crate::lesson_store::LessonStore;
use crate::moderation::ModerationService;
use crate::reporting::ReportingEngine;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

impl ServerState {
    fn new(
        config: ServerConfig,
        lesson_store: GuardedLessonStore,
        reporting: ReportingSettings,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            reporting: Arc::new(ReportingEngine::new(lesson_store.clone(), reporting)),
            moderation: Arc::new(ModerationService::new(lesson_store)),
            hash: env!("LIFENOTES_GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    lesson_store: Arc<dyn LessonStore>,
    reporting: ReportingSettings,
) -> Result<Router> {
    let state = ServerState::new(config.clone(), lesson_store, reporting);

    let admin_routes = make_admin_routes(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/v1/admin", admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(
    lesson_store: Arc<dyn LessonStore>,
    reporting: ReportingSettings,
    config: ServerConfig,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, lesson_store, reporting)?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, make_metrics_app()).await {
            tracing::error!("Metrics server stopped: {}", err);
        }
    });
    info!("Metrics available at port {}", metrics_port);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Serving admin reports on port {}", port);

    Ok(axum::serve(listener, app).await?)
}

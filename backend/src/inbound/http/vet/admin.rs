//! Administrative endpoints. The scope is wrapped in the API key guard.

use std::time::Duration;

use actix_web::{get, post, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::analytics::usage_snapshot;
use crate::domain::ports::SystemStats;
use crate::domain::vet::{ModelInfo, TrainingStatus, UsageSnapshot, format_clock};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, TrainingStatusSchema, UsageSnapshotSchema};
use crate::inbound::http::state::VetState;

/// Pause between acknowledging a restart and signalling shutdown.
const RESTART_DELAY: Duration = Duration::from_secs(1);

/// Current training progress.
#[utoipa::path(
    get,
    path = "/api/v1/admin/training-status",
    responses(
        (status = 200, description = "Training status", body = TrainingStatusSchema),
        (status = 401, description = "Missing or invalid API key", body = ErrorSchema)
    ),
    security(("ApiKey" = [])),
    tags = ["admin"],
    operation_id = "trainingStatus"
)]
#[get("/training-status")]
pub async fn training_status(state: web::Data<VetState>) -> ApiResult<web::Json<TrainingStatus>> {
    Ok(web::Json(state.training.status()?))
}

/// Host CPU, memory and disk usage.
#[utoipa::path(
    get,
    path = "/api/v1/admin/system-stats",
    responses(
        (status = 200, description = "Host figures", body = Object),
        (status = 401, description = "Missing or invalid API key", body = ErrorSchema)
    ),
    security(("ApiKey" = [])),
    tags = ["admin"],
    operation_id = "systemStats"
)]
#[get("/system-stats")]
pub async fn system_stats(state: web::Data<VetState>) -> web::Json<SystemStats> {
    web::Json(state.system.system_stats().await)
}

/// Description of the trained model.
#[utoipa::path(
    get,
    path = "/api/v1/admin/model-info",
    responses(
        (status = 200, description = "Model description", body = Object),
        (status = 401, description = "Missing or invalid API key", body = ErrorSchema)
    ),
    security(("ApiKey" = [])),
    tags = ["admin"],
    operation_id = "modelInfo"
)]
#[get("/model-info")]
pub async fn model_info(state: web::Data<VetState>) -> ApiResult<web::Json<ModelInfo>> {
    let artifacts = state.model_info.artifacts().await;
    let training = state.training.status()?;
    Ok(web::Json(ModelInfo::describe(artifacts.as_ref(), &training)))
}

/// Usage counters plus uptime.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    #[serde(flatten)]
    #[schema(value_type = UsageSnapshotSchema)]
    pub usage: UsageSnapshot,
    /// `HH:MM:SS`.
    #[schema(example = "01:02:05")]
    pub uptime: String,
}

/// Usage counters and uptime.
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Counters", body = AdminStats),
        (status = 401, description = "Missing or invalid API key", body = ErrorSchema)
    ),
    security(("ApiKey" = [])),
    tags = ["admin"],
    operation_id = "adminStats"
)]
#[get("/stats")]
pub async fn admin_stats(state: web::Data<VetState>) -> ApiResult<web::Json<AdminStats>> {
    Ok(web::Json(AdminStats {
        usage: usage_snapshot(&state).await?,
        uptime: format_clock(state.uptime()),
    }))
}

/// Acknowledgement carrying the resulting training status.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrainingAck {
    #[schema(example = "Training started successfully")]
    pub message: &'static str,
    #[schema(value_type = TrainingStatusSchema)]
    pub status: TrainingStatus,
}

/// Start a training run.
#[utoipa::path(
    post,
    path = "/api/v1/admin/start-training",
    responses(
        (status = 200, description = "Run started", body = TrainingAck),
        (status = 400, description = "A run is already in progress", body = ErrorSchema),
        (status = 401, description = "Missing or invalid API key", body = ErrorSchema)
    ),
    security(("ApiKey" = [])),
    tags = ["admin"],
    operation_id = "startTraining"
)]
#[post("/start-training")]
pub async fn start_training(state: web::Data<VetState>) -> ApiResult<web::Json<TrainingAck>> {
    let status = state.training.start()?;
    Ok(web::Json(TrainingAck {
        message: "Training started successfully",
        status,
    }))
}

/// Stop the running training run.
#[utoipa::path(
    post,
    path = "/api/v1/admin/stop-training",
    responses(
        (status = 200, description = "Run stopped", body = TrainingAck),
        (status = 400, description = "No run in progress", body = ErrorSchema),
        (status = 401, description = "Missing or invalid API key", body = ErrorSchema)
    ),
    security(("ApiKey" = [])),
    tags = ["admin"],
    operation_id = "stopTraining"
)]
#[post("/stop-training")]
pub async fn stop_training(state: web::Data<VetState>) -> ApiResult<web::Json<TrainingAck>> {
    let status = state.training.stop()?;
    Ok(web::Json(TrainingAck {
        message: "Training stopped successfully",
        status,
    }))
}

/// `{message}` acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct RestartAck {
    #[schema(example = "Service restart initiated")]
    pub message: &'static str,
}

/// Acknowledge, then ask the server to shut down gracefully.
#[utoipa::path(
    post,
    path = "/api/v1/admin/restart-services",
    responses(
        (status = 200, description = "Restart scheduled", body = RestartAck),
        (status = 401, description = "Missing or invalid API key", body = ErrorSchema)
    ),
    security(("ApiKey" = [])),
    tags = ["admin"],
    operation_id = "restartServices"
)]
#[post("/restart-services")]
pub async fn restart_services(state: web::Data<VetState>) -> web::Json<RestartAck> {
    info!("service restart requested");
    let restart = state.restart.clone();
    tokio::spawn(async move {
        tokio::time::sleep(RESTART_DELAY).await;
        restart.notify_one();
    });
    web::Json(RestartAck {
        message: "Service restart initiated",
    })
}

//! Usage and performance figures.

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::ProcessMemory;
use crate::domain::vet::UsageSnapshot;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UsageSnapshotSchema};
use crate::inbound::http::state::VetState;

/// Live counters, with active sessions taken from the conversation store.
pub(super) async fn usage_snapshot(state: &VetState) -> ApiResult<UsageSnapshot> {
    let sessions = state.conversations.session_count().await?;
    Ok(state.usage.snapshot(sessions, state.clock.utc()))
}

/// Request counters since start-up.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/usage",
    responses(
        (status = 200, description = "Usage counters", body = UsageSnapshotSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["analytics"],
    operation_id = "usageAnalytics"
)]
#[get("/usage")]
pub async fn usage(state: web::Data<VetState>) -> ApiResult<web::Json<UsageSnapshot>> {
    Ok(web::Json(usage_snapshot(&state).await?))
}

/// Process figures.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    /// Seconds since start-up.
    pub uptime: f64,
    /// Resident and virtual size in kilobytes, when readable.
    #[schema(value_type = Option<Object>)]
    pub memory_usage: Option<ProcessMemory>,
    pub timestamp: DateTime<Utc>,
}

/// Uptime and memory of the service process.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/performance",
    responses((status = 200, description = "Process figures", body = Performance)),
    tags = ["analytics"],
    operation_id = "performanceAnalytics"
)]
#[get("/performance")]
pub async fn performance(state: web::Data<VetState>) -> web::Json<Performance> {
    web::Json(Performance {
        uptime: state.uptime().as_secs_f64(),
        memory_usage: state.system.process_memory().await,
        timestamp: state.clock.utc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::time::Duration;

    use crate::inbound::http::test_utils::VetMocks;

    #[rstest]
    #[actix_web::test]
    async fn usage_reports_live_counters() {
        let mut mocks = VetMocks::default();
        mocks.conversations.expect_session_count().returning(|| Ok(3));
        let state = web::Data::new(mocks.into_state());
        state.usage.record_request(200, Duration::from_millis(40));
        state.usage.record_request(404, Duration::from_millis(20));
        state.usage.record_translation();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(web::scope("/api/v1/analytics").service(usage)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/analytics/usage").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["totalQueries"], 2);
        assert_eq!(body["successfulResponses"], 1);
        assert_eq!(body["averageResponseTime"], 30.0);
        assert_eq!(body["activeSessions"], 3);
        assert_eq!(body["translationsPerformed"], 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn performance_includes_process_memory() {
        let mut mocks = VetMocks::default();
        mocks.system.expect_process_memory().returning(|| {
            Some(ProcessMemory {
                resident_kb: 2048,
                virtual_kb: 8192,
            })
        });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(mocks.into_state()))
                .service(web::scope("/api/v1/analytics").service(performance)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/analytics/performance")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body["memoryUsage"],
            json!({"residentKb": 2048, "virtualKb": 8192})
        );
        assert!(body["uptime"].as_f64().is_some_and(|u| u >= 0.0));
    }
}

//! Service index, health reports and the unknown-route fallback.

use actix_web::{HttpRequest, HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::ProcessMemory;
use crate::inbound::http::state::VetState;

/// Routes advertised by the 404 fallback.
const AVAILABLE_ENDPOINTS: [&str; 4] = [
    "GET /api/v1/health",
    "POST /api/v1/chat/ask",
    "GET /api/v1/medicines",
    "GET /api/v1/analytics/usage",
];

/// Entry points of the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct Endpoints {
    pub health: &'static str,
    pub chat: &'static str,
    pub medicines: &'static str,
    pub analytics: &'static str,
    pub admin: &'static str,
}

/// Body of `GET /`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceIndex {
    #[schema(example = "AI Veterinary Bot Service")]
    pub name: &'static str,
    #[schema(example = "1.0.0")]
    pub version: &'static str,
    #[schema(example = "running")]
    pub status: &'static str,
    pub endpoints: Endpoints,
    pub documentation: &'static str,
}

/// Describe the service.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service index", body = ServiceIndex)),
    tags = ["service"],
    operation_id = "serviceIndex"
)]
#[get("/")]
pub async fn index(state: web::Data<VetState>) -> web::Json<ServiceIndex> {
    web::Json(ServiceIndex {
        name: state.info.name,
        version: state.info.version,
        status: "running",
        endpoints: Endpoints {
            health: "/api/v1/health",
            chat: "/api/v1/chat",
            medicines: "/api/v1/medicines",
            analytics: "/api/v1/analytics",
            admin: "/api/v1/admin",
        },
        documentation: "/docs/",
    })
}

/// Basic health report.
#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    #[schema(example = "healthy")]
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Seconds since start-up.
    pub uptime: f64,
    #[schema(value_type = Option<Object>)]
    pub memory: Option<ProcessMemory>,
    pub version: &'static str,
    pub service: &'static str,
}

async fn health_report(state: &VetState) -> Health {
    Health {
        status: "healthy",
        timestamp: state.clock.utc(),
        uptime: state.uptime().as_secs_f64(),
        memory: state.system.process_memory().await,
        version: state.info.version,
        service: state.info.name,
    }
}

/// Liveness with uptime and memory.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Healthy", body = Health)),
    tags = ["health"],
    operation_id = "health"
)]
#[get("/health")]
pub async fn health(state: web::Data<VetState>) -> web::Json<Health> {
    web::Json(health_report(&state).await)
}

/// Health report with deployment details.
#[derive(Debug, Serialize, ToSchema)]
pub struct DetailedHealth {
    #[serde(flatten)]
    pub health: Health,
    #[schema(example = "development")]
    pub environment: &'static str,
    /// Operating system, e.g. `linux`.
    pub platform: &'static str,
    /// Processor architecture, e.g. `x86_64`.
    pub arch: &'static str,
}

/// Health plus environment and platform.
#[utoipa::path(
    get,
    path = "/api/v1/health/detailed",
    responses((status = 200, description = "Healthy", body = DetailedHealth)),
    tags = ["health"],
    operation_id = "detailedHealth"
)]
#[get("/health/detailed")]
pub async fn detailed_health(state: web::Data<VetState>) -> web::Json<DetailedHealth> {
    web::Json(DetailedHealth {
        health: health_report(&state).await,
        environment: state.info.environment,
        platform: std::env::consts::OS,
        arch: std::env::consts::ARCH,
    })
}

/// Body of the unknown-route fallback.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteNotFound {
    #[schema(example = "Endpoint not found")]
    pub error: &'static str,
    pub message: String,
    pub available_endpoints: [&'static str; 4],
}

/// Default service answering routes nothing else matched.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(RouteNotFound {
        error: "Endpoint not found",
        message: format!(
            "The endpoint {} {} does not exist",
            req.method(),
            req.path()
        ),
        available_endpoints: AVAILABLE_ENDPOINTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    use crate::inbound::http::test_utils::VetMocks;

    macro_rules! app {
        ($mocks:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($mocks.into_state()))
                    .service(index)
                    .service(
                        web::scope("/api/v1")
                            .service(health)
                            .service(detailed_health),
                    )
                    .default_service(web::to(not_found)),
            )
            .await
        };
    }

    #[rstest]
    #[actix_web::test]
    async fn index_lists_entry_points() {
        let app = app!(VetMocks::default());
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["name"], "AI Veterinary Bot Service");
        assert_eq!(body["status"], "running");
        assert_eq!(body["endpoints"]["admin"], "/api/v1/admin");
    }

    #[rstest]
    #[actix_web::test]
    async fn detailed_health_reports_environment() {
        let mut mocks = VetMocks::default();
        mocks.system.expect_process_memory().returning(|| None);
        let app = app!(mocks);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/health/detailed")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "test");
        assert_eq!(body["service"], "AI Veterinary Bot Service");
        assert!(body["memory"].is_null());
        assert_eq!(body["platform"], std::env::consts::OS);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_routes_name_method_and_path() {
        let app = app!(VetMocks::default());
        let res = test::call_service(
            &app,
            test::TestRequest::delete().uri("/api/v2/nothing").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Endpoint not found");
        assert_eq!(
            body["message"],
            "The endpoint DELETE /api/v2/nothing does not exist"
        );
        assert_eq!(body["availableEndpoints"][1], "POST /api/v1/chat/ask");
    }
}

//! OpenAPI documentation for both services.
//!
//! [`VetBotApiDoc`] covers the veterinary assistant and [`AdventureApiDoc`]
//! the outdoor-adventure API. Each registers:
//!
//! - **Paths**: every HTTP endpoint the service mounts
//! - **Schemas**: mirror types from [`crate::inbound::http::schemas`] so the
//!   domain stays free of utoipa
//! - **Security**: the admin API key header or the session cookie
//!
//! Swagger UI serves the documents in debug builds; `openapi-dump` exports
//! them for external tooling.

use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, LanguageSchema, SpeciesSchema, UrgencySchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Register the admin API key header.
struct ApiKeyAddon;

impl Modify for ApiKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ApiKey",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                crate::middleware::API_KEY_HEADER,
                "Administrator key required by /api/v1/admin endpoints.",
            ))),
        );
    }
}

/// Register the session cookie.
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the veterinary assistant.
#[derive(OpenApi)]
#[openapi(
    modifiers(&ApiKeyAddon),
    info(
        title = "AI Veterinary Bot Service",
        version = "1.0.0",
        description = "Multilingual pet-care assistant with a medication catalogue, \
                       usage analytics and model training administration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::vet::service::index,
        crate::inbound::http::vet::service::health,
        crate::inbound::http::vet::service::detailed_health,
        crate::inbound::http::vet::chat::ask,
        crate::inbound::http::vet::chat::feedback,
        crate::inbound::http::vet::chat::history,
        crate::inbound::http::vet::chat::translate,
        crate::inbound::http::vet::chat::suggestions,
        crate::inbound::http::vet::medicines::list_medicines,
        crate::inbound::http::vet::medicines::medicine_stats,
        crate::inbound::http::vet::medicines::medicines_for_species,
        crate::inbound::http::vet::medicines::search_medicines,
        crate::inbound::http::vet::medicines::generate_medicines,
        crate::inbound::http::vet::medicines::get_medicine,
        crate::inbound::http::vet::analytics::usage,
        crate::inbound::http::vet::analytics::performance,
        crate::inbound::http::vet::admin::training_status,
        crate::inbound::http::vet::admin::system_stats,
        crate::inbound::http::vet::admin::model_info,
        crate::inbound::http::vet::admin::admin_stats,
        crate::inbound::http::vet::admin::start_training,
        crate::inbound::http::vet::admin::stop_training,
        crate::inbound::http::vet::admin::restart_services,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        SpeciesSchema,
        LanguageSchema,
        UrgencySchema
    )),
    tags(
        (name = "service", description = "Service discovery"),
        (name = "chat", description = "Questions, feedback and translation"),
        (name = "medicines", description = "Medication catalogue"),
        (name = "analytics", description = "Usage and performance counters"),
        (name = "admin", description = "Training and service administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct VetBotApiDoc;

/// OpenAPI document for the outdoor-adventure API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SessionCookieAddon),
    info(
        title = "Outdoor adventure API",
        version = "1.0.0",
        description = "Trails, user profiles, community posts and image uploads."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::adventure::auth::login,
        crate::inbound::http::adventure::users::list_users,
        crate::inbound::http::adventure::users::get_user,
        crate::inbound::http::adventure::users::update_user,
        crate::inbound::http::adventure::trails::list_trails,
        crate::inbound::http::adventure::trails::get_trail,
        crate::inbound::http::adventure::trails::create_trail,
        crate::inbound::http::adventure::trails::update_trail,
        crate::inbound::http::adventure::trails::delete_trail,
        crate::inbound::http::adventure::community::list_posts,
        crate::inbound::http::adventure::community::create_post,
        crate::inbound::http::adventure::community::toggle_like,
        crate::inbound::http::adventure::community::add_comment,
        crate::inbound::http::adventure::community::list_comments,
        crate::inbound::http::adventure::stats::platform_stats,
        crate::inbound::http::adventure::uploads::upload_image,
        crate::inbound::http::adventure::uploads::serve_upload,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema, LanguageSchema)),
    tags(
        (name = "auth", description = "Sign-in"),
        (name = "users", description = "Operations related to users"),
        (name = "trails", description = "Trail catalogue"),
        (name = "community", description = "Posts, likes and comments"),
        (name = "stats", description = "Platform counters"),
        (name = "uploads", description = "Image uploads"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct AdventureApiDoc;

//! HTTP handlers of the outdoor-adventure API.

use actix_web::web;
use serde::Serialize;
use utoipa::ToSchema;

pub mod auth;
pub mod community;
pub mod stats;
pub mod trails;
pub mod uploads;
pub mod users;

/// `{message}` acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Trail updated successfully")]
    pub message: &'static str,
}

impl MessageResponse {
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// `{id, message}` acknowledgement of a created record.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Trail created successfully")]
    pub message: &'static str,
}

impl CreatedResponse {
    pub const fn new(id: String, message: &'static str) -> Self {
        Self { id, message }
    }
}

/// Register the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(trails::list_trails)
        .service(trails::get_trail)
        .service(trails::create_trail)
        .service(trails::update_trail)
        .service(trails::delete_trail)
        .service(community::list_posts)
        .service(community::create_post)
        .service(community::toggle_like)
        .service(community::add_comment)
        .service(community::list_comments)
        .service(stats::platform_stats)
        .service(uploads::upload_image);
}

//! HTTP handlers of the veterinary bot service.
//!
//! Successful responses share one envelope, `{"success": true, "data": …}`;
//! failures use the error envelope from [`crate::inbound::http::error`].

use actix_web::web;
use serde::Serialize;
use utoipa::ToSchema;

use crate::middleware::RequireApiKey;

pub mod admin;
pub mod analytics;
pub mod chat;
pub mod medicines;
pub mod service;

/// `{success: true, data}` wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    /// Always `true`.
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{success: true, message}` acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct Acknowledgement {
    pub success: bool,
    #[schema(example = "Feedback received successfully")]
    pub message: &'static str,
}

impl Acknowledgement {
    pub const fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// Register the `/api/v1` routes. Admin routes sit behind `guard`.
pub fn configure_v1(cfg: &mut web::ServiceConfig, guard: RequireApiKey) {
    cfg.service(service::health)
        .service(service::detailed_health)
        .service(
            web::scope("/chat")
                .service(chat::ask)
                .service(chat::feedback)
                .service(chat::history)
                .service(chat::translate)
                .service(chat::suggestions),
        )
        .service(
            web::scope("/medicines")
                .service(medicines::list_medicines)
                .service(medicines::medicine_stats)
                .service(medicines::medicines_for_species)
                .service(medicines::search_medicines)
                .service(medicines::generate_medicines)
                .service(medicines::get_medicine),
        )
        .service(
            web::scope("/analytics")
                .service(analytics::usage)
                .service(analytics::performance),
        )
        .service(
            web::scope("/admin")
                .wrap(guard)
                .service(admin::training_status)
                .service(admin::system_stats)
                .service(admin::model_info)
                .service(admin::admin_stats)
                .service(admin::start_training)
                .service(admin::stop_training)
                .service(admin::restart_services),
        );
}

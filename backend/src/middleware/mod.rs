//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by both services. Tracing and
//! security headers wrap every app; the veterinary service adds rate
//! limiting, usage accounting and the admin API key guard.

use actix_cors::Cors;
use actix_web::http::{Method, header};
use actix_web::middleware::DefaultHeaders;
use url::Url;

pub mod api_key;
pub mod rate_limit;
pub mod trace;
pub mod usage;

pub use api_key::RequireApiKey;
pub use rate_limit::RateLimit;
pub use trace::Trace;
pub use usage::TrackUsage;

/// Header carrying the admin API key. Also keys the rate limiter.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Content security policy sent with every response.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self' 'unsafe-inline'; \
     style-src 'self' 'unsafe-inline'; img-src 'self' data: https:";

/// Hardening headers added to every response.
#[must_use]
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .add((header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY))
}

/// CORS policy admitting `origins` with credentials.
#[must_use]
pub fn cors(origins: &[Url]) -> Cors {
    let cors = Cors::default()
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static(API_KEY_HEADER),
        ])
        .supports_credentials()
        .max_age(3600);
    origins.iter().fold(cors, |cors, origin| {
        // `Url` renders a bare origin with a trailing slash; browsers send none.
        cors.allowed_origin(origin.as_str().trim_end_matches('/'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    #[actix_web::test]
    async fn responses_carry_security_headers() {
        let app = test::init_service(
            App::new()
                .wrap(security_headers())
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let headers = res.headers();
        assert_eq!(headers.get("x-content-type-options").expect("nosniff"), "nosniff");
        assert_eq!(headers.get("x-frame-options").expect("frame options"), "SAMEORIGIN");
        assert_eq!(
            headers.get("content-security-policy").expect("csp"),
            CONTENT_SECURITY_POLICY
        );
    }

    #[actix_web::test]
    async fn configured_origins_are_allowed() {
        let origins = [Url::parse("http://localhost:5173").expect("origin")];
        let app = test::init_service(
            App::new()
                .wrap(cors(&origins))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/")
                .insert_header((header::ORIGIN, "http://localhost:5173"))
                .to_request(),
        )
        .await;
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .expect("allow origin"),
            "http://localhost:5173"
        );
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .expect("allow credentials"),
            "true"
        );
    }
}

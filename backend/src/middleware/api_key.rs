//! Shared-secret guard for administrative routes.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;
use zeroize::Zeroizing;

use super::API_KEY_HEADER;
use crate::domain::{Error as DomainError, constant_time_eq, secret_fingerprint};

/// Rejects requests whose `x-api-key` header does not match the
/// configured key.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use lvhub::middleware::RequireApiKey;
///
/// let app = App::new().service(
///     web::scope("/admin").wrap(RequireApiKey::new("admin-key-123")),
/// );
/// ```
#[derive(Clone)]
pub struct RequireApiKey {
    expected: Arc<Zeroizing<String>>,
}

impl RequireApiKey {
    /// Guard requiring `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            expected: Arc::new(Zeroizing::new(key.into())),
        }
    }

    fn verify(&self, req: &ServiceRequest) -> Result<(), DomainError> {
        let Some(presented) = req.headers().get(API_KEY_HEADER) else {
            warn!(path = req.path(), "admin request without API key");
            return Err(DomainError::unauthorized("API key required"));
        };
        if constant_time_eq(presented.as_bytes(), self.expected.as_bytes()) {
            Ok(())
        } else {
            warn!(
                path = req.path(),
                key = %secret_fingerprint(presented.as_bytes()),
                "admin request with invalid API key"
            );
            Err(DomainError::unauthorized("Invalid API key"))
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireApiKey
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireApiKeyMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireApiKeyMiddleware {
            service,
            guard: self.clone(),
        }))
    }
}

/// Service wrapper produced by [`RequireApiKey`].
pub struct RequireApiKeyMiddleware<S> {
    service: S,
    guard: RequireApiKey,
}

impl<S, B> Service<ServiceRequest> for RequireApiKeyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.guard.verify(&req) {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(error) => {
                let response = error.error_response();
                Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case(None, StatusCode::UNAUTHORIZED, Some("API key required"))]
    #[case(Some("wrong"), StatusCode::UNAUTHORIZED, Some("Invalid API key"))]
    #[case(Some("admin-key-12"), StatusCode::UNAUTHORIZED, Some("Invalid API key"))]
    #[case(Some("admin-key-123"), StatusCode::OK, None)]
    #[actix_web::test]
    async fn admin_scope_requires_matching_key(
        #[case] key: Option<&str>,
        #[case] expected: StatusCode,
        #[case] message: Option<&str>,
    ) {
        let app = test::init_service(
            App::new().service(
                web::scope("/admin")
                    .wrap(RequireApiKey::new("admin-key-123"))
                    .route("/stats", web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;
        let mut req = test::TestRequest::get().uri("/admin/stats");
        if let Some(key) = key {
            req = req.insert_header((API_KEY_HEADER, key));
        }
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), expected);
        if let Some(message) = message {
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["message"], message);
            assert_eq!(body["error"], "Unauthorized");
        }
    }
}

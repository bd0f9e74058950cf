//! Fixed-window rate limiting for the API scope.
//!
//! Callers are keyed by a fingerprint of their `x-api-key` header when one is
//! sent, else by peer IP address. Refused requests never reach the handler.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::RETRY_AFTER;
use actix_web::{Error, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use super::API_KEY_HEADER;
use crate::domain::{Error as DomainError, FixedWindowLimiter, RateDecision, secret_fingerprint};

/// Message returned with every 429.
pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

/// Middleware admitting at most the limiter's quota per caller and window.
///
/// Clones share one limiter, so the quota holds across server workers.
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<FixedWindowLimiter>,
}

impl RateLimit {
    /// Wrap `limiter`.
    #[must_use]
    pub fn new(limiter: Arc<FixedWindowLimiter>) -> Self {
        Self { limiter }
    }
}

fn caller_key(req: &ServiceRequest) -> String {
    if let Some(key) = req.headers().get(API_KEY_HEADER) {
        return format!("key:{}", secret_fingerprint(key.as_bytes()));
    }
    req.peer_addr()
        .map_or_else(|| "unknown".to_owned(), |addr| format!("ip:{}", addr.ip()))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: Arc<FixedWindowLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let key = caller_key(&req);
        match self.limiter.check(&key) {
            RateDecision::Allowed { .. } => {
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            RateDecision::Limited { retry_after } => {
                warn!(caller = %key, path = req.path(), "rate limit exceeded");
                let mut response = DomainError::too_many_requests(RATE_LIMITED_MESSAGE)
                    .error_response();
                // Round up so clients never retry inside the window.
                let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, seconds.max(1).into());
                Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::Value;

    use crate::domain::RateLimitConfig;
    use crate::test_support::MutableClock;

    fn limiter(max_requests: u32) -> (Arc<FixedWindowLimiter>, Arc<MutableClock>) {
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let limiter = FixedWindowLimiter::new(
            RateLimitConfig {
                max_requests,
                window: Duration::from_secs(60),
            },
            clock.clone(),
        );
        (Arc::new(limiter), clock)
    }

    macro_rules! app {
        ($limiter:expr) => {
            test::init_service(
                App::new()
                    .wrap(RateLimit::new($limiter))
                    .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
            )
            .await
        };
    }

    #[rstest]
    #[actix_web::test]
    async fn refuses_requests_over_quota() {
        let (limiter, _clock) = limiter(2);
        let app = app!(limiter);
        for _ in 0..2 {
            let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
        }
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            res.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()),
            Some("60")
        );
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], RATE_LIMITED_MESSAGE);
        assert_eq!(body["code"], "too_many_requests");
    }

    #[rstest]
    #[actix_web::test]
    async fn api_keys_get_their_own_quota() {
        let (limiter, _clock) = limiter(1);
        let app = app!(limiter);
        let anonymous = test::TestRequest::get().uri("/").to_request();
        assert_eq!(test::call_service(&app, anonymous).await.status(), StatusCode::OK);
        let keyed = test::TestRequest::get()
            .uri("/")
            .insert_header((API_KEY_HEADER, "key-a"))
            .to_request();
        assert_eq!(test::call_service(&app, keyed).await.status(), StatusCode::OK);
        let again = test::TestRequest::get()
            .uri("/")
            .insert_header((API_KEY_HEADER, "key-a"))
            .to_request();
        assert_eq!(
            test::call_service(&app, again).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn quota_returns_after_the_window() {
        let (limiter, clock) = limiter(1);
        let app = app!(limiter);
        let first = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(first.status(), StatusCode::OK);
        clock.advance_seconds(61);
        let later = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(later.status(), StatusCode::OK);
    }
}

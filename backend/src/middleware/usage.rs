//! Request accounting and access logging.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::info;

use crate::domain::vet::UsageTracker;

/// Counts every request into a [`UsageTracker`] and emits one access log
/// event per response.
#[derive(Clone)]
pub struct TrackUsage {
    usage: Arc<UsageTracker>,
}

impl TrackUsage {
    /// Record into `usage`.
    #[must_use]
    pub fn new(usage: Arc<UsageTracker>) -> Self {
        Self { usage }
    }
}

impl<S, B> Transform<S, ServiceRequest> for TrackUsage
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TrackUsageMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TrackUsageMiddleware {
            service,
            usage: Arc::clone(&self.usage),
        }))
    }
}

/// Service wrapper produced by [`TrackUsage`].
pub struct TrackUsageMiddleware<S> {
    service: S,
    usage: Arc<UsageTracker>,
}

impl<S, B> Service<ServiceRequest> for TrackUsageMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_owned();
        let usage = Arc::clone(&self.usage);
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            let elapsed = started.elapsed();
            let status = res.status().as_u16();
            usage.record_request(status, elapsed);
            info!(
                %method,
                path = %path,
                status,
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "request completed"
            );
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};
    use chrono::Utc;

    #[actix_web::test]
    async fn counts_requests_and_successes() {
        let usage = Arc::new(UsageTracker::default());
        let app = test::init_service(
            App::new()
                .wrap(TrackUsage::new(Arc::clone(&usage)))
                .route("/ok", web::get().to(|| async { HttpResponse::Ok().finish() }))
                .route(
                    "/bad",
                    web::get().to(|| async { HttpResponse::BadRequest().finish() }),
                ),
        )
        .await;
        for uri in ["/ok", "/ok", "/bad"] {
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        }
        let snapshot = usage.snapshot(0, Utc::now());
        assert_eq!(snapshot.total_queries, 3);
        assert_eq!(snapshot.successful_responses, 2);
    }
}

//! Server construction and middleware wiring for both services.

pub mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::{AdventureConfig, BuildMode, ConfigError, VetBotConfig};
pub use state_builders::{
    StartupError, VET_SERVICE_NAME, VET_SERVICE_VERSION, build_adventure_state, build_vet_state,
};

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::Clock;
use url::Url;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::{AdventureApiDoc, VetBotApiDoc};
use crate::domain::{FixedWindowLimiter, RateLimitConfig};
use crate::inbound::http::adventure::{self, uploads::serve_upload};
use crate::inbound::http::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::{AdventureState, VetState};
use crate::inbound::http::vet::{self, service};
use crate::middleware::{RateLimit, RequireApiKey, Trace, TrackUsage, cors, security_headers};

/// JSON bodies larger than this are refused.
pub const JSON_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Grace period for in-flight requests once shutdown starts.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Extractor configuration routing failures through the error envelope.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(json_error_handler),
    )
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler));
}

/// Per-worker inputs of the veterinary app.
#[derive(Clone)]
pub struct VetAppDependencies {
    pub health_state: web::Data<HealthState>,
    pub state: web::Data<VetState>,
    /// Shared by every worker so the quota is process-wide.
    pub limiter: Arc<FixedWindowLimiter>,
    pub api_key: RequireApiKey,
    pub allowed_origins: Arc<[Url]>,
}

impl VetAppDependencies {
    /// Dependencies for `state` configured from `config`.
    pub fn new(
        config: &VetBotConfig,
        state: web::Data<VetState>,
        health_state: web::Data<HealthState>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            health_state,
            state,
            limiter: Arc::new(FixedWindowLimiter::new(config.rate_limit, clock)),
            api_key: RequireApiKey::new(config.admin_api_key.as_str()),
            allowed_origins: config.allowed_origins.clone().into(),
        }
    }

    /// Override the rate limit, e.g. for tests.
    #[must_use]
    pub fn with_rate_limit(mut self, limit: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        self.limiter = Arc::new(FixedWindowLimiter::new(limit, clock));
        self
    }
}

/// Assemble the veterinary bot app.
pub fn build_vet_app(
    deps: VetAppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let VetAppDependencies {
        health_state,
        state,
        limiter,
        api_key,
        allowed_origins,
    } = deps;
    let usage = Arc::clone(&state.usage);

    let api = web::scope("/api/v1")
        .wrap(RateLimit::new(limiter))
        .configure(move |cfg| vet::configure_v1(cfg, api_key));

    let app = App::new()
        .app_data(health_state)
        .app_data(state)
        .configure(extractor_configs)
        .wrap(TrackUsage::new(usage))
        .wrap(cors(&allowed_origins))
        .wrap(security_headers())
        .wrap(Trace)
        .service(service::index)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", VetBotApiDoc::openapi()),
    );

    app.default_service(web::to(service::not_found))
}

/// Per-worker inputs of the adventure app.
#[derive(Clone)]
pub struct AdventureAppDependencies {
    pub health_state: web::Data<HealthState>,
    pub state: web::Data<AdventureState>,
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
    pub allowed_origins: Arc<[Url]>,
}

impl AdventureAppDependencies {
    /// Dependencies for `state` configured from `config`.
    pub fn new(
        config: &AdventureConfig,
        state: web::Data<AdventureState>,
        health_state: web::Data<HealthState>,
    ) -> Self {
        Self {
            health_state,
            state,
            key: config.session.key.clone(),
            cookie_secure: config.session.cookie_secure,
            same_site: config.session.same_site,
            allowed_origins: config.allowed_origins.clone().into(),
        }
    }
}

/// Assemble the outdoor-adventure app.
pub fn build_adventure_app(
    deps: AdventureAppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AdventureAppDependencies {
        health_state,
        state,
        key,
        cookie_secure,
        same_site,
        allowed_origins,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api")
        .wrap(session)
        .configure(adventure::configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(state)
        .configure(extractor_configs)
        .wrap(cors(&allowed_origins))
        .wrap(security_headers())
        .wrap(Trace)
        .service(api)
        .service(serve_upload)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", AdventureApiDoc::openapi()),
    );

    app
}

/// Bind the veterinary bot server. The server stops gracefully, waiting
/// up to ten seconds for in-flight requests.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_vet_server(deps: VetAppDependencies, bind_addr: SocketAddr) -> std::io::Result<Server> {
    let health_state = deps.health_state.clone();
    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::for_service("vet_bot");

    let server = HttpServer::new(move || {
        let app = build_vet_app(deps.clone());
        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());
        app
    })
    .shutdown_timeout(SHUTDOWN_TIMEOUT.as_secs())
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

/// Bind the outdoor-adventure server.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_adventure_server(
    deps: AdventureAppDependencies,
    bind_addr: SocketAddr,
) -> std::io::Result<Server> {
    let health_state = deps.health_state.clone();
    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::for_service("adventure_api");

    let server = HttpServer::new(move || {
        let app = build_adventure_app(deps.clone());
        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());
        app
    })
    .shutdown_timeout(SHUTDOWN_TIMEOUT.as_secs())
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

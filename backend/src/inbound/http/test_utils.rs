//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};
use chrono::Utc;
use mockable::DefaultClock;
use url::Url;

use super::session::SessionContext;
use super::state::{AdventurePorts, AdventureState, ServiceInfo, VetPorts, VetState};
use crate::domain::ports::{
    MockAiProvider, MockCommunityRepository, MockConversationStore, MockKnowledgeSource,
    MockLoginService, MockMedicationStore, MockModelInfoSource, MockSystemProbe,
    MockTrailRepository, MockTrainingProcess, MockTranslator, MockUploadStore,
    MockUserRepository,
};
use crate::domain::vet::{BotPorts, CataloguePacing};
use crate::domain::{EmailAddress, User, UserId};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mocked ports behind [`AdventureState`]; set expectations, then call
/// [`AdventureMocks::into_state`].
#[derive(Default)]
pub struct AdventureMocks {
    pub login: MockLoginService,
    pub users: MockUserRepository,
    pub trails: MockTrailRepository,
    pub community: MockCommunityRepository,
    pub uploads: MockUploadStore,
}

impl AdventureMocks {
    pub fn into_state(self) -> AdventureState {
        self.into_state_at("http://localhost:5000/")
    }

    pub fn into_state_at(self, public_base_url: &str) -> AdventureState {
        AdventureState::new(
            AdventurePorts {
                login: Arc::new(self.login),
                users: Arc::new(self.users),
                trails: Arc::new(self.trails),
                community: Arc::new(self.community),
                uploads: Arc::new(self.uploads),
            },
            Url::parse(public_base_url).expect("base url"),
            Arc::new(DefaultClock),
        )
    }
}

/// Mocked ports behind [`VetState`]. The AI mock answers `name()` so the
/// bot can be constructed; add further expectations before
/// [`VetMocks::into_state`].
#[derive(Default)]
pub struct VetMocks {
    pub ai: MockAiProvider,
    pub translator: MockTranslator,
    pub knowledge: MockKnowledgeSource,
    pub medications: MockMedicationStore,
    pub conversations: MockConversationStore,
    pub training: MockTrainingProcess,
    pub system: MockSystemProbe,
    pub model_info: MockModelInfoSource,
}

impl VetMocks {
    pub fn into_state(mut self) -> VetState {
        self.ai.expect_name().return_const("Mock AI".to_owned());
        VetState::new(
            VetPorts {
                bot: BotPorts {
                    ai: Arc::new(self.ai),
                    translator: Arc::new(self.translator),
                    knowledge: Arc::new(self.knowledge),
                    medications: Arc::new(self.medications),
                },
                conversations: Arc::new(self.conversations),
                training: Arc::new(self.training),
                system: Arc::new(self.system),
                model_info: Arc::new(self.model_info),
            },
            CataloguePacing::immediate(),
            ServiceInfo {
                name: "AI Veterinary Bot Service",
                version: "1.0.0",
                environment: "test",
                started: Utc::now(),
            },
            Arc::new(DefaultClock),
        )
    }
}

/// A user record for handler tests.
pub fn sample_user(id: &str, email: &str, is_admin: bool) -> User {
    let mut user = User::new(
        UserId::new(id).expect("user id"),
        "Anna Bērziņa".to_owned(),
        EmailAddress::new(email).expect("email"),
        Utc::now(),
    );
    user.is_admin = is_admin;
    user
}

/// Route handler that signs the caller in as `{id}`; register it at
/// [`SIGN_IN_PATH`] in tests that need a session.
pub async fn sign_in_handler(
    session: SessionContext,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    let id = UserId::new(path.into_inner()).map_err(actix_web::error::ErrorBadRequest)?;
    session.sign_in(&id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Path template for [`sign_in_handler`].
pub const SIGN_IN_PATH: &str = "/test/sign-in/{id}";

/// Sign in as `user_id` and return the session cookie to replay.
pub async fn sign_in<S, B>(app: &S, user_id: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri(&format!("/test/sign-in/{user_id}"))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "sign-in failed: {}", res.status());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
        .expect("session cookie")
}

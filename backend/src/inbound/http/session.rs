//! Cookie-session access for the adventure API.
//!
//! Handlers take a [`SessionContext`] and ask it who is signed in; the
//! cookie layout stays private to this module.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

/// Session entry holding the signed-in user's id.
pub(crate) const SIGNED_IN_USER_KEY: &str = "signed_in_user";

/// The caller's cookie session, seen as a sign-in record.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record `user_id` as signed in. The session key is renewed so a cookie
    /// issued before sign-in cannot be replayed afterwards.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(SIGNED_IN_USER_KEY, user_id.as_str())
            .map_err(|error| Error::internal(format!("failed to write session: {error}")))
    }

    /// The signed-in user, or `None` for anonymous callers.
    ///
    /// A cookie holding a malformed id counts as anonymous.
    pub fn current_user(&self) -> Result<Option<UserId>, Error> {
        let stored = self
            .0
            .get::<String>(SIGNED_IN_USER_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(stored.and_then(|raw| match UserId::new(raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "discarding malformed user id from session cookie");
                None
            }
        }))
    }

    /// The signed-in user; `401 Unauthorized` when there is none.
    pub fn require_user(&self) -> Result<UserId, Error> {
        self.current_user()?
            .ok_or_else(|| Error::unauthorized("Authentication required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { Ok(Self::new(session.await?)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use crate::inbound::http::test_utils::{
        SIGN_IN_PATH, sign_in, sign_in_handler, test_session_middleware,
    };

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = session.require_user()?;
        Ok(HttpResponse::Ok().body(id.to_string()))
    }

    async fn plant_raw_id(session: Session) -> HttpResponse {
        session
            .insert(SIGNED_IN_USER_KEY, "not a valid id!")
            .expect("write raw id");
        HttpResponse::Ok().finish()
    }

    macro_rules! session_app {
        () => {
            test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .route(SIGN_IN_PATH, web::post().to(sign_in_handler))
                    .route("/plant", web::get().to(plant_raw_id))
                    .route("/whoami", web::get().to(whoami)),
            )
            .await
        };
    }

    #[rstest]
    #[actix_web::test]
    async fn signed_in_user_is_recognised() {
        let app = session_app!();
        let cookie = sign_in(&app, "user-2").await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .cookie(cookie)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "user-2");
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_caller_is_unauthorised() {
        let app = session_app!();
        let req = test::TestRequest::get().uri("/whoami").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_stored_id_counts_as_anonymous() {
        let app = session_app!();
        let res = test::call_service(&app, test::TestRequest::get().uri("/plant").to_request()).await;
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned())
            .expect("session cookie");

        let req = test::TestRequest::get()
            .uri("/whoami")
            .cookie(cookie)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

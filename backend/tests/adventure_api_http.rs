//! End-to-end behaviour of the adventure app: sign-in, the trail catalogue
//! and cookie sessions.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{test, web};
use mockable::{DefaultClock, MockEnv};
use rstest::rstest;
use serde_json::{Value, json};
use tempfile::TempDir;

use lvhub::inbound::http::health::HealthState;
use lvhub::server::{
    AdventureAppDependencies, AdventureConfig, BuildMode, build_adventure_app,
    build_adventure_state,
};

const ADMIN_EMAIL: &str = "emalinovskis@me.com";
const ADMIN_PASSWORD: &str = "integration-pw";

async fn deps(uploads: &TempDir) -> AdventureAppDependencies {
    let upload_dir = uploads.path().join("uploads").to_string_lossy().into_owned();
    let mut env = MockEnv::new();
    env.expect_string().times(0..).returning(move |key| match key {
        "UPLOAD_DIR" => Some(upload_dir.clone()),
        "ADMIN_PASSWORD" => Some(ADMIN_PASSWORD.to_owned()),
        "SESSION_KEY_FILE" => Some("/nonexistent/session_key".to_owned()),
        "SESSION_COOKIE_SECURE" => Some("0".to_owned()),
        _ => None,
    });
    let config = AdventureConfig::from_env(&env, BuildMode::Debug).expect("config");
    let state = build_adventure_state(&config, Arc::new(DefaultClock))
        .await
        .expect("state");
    AdventureAppDependencies::new(
        &config,
        web::Data::new(state),
        web::Data::new(HealthState::new()),
    )
}

fn session_cookie<B>(res: &actix_web::dev::ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

fn trail_body() -> Value {
    json!({
        "name": { "en": "Kemeri Bog Boardwalk", "lv": "Ķemeru purva laipa" },
        "description": { "en": "Raised boardwalk across the Great Kemeri Bog." },
        "region": "Kurzeme",
        "difficulty": "easy",
        "distance": "3.4 km",
        "latitude": 56.93,
        "longitude": 23.48,
        "parkingAvailable": "true",
    })
}

#[rstest]
#[actix_rt::test]
async fn trails_are_listed_without_a_session() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = test::init_service(build_adventure_app(deps(&dir).await)).await;
    let req = test::TestRequest::get().uri("/api/trails").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("trace-id"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_rt::test]
async fn unknown_difficulty_filter_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = test::init_service(build_adventure_app(deps(&dir).await)).await;
    let req = test::TestRequest::get()
        .uri("/api/trails?difficulty=vertical")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "difficulty");
}

#[rstest]
#[case::wrong_password(json!({ "email": ADMIN_EMAIL, "password": "nope" }), StatusCode::UNAUTHORIZED)]
#[case::unknown_user(json!({ "email": "ghost@example.com", "password": "pw" }), StatusCode::UNAUTHORIZED)]
#[case::bad_email(json!({ "email": "not-an-email", "password": "pw" }), StatusCode::BAD_REQUEST)]
#[actix_rt::test]
async fn failed_logins_do_not_issue_a_session(#[case] body: Value, #[case] expected: StatusCode) {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = test::init_service(build_adventure_app(deps(&dir).await)).await;
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), expected);
    assert!(res.response().cookies().all(|c| c.name() != "session"));
}

#[rstest]
#[actix_rt::test]
async fn creating_a_trail_requires_a_session() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = test::init_service(build_adventure_app(deps(&dir).await)).await;
    let req = test::TestRequest::post()
        .uri("/api/trails")
        .set_json(trail_body())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_rt::test]
async fn administrator_publishes_a_trail() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = test::init_service(build_adventure_app(deps(&dir).await)).await;

    let login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .to_request();
    let res = test::call_service(&app, login).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["user"]["isAdmin"], true);

    let create = test::TestRequest::post()
        .uri("/api/trails")
        .cookie(cookie)
        .set_json(trail_body())
        .to_request();
    let res = test::call_service(&app, create).await;
    assert_eq!(res.status(), StatusCode::OK);
    let created: Value = test::read_body_json(res).await;
    let id = created["id"].as_str().expect("trail id").to_owned();

    let req = test::TestRequest::get()
        .uri(&format!("/api/trails/{id}"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let trail: Value = test::read_body_json(res).await;
    assert_eq!(trail["region"], "Kurzeme");
    assert_eq!(trail["parkingAvailable"], true);

    let req = test::TestRequest::get()
        .uri("/api/trails?region=kurzeme")
        .to_request();
    let res = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_rt::test]
async fn missing_uploads_are_not_found() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = test::init_service(build_adventure_app(deps(&dir).await)).await;
    let req = test::TestRequest::get()
        .uri("/uploads/image-1-2.png")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_rt::test]
async fn readiness_reflects_startup() {
    let dir = tempfile::tempdir().expect("temp dir");
    let deps = deps(&dir).await;
    let health = deps.health_state.clone();
    let app = test::init_service(build_adventure_app(deps)).await;

    let req = test::TestRequest::get().uri("/health/ready").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );

    health.mark_ready();
    let req = test::TestRequest::get().uri("/health/ready").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

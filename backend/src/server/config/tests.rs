//! Unit tests for environment-driven configuration.

use std::collections::HashMap;
use std::io::Write as _;

use actix_web::cookie::SameSite;
use mockable::MockEnv;
use rstest::rstest;
use tempfile::NamedTempFile;

use super::session::{
    ALLOW_EPHEMERAL_ENV, COOKIE_SECURE_ENV, KEY_FILE_ENV, SAMESITE_ENV, SESSION_KEY_MIN_LEN,
};
use super::*;

fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(&vec![b'k'; len]).expect("write key");
    file
}

#[rstest]
fn vet_defaults_in_debug() {
    let config = VetBotConfig::from_env(&mock_env(&[]), BuildMode::Debug).expect("config");
    assert_eq!(config.bind_addr.port(), 3001);
    assert_eq!(config.admin_api_key.as_str(), "admin-key-123");
    assert_eq!(config.ai_provider, AiProviderKind::Template);
    assert_eq!(config.database, DatabaseKind::Sqlite);
    assert!(!config.redis_configured);
    assert_eq!(config.rate_limit.max_requests, 100);
    assert_eq!(config.rate_limit.window, Duration::from_secs(60));
    assert_eq!(
        config.allowed_origins,
        vec![Url::parse("http://localhost:5173").expect("url")]
    );
    assert_eq!(config.model.python, "python3");
    assert_eq!(config.model.training_dir, PathBuf::from("ai-training"));
}

#[rstest]
fn release_requires_admin_api_key() {
    let err = VetBotConfig::from_env(&mock_env(&[]), BuildMode::Release)
        .err()
        .expect("missing key must fail");
    assert!(matches!(err, ConfigError::MissingEnv { name: "ADMIN_API_KEY" }));
}

#[rstest]
fn vet_values_are_read() {
    let env = mock_env(&[
        ("PORT", "4100"),
        ("ADMIN_API_KEY", "s3cret"),
        ("AI_PROVIDER", "local"),
        ("DATABASE_TYPE", "memory"),
        ("REDIS_URL", "redis://localhost"),
        ("RATE_LIMIT_MAX_REQUESTS", "5"),
        ("RATE_LIMIT_WINDOW_SECS", "10"),
        ("ALLOWED_ORIGINS", "https://vet.example.lv, http://localhost:3000"),
    ]);
    let config = VetBotConfig::from_env(&env, BuildMode::Release).expect("config");
    assert_eq!(config.bind_addr.port(), 4100);
    assert_eq!(config.admin_api_key.as_str(), "s3cret");
    assert_eq!(config.ai_provider, AiProviderKind::Local);
    assert_eq!(config.database, DatabaseKind::Memory);
    assert!(config.redis_configured);
    assert_eq!(config.rate_limit.max_requests, 5);
    assert_eq!(config.allowed_origins.len(), 2);
}

#[rstest]
#[case("AI_PROVIDER", "openai")]
#[case("DATABASE_TYPE", "postgres")]
#[case("PORT", "70000")]
#[case("RATE_LIMIT_MAX_REQUESTS", "-1")]
#[case("RATE_LIMIT_WINDOW_SECS", "0")]
#[case("ALLOWED_ORIGINS", "not a url")]
fn malformed_vet_values_are_rejected(#[case] name: &str, #[case] value: &str) {
    let env = mock_env(&[(name, value)]);
    let err = VetBotConfig::from_env(&env, BuildMode::Debug)
        .err()
        .expect("invalid value must fail");
    assert!(matches!(err, ConfigError::InvalidEnv { .. }), "{err}");
}

#[rstest]
fn adventure_defaults_in_debug() {
    let config = AdventureConfig::from_env(&mock_env(&[]), BuildMode::Debug).expect("config");
    assert_eq!(config.bind_addr.port(), 5000);
    assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    assert_eq!(config.public_base_url.as_str(), "http://localhost:5000/");
    assert_eq!(config.session.same_site, SameSite::Lax);
    assert!(config.session.cookie_secure);
}

#[rstest]
fn public_base_url_keeps_its_path() {
    let env = mock_env(&[("PUBLIC_BASE_URL", "https://example.lv/hub")]);
    let config = AdventureConfig::from_env(&env, BuildMode::Debug).expect("config");
    let joined = config
        .public_base_url
        .join("uploads/image-1-2.png")
        .expect("join");
    assert_eq!(joined.as_str(), "https://example.lv/hub/uploads/image-1-2.png");
}

#[rstest]
fn release_session_settings_load_key_file() {
    let key = key_file(SESSION_KEY_MIN_LEN);
    let path = key.path().to_str().expect("utf8 path").to_owned();
    let env = mock_env(&[
        (KEY_FILE_ENV, &path),
        (COOKIE_SECURE_ENV, "1"),
        (SAMESITE_ENV, "Strict"),
        (ALLOW_EPHEMERAL_ENV, "0"),
    ]);
    let settings = session_settings_from_env(&env, BuildMode::Release).expect("settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
fn release_rejects_short_keys() {
    let key = key_file(SESSION_KEY_MIN_LEN - 1);
    let path = key.path().to_str().expect("utf8 path").to_owned();
    let env = mock_env(&[
        (KEY_FILE_ENV, &path),
        (COOKIE_SECURE_ENV, "1"),
        (SAMESITE_ENV, "Strict"),
        (ALLOW_EPHEMERAL_ENV, "0"),
    ]);
    let err = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("short key must fail");
    assert!(matches!(err, ConfigError::KeyTooShort { .. }));
}

#[rstest]
#[case(&[(COOKIE_SECURE_ENV, "maybe")])]
#[case(&[(COOKIE_SECURE_ENV, "0"), (SAMESITE_ENV, "None")])]
#[case(&[(COOKIE_SECURE_ENV, "1"), (SAMESITE_ENV, "Strict"), (ALLOW_EPHEMERAL_ENV, "1")])]
#[case(&[])]
fn release_rejects_unsafe_session_toggles(#[case] vars: &[(&str, &str)]) {
    let err = session_settings_from_env(&mock_env(vars), BuildMode::Release);
    assert!(err.is_err());
}

#[rstest]
fn debug_tolerates_invalid_toggles() {
    let env = mock_env(&[
        (KEY_FILE_ENV, "/nonexistent/session_key"),
        (COOKIE_SECURE_ENV, "maybe"),
        (SAMESITE_ENV, "sideways"),
    ]);
    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

//! Behaviour tests running the lint over a backend tree on disk.

use std::fs;
use std::path::Path;

use architecture_lint::{ArchitectureLintError, Violation, lint_backend_sources};
use rstest::{fixture, rstest};
use tempfile::TempDir;

const VALID_MODULES: &[(&str, &str)] = &[
    (
        "domain/vocabulary.rs",
        "pub enum Species { Dog } impl Species { pub fn parse() -> Self { Self::Dog } }",
    ),
    (
        "inbound/http/vet/chat.rs",
        "use crate::domain::Species; pub fn handler() { let _ = Species::parse(); }",
    ),
    (
        "outbound/memory/conversations.rs",
        "use crate::domain::ports::ConversationStore; pub struct InMemoryConversationStore;",
    ),
];

#[fixture]
fn backend() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for (file, contents) in VALID_MODULES {
        write_source(dir.path(), file, contents);
    }
    // Files outside the three layers are never linted.
    write_source(dir.path(), "server/mod.rs", "use crate::outbound::memory; fn f() {}");
    dir
}

fn write_source(backend: &Path, file: &str, contents: &str) {
    let path = backend.join("src").join(file);
    let parent = path.parent().expect("source parent");
    fs::create_dir_all(parent).expect("create source dir");
    fs::write(&path, contents).expect("write source");
}

fn violations(result: Result<(), ArchitectureLintError>) -> Vec<Violation> {
    match result {
        Err(ArchitectureLintError::Violations(violations)) => violations,
        other => panic!("expected violations, got: {other:?}"),
    }
}

fn assert_reported(violations: &[Violation], file: &str, fragment: &str) {
    assert!(
        violations
            .iter()
            .any(|v| v.file == Path::new(file) && v.message.contains(fragment)),
        "expected a violation in {file} mentioning {fragment}, got: {violations:?}"
    );
}

#[rstest]
fn valid_layers_pass(backend: TempDir) {
    let result = lint_backend_sources(backend.path());
    assert!(result.is_ok(), "result: {result:?}");
}

#[rstest]
#[case(
    "inbound/http/adventure/uploads.rs",
    "use lvhub::outbound::files::CapStdUploadStore; fn f() {}",
    "crate::outbound"
)]
#[case(
    "outbound/files/uploads.rs",
    "use crate::inbound::http::state; fn f() {}",
    "crate::inbound"
)]
#[case(
    "domain/trail.rs",
    "use actix_web::HttpResponse; fn f() { let _ = HttpResponse::Ok(); }",
    "external crate `actix_web`"
)]
#[case(
    "inbound/http/vet/admin.rs",
    "use crate::server::build_vet_state; fn f() {}",
    "crate::server"
)]
fn boundary_crossings_fail(
    backend: TempDir,
    #[case] file: &str,
    #[case] contents: &str,
    #[case] fragment: &str,
) {
    write_source(backend.path(), file, contents);
    let violations = violations(lint_backend_sources(backend.path()));
    assert_reported(&violations, file, fragment);
}

#[rstest]
fn every_violation_is_reported(backend: TempDir) {
    write_source(
        backend.path(),
        "inbound/http/bad.rs",
        "use crate::outbound::memory::InMemoryUserRepository; fn f() {}",
    );
    write_source(
        backend.path(),
        "domain/bad.rs",
        "use utoipa::ToSchema; #[derive(ToSchema)] struct Foo;",
    );
    let violations = violations(lint_backend_sources(backend.path()));
    assert_eq!(violations.len(), 2, "{violations:?}");
    assert_reported(&violations, "inbound/http/bad.rs", "crate::outbound");
    assert_reported(&violations, "domain/bad.rs", "external crate `utoipa`");
}

#[rstest]
fn unparsable_sources_are_reported(backend: TempDir) {
    write_source(backend.path(), "domain/broken.rs", "fn (");
    let result = lint_backend_sources(backend.path());
    assert!(matches!(result, Err(ArchitectureLintError::Parse { .. })));
}

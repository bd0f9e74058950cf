//! Repo-local architectural lint for the backend's hexagonal boundaries.
//!
//! Both services share one crate split into `domain` (rules and ports),
//! `inbound` (HTTP adapters) and `outbound` (port implementations), with
//! `server` as the only composition root. The lint:
//!
//! - forbids `domain` code from depending on adapters, the composition root,
//!   or the HTTP, OpenAPI and filesystem-capability crates
//! - forbids `inbound` adapters from importing `outbound` modules, the
//!   composition root, or filesystem and metrics crates directly
//! - forbids `outbound` adapters from importing `inbound` modules or the
//!   HTTP stack
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;

/// Library name of the linted crate, as used in `use lvhub::...` paths.
const CRATE_NAME: &str = "lvhub";

/// Top-level modules of the linted crate that a path may start with.
const CRATE_MODULES: &[&str] = &["domain", "inbound", "outbound", "server", "middleware"];

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `backend/src`.
    pub file: PathBuf,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Failure modes returned by the architecture lint.
#[derive(Debug)]
pub enum ArchitectureLintError {
    /// Filesystem traversal or reading failed.
    Io(io::Error),
    /// Rust source parsing failed, or the file sits outside every layer.
    Parse { file: PathBuf, message: String },
    /// One or more boundary violations were found.
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error while linting architecture: {err}"),
            Self::Parse { file, message } => write!(
                f,
                "Failed to parse Rust source while linting architecture ({}): {message}",
                file.display()
            ),
            Self::Violations(violations) => {
                writeln!(
                    f,
                    "{} architecture boundary violation(s):",
                    violations.len()
                )?;
                for violation in violations {
                    writeln!(f, "- {violation}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ArchitectureLintError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `backend/src`.
    pub file: PathBuf,
    pub contents: String,
}

/// Modules and crates one layer must not reach.
struct LayerRules {
    name: &'static str,
    modules: &'static [&'static str],
    crates: &'static [&'static str],
}

const DOMAIN_RULES: LayerRules = LayerRules {
    name: "domain",
    modules: &["inbound", "outbound", "server", "middleware"],
    crates: &[
        "actix_cors",
        "actix_multipart",
        "actix_service",
        "actix_session",
        "actix_web",
        "actix_web_prom",
        "cap_std",
        "utoipa",
        "utoipa_swagger_ui",
    ],
};

const INBOUND_RULES: LayerRules = LayerRules {
    name: "inbound",
    modules: &["outbound", "server"],
    crates: &["actix_web_prom", "cap_std"],
};

const OUTBOUND_RULES: LayerRules = LayerRules {
    name: "outbound",
    modules: &["inbound", "server", "middleware"],
    crates: &[
        "actix_cors",
        "actix_multipart",
        "actix_service",
        "actix_session",
        "actix_web",
        "utoipa",
    ],
};

/// The layer a file belongs to, from its first path component.
fn layer_rules(relative_path: &Path) -> Option<&'static LayerRules> {
    let first = relative_path.components().next()?.as_os_str().to_str()?;
    match first {
        "domain" => Some(&DOMAIN_RULES),
        "inbound" => Some(&INBOUND_RULES),
        "outbound" => Some(&OUTBOUND_RULES),
        _ => None,
    }
}

/// Lint the backend crate sources on disk.
///
/// `backend_dir` must be the `backend/` directory at the repository root.
///
/// # Errors
/// Fails on unreadable or unparsable sources and on any violation.
pub fn lint_backend_sources(backend_dir: &Path) -> Result<(), ArchitectureLintError> {
    let sources = collect_lint_sources(&backend_dir.join("src"))?;
    lint_sources(&sources)
}

/// Lint the provided Rust sources. Intended for unit and behaviour tests.
///
/// # Errors
/// Fails when a file lies outside the three layers, does not parse, or
/// crosses a boundary.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        let parse_error = |message: String| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message,
        };
        let rules = layer_rules(&source.file)
            .ok_or_else(|| parse_error("unable to infer module layer from file path".to_owned()))?;
        let parsed = syn::parse_file(&source.contents).map_err(|err| parse_error(err.to_string()))?;
        violations.extend(check_file(&source.file, rules, &parsed));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

fn check_file(file: &Path, rules: &LayerRules, parsed: &syn::File) -> Vec<Violation> {
    let mut collector = PathCollector::default();
    collector.visit_file(parsed);

    let mut messages = BTreeSet::new();
    for segments in &collector.paths {
        if let Some(module) = internal_module_root(segments).filter(|m| rules.modules.contains(m)) {
            messages.insert(format!(
                "{} module must not depend on crate::{module}",
                rules.name
            ));
        }
        if let Some(krate) = external_crate_root(segments).filter(|c| rules.crates.contains(c)) {
            messages.insert(format!(
                "{} module must not depend on external crate `{krate}`",
                rules.name
            ));
        }
    }

    messages
        .into_iter()
        .map(|message| Violation {
            file: file.to_path_buf(),
            message,
        })
        .collect()
}

fn is_relative_segment(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

/// Crate module a path points into, if any: `crate::outbound::x`,
/// `super::super::server`, `lvhub::domain` and bare `outbound::x` all
/// resolve.
fn internal_module_root(segments: &[String]) -> Option<&str> {
    let first = segments.first()?.as_str();
    let root = if CRATE_MODULES.contains(&first) {
        first
    } else if is_relative_segment(first) {
        segments
            .iter()
            .map(String::as_str)
            .find(|segment| !is_relative_segment(segment))?
    } else if first == CRATE_NAME {
        segments.get(1)?.as_str()
    } else {
        return None;
    };
    Some(root)
}

fn external_crate_root(segments: &[String]) -> Option<&str> {
    let root = segments.first()?.as_str();
    (!is_relative_segment(root) && root != CRATE_NAME).then_some(root)
}

/// Every path mentioned by a file, from `use` trees and expressions alike.
#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn record_use_tree(&mut self, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use_tree(&path.tree, prefix);
            }
            syn::UseTree::Name(syn::UseName { ident })
            | syn::UseTree::Rename(syn::UseRename { ident, .. }) => {
                prefix.push(ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.paths.insert(prefix);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use_tree(&node.tree, Vec::new());
    }
}

/// Rust sources of the three layers under `src_dir`, sorted by path.
fn collect_lint_sources(src_dir: &Path) -> Result<Vec<LintSource>, ArchitectureLintError> {
    let mut pending: Vec<PathBuf> = ["domain", "inbound", "outbound"]
        .iter()
        .map(|layer| src_dir.join(layer))
        .filter(|dir| dir.is_dir())
        .collect();
    let mut sources = Vec::new();

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
                continue;
            }
            let file = path
                .strip_prefix(src_dir)
                .map_err(|err| ArchitectureLintError::Parse {
                    file: path.clone(),
                    message: err.to_string(),
                })?
                .to_path_buf();
            let contents = fs::read_to_string(&path)?;
            sources.push(LintSource { file, contents });
        }
    }

    sources.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(sources)
}

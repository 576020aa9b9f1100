//! Repo-local architectural lint for enforcing hexagonal boundaries.
//!
//! The SkillSwap backend keeps its swap rules in `domain` and reaches HTTP,
//! SQL and logging sinks only through ports. This crate checks, per file
//! under `backend/src`, that:
//!
//! - `domain` never names `inbound`, `outbound`, the web stack, the
//!   session store, the OpenAPI generator, or Diesel
//! - `inbound` handlers never name `outbound` adapters or Diesel
//! - `outbound` adapters never name `inbound` or the web stack
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;

/// Name under which integration code refers to the backend library.
const LIBRARY_CRATE: &str = "skillswap";

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {message}", .file.display())]
pub struct Violation {
    /// File path relative to `backend/src`.
    pub file: PathBuf,
    pub message: String,
}

/// Failure modes returned by the architecture lint.
#[derive(Debug, thiserror::Error)]
pub enum ArchitectureLintError {
    #[error("I/O error while linting architecture: {0}")]
    Io(#[from] io::Error),
    #[error("cannot lint {}: {message}", .file.display())]
    Parse { file: PathBuf, message: String },
    #[error("architecture boundary violations:\n{}", list(.0))]
    Violations(Vec<Violation>),
}

fn list(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("- {violation}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `backend/src`.
    pub file: PathBuf,
    pub contents: String,
}

/// Lint the backend crate sources on disk.
///
/// `backend_dir` is the directory holding the backend's `Cargo.toml`.
pub fn lint_backend_sources(backend_dir: &Path) -> Result<(), ArchitectureLintError> {
    let src_dir = backend_dir.join("src");
    let mut sources = Vec::new();
    for layer in Layer::ALL {
        let dir = src_dir.join(layer.dir());
        if dir.is_dir() {
            collect_sources(&src_dir, &dir, &mut sources)?;
        }
    }
    lint_sources(&sources)
}

/// Lint in-memory sources. Every file must live under a layer directory.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        let parse_error = |message: String| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message,
        };
        let layer = Layer::of(&source.file)
            .ok_or_else(|| parse_error("not under domain/, inbound/ or outbound/".to_owned()))?;
        let parsed = syn::parse_file(&source.contents).map_err(|err| parse_error(err.to_string()))?;

        let mut paths = PathCollector::default();
        paths.visit_file(&parsed);
        violations.extend(
            layer
                .violations(&paths.paths)
                .into_iter()
                .map(|message| Violation {
                    file: source.file.clone(),
                    message,
                }),
        );
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Domain,
    Inbound,
    Outbound,
}

impl Layer {
    const ALL: [Self; 3] = [Self::Domain, Self::Inbound, Self::Outbound];

    const fn dir(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    fn of(relative_path: &Path) -> Option<Self> {
        let first = relative_path.components().next()?.as_os_str().to_str()?;
        Self::ALL.into_iter().find(|layer| layer.dir() == first)
    }

    const fn forbidden_modules(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &["inbound", "outbound"],
            Self::Inbound => &["outbound"],
            Self::Outbound => &["inbound"],
        }
    }

    const fn forbidden_crates(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &[
                "actix_http",
                "actix_session",
                "actix_web",
                "bb8",
                "diesel",
                "diesel_async",
                "diesel_migrations",
                "utoipa",
                "utoipa_swagger_ui",
            ],
            Self::Inbound => &["bb8", "diesel", "diesel_async", "diesel_migrations"],
            Self::Outbound => &["actix_http", "actix_session", "actix_web", "utoipa"],
        }
    }

    /// One message per distinct forbidden root named in `paths`.
    fn violations(self, paths: &BTreeSet<Vec<String>>) -> BTreeSet<String> {
        let layer = self.dir();
        let mut messages = BTreeSet::new();
        for segments in paths {
            if let Some(root) = internal_root(segments)
                .filter(|root| self.forbidden_modules().contains(root))
            {
                messages.insert(format!("{layer} module must not depend on crate::{root}"));
            }
            if let Some(root) =
                external_root(segments).filter(|root| self.forbidden_crates().contains(root))
            {
                messages.insert(format!("{layer} module must not depend on external crate `{root}`"));
            }
        }
        messages
    }
}

const fn is_relative(segment: &str) -> bool {
    matches!(segment.as_bytes(), b"crate" | b"self" | b"super")
}

/// The crate-local module a path starts from, if it names one.
fn internal_root(segments: &[String]) -> Option<&str> {
    let first = segments.first()?.as_str();
    if Layer::ALL.iter().any(|layer| layer.dir() == first) {
        return Some(first);
    }
    if first == LIBRARY_CRATE {
        return segments.get(1).map(String::as_str);
    }
    if is_relative(first) {
        return segments
            .iter()
            .map(String::as_str)
            .find(|segment| !is_relative(segment));
    }
    None
}

fn external_root(segments: &[String]) -> Option<&str> {
    let root = segments.first()?.as_str();
    (!is_relative(root) && root != LIBRARY_CRATE).then_some(root)
}

/// Every path and `use` tree named in a file, as segment lists.
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

fn collect_sources(
    src_root: &Path,
    dir: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_sources(src_root, &path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            let file = path
                .strip_prefix(src_root)
                .map_err(|err| ArchitectureLintError::Parse {
                    file: path.clone(),
                    message: err.to_string(),
                })?
                .to_path_buf();
            let contents = fs::read_to_string(&path)?;
            sources.push(LintSource { file, contents });
        }
    }
    Ok(())
}

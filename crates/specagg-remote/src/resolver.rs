//! Inline relative cross-file `$ref`s.
//!
//! Every relative reference (`./file.yaml#/json/pointer`) is joined onto the
//! service's specs root, so nested files reference siblings the same way the
//! top-level documents do. Referenced files are fetched up front into a
//! [`ResolutionCache`], then a single traversal substitutes the fragments.

use crate::fetcher::fetch_document;
use crate::source::SpecSource;
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value as JsonValue};
use specagg_core::document::{walk_refs, REF_KEY};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// Upper bound on referenced files fetched at the same time
pub const MAX_CONCURRENT_FETCHES: usize = 8;

/// A relative reference split into its target file and JSON pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRef {
    pub file: String,
    /// Pointer inside the target file, `None` for the whole document
    pub pointer: Option<String>,
}

impl ExternalRef {
    /// Parse a `$ref` value; only `./` references are external
    pub fn parse(reference: &str) -> Option<Self> {
        if !reference.starts_with("./") {
            return None;
        }
        let (file, pointer) = match reference.split_once('#') {
            Some((file, fragment)) => (file, normalize_pointer(fragment)),
            None => (reference, None),
        };
        Some(Self {
            file: file.to_string(),
            pointer,
        })
    }
}

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pointer {
            Some(pointer) => write!(f, "{}#{}", self.file, pointer),
            None => f.write_str(&self.file),
        }
    }
}

fn normalize_pointer(fragment: &str) -> Option<String> {
    let trimmed = fragment.trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("/{}", trimmed))
    }
}

/// Join `relative` onto `base` with POSIX `.`/`..` normalisation
pub fn join_posix(base: &str, relative: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Referenced documents of one service, keyed by resolved path.
///
/// Files that failed to fetch are remembered so a pass never asks for them
/// twice.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    documents: HashMap<String, JsonValue>,
    failed: HashSet<String>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        self.documents.get(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, document: JsonValue) {
        let path = path.into();
        self.failed.remove(&path);
        self.documents.insert(path, document);
    }

    pub fn mark_failed(&mut self, path: impl Into<String>) {
        self.failed.insert(path.into());
    }

    pub fn is_failed(&self, path: &str) -> bool {
        self.failed.contains(path)
    }

    /// Whether a fetch was already attempted for `path`
    pub fn contains(&self, path: &str) -> bool {
        self.documents.contains_key(path) || self.failed.contains(path)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

pub struct RefResolver<'a> {
    source: &'a dyn SpecSource,
    repo: &'a str,
    specs_root: &'a str,
    branch: &'a str,
}

impl<'a> RefResolver<'a> {
    pub fn new(
        source: &'a dyn SpecSource,
        repo: &'a str,
        specs_root: &'a str,
        branch: &'a str,
    ) -> Self {
        Self {
            source,
            repo,
            specs_root,
            branch,
        }
    }

    /// Return `document` with every resolvable relative reference inlined.
    ///
    /// References whose file failed to load, whose pointer does not resolve,
    /// or which would recurse into themselves are left as they are.
    pub async fn resolve(&self, document: JsonValue, cache: &mut ResolutionCache) -> JsonValue {
        self.prefetch(&document, cache).await;
        let mut resolving = HashSet::new();
        self.substitute(document, cache, &mut resolving)
    }

    /// Resolved paths of every file referenced from `value`
    fn referenced_files(&self, value: &JsonValue) -> BTreeSet<String> {
        let mut files = BTreeSet::new();
        walk_refs(value, &mut |reference| {
            if let Some(external) = ExternalRef::parse(reference) {
                files.insert(join_posix(self.specs_root, &external.file));
            }
        });
        files
    }

    /// Fetch referenced files until no new file shows up
    async fn prefetch(&self, document: &JsonValue, cache: &mut ResolutionCache) {
        let mut pending: Vec<String> = self
            .referenced_files(document)
            .into_iter()
            .filter(|path| !cache.contains(path))
            .collect();

        while !pending.is_empty() {
            tracing::info!(
                repo = self.repo,
                count = pending.len(),
                "fetching referenced files"
            );

            let fetched: Vec<(String, Option<JsonValue>)> = stream::iter(pending)
                .map(move |path| async move {
                    tracing::debug!(repo = self.repo, path = %path, "fetching referenced file");
                    let document = fetch_document(self.source, self.repo, &path, self.branch).await;
                    (path, document)
                })
                .buffer_unordered(MAX_CONCURRENT_FETCHES)
                .collect()
                .await;

            let mut discovered = BTreeSet::new();
            for (path, document) in fetched {
                match document {
                    Some(document) => {
                        discovered.extend(self.referenced_files(&document));
                        cache.insert(path, document);
                    }
                    None => cache.mark_failed(path),
                }
            }

            pending = discovered
                .into_iter()
                .filter(|path| !cache.contains(path))
                .collect();
        }
    }

    fn substitute(
        &self,
        node: JsonValue,
        cache: &ResolutionCache,
        resolving: &mut HashSet<String>,
    ) -> JsonValue {
        match node {
            JsonValue::Object(map) => {
                let external = map
                    .get(REF_KEY)
                    .and_then(JsonValue::as_str)
                    .and_then(ExternalRef::parse);
                match external {
                    Some(external) => self.expand(map, &external, cache, resolving),
                    None => JsonValue::Object(
                        map.into_iter()
                            .map(|(key, child)| (key, self.substitute(child, cache, resolving)))
                            .collect(),
                    ),
                }
            }
            JsonValue::Array(items) => JsonValue::Array(
                items
                    .into_iter()
                    .map(|item| self.substitute(item, cache, resolving))
                    .collect(),
            ),
            other => other,
        }
    }

    fn expand(
        &self,
        node: Map<String, JsonValue>,
        external: &ExternalRef,
        cache: &ResolutionCache,
        resolving: &mut HashSet<String>,
    ) -> JsonValue {
        let path = join_posix(self.specs_root, &external.file);
        let Some(target) = cache.get(&path) else {
            tracing::warn!(
                repo = self.repo,
                reference = %external,
                "could not resolve reference, file unavailable"
            );
            return JsonValue::Object(node);
        };

        let pointer = external.pointer.as_deref().unwrap_or("");
        let Some(fragment) = target.pointer(pointer) else {
            tracing::warn!(
                repo = self.repo,
                reference = %external,
                "reference pointer not found in target document"
            );
            return JsonValue::Object(node);
        };

        let key = format!("{}#{}", path, pointer);
        if !resolving.insert(key.clone()) {
            tracing::warn!(
                repo = self.repo,
                reference = %external,
                "cyclic reference left unexpanded"
            );
            return JsonValue::Object(node);
        }
        let expanded = self.substitute(fragment.clone(), cache, resolving);
        resolving.remove(&key);
        expanded
    }
}

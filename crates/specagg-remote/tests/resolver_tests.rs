use async_trait::async_trait;
use serde_json::{json, Value};
use specagg_remote::{
    DirEntry, LocalSource, RefResolver, RemoteResult, ResolutionCache, SpecSource,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::{tempdir, TempDir};

const REPO: &str = "acme/customs";

/// Local source that counts file reads
struct CountingSource {
    inner: LocalSource,
    reads: AtomicUsize,
}

impl CountingSource {
    fn new(root: &Path) -> Self {
        Self {
            inner: LocalSource::new(root),
            reads: AtomicUsize::new(0),
        }
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpecSource for CountingSource {
    async fn list_directory(&self, repo: &str, dir: &str, branch: &str) -> RemoteResult<Vec<DirEntry>> {
        self.inner.list_directory(repo, dir, branch).await
    }

    async fn read_entry(&self, entry: &DirEntry) -> RemoteResult<String> {
        self.inner.read_entry(entry).await
    }

    async fn read_file(&self, repo: &str, path: &str, branch: &str) -> RemoteResult<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_file(repo, path, branch).await
    }
}

fn checkout(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().unwrap();
    for (name, content) in files {
        let path = dir.path().join(REPO).join("specs").join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    dir
}

async fn resolve(source: &CountingSource, doc: Value, cache: &mut ResolutionCache) -> Value {
    RefResolver::new(source, REPO, "specs", "main")
        .resolve(doc, cache)
        .await
}

#[tokio::test]
async fn inlines_nested_fragments() {
    let dir = checkout(&[
        (
            "shared/errors.yaml",
            "Error:\n  type: object\n  properties:\n    code:\n      $ref: './shared/codes.yaml#/Code'\n",
        ),
        ("shared/codes.yaml", "Code:\n  type: string\n  enum: [E1, E2]\n"),
    ]);
    let source = CountingSource::new(dir.path());
    let mut cache = ResolutionCache::new();

    let doc = json!({
        "paths": {"/declarations": {"post": {"responses": {"400": {
            "content": {"application/json": {"schema": {"$ref": "./shared/errors.yaml#/Error"}}}
        }}}}}
    });
    let resolved = resolve(&source, doc, &mut cache).await;

    assert_eq!(
        resolved["paths"]["/declarations"]["post"]["responses"]["400"]["content"]
            ["application/json"]["schema"],
        json!({
            "type": "object",
            "properties": {"code": {"type": "string", "enum": ["E1", "E2"]}}
        })
    );
    assert_eq!(source.reads(), 2);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn resolution_is_idempotent_and_cached() {
    let dir = checkout(&[("common.yaml", "Id:\n  name: id\n  in: path\n")]);
    let source = CountingSource::new(dir.path());
    let mut cache = ResolutionCache::new();

    let doc = json!({"parameters": [{"$ref": "./common.yaml#/Id"}, {"$ref": "./common.yaml#/Id"}]});
    let once = resolve(&source, doc, &mut cache).await;
    let twice = resolve(&source, once.clone(), &mut cache).await;

    assert_eq!(once, twice);
    assert_eq!(once["parameters"][1], json!({"name": "id", "in": "path"}));
    assert_eq!(source.reads(), 1);
}

#[tokio::test]
async fn whole_document_reference_is_inlined() {
    let dir = checkout(&[("enums/status.yaml", "type: string\nenum: [open, closed]\n")]);
    let source = CountingSource::new(dir.path());
    let mut cache = ResolutionCache::new();

    let resolved = resolve(&source, json!({"schema": {"$ref": "./enums/status.yaml"}}), &mut cache).await;
    assert_eq!(resolved["schema"], json!({"type": "string", "enum": ["open", "closed"]}));
}

#[tokio::test]
async fn unresolvable_references_are_kept() {
    let dir = checkout(&[("common.yaml", "Id:\n  name: id\n")]);
    let source = CountingSource::new(dir.path());
    let mut cache = ResolutionCache::new();

    let doc = json!({
        "a": {"$ref": "./missing.yaml#/X"},
        "b": {"$ref": "./common.yaml#/Nope"},
        "c": {"$ref": "#/components/schemas/Local"}
    });
    let resolved = resolve(&source, doc.clone(), &mut cache).await;
    assert_eq!(resolved, doc);
    assert!(cache.is_failed("specs/missing.yaml"));

    // The failed file is not fetched again within the same cache
    let reads = source.reads();
    resolve(&source, doc, &mut cache).await;
    assert_eq!(source.reads(), reads);
}

#[tokio::test]
async fn cycles_are_left_unexpanded() {
    let dir = checkout(&[
        ("a.yaml", "Node:\n  properties:\n    next:\n      $ref: './b.yaml#/Node'\n"),
        ("b.yaml", "Node:\n  properties:\n    prev:\n      $ref: './a.yaml#/Node'\n"),
    ]);
    let source = CountingSource::new(dir.path());
    let mut cache = ResolutionCache::new();

    let resolved = resolve(&source, json!({"schema": {"$ref": "./a.yaml#/Node"}}), &mut cache).await;
    assert_eq!(
        resolved["schema"],
        json!({"properties": {"next": {"properties": {"prev": {"$ref": "./a.yaml#/Node"}}}}})
    );
    assert_eq!(source.reads(), 2);
}

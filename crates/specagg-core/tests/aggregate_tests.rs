use serde_json::{json, Value};
use specagg_core::{
    aggregate_for_audience, reachable_schemas, schema_ref_name, walk_refs, AggregationSettings,
    Server, ServiceSpecs, SpecDocument, SpecFile,
};

fn yaml_doc(text: &str) -> SpecDocument {
    let value: Value = serde_yaml::from_str(text).expect("fixture must be valid YAML");
    SpecDocument::from_value(value).expect("fixture root must be a mapping")
}

fn service(name: &str, docs: Vec<SpecDocument>) -> ServiceSpecs {
    ServiceSpecs {
        service: name.to_string(),
        specs: docs
            .into_iter()
            .enumerate()
            .map(|(i, document)| SpecFile {
                file_name: format!("spec-{}.yaml", i),
                document,
            })
            .collect(),
    }
}

fn settings() -> AggregationSettings {
    AggregationSettings {
        default_servers: vec![
            Server::new("https://api.serhafen-tech.com", "Production server"),
            Server::new("https://api-staging.serhafen-tech.com", "Staging server"),
        ],
        tag_order: vec!["Declarations".into(), "Shipments".into(), "Tracking".into()],
        ..Default::default()
    }
}

const PARCELS: &str = r#"
openapi: 3.1.0
info:
  title: Tracking
  version: 1.0.0
paths:
  /parcels:
    get:
      x-public: true
      x-audience: lastmile
      x-category: Tracking
      responses:
        '200':
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Parcel'
    post:
      x-public: false
      x-audience: lastmile
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/InternalAudit'
components:
  schemas:
    Parcel:
      type: object
      properties:
        id:
          type: string
    InternalAudit:
      type: object
"#;

#[test]
fn test_only_public_operation_for_audience_is_published() {
    let services = vec![service("tracking", vec![yaml_doc(PARCELS)])];
    let spec = aggregate_for_audience(&services, "lastmile", &settings());

    let item = spec.paths.get("/parcels").expect("GET /parcels must be present");
    assert!(item.contains_key("get"));
    assert!(!item.contains_key("post"));
    assert_eq!(item["get"]["tags"], json!(["Tracking"]));
    assert!(item["get"].get("x-public").is_none());
    assert!(item["get"].get("x-audience").is_none());
    assert!(item["get"].get("x-category").is_none());

    let tags: Vec<_> = spec.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tags, vec!["Tracking"]);
}

#[test]
fn test_unused_schema_is_pruned() {
    let services = vec![service("tracking", vec![yaml_doc(PARCELS)])];
    let spec = aggregate_for_audience(&services, "lastmile", &settings());

    assert!(spec.components.schemas.contains_key("Parcel"));
    assert!(!spec.components.schemas.contains_key("InternalAudit"));
}

#[test]
fn test_other_audience_gets_empty_document() {
    let services = vec![service("tracking", vec![yaml_doc(PARCELS)])];
    let spec = aggregate_for_audience(&services, "customs", &settings());

    assert!(spec.paths.is_empty());
    assert!(spec.tags.is_empty());
    assert!(spec.components.schemas.is_empty());
    assert_eq!(spec.info.title, "Customs API");
}

#[test]
fn test_default_servers_used_when_spec_declares_none() {
    let services = vec![service("tracking", vec![yaml_doc(PARCELS)])];
    let spec = aggregate_for_audience(&services, "lastmile", &settings());

    assert_eq!(
        spec.paths["/parcels"]["get"]["servers"],
        json!([
            {"url": "https://api.serhafen-tech.com", "description": "Production server"},
            {"url": "https://api-staging.serhafen-tech.com", "description": "Staging server"}
        ])
    );
}

#[test]
fn test_namespaced_refs_point_at_stored_schemas() {
    let customs = yaml_doc(
        r#"
paths:
  /declarations:
    post:
      x-public: true
      x-audience: [customs]
      x-category: Declarations
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Declaration'
components:
  schemas:
    Declaration:
      properties:
        error:
          $ref: '#/components/schemas/Error'
    Error:
      type: object
"#,
    );
    let iam = yaml_doc(
        r#"
paths:
  /tokens:
    post:
      x-public: true
      x-audience: "customs, lastmile"
      x-category: Auth
      responses:
        '400':
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Error'
components:
  schemas:
    Error:
      type: object
      required: [code]
"#,
    );

    let mut s = settings();
    s.prefix_schemas = true;
    s.prefix_paths = true;
    let services = vec![service("customs", vec![customs]), service("iam", vec![iam])];
    let spec = aggregate_for_audience(&services, "customs", &s);

    let mut names: Vec<_> = spec.components.schemas.keys().cloned().collect();
    names.sort();
    assert_eq!(names, vec!["customs_Declaration", "customs_Error", "iam_Error"]);

    let value = spec.to_value().unwrap();
    let mut refs = Vec::new();
    walk_refs(&value, &mut |r| refs.push(r.to_string()));
    assert!(!refs.is_empty());
    for reference in refs {
        let name = schema_ref_name(&reference).expect("only schema refs in fixture");
        assert!(spec.components.schemas.contains_key(&name), "dangling ref {}", reference);
    }

    let paths: Vec<_> = spec.paths.keys().cloned().collect();
    assert_eq!(paths, vec!["/customs/declarations", "/iam/tokens"]);
    assert_eq!(reachable_schemas(&spec).len(), 3);
}

#[test]
fn test_tags_and_paths_follow_priority_order() {
    let doc = yaml_doc(
        r#"
paths:
  /shipments/{id}:
    get: {x-public: true, x-audience: customs, x-category: Shipments}
  /other:
    get: {x-public: true, x-audience: customs, x-category: Other}
  /shipments:
    get: {x-public: true, x-audience: customs, x-category: Shipments}
  /declarations:
    get: {x-public: true, x-audience: customs, x-category: Declarations}
  /events:
    get: {x-public: true, x-audience: customs, x-category: Tracking}
"#,
    );
    let spec = aggregate_for_audience(&[service("customs", vec![doc])], "customs", &settings());

    let tags: Vec<_> = spec.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tags, vec!["Declarations", "Shipments", "Tracking", "Other"]);

    let paths: Vec<_> = spec.paths.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec!["/declarations", "/shipments", "/shipments/{id}", "/events", "/other"]
    );
}

#[test]
fn test_security_merged_across_documents() {
    let a = yaml_doc(
        r#"
components:
  securitySchemes:
    bearerAuth: {type: http, scheme: bearer}
security:
  - bearerAuth: []
"#,
    );
    let b = yaml_doc("security:\n  - bearerAuth: [read]\n");
    let spec = aggregate_for_audience(&[service("iam", vec![a, b])], "customs", &settings());

    assert!(spec.components.security_schemes.contains_key("bearerAuth"));
    assert_eq!(spec.security.len(), 2);
}

pub mod aggregate;
pub mod audience;
pub mod document;
pub mod error;
pub mod merge;
pub mod ordering;
pub mod prune;
pub mod transform;
pub mod types;

// Re-export commonly used types
pub use aggregate::{aggregate_for_audience, AggregatedSpec, Components, Contact, Info, PathItem, Tag};
pub use audience::{include, normalize_audiences, Inclusion};
pub use document::{collect_schema_refs, prefix_schema_ref, rewrite_refs, schema_ref_name, walk_refs};
pub use error::{CoreError, CoreResult};
pub use ordering::OrderingPolicy;
pub use prune::{prune_unused_schemas, reachable_schemas};
pub use transform::{transform_operation, OperationContext};
pub use types::{
    AggregationSettings, InfoSettings, Server, ServiceDescriptor, ServiceSpecs, SpecDocument,
    SpecFile, HTTP_METHODS, OPENAPI_VERSION,
};

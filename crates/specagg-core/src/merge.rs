//! Folds a service's components into the aggregate

use crate::aggregate::AggregatedSpec;
use crate::document::{prefix_schema_ref, prefixed_schema_name, rewrite_refs};
use crate::types::{AggregationSettings, SpecDocument};

/// Merge `components.schemas` of one document.
///
/// With schema prefixing on, every schema is stored as `{service}_{Name}`
/// and the references inside its body are rewritten with the same function
/// the operation transformer uses, so cross references stay valid.
pub fn merge_schemas(
    aggregated: &mut AggregatedSpec,
    doc: &SpecDocument,
    service: &str,
    settings: &AggregationSettings,
) {
    let Some(schemas) = doc.schemas() else {
        return;
    };

    for (name, schema) in schemas {
        let mut body = schema.clone();
        let stored_name = if settings.prefix_schemas {
            rewrite_refs(&mut body, &mut |reference| {
                prefix_schema_ref(reference, service)
            });
            prefixed_schema_name(service, name)
        } else {
            name.clone()
        };

        if let Some(previous) = aggregated.components.schemas.insert(stored_name.clone(), body) {
            if aggregated.components.schemas.get(&stored_name) != Some(&previous) {
                tracing::debug!(
                    service,
                    schema = %stored_name,
                    "schema redefined by a later document"
                );
            }
        }
    }
}

/// Merge `components.securitySchemes` and top-level `security`.
///
/// Schemes are a plain union where the last definition of a name wins;
/// security requirements are concatenated.
pub fn merge_security(aggregated: &mut AggregatedSpec, doc: &SpecDocument, service: &str) {
    if let Some(schemes) = doc.security_schemes() {
        for (name, scheme) in schemes {
            if let Some(previous) = aggregated
                .components
                .security_schemes
                .insert(name.clone(), scheme.clone())
            {
                if &previous != scheme {
                    tracing::warn!(
                        service,
                        scheme = %name,
                        "security scheme redefined with a different definition, last one wins"
                    );
                }
            }
        }
    }

    aggregated.security.extend(doc.security().iter().cloned());
}

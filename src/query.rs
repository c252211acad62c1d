//! Structural model queries
//!
//! Shallow scans over model document JSON: the root identifier, the
//! dependency references the resolver must additionally fetch, and the
//! contents of pre-computed expanded bundles. This is identifier harvesting,
//! not DTDL semantic validation.

use serde_json::Value;

use crate::dtmi::Dtmi;
use crate::error::ResolverError;

/// Identifiers extracted from one model document.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// The document's own identity, from the top-level `@id`.
    pub id: Dtmi,
    /// Inheritance references from `extends`.
    pub extends: Vec<Dtmi>,
    /// Schema references from Component entries under `contents`.
    pub component_schemas: Vec<Dtmi>,
}

impl ModelMetadata {
    /// Order-preserving union of inheritance and component references.
    pub fn dependencies(&self) -> Vec<Dtmi> {
        let mut deps: Vec<Dtmi> = Vec::new();
        for dep in self.extends.iter().chain(self.component_schemas.iter()) {
            if !deps.contains(dep) {
                deps.push(dep.clone());
            }
        }
        deps
    }
}

/// Read-only query over raw model content.
pub struct ModelQuery<'a> {
    content: &'a str,
}

impl<'a> ModelQuery<'a> {
    pub fn new(content: &'a str) -> Self {
        ModelQuery { content }
    }

    /// Extract the root identifier and dependency references.
    ///
    /// A missing or non-string top-level `@id` is a `MissingRootId` error.
    /// Every harvested reference string must satisfy the DTMI grammar;
    /// a malformed identifier in a reference position is fatal.
    pub fn metadata(&self) -> Result<ModelMetadata, ResolverError> {
        let root: Value = serde_json::from_str(self.content)?;
        let id = parse_root_id(&root)?;

        let mut extends = Vec::new();
        collect_extends(&root, &mut extends)?;

        let mut component_schemas = Vec::new();
        collect_component_schemas(&root, &mut component_schemas)?;

        Ok(ModelMetadata {
            id,
            extends,
            component_schemas,
        })
    }

    /// Interpret the content as an expanded bundle: a top-level JSON array
    /// of model objects. Returns each model's identity with its
    /// re-serialized text, in document order.
    pub fn expanded_models(&self) -> Result<Vec<(Dtmi, String)>, ResolverError> {
        let root: Value = serde_json::from_str(self.content)?;
        let Value::Array(elements) = root else {
            return Err(ResolverError::MalformedExpandedDocument);
        };

        let mut models = Vec::with_capacity(elements.len());
        for element in &elements {
            let id = parse_root_id(element)?;
            models.push((id, serde_json::to_string(element)?));
        }

        Ok(models)
    }
}

fn parse_root_id(model: &Value) -> Result<Dtmi, ResolverError> {
    match model.get("@id") {
        Some(Value::String(id)) => Dtmi::parse(id),
        _ => Err(ResolverError::MissingRootId),
    }
}

fn has_type(value: &Value, type_name: &str) -> bool {
    matches!(value.get("@type"), Some(Value::String(t)) if t == type_name)
}

fn collect_extends(model: &Value, out: &mut Vec<Dtmi>) -> Result<(), ResolverError> {
    match model.get("extends") {
        Some(extends) => collect_reference(extends, out),
        None => Ok(()),
    }
}

fn collect_component_schemas(model: &Value, out: &mut Vec<Dtmi>) -> Result<(), ResolverError> {
    let Some(Value::Array(contents)) = model.get("contents") else {
        return Ok(());
    };

    for entry in contents {
        if !has_type(entry, "Component") {
            continue;
        }
        if let Some(schema) = entry.get("schema") {
            collect_reference(schema, out)?;
        }
    }

    Ok(())
}

/// Harvest a reference-bearing value: a DTMI string, an inline Interface
/// definition (which contributes its own references), or an array of either.
/// Anything else in these positions carries no reference and is skipped.
fn collect_reference(value: &Value, out: &mut Vec<Dtmi>) -> Result<(), ResolverError> {
    match value {
        Value::String(id) => {
            out.push(Dtmi::parse(id)?);
            Ok(())
        }
        Value::Object(_) if has_type(value, "Interface") => {
            collect_extends(value, out)?;
            collect_component_schemas(value, out)
        }
        Value::Array(elements) => {
            for element in elements {
                collect_reference(element, out)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_basic() {
        let content = json!({
            "@id": "dtmi:com:example:Thermostat;1",
            "@type": "Interface",
            "extends": "dtmi:com:example:Base;1",
            "contents": [
                {
                    "@type": "Component",
                    "name": "sensor",
                    "schema": "dtmi:com:example:TemperatureSensor;2"
                },
                {
                    "@type": "Property",
                    "name": "unit",
                    "schema": "string"
                }
            ]
        })
        .to_string();

        let metadata = ModelQuery::new(&content).metadata().unwrap();
        assert_eq!(metadata.id.as_str(), "dtmi:com:example:Thermostat;1");
        assert_eq!(metadata.extends.len(), 1);
        assert_eq!(metadata.component_schemas.len(), 1);
        assert_eq!(
            metadata.component_schemas[0].as_str(),
            "dtmi:com:example:TemperatureSensor;2"
        );
    }

    #[test]
    fn test_metadata_extends_array() {
        let content = json!({
            "@id": "dtmi:com:example:Device;1",
            "extends": ["dtmi:com:example:A;1", "dtmi:com:example:B;1"]
        })
        .to_string();

        let metadata = ModelQuery::new(&content).metadata().unwrap();
        let deps = metadata.dependencies();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].as_str(), "dtmi:com:example:A;1");
        assert_eq!(deps[1].as_str(), "dtmi:com:example:B;1");
    }

    #[test]
    fn test_metadata_inline_interface_recursed() {
        let content = json!({
            "@id": "dtmi:com:example:Device;1",
            "contents": [
                {
                    "@type": "Component",
                    "name": "inner",
                    "schema": {
                        "@type": "Interface",
                        "@id": "dtmi:com:example:Inline;1",
                        "extends": "dtmi:com:example:Base;1"
                    }
                }
            ]
        })
        .to_string();

        let metadata = ModelQuery::new(&content).metadata().unwrap();
        let deps = metadata.dependencies();
        // The inline interface is a definition, not a reference; only its
        // own extends reference is harvested.
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].as_str(), "dtmi:com:example:Base;1");
    }

    #[test]
    fn test_dependencies_deduplicated_in_order() {
        let content = json!({
            "@id": "dtmi:com:example:Device;1",
            "extends": ["dtmi:com:example:Shared;1"],
            "contents": [
                {"@type": "Component", "name": "c1", "schema": "dtmi:com:example:Shared;1"},
                {"@type": "Component", "name": "c2", "schema": "dtmi:com:example:Other;1"}
            ]
        })
        .to_string();

        let deps = ModelQuery::new(&content).metadata().unwrap().dependencies();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].as_str(), "dtmi:com:example:Shared;1");
        assert_eq!(deps[1].as_str(), "dtmi:com:example:Other;1");
    }

    #[test]
    fn test_missing_root_id() {
        let content = json!({"@type": "Interface"}).to_string();
        let err = ModelQuery::new(&content).metadata().unwrap_err();
        assert!(matches!(err, ResolverError::MissingRootId));
    }

    #[test]
    fn test_malformed_reference_is_fatal() {
        let content = json!({
            "@id": "dtmi:com:example:Device;1",
            "extends": "not-a-dtmi"
        })
        .to_string();

        let err = ModelQuery::new(&content).metadata().unwrap_err();
        assert!(matches!(err, ResolverError::InvalidDtmiFormat(_)));
    }

    #[test]
    fn test_malformed_root_id_is_fatal() {
        let content = json!({"@id": "urn:not:dtmi"}).to_string();
        let err = ModelQuery::new(&content).metadata().unwrap_err();
        assert!(matches!(err, ResolverError::InvalidDtmiFormat(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = ModelQuery::new("{not json").metadata().unwrap_err();
        assert!(matches!(err, ResolverError::Json(_)));
    }

    #[test]
    fn test_expanded_models() {
        let content = json!([
            {"@id": "dtmi:com:example:Root;1", "extends": "dtmi:com:example:Base;1"},
            {"@id": "dtmi:com:example:Base;1"}
        ])
        .to_string();

        let models = ModelQuery::new(&content).expanded_models().unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].0.as_str(), "dtmi:com:example:Root;1");
        assert_eq!(models[1].0.as_str(), "dtmi:com:example:Base;1");
        assert!(models[0].1.contains("extends"));
    }

    #[test]
    fn test_expanded_rejects_non_array() {
        let content = json!({"@id": "dtmi:com:example:Root;1"}).to_string();
        let err = ModelQuery::new(&content).expanded_models().unwrap_err();
        assert!(matches!(err, ResolverError::MalformedExpandedDocument));
    }

    #[test]
    fn test_expanded_element_without_id_is_fatal() {
        let content = json!([{"displayName": "anonymous"}]).to_string();
        let err = ModelQuery::new(&content).expanded_models().unwrap_err();
        assert!(matches!(err, ResolverError::MissingRootId));
    }
}

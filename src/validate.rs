//! Document validity checks over repository conventions
//!
//! The standalone checker run against individual repository files. It
//! consumes the resolver's identifier grammar and path convention but is
//! not part of resolution, and it performs no DTDL semantic validation.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;

use crate::dtmi::{dtmi_to_path, Dtmi};
use crate::error::ResolverError;
use crate::query::ModelQuery;

/// Outcome of validity checks: passes when no diagnostics were raised.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<String>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn flag(&mut self, message: impl Into<String>) {
        self.diagnostics.push(message.into());
    }
}

/// Check one model document's content: well-formed JSON, a valid root
/// `@id`, grammar-valid dependency references, and nested identifiers that
/// stay inside the root identifier's namespace.
pub fn validate_content(content: &str) -> ValidationReport {
    let mut report = ValidationReport::default();

    let root: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(err) => {
            report.flag(format!("content is not valid JSON: {}", err));
            return report;
        }
    };

    let root_id = match root.get("@id") {
        Some(Value::String(id)) => match Dtmi::parse(id) {
            Ok(dtmi) => Some(dtmi),
            Err(_) => {
                report.flag(format!("root @id '{}' is not a valid DTMI", id));
                None
            }
        },
        _ => {
            report.flag("document does not declare a root @id");
            None
        }
    };

    let Some(root_id) = root_id else {
        return report;
    };

    if let Err(err) = ModelQuery::new(content).metadata() {
        report.flag(format!("dependency references are malformed: {}", err));
    }

    let namespace = root_id.namespace();
    let mut nested = Vec::new();
    collect_nested_ids(&root, &mut nested);
    for id in nested {
        if id == root_id.as_str() {
            continue;
        }
        if Dtmi::parse(&id).is_err() {
            report.flag(format!("nested @id '{}' is not a valid DTMI", id));
        } else if !id.starts_with(namespace) {
            report.flag(format!(
                "nested @id '{}' does not start with the root namespace '{}'",
                id, namespace
            ));
        }
    }

    report
}

/// Validate a model file; with a repository base, additionally check that
/// the file sits at the path the convention derives from its root `@id`.
/// The convention path is all lower-case, so an uppercase stored filename
/// always fails this check.
pub fn validate_file(
    model_path: &Path,
    repo_base: Option<&Path>,
) -> Result<ValidationReport, ResolverError> {
    let content = fs::read_to_string(model_path)?;
    let mut report = validate_content(&content);

    if let Some(base) = repo_base {
        if let Some(expected) = expected_model_path(&content, base) {
            let placed = match (model_path.canonicalize(), expected.canonicalize()) {
                (Ok(actual), Ok(wanted)) => actual == wanted,
                _ => model_path == expected.as_path(),
            };
            if !placed {
                report.flag(format!(
                    "file path does not adhere to the repository convention; expected '{}'",
                    expected.display()
                ));
            }
        }
    }

    Ok(report)
}

/// Validate every document of a resolved model map.
pub fn validate_models(models: &IndexMap<Dtmi, String>) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (dtmi, definition) in models {
        for diagnostic in validate_content(definition).diagnostics {
            report.flag(format!("{}: {}", dtmi, diagnostic));
        }
    }
    report
}

fn expected_model_path(content: &str, base: &Path) -> Option<PathBuf> {
    let root: Value = serde_json::from_str(content).ok()?;
    let id = root.get("@id")?.as_str()?;
    let dtmi = Dtmi::parse(id).ok()?;
    Some(base.join(dtmi_to_path(&dtmi, false)))
}

/// Every string value under an `@id` key, depth-first.
fn collect_nested_ids(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(obj) => {
            if let Some(Value::String(id)) = obj.get("@id") {
                out.push(id.clone());
            }
            for (key, nested) in obj {
                if key != "@id" {
                    collect_nested_ids(nested, out);
                }
            }
        }
        Value::Array(elements) => {
            for element in elements {
                collect_nested_ids(element, out);
            }
        }
        _ => {}
    }
}

//! Output formatting shared by the tool surfaces
//!
//! One formatting collaborator consumed by every command-line tool. This
//! sits entirely outside the resolution core: the engine hands over a
//! resolved model map and never formats it itself.

use clap::ValueEnum;
use indexmap::IndexMap;
use serde_json::Value;

use crate::dtmi::Dtmi;
use crate::error::ResolverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModelsFormat {
    /// Space-delimited identifier list.
    Space,
    /// Comma-separated identifier list.
    Csv,
    /// JSON array of the raw model documents.
    #[default]
    Json,
}

/// Render a resolved model map for output, preserving resolution order.
pub fn format_models(
    models: &IndexMap<Dtmi, String>,
    format: ModelsFormat,
) -> Result<String, ResolverError> {
    match format {
        ModelsFormat::Space => Ok(joined_ids(models, " ")),
        ModelsFormat::Csv => Ok(joined_ids(models, ",")),
        ModelsFormat::Json => {
            let documents = models
                .values()
                .map(|definition| serde_json::from_str::<Value>(definition))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(serde_json::to_string_pretty(&Value::Array(documents))?)
        }
    }
}

fn joined_ids(models: &IndexMap<Dtmi, String>, separator: &str) -> String {
    models
        .keys()
        .map(Dtmi::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}

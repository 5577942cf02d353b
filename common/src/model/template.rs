use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalog entry describing one registered template module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub slug: String,
    /// Placeholder names in the order the module declares them.
    pub fields: Vec<String>,
    pub themes: Vec<String>,
}

/// The unpopulated HTML of every theme of a template module, placeholders intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTemplates {
    pub slug: String,
    pub fields: Vec<String>,
    pub templates: BTreeMap<String, String>,
}

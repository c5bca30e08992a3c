//! Catalog loading — the async seam to the field-metadata service.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{LoaderError, Result};
use crate::types::Field;

/// Asynchronously resolves the selectable fields of an object type.
///
/// Implementations wrap whatever metadata service the host talks to.
/// `include_formula` asks for formula fields in addition to stored ones;
/// reference drill-downs always request them.
#[async_trait]
pub trait CatalogLoader: Send + Sync {
    async fn fetch_fields(&self, object_api_name: &str, include_formula: bool)
        -> Result<Vec<Field>>;
}

/// In-memory loader keyed by object API name.
///
/// Stored and formula fields are registered separately so that
/// `include_formula` is observable. Useful for tests and for hosts that
/// already hold the full describe result.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogLoader {
    fields: HashMap<String, Vec<Field>>,
    formula_fields: HashMap<String, Vec<Field>>,
}

impl StaticCatalogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the stored fields of an object type.
    pub fn with_object(mut self, object_api_name: &str, fields: Vec<Field>) -> Self {
        self.fields.insert(object_api_name.to_string(), fields);
        self
    }

    /// Register formula fields, returned only when requested.
    pub fn with_formula_fields(mut self, object_api_name: &str, fields: Vec<Field>) -> Self {
        self.formula_fields
            .insert(object_api_name.to_string(), fields);
        self
    }
}

#[async_trait]
impl CatalogLoader for StaticCatalogLoader {
    async fn fetch_fields(
        &self,
        object_api_name: &str,
        include_formula: bool,
    ) -> Result<Vec<Field>> {
        let mut fields = self
            .fields
            .get(object_api_name)
            .cloned()
            .ok_or_else(|| LoaderError::UnknownObject {
                name: object_api_name.to_string(),
            })?;
        if include_formula {
            if let Some(formula) = self.formula_fields.get(object_api_name) {
                fields.extend(formula.iter().cloned());
            }
        }
        Ok(fields)
    }
}

//! Field catalog — the set of fields selectable at one drill-down level.
//!
//! A catalog pairs a name-indexed map (O(1) lookup on pick) with the
//! ordered `{label, value}` options list used for display. Both are built
//! together from the same field list, so they can never fall out of sync;
//! a newly loaded catalog replaces the old one wholesale.

use std::collections::HashMap;

use crate::types::{Field, PickOption};

/// Immutable lookup structure over one level's selectable fields.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    by_name: HashMap<String, Field>,
    options: Vec<PickOption>,
}

impl FieldCatalog {
    /// An empty catalog — the state before any field list has loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a field list. Option order follows input
    /// order; a duplicated API name keeps the last occurrence in the map
    /// but every occurrence in the options list.
    pub fn from_fields(fields: &[Field]) -> Self {
        let mut by_name = HashMap::with_capacity(fields.len());
        let mut options = Vec::with_capacity(fields.len());
        for field in fields {
            options.push(PickOption {
                label: field.label.clone(),
                value: field.api_name.clone(),
            });
            by_name.insert(field.api_name.clone(), field.clone());
        }
        Self { by_name, options }
    }

    /// Build a catalog from a raw describe payload.
    ///
    /// A non-array value yields an empty catalog (defensive default, not
    /// an error). Array entries that are not objects, or that fail to
    /// decode, are skipped. The object check matters: serde would
    /// otherwise accept a JSON sequence positionally for a named-field
    /// struct, letting array-shaped garbage land in the catalog.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let Some(entries) = value.as_array() else {
            return Self::new();
        };
        let fields: Vec<Field> = entries
            .iter()
            .filter_map(|entry| {
                if !entry.is_object() {
                    tracing::warn!("skipping non-object field entry");
                    return None;
                }
                match serde_json::from_value(entry.clone()) {
                    Ok(field) => Some(field),
                    Err(e) => {
                        tracing::warn!(%e, "skipping undecodable field entry");
                        None
                    }
                }
            })
            .collect();
        Self::from_fields(&fields)
    }

    /// Look up a field by API name.
    pub fn get(&self, api_name: &str) -> Option<&Field> {
        self.by_name.get(api_name)
    }

    /// Whether a field with this API name is selectable.
    pub fn contains(&self, api_name: &str) -> bool {
        self.by_name.contains_key(api_name)
    }

    /// The ordered display options, in field-list order.
    pub fn options(&self) -> &[PickOption] {
        &self.options
    }

    /// The catalog's fields, in map order (not guaranteed ordered —
    /// callers needing order use [`FieldCatalog::options`]).
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.by_name.values()
    }

    /// Number of distinct field names in the catalog.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

//! Field metadata and selection-chain types.
//!
//! All types serialize to/from JSON via serde using the camelCase wire
//! names of the describe payload (`apiName`, `labelName`, `type`,
//! `referenceTo`, `parentField`). A [`Field`] describes one selectable
//! attribute of an object type; a [`SelectedField`] is one link in the
//! drill-down chain built as the consumer follows references.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The describe type of a field — determines what shape the value takes.
///
/// Unrecognized describe types deserialize to [`FieldKind::Unknown`]
/// rather than failing the whole catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldKind {
    #[default]
    String,
    Boolean,
    Currency,
    Date,
    Datetime,
    Double,
    Email,
    Id,
    Phone,
    Picklist,
    Reference,
    Textarea,
    Url,
    #[serde(other)]
    Unknown,
}

/// A single selectable field on an object type, as returned by the
/// catalog loader.
///
/// `reference_to` is `Some` iff the field points at another object type;
/// it is the sole trigger for drilling down another level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub api_name: String,
    #[serde(rename = "labelName")]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub reference_to: Option<String>,
}

impl Field {
    /// Whether this field points at another object type.
    pub fn is_reference(&self) -> bool {
        self.reference_to.is_some()
    }
}

/// Describe payloads use `""` for "no reference target"; fold that into
/// `None` so `reference_to.is_some()` means exactly "is a reference".
fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// One `{label, value}` pair in the ordered display-options list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickOption {
    pub label: String,
    pub value: String,
}

/// A picked field plus the chain of deeper picks made through its
/// reference target.
///
/// `parent` links to the pick made one level *deeper* (wire name
/// `parentField`), so the chain reads root pick → nested pick → … →
/// deepest pick. Chains are plain value-copied data: a snapshot handed to
/// a listener can never be mutated behind its back. Links are only
/// populated by the enclosing selector when its nested selector reports a
/// pick, so a chain cannot contain cycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SelectedField {
    pub api_name: String,
    #[serde(rename = "labelName")]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub reference_to: Option<String>,
    #[serde(
        rename = "parentField",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<Box<SelectedField>>,
}

impl SelectedField {
    /// The empty, unrequired, non-reference selection used before any
    /// pick is made.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether a field has actually been picked at this level.
    pub fn is_picked(&self) -> bool {
        !self.api_name.is_empty()
    }

    /// Whether this pick points at another object type.
    pub fn is_reference(&self) -> bool {
        self.reference_to.is_some()
    }

    /// A copy of this selection with `nested` merged into the `parent`
    /// slot. Every other field is preserved unchanged.
    pub fn with_nested(&self, nested: SelectedField) -> SelectedField {
        SelectedField {
            parent: Some(Box::new(nested)),
            ..self.clone()
        }
    }

    /// Number of links in the chain, this one included.
    pub fn depth(&self) -> usize {
        1 + self.parent.as_deref().map_or(0, SelectedField::depth)
    }

    /// The deepest pick in the chain.
    pub fn leaf(&self) -> &SelectedField {
        self.parent.as_deref().map_or(self, SelectedField::leaf)
    }

    /// The chain rendered as a dot path, e.g. `OwnerId.Email`.
    pub fn dot_path(&self) -> String {
        let mut path = self.api_name.clone();
        let mut link = self.parent.as_deref();
        while let Some(segment) = link {
            path.push('.');
            path.push_str(&segment.api_name);
            link = segment.parent.as_deref();
        }
        path
    }
}

impl From<&Field> for SelectedField {
    fn from(field: &Field) -> Self {
        SelectedField {
            api_name: field.api_name.clone(),
            label: field.label.clone(),
            kind: field.kind,
            required: field.required,
            reference_to: field.reference_to.clone(),
            parent: None,
        }
    }
}

impl From<Field> for SelectedField {
    fn from(field: Field) -> Self {
        SelectedField::from(&field)
    }
}

impl fmt::Display for SelectedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dot_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner_field() -> Field {
        Field {
            api_name: "OwnerId".into(),
            label: "Owner".into(),
            kind: FieldKind::Reference,
            required: true,
            reference_to: Some("User".into()),
        }
    }

    #[test]
    fn field_json_round_trip() {
        let field = owner_field();
        let json = serde_json::to_string(&field).unwrap();
        let parsed: Field = serde_json::from_str(&json).unwrap();
        assert_eq!(field, parsed);
    }

    #[test]
    fn field_uses_wire_names() {
        let json = serde_json::to_value(owner_field()).unwrap();
        assert_eq!(json["apiName"], "OwnerId");
        assert_eq!(json["labelName"], "Owner");
        assert_eq!(json["type"], "REFERENCE");
        assert_eq!(json["referenceTo"], "User");
    }

    #[test]
    fn field_parses_describe_payload() {
        let json = r#"{
            "apiName": "Email",
            "labelName": "Email",
            "type": "EMAIL",
            "required": false,
            "referenceTo": ""
        }"#;
        let field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field.kind, FieldKind::Email);
        assert_eq!(field.reference_to, None);
        assert!(!field.is_reference());
    }

    #[test]
    fn empty_reference_to_folds_to_none() {
        let field: Field =
            serde_json::from_str(r#"{"apiName":"Name","labelName":"Name","referenceTo":""}"#)
                .unwrap();
        assert_eq!(field.reference_to, None);

        let field: Field =
            serde_json::from_str(r#"{"apiName":"Name","labelName":"Name"}"#).unwrap();
        assert_eq!(field.reference_to, None);
    }

    #[test]
    fn unknown_kind_degrades_gracefully() {
        let field: Field = serde_json::from_str(
            r#"{"apiName":"Geo__c","labelName":"Geo","type":"LOCATION"}"#,
        )
        .unwrap();
        assert_eq!(field.kind, FieldKind::Unknown);
    }

    #[test]
    fn selected_field_from_field() {
        let selection = SelectedField::from(&owner_field());
        assert_eq!(selection.api_name, "OwnerId");
        assert_eq!(selection.reference_to.as_deref(), Some("User"));
        assert!(selection.parent.is_none());
        assert!(selection.is_picked());
    }

    #[test]
    fn empty_selection_is_not_picked() {
        let selection = SelectedField::empty();
        assert!(!selection.is_picked());
        assert!(!selection.is_reference());
        assert!(!selection.required);
    }

    #[test]
    fn with_nested_preserves_own_fields() {
        let owner = SelectedField::from(&owner_field());
        let email = SelectedField {
            api_name: "Email".into(),
            label: "Email".into(),
            kind: FieldKind::Email,
            ..SelectedField::default()
        };

        let merged = owner.with_nested(email.clone());
        assert_eq!(merged.api_name, owner.api_name);
        assert_eq!(merged.label, owner.label);
        assert_eq!(merged.required, owner.required);
        assert_eq!(merged.reference_to, owner.reference_to);
        assert_eq!(merged.parent.as_deref(), Some(&email));
    }

    #[test]
    fn chain_depth_leaf_and_dot_path() {
        let email = SelectedField {
            api_name: "Email".into(),
            label: "Email".into(),
            ..SelectedField::default()
        };
        let owner = SelectedField::from(&owner_field()).with_nested(email);
        let account = SelectedField {
            api_name: "AccountId".into(),
            label: "Account".into(),
            kind: FieldKind::Reference,
            reference_to: Some("Account".into()),
            ..SelectedField::default()
        }
        .with_nested(owner);

        assert_eq!(account.depth(), 3);
        assert_eq!(account.leaf().api_name, "Email");
        assert_eq!(account.dot_path(), "AccountId.OwnerId.Email");
        assert_eq!(account.to_string(), "AccountId.OwnerId.Email");
    }

    #[test]
    fn chain_serializes_with_parent_field_wire_name() {
        let email = SelectedField {
            api_name: "Email".into(),
            label: "Email".into(),
            ..SelectedField::default()
        };
        let owner = SelectedField::from(&owner_field()).with_nested(email);

        let json = serde_json::to_value(&owner).unwrap();
        assert_eq!(json["parentField"]["apiName"], "Email");

        let parsed: SelectedField = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, owner);
    }

    #[test]
    fn leafless_chain_omits_parent_field() {
        let json = serde_json::to_string(&SelectedField::from(&owner_field())).unwrap();
        assert!(!json.contains("parentField"));
    }
}

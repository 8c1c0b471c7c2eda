//! Schema types — the declarative description of which document fields
//! are pointers to further documents.
//!
//! A [`ChildrenSchema`] maps top-level field names to [`FieldSchema`]
//! entries. An entry marks its field as a single pointer (the default) or
//! a keyed collection of pointers (`nested`), says whether the field must
//! be present (`required`, default `true`), and carries the schema for the
//! documents it points at (`children`), recursively.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::SchemaError;

/// Schema entry for one pointer field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSchema {
    /// Whether the field must be present (and truthy) in the downloaded
    /// document.
    #[serde(default = "default_true")]
    pub required: bool,
    /// Whether the field holds a map of key → URI rather than a single URI.
    #[serde(default)]
    pub nested: bool,
    /// Schema for the document(s) this field points at.
    #[serde(default)]
    pub children: ChildrenSchema,
}

fn default_true() -> bool {
    true
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            required: true,
            nested: false,
            children: ChildrenSchema::new(),
        }
    }
}

impl FieldSchema {
    /// A required, non-nested pointer with no children.
    pub fn pointer() -> Self {
        Self::default()
    }

    /// An optional, non-nested pointer with no children.
    pub fn optional() -> Self {
        Self {
            required: false,
            ..Self::default()
        }
    }

    /// Mark the field as a keyed collection of pointers.
    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }

    /// Attach the schema for the pointed-at document(s).
    pub fn with_children(mut self, children: ChildrenSchema) -> Self {
        self.children = children;
        self
    }
}

/// Mapping from top-level field name to its schema entry, in declaration
/// order.
///
/// Order matters: materialization walks fields in the order they were
/// declared, so when several fields are invalid the first declared one is
/// the fault reported. Field names are unique case-insensitively;
/// [`validate`] enforces this recursively and resolver construction runs
/// it before any I/O can happen.
#[derive(Debug, Clone, Default)]
pub struct ChildrenSchema {
    fields: Vec<(String, FieldSchema)>,
}

impl ChildrenSchema {
    /// An empty schema: every document field stays a plain value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry for `name`, appending it in declaration order, or
    /// replace the existing entry with the exact same name in place.
    pub fn insert(&mut self, name: impl Into<String>, entry: FieldSchema) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = entry,
            None => self.fields.push((name, entry)),
        }
    }

    /// Look up the entry for `name` (exact match).
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, entry)| entry)
    }

    /// Returns `true` if an entry with exactly `name` exists.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldSchema)> {
        self.fields.iter().map(|(name, entry)| (name, entry))
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Hand-written so JSON object entries land in source order; a derived map
// representation would re-sort them.
impl<'de> Deserialize<'de> for ChildrenSchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = ChildrenSchema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to field schemas")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, FieldSchema>()? {
                    fields.push(entry);
                }
                Ok(ChildrenSchema { fields })
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

/// Check a schema for field names that differ only by case, recursively
/// through every `children` level.
pub fn validate(schema: &ChildrenSchema) -> Result<(), SchemaError> {
    let mut seen: Vec<String> = Vec::with_capacity(schema.len());
    for (field, entry) in schema.iter() {
        let folded = field.to_lowercase();
        if seen.contains(&folded) {
            return Err(SchemaError::DuplicateField {
                field: field.clone(),
            });
        }
        seen.push(folded);
        validate(&entry.children)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_schema_is_valid() {
        assert!(validate(&ChildrenSchema::new()).is_ok());
    }

    #[test]
    fn distinct_fields_are_valid() {
        let mut schema = ChildrenSchema::new();
        schema.insert("descriptionUri", FieldSchema::pointer());
        schema.insert("ratePlansUri", FieldSchema::optional().nested());
        assert!(validate(&schema).is_ok());
    }

    #[test]
    fn case_insensitive_duplicate_rejected() {
        let mut schema = ChildrenSchema::new();
        schema.insert("description", FieldSchema::pointer());
        schema.insert("Description", FieldSchema::pointer());
        let err = validate(&schema).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn duplicate_in_children_rejected() {
        let mut inner = ChildrenSchema::new();
        inner.insert("plan", FieldSchema::pointer());
        inner.insert("PLAN", FieldSchema::pointer());

        let mut schema = ChildrenSchema::new();
        schema.insert("index", FieldSchema::pointer().with_children(inner));
        assert!(validate(&schema).is_err());
    }

    #[test]
    fn iteration_preserves_declaration_order() {
        let mut schema = ChildrenSchema::new();
        schema.insert("zebra", FieldSchema::pointer());
        schema.insert("alpha", FieldSchema::optional());
        schema.insert("middle", FieldSchema::pointer());

        let names: Vec<_> = schema.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["zebra", "alpha", "middle"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut schema = ChildrenSchema::new();
        schema.insert("first", FieldSchema::pointer());
        schema.insert("second", FieldSchema::pointer());
        schema.insert("first", FieldSchema::optional());

        assert_eq!(schema.len(), 2);
        assert!(!schema.get("first").unwrap().required);
        let names: Vec<_> = schema.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn deserializes_with_defaults_in_source_order() {
        let schema: ChildrenSchema = serde_json::from_str(
            r#"{
                "ratePlansUri": { "required": false, "nested": true,
                                  "children": { "name": {} } },
                "descriptionUri": {}
            }"#,
        )
        .unwrap();

        let names: Vec<_> = schema.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["ratePlansUri", "descriptionUri"]);

        let description = schema.get("descriptionUri").unwrap();
        assert!(description.required);
        assert!(!description.nested);
        assert!(description.children.is_empty());

        let rate_plans = schema.get("ratePlansUri").unwrap();
        assert!(!rate_plans.required);
        assert!(rate_plans.nested);
        assert!(rate_plans.children.contains_key("name"));
    }
}

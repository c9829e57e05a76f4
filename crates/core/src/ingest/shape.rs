//! Source shapes: where the columns of a BOM export live
//!
//! A [`SourceShape`] tells ingestion which row holds the header, which
//! columns carry the id, the next id and the descriptions, how strictly ids
//! are normalized, and which way the edges point. Shapes are plain serde
//! values so custom exports can be described in a JSON shapes file:
//!
//! ```json
//! {
//!   "plant-routing": {
//!     "header_offset": 2,
//!     "id_column": "Part",
//!     "next_column": "Used In",
//!     "description_column": "Part Name",
//!     "id_policy": "integer",
//!     "direction": "next_to_id"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::ident::IdPolicy;

/// Which way a row's (id, next id) pair points in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    /// `id` decomposes into `next`: edge `id -> next`
    #[default]
    IdToNext,
    /// `next` is the parent of `id`: edge `next -> id`
    NextToId,
}

impl EdgeDirection {
    /// Orient a row's pair as `(from, to)`.
    pub fn orient<T>(self, id: T, next: T) -> (T, T) {
        match self {
            Self::IdToNext => (id, next),
            Self::NextToId => (next, id),
        }
    }
}

/// Column layout of one kind of tabular source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceShape {
    /// Number of rows above the header row
    #[serde(default)]
    pub header_offset: usize,
    /// Column holding the row's own BOM id
    pub id_column: String,
    /// Column holding the id the row decomposes into
    pub next_column: String,
    /// Column describing the row's own id
    #[serde(default)]
    pub description_column: Option<String>,
    /// Column describing the next id
    #[serde(default)]
    pub next_description_column: Option<String>,
    #[serde(default)]
    pub id_policy: IdPolicy,
    #[serde(default)]
    pub direction: EdgeDirection,
}

impl SourceShape {
    /// Flat CSV export with `BOM ID`, `Next BOM ID` and two `Description`
    /// columns (the second one describes the next id).
    pub fn bom_export() -> Self {
        Self {
            header_offset: 0,
            id_column: "BOM ID".to_string(),
            next_column: "Next BOM ID".to_string(),
            description_column: Some("Description".to_string()),
            next_description_column: Some("Description.1".to_string()),
            id_policy: IdPolicy::Lenient,
            direction: EdgeDirection::IdToNext,
        }
    }

    /// BOM details list spreadsheet: seven banner rows above the header.
    pub fn bom_details() -> Self {
        Self {
            header_offset: 7,
            id_column: "BOM ID".to_string(),
            next_column: "Next Bom".to_string(),
            description_column: Some("Description".to_string()),
            next_description_column: None,
            id_policy: IdPolicy::Integer,
            direction: EdgeDirection::IdToNext,
        }
    }

    /// BOM parents list spreadsheet: six banner rows above the header, and
    /// the row's description sits in the second `Description` column.
    pub fn bom_parents() -> Self {
        Self {
            header_offset: 6,
            id_column: "BOM ID".to_string(),
            next_column: "Next".to_string(),
            description_column: Some("Description.1".to_string()),
            next_description_column: None,
            id_policy: IdPolicy::Integer,
            direction: EdgeDirection::IdToNext,
        }
    }
}

/// Named shapes available to callers
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    shapes: BTreeMap<String, SourceShape>,
}

impl ShapeRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `bom-export`, `bom-details` and `bom-parents`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert("bom-export", SourceShape::bom_export());
        registry.insert("bom-details", SourceShape::bom_details());
        registry.insert("bom-parents", SourceShape::bom_parents());
        registry
    }

    /// Register a shape, replacing any shape with the same name.
    pub fn insert(&mut self, name: impl Into<String>, shape: SourceShape) {
        self.shapes.insert(name.into(), shape);
    }

    pub fn get(&self, name: &str) -> Option<&SourceShape> {
        self.shapes.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    /// Merge a JSON object of `name -> shape` into the registry.
    ///
    /// Entries override shapes already registered under the same name.
    /// Returns the number of shapes read.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize> {
        let parsed: BTreeMap<String, SourceShape> = serde_json::from_str(json)?;
        let count = parsed.len();
        self.shapes.extend(parsed);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_shapes_registered() {
        let registry = ShapeRegistry::with_builtins();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["bom-details", "bom-export", "bom-parents"]);
        assert_eq!(registry.get("bom-details").unwrap().header_offset, 7);
        assert_eq!(registry.get("bom-parents").unwrap().header_offset, 6);
    }

    #[test]
    fn test_orient() {
        assert_eq!(EdgeDirection::IdToNext.orient(1, 2), (1, 2));
        assert_eq!(EdgeDirection::NextToId.orient(1, 2), (2, 1));
    }

    #[test]
    fn test_extend_from_json_overrides_and_defaults() {
        let mut registry = ShapeRegistry::with_builtins();
        let count = registry
            .extend_from_json(
                r#"{
                    "bom-export": { "id_column": "Item", "next_column": "Parent" },
                    "routing": {
                        "header_offset": 2,
                        "id_column": "Part",
                        "next_column": "Used In",
                        "id_policy": "integer",
                        "direction": "next_to_id"
                    }
                }"#,
            )
            .unwrap();

        assert_eq!(count, 2);

        let export = registry.get("bom-export").unwrap();
        assert_eq!(export.id_column, "Item");
        assert_eq!(export.header_offset, 0);
        assert_eq!(export.description_column, None);
        assert_eq!(export.id_policy, IdPolicy::Lenient);

        let routing = registry.get("routing").unwrap();
        assert_eq!(routing.id_policy, IdPolicy::Integer);
        assert_eq!(routing.direction, EdgeDirection::NextToId);
    }

    #[test]
    fn test_extend_from_json_rejects_unknown_fields() {
        let mut registry = ShapeRegistry::new();
        let result = registry.extend_from_json(
            r#"{ "x": { "id_column": "A", "next_column": "B", "colour": "red" } }"#,
        );
        assert!(result.is_err());
        assert_eq!(registry.names().count(), 0);
    }
}

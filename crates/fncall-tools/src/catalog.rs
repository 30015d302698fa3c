//! Registration-time documentation and enum values
//!
//! Descriptions, parameter names and enum members cannot be recovered from
//! Rust types alone. They are supplied to the [`SchemaDeriver`] through a
//! [`DocSource`]; [`Catalog`] is the default in-memory implementation and can
//! be loaded from a JSON file.
//!
//! Missing entries are never errors: the deriver falls back to empty
//! descriptions, synthesized parameter names and plain strings.
//!
//! [`SchemaDeriver`]: crate::SchemaDeriver

use crate::error::{Result, ToolError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Documentation for one callable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallableDoc {
    /// Summary shown to the model
    pub description: String,
    /// Parameter names in declaration order, context parameter excluded
    pub params: Vec<String>,
}

/// Documentation for one record or named string type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDoc {
    /// Summary of the type
    pub description: Option<String>,
    /// Field descriptions keyed by field name
    pub fields: HashMap<String, String>,
    /// Members of a closed string enumeration
    pub values: Vec<String>,
}

/// Source of documentation and enum members for the schema deriver
#[cfg_attr(test, mockall::automock)]
pub trait DocSource: Send + Sync {
    /// Documentation for the callable registered under `name`
    fn callable_doc(&self, name: &str) -> Option<CallableDoc>;

    /// Summary of the record `type_name`
    fn type_doc(&self, type_name: &str) -> Option<String>;

    /// Description of `field` on record `type_name`
    fn field_doc(&self, type_name: &str, field: &str) -> Option<String>;

    /// Members of the named string type `type_name`
    fn enum_values(&self, type_name: &str) -> Option<Vec<String>>;
}

/// In-memory [`DocSource`]
///
/// # Example
///
/// ```
/// use fncall_tools::catalog::{Catalog, DocSource};
///
/// let catalog = Catalog::new()
///     .with_callable("get_weather", "Current weather for a city", ["city", "unit"])
///     .with_enum("Unit", ["celsius", "fahrenheit"])
///     .with_field("Forecast", "days", "number of days ahead");
///
/// assert_eq!(catalog.callable_doc("get_weather").unwrap().params, vec!["city", "unit"]);
/// assert_eq!(catalog.enum_values("Unit").unwrap().len(), 2);
/// assert!(catalog.type_doc("Forecast").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    callables: HashMap<String, CallableDoc>,
    types: HashMap<String, TypeDoc>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file
    ///
    /// ```json
    /// {
    ///   "callables": {
    ///     "get_weather": { "description": "...", "params": ["city"] }
    ///   },
    ///   "types": {
    ///     "Unit": { "values": ["celsius", "fahrenheit"] }
    ///   }
    /// }
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
        let catalog: Self = serde_json::from_str(&data)
            .map_err(|e| ToolError::Config(format!("invalid catalog {}: {e}", path.display())))?;
        tracing::debug!(
            path = %path.display(),
            callables = catalog.callables.len(),
            types = catalog.types.len(),
            "Loaded doc catalog"
        );
        Ok(catalog)
    }

    /// Register a callable's description and parameter names
    pub fn with_callable<I, S>(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        params: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.callables.insert(
            name.into(),
            CallableDoc {
                description: description.into(),
                params: params.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Register a record's summary
    pub fn with_type(mut self, type_name: impl Into<String>, description: impl Into<String>) -> Self {
        self.types.entry(type_name.into()).or_default().description = Some(description.into());
        self
    }

    /// Register a field description
    pub fn with_field(
        mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.types
            .entry(type_name.into())
            .or_default()
            .fields
            .insert(field.into(), description.into());
        self
    }

    /// Register the members of a named string type
    pub fn with_enum<I, S>(mut self, type_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.entry(type_name.into()).or_default().values =
            values.into_iter().map(Into::into).collect();
        self
    }

    /// Merge another catalog into this one (other entries override)
    pub fn merge(&mut self, other: Catalog) {
        self.callables.extend(other.callables);
        self.types.extend(other.types);
    }

    pub fn is_empty(&self) -> bool {
        self.callables.is_empty() && self.types.is_empty()
    }
}

impl DocSource for Catalog {
    fn callable_doc(&self, name: &str) -> Option<CallableDoc> {
        self.callables.get(name).cloned()
    }

    fn type_doc(&self, type_name: &str) -> Option<String> {
        self.types.get(type_name).and_then(|t| t.description.clone())
    }

    fn field_doc(&self, type_name: &str, field: &str) -> Option<String> {
        self.types
            .get(type_name)
            .and_then(|t| t.fields.get(field))
            .cloned()
    }

    fn enum_values(&self, type_name: &str) -> Option<Vec<String>> {
        self.types
            .get(type_name)
            .map(|t| t.values.clone())
            .filter(|values| !values.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builder_entries() {
        let catalog = Catalog::new()
            .with_type("Person", "a person")
            .with_field("Person", "name", "full name")
            .with_enum("Role", ["user", "assistant"]);

        assert_eq!(catalog.type_doc("Person").as_deref(), Some("a person"));
        assert_eq!(
            catalog.field_doc("Person", "name").as_deref(),
            Some("full name")
        );
        assert!(catalog.field_doc("Person", "age").is_none());
        assert_eq!(
            catalog.enum_values("Role"),
            Some(vec!["user".to_string(), "assistant".to_string()])
        );
        assert!(catalog.enum_values("Person").is_none());
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = Catalog::new().with_callable("f", "old", ["a"]);
        base.merge(Catalog::new().with_callable("f", "new", ["a", "b"]));

        let doc = base.callable_doc("f").unwrap();
        assert_eq!(doc.description, "new");
        assert_eq!(doc.params.len(), 2);
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{
                "callables": {"print_test": {"description": "prints", "params": ["name", "amount"]}},
                "types": {"Role": {"values": ["user", "system"]}}
            }"#,
        )
        .unwrap();

        let catalog = Catalog::from_file(&path).unwrap();
        assert_eq!(catalog.callable_doc("print_test").unwrap().params, ["name", "amount"]);
        assert_eq!(catalog.enum_values("Role").unwrap(), ["user", "system"]);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Catalog::from_file(dir.path().join("missing.json")),
            Err(ToolError::Io { .. })
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            Catalog::from_file(&path),
            Err(ToolError::Config(_))
        ));
    }
}

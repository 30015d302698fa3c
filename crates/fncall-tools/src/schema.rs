//! Parameter schema
//!
//! A [`ParameterSchema`] is one node of the JSON-Schema-like description of a
//! tool's parameters. Nodes nest through `items` (arrays) and `properties`
//! (objects); requiredness of a property is recorded on its parent in the
//! `required` list.

use crate::kind::Kind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One node of a tool's parameter schema
///
/// Exactly one of the shape fields is populated, matching [`kind`](Self::kind):
/// arrays carry `items`, objects carry `properties`, strings may carry `enum`,
/// and every other kind carries nothing. The constructors uphold this;
/// [`validate`](Self::validate) checks it for documents read from disk.
///
/// # Example
///
/// ```
/// use fncall_tools::{Kind, ParameterSchema};
///
/// let schema = ParameterSchema::object()
///     .with_property("query", ParameterSchema::primitive(Kind::String), true)
///     .with_property(
///         "tags",
///         ParameterSchema::array(ParameterSchema::primitive(Kind::String)),
///         false,
///     );
///
/// assert_eq!(schema.param_names(), vec!["query", "tags"]);
/// assert!(schema.is_required("query"));
/// assert!(!schema.is_required("tags"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    kind: Kind,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    enum_values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<IndexMap<String, ParameterSchema>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    required: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Box<ParameterSchema>>,
}

impl ParameterSchema {
    /// A leaf node; arrays and objects get an empty shape
    pub fn primitive(kind: Kind) -> Self {
        match kind {
            Kind::Object => Self::object(),
            Kind::Array => Self::array(Self::primitive(Kind::Null)),
            kind => Self {
                kind,
                ..Self::default()
            },
        }
    }

    /// A string restricted to `values`; an empty list yields a plain string
    pub fn enumeration(values: Vec<String>) -> Self {
        Self {
            kind: Kind::String,
            enum_values: (!values.is_empty()).then_some(values),
            ..Self::default()
        }
    }

    pub fn array(items: ParameterSchema) -> Self {
        Self {
            kind: Kind::Array,
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// An object with no properties yet
    pub fn object() -> Self {
        Self {
            kind: Kind::Object,
            properties: Some(IndexMap::new()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a property; replaces an existing one with the same name in place
    ///
    /// Has no effect on non-object nodes.
    pub fn with_property(mut self, name: impl Into<String>, schema: Self, required: bool) -> Self {
        self.insert_property(name, schema, required);
        self
    }

    pub fn insert_property(&mut self, name: impl Into<String>, schema: Self, required: bool) {
        let Some(properties) = self.properties.as_mut() else {
            return;
        };
        let name = name.into();
        self.required.retain(|r| r != &name);
        if required {
            self.required.push(name.clone());
        }
        properties.insert(name, schema);
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn enum_values(&self) -> Option<&[String]> {
        self.enum_values.as_deref()
    }

    pub fn properties(&self) -> Option<&IndexMap<String, ParameterSchema>> {
        self.properties.as_ref()
    }

    pub fn property(&self, name: &str) -> Option<&ParameterSchema> {
        self.properties.as_ref().and_then(|p| p.get(name))
    }

    pub fn items(&self) -> Option<&ParameterSchema> {
        self.items.as_deref()
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Property names in declaration order
    pub fn param_names(&self) -> Vec<&str> {
        self.properties
            .as_ref()
            .map(|p| p.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of top-level properties
    pub fn len(&self) -> usize {
        self.properties.as_ref().map_or(0, IndexMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check the shape invariants recursively
    ///
    /// Returns a description of the first violation, prefixed by its path.
    pub fn validate(&self) -> Result<(), String> {
        self.validate_at("$")
    }

    fn validate_at(&self, path: &str) -> Result<(), String> {
        let misplaced = |field: &str| Err(format!("{path}: {field} not allowed on {}", self.kind));

        if self.kind != Kind::String && self.enum_values.is_some() {
            return misplaced("enum");
        }
        if self.kind != Kind::Array && self.items.is_some() {
            return misplaced("items");
        }
        if self.kind != Kind::Object && (self.properties.is_some() || !self.required.is_empty()) {
            return misplaced("properties");
        }

        match self.kind {
            Kind::String => {
                if self.enum_values.as_ref().is_some_and(Vec::is_empty) {
                    return Err(format!("{path}: enum must not be empty"));
                }
            }
            Kind::Array => {
                let Some(items) = &self.items else {
                    return Err(format!("{path}: array without items"));
                };
                items.validate_at(&format!("{path}[]"))?;
            }
            Kind::Object => {
                for name in &self.required {
                    if self.property(name).is_none() {
                        return Err(format!("{path}: required property '{name}' is not defined"));
                    }
                }
                for (name, property) in self.properties.iter().flatten() {
                    property.validate_at(&format!("{path}.{name}"))?;
                }
            }
            Kind::Integer | Kind::Number | Kind::Boolean | Kind::Null => {}
        }
        Ok(())
    }
}

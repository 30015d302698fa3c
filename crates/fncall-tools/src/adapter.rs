//! Protocol adapters
//!
//! A [`ToolAdapter`] turns a [`Tool`] into whatever a tool protocol or model
//! provider expects. Two adapters are provided: [`OptionListAdapter`] for
//! option-list protocols (one typed option per parameter) and
//! [`DefinitionAdapter`] for chat-completion style `{name, description,
//! input_schema}` definitions.

use crate::error::{Result, ToolError};
use crate::kind::Kind;
use crate::schema::ParameterSchema;
use crate::tool::Tool;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Converts a tool into a protocol-specific description
pub trait ToolAdapter {
    type Output;

    fn adapt(&self, tool: &Tool) -> Result<Self::Output>;
}

/// Shape of one tool option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptionKind {
    String,
    /// Integers and floats alike
    Number,
    Boolean,
    Array { items: Value },
    Object { properties: IndexMap<String, Value> },
}

/// One named, typed option of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOption {
    pub name: String,
    #[serde(flatten)]
    pub kind: OptionKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// A tool expressed as a list of options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionList {
    pub name: String,
    pub description: String,
    pub options: Vec<ToolOption>,
}

/// One option per top-level parameter; parameters of the null kind are skipped
///
/// # Example
///
/// ```
/// use fncall_tools::adapter::{OptionKind, OptionListAdapter, ToolAdapter};
/// use fncall_tools::{Function, SchemaDeriver};
///
/// fn search(query: String, limit: u32) -> Vec<String> {
///     vec![query; limit as usize]
/// }
///
/// let tool = SchemaDeriver::default()
///     .derive(Function::new(search).params(["query", "limit"]).into_callable())
///     .unwrap();
/// let list = OptionListAdapter.adapt(&tool).unwrap();
///
/// assert_eq!(list.options.len(), 2);
/// assert_eq!(list.options[1].kind, OptionKind::Number);
/// assert!(list.options[1].required);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionListAdapter;

impl OptionListAdapter {
    fn option(name: &str, schema: &ParameterSchema, required: bool) -> Result<Option<ToolOption>> {
        let kind = match schema.kind() {
            Kind::String => OptionKind::String,
            Kind::Integer | Kind::Number => OptionKind::Number,
            Kind::Boolean => OptionKind::Boolean,
            Kind::Array => OptionKind::Array {
                items: to_json(schema.items())?,
            },
            Kind::Object => OptionKind::Object {
                properties: schema
                    .properties()
                    .into_iter()
                    .flatten()
                    .map(|(k, v)| to_json(Some(v)).map(|json| (k.clone(), json)))
                    .collect::<Result<_>>()?,
            },
            Kind::Null => return Ok(None),
        };
        Ok(Some(ToolOption {
            name: name.to_string(),
            kind,
            description: schema.description().to_string(),
            required,
        }))
    }
}

impl ToolAdapter for OptionListAdapter {
    type Output = OptionList;

    fn adapt(&self, tool: &Tool) -> Result<OptionList> {
        let parameters = tool.parameters();
        let mut options = Vec::with_capacity(parameters.len());
        for (name, schema) in parameters.properties().into_iter().flatten() {
            if let Some(option) = Self::option(name, schema, parameters.is_required(name))? {
                options.push(option);
            }
        }
        Ok(OptionList {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            options,
        })
    }
}

/// Provider-facing tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match the name in the registry)
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

/// `{name, description, input_schema}` definitions
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionAdapter;

impl ToolAdapter for DefinitionAdapter {
    type Output = ToolDefinition;

    fn adapt(&self, tool: &Tool) -> Result<ToolDefinition> {
        Ok(ToolDefinition {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: to_json(Some(tool.parameters()))?,
        })
    }
}

fn to_json(schema: Option<&ParameterSchema>) -> Result<Value> {
    match schema {
        Some(schema) => serde_json::to_value(schema)
            .map_err(|e| ToolError::InvalidFormat(format!("failed to encode schema: {e}"))),
        None => Ok(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::FuncDef;
    use serde_json::json;

    fn tool() -> Tool {
        let parameters = ParameterSchema::object()
            .with_property(
                "query",
                ParameterSchema::primitive(Kind::String).with_description("search text"),
                true,
            )
            .with_property("limit", ParameterSchema::primitive(Kind::Integer), false)
            .with_property(
                "tags",
                ParameterSchema::array(ParameterSchema::primitive(Kind::String)),
                false,
            )
            .with_property(
                "filter",
                ParameterSchema::object().with_property(
                    "lang",
                    ParameterSchema::enumeration(vec!["en".into(), "de".into()]),
                    true,
                ),
                true,
            )
            .with_property("raw", ParameterSchema::primitive(Kind::Null), true);
        Tool::new(FuncDef {
            name: "search".to_string(),
            description: "Search documents".to_string(),
            strict: false,
            param_order: vec![
                "query".into(),
                "limit".into(),
                "tags".into(),
                "filter".into(),
                "raw".into(),
            ],
            parameters,
            arguments: None,
        })
    }

    #[test]
    fn test_option_list() {
        let list = OptionListAdapter.adapt(&tool()).unwrap();
        assert_eq!(list.name, "search");
        assert_eq!(list.description, "Search documents");

        let names: Vec<&str> = list.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["query", "limit", "tags", "filter"]);

        assert_eq!(list.options[0].kind, OptionKind::String);
        assert_eq!(list.options[0].description, "search text");
        assert!(list.options[0].required);
        assert_eq!(list.options[1].kind, OptionKind::Number);
        assert!(!list.options[1].required);
        assert_eq!(
            list.options[2].kind,
            OptionKind::Array {
                items: json!({"type": "string"})
            }
        );
        let OptionKind::Object { properties } = &list.options[3].kind else {
            panic!("filter should be an object option");
        };
        assert_eq!(properties["lang"], json!({"type": "string", "enum": ["en", "de"]}));
    }

    #[test]
    fn test_option_serialization() {
        let list = OptionListAdapter.adapt(&tool()).unwrap();
        let value = serde_json::to_value(&list.options[2]).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "tags",
                "type": "array",
                "items": {"type": "string"},
                "required": false
            })
        );
    }

    #[test]
    fn test_definition() {
        let definition = DefinitionAdapter.adapt(&tool()).unwrap();
        assert_eq!(definition.name, "search");
        assert_eq!(definition.input_schema["type"], "object");
        assert_eq!(
            definition.input_schema["required"],
            json!(["query", "filter", "raw"])
        );
        assert_eq!(
            definition.input_schema["properties"]["query"]["description"],
            "search text"
        );
    }
}

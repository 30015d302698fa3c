//! Schema kinds and the type mapper

use crate::describe::TypeInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The primitive categories a parameter schema can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    /// Unsupported or unknown types
    #[default]
    Null,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Null => "null",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a type descriptor to its schema kind
///
/// Total: anything without a JSON counterpart maps to [`Kind::Null`].
pub fn map_type(ty: &TypeInfo) -> Kind {
    match ty {
        TypeInfo::String | TypeInfo::Enum(_) => Kind::String,
        TypeInfo::Integer(_) => Kind::Integer,
        TypeInfo::Float(_) => Kind::Number,
        TypeInfo::Bool => Kind::Boolean,
        TypeInfo::Sequence(_) => Kind::Array,
        TypeInfo::Map(_) | TypeInfo::Record(_) => Kind::Object,
        TypeInfo::Optional(inner) => map_type(inner),
        TypeInfo::Unit
        | TypeInfo::Context
        | TypeInfo::Error
        | TypeInfo::Any
        | TypeInfo::Unsupported(_) => Kind::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::Describe;
    use std::collections::HashMap;

    #[test]
    fn test_primitives() {
        assert_eq!(map_type(&String::type_info()), Kind::String);
        assert_eq!(map_type(&i8::type_info()), Kind::Integer);
        assert_eq!(map_type(&u64::type_info()), Kind::Integer);
        assert_eq!(map_type(&f32::type_info()), Kind::Number);
        assert_eq!(map_type(&bool::type_info()), Kind::Boolean);
    }

    #[test]
    fn test_containers() {
        assert_eq!(map_type(&Vec::<String>::type_info()), Kind::Array);
        assert_eq!(map_type(&HashMap::<String, i32>::type_info()), Kind::Object);
        assert_eq!(map_type(&Option::<f64>::type_info()), Kind::Number);
        assert_eq!(
            map_type(&TypeInfo::enumeration("Role", &["user"])),
            Kind::String
        );
    }

    #[test]
    fn test_unsupported_maps_to_null() {
        assert_eq!(map_type(&TypeInfo::Unsupported("fn()")), Kind::Null);
        assert_eq!(map_type(&TypeInfo::Context), Kind::Null);
        assert_eq!(map_type(&serde_json::Value::type_info()), Kind::Null);
        assert_eq!(map_type(&<()>::type_info()), Kind::Null);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Kind::Boolean).unwrap(), "\"boolean\"");
        let kind: Kind = serde_json::from_str("\"null\"").unwrap();
        assert_eq!(kind, Kind::Null);
    }
}

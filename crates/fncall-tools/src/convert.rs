//! Argument conversion against declared parameter types
//!
//! Decoded JSON arrives as loosely typed [`Value`]s: every number may be an
//! integer or a float, enum members are plain strings. Before a callable is
//! invoked each argument is checked against, and normalized to, the
//! [`TypeInfo`] of its parameter.

use crate::Value;
use crate::describe::TypeInfo;
use crate::error::ToolError;
use indexmap::IndexMap;

/// Why a value did not fit, reported for the innermost offending type
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rejected {
    pub expected: String,
    pub actual: String,
}

impl Rejected {
    fn new(ty: &TypeInfo, actual: impl Into<String>) -> Self {
        Self {
            expected: ty.to_string(),
            actual: actual.into(),
        }
    }

    pub(crate) fn at(self, index: usize) -> ToolError {
        ToolError::TypeMismatch {
            index,
            expected: self.expected,
            actual: self.actual,
        }
    }
}

/// Convert positional argument `index` to its declared type
pub(crate) fn convert_argument(index: usize, value: Value, ty: &TypeInfo) -> Result<Value, ToolError> {
    convert(value, ty).map_err(|rejected| rejected.at(index))
}

/// Check `value` against `ty`, normalizing numbers on the way
pub(crate) fn convert(value: Value, ty: &TypeInfo) -> Result<Value, Rejected> {
    match (ty, value) {
        (TypeInfo::Any | TypeInfo::Unsupported(_), value) => Ok(value),
        (TypeInfo::Optional(_), Value::Null) => Ok(Value::Null),
        (TypeInfo::Optional(inner), value) => convert(value, inner),
        (TypeInfo::Unit, Value::Null) => Ok(Value::Null),
        (TypeInfo::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
        (TypeInfo::Integer(info), value) => {
            let converted = match &value {
                Value::Int(i) => Some(i128::from(*i)),
                Value::UInt(u) => Some(i128::from(*u)),
                Value::Float(f) if f.is_finite() && f.fract() == 0.0 => float_to_i128(*f),
                _ => None,
            };
            match converted {
                Some(n) if info.contains(n) => Ok(integer_value(n)),
                Some(n) => Err(Rejected::new(ty, format!("{n} (out of range)"))),
                None => Err(Rejected::new(ty, describe_value(&value))),
            }
        }
        (TypeInfo::Float(info), value) => {
            let converted = match &value {
                Value::Int(i) => Some(*i as f64),
                Value::UInt(u) => Some(*u as f64),
                Value::Float(f) => Some(*f),
                _ => None,
            };
            match converted {
                Some(f) if f.is_finite() && f.abs() > info.max => {
                    Err(Rejected::new(ty, format!("{f} (out of range)")))
                }
                Some(f) => Ok(Value::Float(f)),
                None => Err(Rejected::new(ty, describe_value(&value))),
            }
        }
        (TypeInfo::String, Value::String(s)) => Ok(Value::String(s)),
        (TypeInfo::Enum(info), Value::String(s)) => {
            if info.values.is_empty() || info.values.contains(&s) {
                Ok(Value::String(s))
            } else {
                Err(Rejected::new(ty, format!("\"{s}\" (not one of {})", info.values.join(", "))))
            }
        }
        (TypeInfo::Sequence(inner), Value::Array(items)) => items
            .into_iter()
            .map(|item| convert(item, inner))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (TypeInfo::Map(inner), Value::Object(map)) => map
            .into_iter()
            .map(|(key, item)| convert(item, inner).map(|item| (key, item)))
            .collect::<Result<IndexMap<_, _>, _>>()
            .map(Value::Object),
        (TypeInfo::Record(info), Value::Object(mut map)) => {
            for field in info.fields() {
                if let Some(item) = map.get_mut(&field.name) {
                    let taken = std::mem::take(item);
                    *item = convert(taken, &field.ty)?;
                }
            }
            Ok(Value::Object(map))
        }
        (ty, value) => Err(Rejected::new(ty, describe_value(&value))),
    }
}

fn integer_value(n: i128) -> Value {
    match i64::try_from(n) {
        Ok(i) => Value::Int(i),
        Err(_) => u64::try_from(n).map_or(Value::Null, Value::UInt),
    }
}

fn float_to_i128(f: f64) -> Option<i128> {
    // i128 covers every integral f64 that can fit any supported integer type
    (f.abs() < 1.7e38).then_some(f as i128)
}

fn describe_value(value: &Value) -> String {
    value.type_name().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::{Describe, FieldInfo};
    use std::collections::HashMap;

    struct Point;

    impl Describe for Point {
        fn type_info() -> TypeInfo {
            TypeInfo::record("Point", || {
                vec![FieldInfo::of::<i32>("x"), FieldInfo::of::<i32>("y")]
            })
        }
    }

    fn object(pairs: &[(&str, Value)]) -> Value {
        Value::Object(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_integers() {
        let ty = u8::type_info();
        assert_eq!(convert(Value::Int(7), &ty), Ok(Value::Int(7)));
        assert_eq!(convert(Value::Float(3.0), &ty), Ok(Value::Int(3)));
        assert_eq!(
            convert(Value::Int(300), &ty),
            Err(Rejected {
                expected: "u8".to_string(),
                actual: "300 (out of range)".to_string()
            })
        );
        assert!(convert(Value::Float(1.5), &ty).is_err());
        assert!(convert(Value::from("1"), &ty).is_err());
        assert_eq!(
            convert(Value::UInt(u64::MAX), &u64::type_info()),
            Ok(Value::UInt(u64::MAX))
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(convert(Value::Int(2), &f64::type_info()), Ok(Value::Float(2.0)));
        assert!(convert(Value::Float(1e300), &f32::type_info()).is_err());
        assert!(convert(Value::Bool(true), &f64::type_info()).is_err());
    }

    #[test]
    fn test_strings_and_enums() {
        assert!(convert(Value::from("x"), &String::type_info()).is_ok());
        assert!(convert(Value::Int(1), &String::type_info()).is_err());

        let role = TypeInfo::enumeration("Role", &["user", "system"]);
        assert!(convert(Value::from("user"), &role).is_ok());
        let err = convert(Value::from("admin"), &role).unwrap_err();
        assert_eq!(err.expected, "Role");

        let open = TypeInfo::named_string("Label");
        assert!(convert(Value::from("anything"), &open).is_ok());
    }

    #[test]
    fn test_optional_and_unit() {
        let ty = Option::<i64>::type_info();
        assert_eq!(convert(Value::Null, &ty), Ok(Value::Null));
        assert_eq!(convert(Value::Int(4), &ty), Ok(Value::Int(4)));
        assert!(convert(Value::Null, &i64::type_info()).is_err());
        assert!(convert(Value::Null, &<()>::type_info()).is_ok());
    }

    #[test]
    fn test_sequences_report_innermost_type() {
        let ty = Vec::<i64>::type_info();
        let err = convert(
            Value::Array(vec![Value::Int(1), Value::from("two")]),
            &ty,
        )
        .unwrap_err();
        assert_eq!(err.expected, "i64");
        assert_eq!(err.actual, "string");
    }

    #[test]
    fn test_maps_and_records() {
        let ty = HashMap::<String, f64>::type_info();
        let converted = convert(object(&[("a", Value::Int(1))]), &ty).unwrap();
        assert_eq!(converted, object(&[("a", Value::Float(1.0))]));

        let point = Point::type_info();
        let converted = convert(
            object(&[("x", Value::Float(1.0)), ("y", Value::Int(2)), ("z", Value::Null)]),
            &point,
        )
        .unwrap();
        assert_eq!(
            converted,
            object(&[("x", Value::Int(1)), ("y", Value::Int(2)), ("z", Value::Null)])
        );

        let err = convert(object(&[("x", Value::from("1"))]), &point).unwrap_err();
        assert_eq!(err.expected, "i32");
        assert!(convert(Value::Array(Vec::new()), &point).is_err());
    }

    #[test]
    fn test_any_and_context() {
        assert!(convert(Value::from("x"), &TypeInfo::Any).is_ok());
        assert!(convert(Value::Null, &TypeInfo::Context).is_err());
    }

    #[test]
    fn test_convert_argument_index() {
        let err = convert_argument(1, Value::from("b"), &i64::type_info()).unwrap_err();
        assert_eq!(err.to_string(), "argument 1: expected i64, got string");
    }
}

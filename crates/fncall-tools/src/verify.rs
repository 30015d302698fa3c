//! Structural comparison of a persisted tool against a freshly derived one

use crate::error::{Mismatch, Result, ToolError};
use crate::schema::ParameterSchema;
use crate::tool::FuncDef;
use serde::{Deserialize, Serialize};

/// How thoroughly a loaded tool is checked against its live callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    /// Parameter count and top-level kind only
    Shallow,
    /// Every parameter, recursively: kind, item schema, property names and kinds
    #[default]
    Deep,
}

impl std::str::FromStr for Verification {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "shallow" => Ok(Verification::Shallow),
            "deep" => Ok(Verification::Deep),
            other => Err(ToolError::Config(format!("unknown verification level: {other}"))),
        }
    }
}

/// Compare `persisted` against `derived` (the function of the live callable)
///
/// Parameters are paired by position in `param_order`; the key order of
/// `properties` carries no meaning. Descriptions, names and enum members are
/// never compared, so documentation edited by hand in a persisted file
/// survives verification.
pub fn verify(persisted: &FuncDef, derived: &FuncDef, level: Verification) -> Result<()> {
    let (actual, expected) = (&persisted.parameters, &derived.parameters);
    if actual.len() != expected.len() {
        return Err(ToolError::SchemaMismatch(Mismatch::Count {
            expected: expected.len(),
            actual: actual.len(),
        }));
    }
    if actual.kind() != expected.kind() {
        return Err(kind_mismatch("$", expected, actual));
    }
    if level == Verification::Shallow {
        return Ok(());
    }

    let pairs = persisted.param_order.iter().zip(&derived.param_order);
    for (position, (actual_name, expected_name)) in pairs.enumerate() {
        let path = format!("${position}");
        match (actual.property(actual_name), expected.property(expected_name)) {
            (Some(actual_prop), Some(expected_prop)) => compare(&path, actual_prop, expected_prop)?,
            _ => {
                return Err(ToolError::InvalidFormat(format!(
                    "param_order entry {path} ('{actual_name}') has no parameter schema"
                )));
            }
        }
    }
    Ok(())
}

fn compare(path: &str, actual: &ParameterSchema, expected: &ParameterSchema) -> Result<()> {
    if actual.kind() != expected.kind() {
        return Err(kind_mismatch(path, expected, actual));
    }

    if let (Some(actual_items), Some(expected_items)) = (actual.items(), expected.items()) {
        compare(&format!("{path}[]"), actual_items, expected_items)?;
    }

    if let (Some(actual_props), Some(expected_props)) = (actual.properties(), expected.properties()) {
        let mut actual_names: Vec<&String> = actual_props.keys().collect();
        let mut expected_names: Vec<&String> = expected_props.keys().collect();
        actual_names.sort();
        expected_names.sort();
        if actual_names != expected_names {
            return Err(ToolError::SchemaMismatch(Mismatch::Properties {
                path: path.to_string(),
                expected: expected_names.into_iter().cloned().collect(),
                actual: actual_names.into_iter().cloned().collect(),
            }));
        }
        for (name, expected_prop) in expected_props {
            if let Some(actual_prop) = actual_props.get(name) {
                compare(&format!("{path}.{name}"), actual_prop, expected_prop)?;
            }
        }
    }
    Ok(())
}

fn kind_mismatch(path: &str, expected: &ParameterSchema, actual: &ParameterSchema) -> ToolError {
    ToolError::SchemaMismatch(Mismatch::Kind {
        path: path.to_string(),
        expected: expected.kind().to_string(),
        actual: actual.kind().to_string(),
    })
}

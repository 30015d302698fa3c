//! Runtime type descriptors
//!
//! Rust has no runtime reflection, so every type that can appear as a tool
//! parameter, record field or return value describes itself through
//! [`Describe`]. The schema deriver and the invocation engine work purely on
//! the resulting [`TypeInfo`] values.
//!
//! # Example
//!
//! ```
//! use fncall_tools::describe::{Describe, FieldInfo, TypeInfo};
//!
//! struct Person {
//!     name: String,
//!     age: i64,
//!     nickname: Option<String>,
//! }
//!
//! impl Describe for Person {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::record("Person", || {
//!             vec![
//!                 FieldInfo::of::<String>("name").describe("first and last name"),
//!                 FieldInfo::of::<i64>("age"),
//!                 FieldInfo::of::<Option<String>>("nickname"),
//!             ]
//!         })
//!     }
//! }
//!
//! let info = Person::type_info();
//! assert_eq!(info.to_string(), "Person");
//! ```

use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

/// Descriptor of a concrete Rust type as seen by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum TypeInfo {
    /// `()`
    Unit,
    /// `bool`
    Bool,
    /// Any fixed-width integer
    Integer(IntegerInfo),
    /// `f32` / `f64`
    Float(FloatInfo),
    /// `String`
    String,
    /// A named string type, optionally with a closed set of values
    Enum(EnumInfo),
    /// `Vec<T>` and other sequences
    Sequence(Box<TypeInfo>),
    /// String-keyed maps
    Map(Box<TypeInfo>),
    /// `Option<T>`
    Optional(Box<TypeInfo>),
    /// A struct with named fields
    Record(RecordInfo),
    /// The call context (`&CallContext`), only valid as a first parameter
    Context,
    /// The error half of a `Result` return
    Error,
    /// Untyped JSON (`serde_json::Value`, [`crate::Value`])
    Any,
    /// Anything else; maps to the null kind
    Unsupported(&'static str),
}

/// Integer type name and inclusive range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerInfo {
    pub name: &'static str,
    pub min: i128,
    pub max: i128,
}

impl IntegerInfo {
    pub fn contains(&self, value: i128) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Float type name and largest finite magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatInfo {
    pub name: &'static str,
    pub max: f64,
}

/// A named string type
///
/// `values` may be empty when the type does not declare its members; the
/// deriver then asks its [`DocSource`](crate::catalog::DocSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    pub name: &'static str,
    pub values: Vec<String>,
}

/// Describes a struct: its name and, lazily, its fields
///
/// Fields are produced on demand so that a record referring to itself can be
/// described at all; the deriver rejects such cycles when it walks them.
#[derive(Clone)]
pub struct RecordInfo {
    name: &'static str,
    fields: fn() -> Vec<FieldInfo>,
}

impl RecordInfo {
    pub fn new(name: &'static str, fields: fn() -> Vec<FieldInfo>) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> Vec<FieldInfo> {
        (self.fields)()
    }
}

impl fmt::Debug for RecordInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordInfo").field("name", &self.name).finish_non_exhaustive()
    }
}

impl PartialEq for RecordInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// How a record field treats absent values, the analogue of serialization tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    /// Always present
    #[default]
    Required,
    /// Omitted when empty
    OmitEmpty,
    /// Omitted when zero-valued
    OmitZero,
    /// Never serialized
    Skipped,
}

/// One field of a record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: TypeInfo,
    pub description: Option<String>,
    pub presence: Presence,
}

impl FieldInfo {
    /// A required field of type `T`
    pub fn of<T: Describe>(name: impl Into<String>) -> Self {
        Self::new(name, T::type_info())
    }

    pub fn new(name: impl Into<String>, ty: TypeInfo) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            presence: Presence::Required,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    pub fn omit_empty(self) -> Self {
        self.presence(Presence::OmitEmpty)
    }

    pub fn skipped(self) -> Self {
        self.presence(Presence::Skipped)
    }

    /// Required unless tagged as omittable/skipped or typed `Option<T>`
    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required && !matches!(self.ty, TypeInfo::Optional(_))
    }
}

impl TypeInfo {
    /// Shorthand for a record descriptor
    pub fn record(name: &'static str, fields: fn() -> Vec<FieldInfo>) -> Self {
        TypeInfo::Record(RecordInfo::new(name, fields))
    }

    /// A closed string enumeration
    pub fn enumeration(name: &'static str, values: &[&str]) -> Self {
        TypeInfo::Enum(EnumInfo {
            name,
            values: values.iter().map(|v| (*v).to_string()).collect(),
        })
    }

    /// A named string type whose members, if any, are registered elsewhere
    pub fn named_string(name: &'static str) -> Self {
        TypeInfo::Enum(EnumInfo {
            name,
            values: Vec::new(),
        })
    }

    pub fn is_context(&self) -> bool {
        matches!(self, TypeInfo::Context)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TypeInfo::Error)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeInfo::Unit => f.write_str("()"),
            TypeInfo::Bool => f.write_str("bool"),
            TypeInfo::Integer(info) => f.write_str(info.name),
            TypeInfo::Float(info) => f.write_str(info.name),
            TypeInfo::String => f.write_str("String"),
            TypeInfo::Enum(info) => f.write_str(info.name),
            TypeInfo::Sequence(inner) => write!(f, "Vec<{inner}>"),
            TypeInfo::Map(inner) => write!(f, "Map<String, {inner}>"),
            TypeInfo::Optional(inner) => write!(f, "Option<{inner}>"),
            TypeInfo::Record(info) => f.write_str(info.name()),
            TypeInfo::Context => f.write_str("&CallContext"),
            TypeInfo::Error => f.write_str("Error"),
            TypeInfo::Any => f.write_str("Value"),
            TypeInfo::Unsupported(name) => f.write_str(name),
        }
    }
}

/// Types that can describe themselves to the engine
pub trait Describe {
    fn type_info() -> TypeInfo;
}

macro_rules! describe_integer {
    ($($ty:ty),*) => {
        $(
            impl Describe for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::Integer(IntegerInfo {
                        name: stringify!($ty),
                        min: <$ty>::MIN as i128,
                        max: <$ty>::MAX as i128,
                    })
                }
            }
        )*
    };
}

describe_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Describe for f32 {
    fn type_info() -> TypeInfo {
        TypeInfo::Float(FloatInfo {
            name: "f32",
            max: f64::from(f32::MAX),
        })
    }
}

impl Describe for f64 {
    fn type_info() -> TypeInfo {
        TypeInfo::Float(FloatInfo {
            name: "f64",
            max: f64::MAX,
        })
    }
}

impl Describe for bool {
    fn type_info() -> TypeInfo {
        TypeInfo::Bool
    }
}

impl Describe for String {
    fn type_info() -> TypeInfo {
        TypeInfo::String
    }
}

impl Describe for () {
    fn type_info() -> TypeInfo {
        TypeInfo::Unit
    }
}

impl Describe for serde_json::Value {
    fn type_info() -> TypeInfo {
        TypeInfo::Any
    }
}

impl Describe for crate::Value {
    fn type_info() -> TypeInfo {
        TypeInfo::Any
    }
}

impl<T: Describe> Describe for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Optional(Box::new(T::type_info()))
    }
}

impl<T: Describe> Describe for Box<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }
}

macro_rules! describe_sequence {
    ($($ty:ident),*) => {
        $(
            impl<T: Describe> Describe for $ty<T> {
                fn type_info() -> TypeInfo {
                    TypeInfo::Sequence(Box::new(T::type_info()))
                }
            }
        )*
    };
}

describe_sequence!(Vec, VecDeque, HashSet, BTreeSet);

impl<T: Describe, S> Describe for HashMap<String, T, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map(Box::new(T::type_info()))
    }
}

impl<T: Describe> Describe for BTreeMap<String, T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map(Box::new(T::type_info()))
    }
}

impl<T: Describe, S> Describe for IndexMap<String, T, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map(Box::new(T::type_info()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node;

    impl Describe for Node {
        fn type_info() -> TypeInfo {
            TypeInfo::record("Node", || {
                vec![
                    FieldInfo::of::<String>("label"),
                    FieldInfo::of::<Vec<Node>>("children").omit_empty(),
                ]
            })
        }
    }

    #[test]
    fn test_integer_ranges() {
        let TypeInfo::Integer(info) = u8::type_info() else {
            panic!("u8 should describe as an integer");
        };
        assert_eq!(info.name, "u8");
        assert!(info.contains(255));
        assert!(!info.contains(256));
        assert!(!info.contains(-1));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Vec::<Option<i64>>::type_info().to_string(), "Vec<Option<i64>>");
        assert_eq!(
            HashMap::<String, bool>::type_info().to_string(),
            "Map<String, bool>"
        );
        assert_eq!(Box::<f32>::type_info().to_string(), "f32");
    }

    #[test]
    fn test_self_referencing_record_is_describable() {
        let TypeInfo::Record(info) = Node::type_info() else {
            panic!("Node should describe as a record");
        };
        let fields = info.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].ty, TypeInfo::Sequence(Box::new(Node::type_info())));
    }

    #[test]
    fn test_field_requiredness() {
        assert!(FieldInfo::of::<String>("name").is_required());
        assert!(!FieldInfo::of::<Option<String>>("nick").is_required());
        assert!(!FieldInfo::of::<String>("bio").omit_empty().is_required());
        assert!(!FieldInfo::of::<String>("secret").skipped().is_required());
        assert!(
            !FieldInfo::of::<u32>("count")
                .presence(Presence::OmitZero)
                .is_required()
        );
    }

    #[test]
    fn test_enumeration() {
        let info = TypeInfo::enumeration("Role", &["user", "system"]);
        assert_eq!(
            info,
            TypeInfo::Enum(EnumInfo {
                name: "Role",
                values: vec!["user".to_string(), "system".to_string()],
            })
        );
        assert_eq!(info.to_string(), "Role");
    }
}

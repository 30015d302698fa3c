//! Schema derivation
//!
//! Turns a callable or a record type into a [`Tool`]: the top-level object
//! schema whose properties are the callable's parameters (or the record's
//! fields), with documentation pulled from a [`DocSource`].

use crate::callable::Callable;
use crate::catalog::{Catalog, DocSource};
use crate::describe::{EnumInfo, FieldInfo, RecordInfo, TypeInfo};
use crate::error::{Result, ToolError};
use crate::kind::map_type;
use crate::schema::ParameterSchema;
use crate::tool::{FuncDef, Tool};
use std::sync::Arc;

/// Nesting limit for record and sequence recursion
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// What a tool is derived from
#[derive(Clone)]
pub enum Target {
    /// An invocable function
    Callable(Arc<dyn Callable>),
    /// A type whose fields become the parameters; only records qualify
    Type(TypeInfo),
}

impl Target {
    pub fn callable(callable: impl Callable + 'static) -> Self {
        Target::Callable(Arc::new(callable))
    }

    pub fn of<T: crate::describe::Describe>() -> Self {
        Target::Type(T::type_info())
    }
}

impl From<Arc<dyn Callable>> for Target {
    fn from(callable: Arc<dyn Callable>) -> Self {
        Target::Callable(callable)
    }
}

impl From<TypeInfo> for Target {
    fn from(ty: TypeInfo) -> Self {
        Target::Type(ty)
    }
}

/// Builds tools from callables and record types
///
/// # Example
///
/// ```
/// use fncall_tools::{Function, SchemaDeriver, Target};
/// use fncall_tools::catalog::Catalog;
///
/// fn print_test(name: String, amount: i64) -> String {
///     format!("{name} {amount}")
/// }
///
/// let deriver = SchemaDeriver::new(
///     Catalog::new().with_callable("print_test", "prints a line", ["name", "amount"]),
/// );
/// let tool = deriver.derive(Target::callable(Function::new(print_test))).unwrap();
///
/// assert_eq!(tool.name(), "print_test");
/// assert_eq!(tool.function.param_order, vec!["name", "amount"]);
/// ```
pub struct SchemaDeriver {
    docs: Arc<dyn DocSource>,
    max_depth: usize,
    strict: bool,
}

impl Default for SchemaDeriver {
    fn default() -> Self {
        Self::new(Catalog::new())
    }
}

impl SchemaDeriver {
    pub fn new(docs: impl DocSource + 'static) -> Self {
        Self::with_docs(Arc::new(docs))
    }

    pub fn with_docs(docs: Arc<dyn DocSource>) -> Self {
        Self {
            docs,
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the provider strict-mode flag on every derived tool
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Derive a tool from a callable or a record type
    pub fn derive(&self, target: impl Into<Target>) -> Result<Tool> {
        match target.into() {
            Target::Callable(callable) => self.derive_callable(callable),
            Target::Type(TypeInfo::Record(record)) => self.derive_record(&record),
            Target::Type(other) => Err(ToolError::NotCallable(other.to_string())),
        }
    }

    fn derive_callable(&self, callable: Arc<dyn Callable>) -> Result<Tool> {
        let signature = callable.signature();
        let doc = self.docs.callable_doc(&signature.name);
        let names = signature
            .param_names
            .as_ref()
            .or(doc.as_ref().map(|d| &d.params));

        let mut parameters = ParameterSchema::object();
        let mut param_order = Vec::new();
        for (i, ty) in signature.schema_params().iter().enumerate() {
            let name = names
                .and_then(|names| names.get(i))
                .filter(|name| !name.is_empty())
                .cloned()
                .unwrap_or_else(|| format!("param{i}"));
            let schema = self
                .schema_for(ty, &mut Vec::new(), 0)
                .map_err(|e| e.within(&name))?;
            parameters.insert_property(name.clone(), schema, true);
            param_order.push(name);
        }

        let description = signature
            .description
            .clone()
            .or(doc.map(|d| d.description))
            .unwrap_or_default();

        tracing::debug!(
            tool = %signature.name,
            params = param_order.len(),
            "Derived tool from callable"
        );

        let function = FuncDef {
            name: signature.name.clone(),
            description,
            strict: self.strict,
            param_order,
            parameters,
            arguments: None,
        };
        Ok(Tool::new(function).with_callable(callable))
    }

    fn derive_record(&self, record: &RecordInfo) -> Result<Tool> {
        let mut stack = vec![record.name()];
        let mut parameters = ParameterSchema::object();
        let mut param_order = Vec::new();
        for field in record.fields() {
            let schema = self.field_schema(record, &field, &mut stack, 1)?;
            parameters.insert_property(field.name.clone(), schema, field.is_required());
            param_order.push(field.name);
        }

        let description = self
            .docs
            .type_doc(record.name())
            .unwrap_or_else(|| {
                let name = record.name();
                format!("{name} defines a {} object", name.to_lowercase())
            });

        tracing::debug!(
            tool = record.name(),
            params = param_order.len(),
            "Derived tool from record"
        );

        let function = FuncDef {
            name: record.name().to_string(),
            description,
            strict: self.strict,
            param_order,
            parameters,
            arguments: None,
        };
        Ok(Tool::new(function))
    }

    fn field_schema(
        &self,
        record: &RecordInfo,
        field: &FieldInfo,
        stack: &mut Vec<&'static str>,
        depth: usize,
    ) -> Result<ParameterSchema> {
        let description = field
            .description
            .clone()
            .or_else(|| self.docs.field_doc(record.name(), &field.name))
            .unwrap_or_else(|| field.name.clone());
        let schema = self
            .schema_for(&field.ty, stack, depth)
            .map_err(|e| e.within(&field.name))?;
        Ok(schema.with_description(description))
    }

    fn schema_for(
        &self,
        ty: &TypeInfo,
        stack: &mut Vec<&'static str>,
        depth: usize,
    ) -> Result<ParameterSchema> {
        if depth > self.max_depth {
            return Err(ToolError::SchemaDerivation {
                path: String::new(),
                reason: format!("nesting deeper than {}", self.max_depth),
            });
        }

        match ty {
            TypeInfo::Optional(inner) => self.schema_for(inner, stack, depth),
            TypeInfo::Enum(info) => Ok(self.enum_schema(info)),
            TypeInfo::Sequence(inner) => {
                let items = self.schema_for(inner, stack, depth + 1)?;
                Ok(ParameterSchema::array(items))
            }
            TypeInfo::Record(record) => self.record_schema(record, stack, depth + 1),
            other => Ok(ParameterSchema::primitive(map_type(other))),
        }
    }

    fn enum_schema(&self, info: &EnumInfo) -> ParameterSchema {
        let values = if info.values.is_empty() {
            self.docs.enum_values(info.name).unwrap_or_default()
        } else {
            info.values.clone()
        };
        ParameterSchema::enumeration(values)
    }

    fn record_schema(
        &self,
        record: &RecordInfo,
        stack: &mut Vec<&'static str>,
        depth: usize,
    ) -> Result<ParameterSchema> {
        if stack.contains(&record.name()) {
            return Err(ToolError::SchemaDerivation {
                path: String::new(),
                reason: format!("recursive type {}", record.name()),
            });
        }

        stack.push(record.name());
        let mut schema = ParameterSchema::object();
        if let Some(doc) = self.docs.type_doc(record.name()) {
            schema = schema.with_description(doc);
        }
        for field in record.fields() {
            let property = self.field_schema(record, &field, stack, depth)?;
            schema.insert_property(field.name.clone(), property, field.is_required());
        }
        stack.pop();
        Ok(schema)
    }
}

//! Invocation engine
//!
//! Calls a tool's callable from positional values, a name-keyed map, or the
//! raw JSON argument text a model produced. Arguments are checked against the
//! declared parameter types before the callable runs; the call context is
//! prepended when the callable asks for it.

use crate::Value;
use crate::callable::{Argument, ArgumentError};
use crate::convert::convert_argument;
use crate::describe::TypeInfo;
use crate::error::{Result, ToolError};
use crate::tool::Tool;
use fncall_core::CallContext;
use indexmap::IndexMap;

impl From<ArgumentError> for ToolError {
    fn from(err: ArgumentError) -> Self {
        ToolError::TypeMismatch {
            index: err.index,
            expected: err.expected,
            actual: err.actual,
        }
    }
}

impl Tool {
    /// Invoke with positional arguments
    ///
    /// Returns the callable's non-error results in order. A callable that
    /// reports an error yields [`ToolError::Callable`], which still carries
    /// the results.
    ///
    /// # Example
    ///
    /// ```
    /// use fncall_core::CallContext;
    /// use fncall_tools::{Function, SchemaDeriver, Value};
    ///
    /// fn print_test(name: String, amount: String) -> String {
    ///     format!("{name} {amount}")
    /// }
    ///
    /// let tool = SchemaDeriver::default()
    ///     .derive(Function::new(print_test).into_callable())
    ///     .unwrap();
    /// let results = tool
    ///     .invoke(&CallContext::new(), vec![Value::from("a"), Value::from("1")])
    ///     .unwrap();
    /// assert_eq!(results, vec![Value::from("a 1")]);
    /// ```
    pub fn invoke(&self, ctx: &CallContext, args: Vec<Value>) -> Result<Vec<Value>> {
        let callable = self
            .callable()
            .ok_or_else(|| ToolError::NotInvocable(self.name().to_string()))?;
        let signature = callable.signature();
        let params = signature.schema_params();
        if args.len() != params.len() {
            return Err(ToolError::Arity {
                expected: params.len(),
                actual: args.len(),
            });
        }

        let mut prepared = Vec::with_capacity(signature.params.len());
        if signature.takes_context() {
            prepared.push(Argument::Context(ctx.clone()));
        }
        for (index, (value, ty)) in args.into_iter().zip(params).enumerate() {
            prepared.push(Argument::Value(convert_argument(index, value, ty)?));
        }

        tracing::debug!(tool = %self.name(), args = params.len(), "Invoking tool");
        let output = callable.call(prepared)?;
        match output.error {
            Some(source) => {
                tracing::debug!(tool = %self.name(), error = %source, "Tool returned an error");
                Err(ToolError::Callable {
                    source,
                    results: output.values,
                })
            }
            None => Ok(output.values),
        }
    }

    /// Invoke with arguments keyed by parameter name
    ///
    /// Values are reordered by the tool's parameter order. A missing parameter
    /// is passed as `Null` when the callable declares it as `Option`, and is
    /// an error otherwise, whatever the persisted `required` list says.
    /// Unknown names are ignored.
    pub fn invoke_named(&self, ctx: &CallContext, mut args: IndexMap<String, Value>) -> Result<Vec<Value>> {
        let callable = self
            .callable()
            .ok_or_else(|| ToolError::NotInvocable(self.name().to_string()))?;
        let signature = callable.signature();
        let params = signature.schema_params();

        let mut positional = Vec::with_capacity(self.param_order().len());
        for (index, name) in self.param_order().iter().enumerate() {
            match args.shift_remove(name) {
                Some(value) => positional.push(value),
                None if matches!(params.get(index), Some(TypeInfo::Optional(_))) => {
                    positional.push(Value::Null);
                }
                None => return Err(ToolError::MissingParameter(name.clone())),
            }
        }
        if !args.is_empty() {
            tracing::debug!(
                tool = %self.name(),
                ignored = ?args.keys().collect::<Vec<_>>(),
                "Ignoring unknown arguments"
            );
        }
        self.invoke(ctx, positional)
    }

    /// Invoke with raw JSON argument text
    ///
    /// An object is treated as named arguments, an array as positional ones.
    pub fn invoke_json(&self, ctx: &CallContext, text: &str) -> Result<Vec<Value>> {
        match text.trim_start().chars().next() {
            Some('{') => {
                let map: IndexMap<String, serde_json::Value> =
                    serde_json::from_str(text).map_err(ToolError::Decode)?;
                let args = map.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
                self.invoke_named(ctx, args)
            }
            Some('[') => {
                let values: Vec<serde_json::Value> =
                    serde_json::from_str(text).map_err(ToolError::Decode)?;
                self.invoke(ctx, values.into_iter().map(Value::from).collect())
            }
            _ => Err(ToolError::InvalidInput(text.to_string())),
        }
    }
}

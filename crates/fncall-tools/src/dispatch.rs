//! Async bridge between model-facing hosts and the synchronous engine

use crate::adapter::{DefinitionAdapter, ToolAdapter, ToolDefinition};
use crate::error::ToolError;
use crate::tool::Tool;
use crate::Value;
use async_trait::async_trait;
use fncall_core::{CallContext, Error, Result};
use std::sync::Arc;

/// Trait for tools that agents can execute
///
/// Hosts hand the model's arguments over as JSON and get JSON back, without
/// knowing how the tool is implemented.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute the tool with the given parameters (an object or an array)
    async fn execute(&self, params: serde_json::Value) -> Result<serde_json::Value>;

    /// Get the tool's name
    ///
    /// Must be unique within a registry
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    fn input_schema(&self) -> serde_json::Value;
}

/// A shared tool bound to the context its calls run under
///
/// # Example
///
/// ```
/// use fncall_core::CallContext;
/// use fncall_tools::{Function, SchemaDeriver, ToolExecutor, ToolHandle};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let tool = SchemaDeriver::default()
///     .derive(Function::new(|a: i64, b: i64| a * b).named("mul").params(["a", "b"]).into_callable())
///     .unwrap();
/// let handle = ToolHandle::new(tool, CallContext::new());
///
/// let result = handle.execute(json!({"a": 6, "b": 7})).await.unwrap();
/// assert_eq!(result, json!(42));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ToolHandle {
    tool: Arc<Tool>,
    context: CallContext,
}

impl ToolHandle {
    pub fn new(tool: impl Into<Arc<Tool>>, context: CallContext) -> Self {
        Self {
            tool: tool.into(),
            context,
        }
    }

    pub fn tool(&self) -> &Arc<Tool> {
        &self.tool
    }

    pub fn context(&self) -> &CallContext {
        &self.context
    }

    fn check_context(&self) -> Result<()> {
        if self.context.is_cancelled() {
            return Err(Error::Cancelled(self.tool.name().to_string()));
        }
        if self.context.is_expired() {
            return Err(Error::DeadlineExceeded(self.tool.name().to_string()));
        }
        Ok(())
    }
}

/// A single result is returned as-is, anything else as an array
fn collapse(mut results: Vec<Value>) -> serde_json::Value {
    if results.len() == 1 {
        results.remove(0).into()
    } else {
        serde_json::Value::Array(results.into_iter().map(Into::into).collect())
    }
}

/// Adapter failures are logged and reported as a `null` schema
fn schema_or_null(name: &str, definition: crate::Result<ToolDefinition>) -> serde_json::Value {
    match definition {
        Ok(definition) => definition.input_schema,
        Err(e) => {
            tracing::warn!(tool = %name, error = %e, "Failed to build input schema");
            serde_json::Value::Null
        }
    }
}

#[async_trait]
impl ToolExecutor for ToolHandle {
    async fn execute(&self, params: serde_json::Value) -> Result<serde_json::Value> {
        self.check_context()?;

        let tool = Arc::clone(&self.tool);
        let context = self.context.clone();
        let name = tool.name().to_string();
        tracing::debug!(tool = %name, "Dispatching tool call");

        let results = tokio::task::spawn_blocking(move || -> std::result::Result<Vec<Value>, ToolError> {
            match params {
                serde_json::Value::Object(map) => tool.invoke_named(
                    &context,
                    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
                ),
                serde_json::Value::Array(values) => {
                    tool.invoke(&context, values.into_iter().map(Value::from).collect())
                }
                serde_json::Value::Null => tool.invoke(&context, Vec::new()),
                other => Err(ToolError::InvalidInput(other.to_string())),
            }
        })
        .await
        .map_err(|e| Error::ProcessingFailed(format!("tool '{name}' panicked: {e}")))?;

        match results {
            Ok(results) => Ok(collapse(results)),
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "Tool call failed");
                Err(e.into())
            }
        }
    }

    fn name(&self) -> &str {
        self.tool.name()
    }

    fn description(&self) -> &str {
        self.tool.description()
    }

    fn input_schema(&self) -> serde_json::Value {
        schema_or_null(self.tool.name(), DefinitionAdapter.adapt(&self.tool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Function;
    use crate::deriver::{SchemaDeriver, Target};
    use serde_json::json;
    use std::time::{Duration, Instant};

    fn divide_tool() -> Tool {
        let function = Function::new(|a: f64, b: f64| -> std::result::Result<f64, String> {
            if b == 0.0 {
                Err("division by zero".to_string())
            } else {
                Ok(a / b)
            }
        })
        .named("divide")
        .params(["a", "b"]);
        SchemaDeriver::default()
            .derive(Target::callable(function))
            .unwrap()
    }

    fn pair_tool() -> Tool {
        let function = Function::new(|s: String| (s.len() as u64, s.to_uppercase())).named("pair");
        SchemaDeriver::default()
            .derive(Target::callable(function))
            .unwrap()
    }

    #[tokio::test]
    async fn test_execute_named_and_positional() {
        let handle = ToolHandle::new(divide_tool(), CallContext::new());
        assert_eq!(handle.name(), "divide");
        assert_eq!(handle.input_schema()["properties"]["a"]["type"], "number");

        let result = handle.execute(json!({"a": 9, "b": 3})).await.unwrap();
        assert_eq!(result, json!(3.0));

        let result = handle.execute(json!([1, 4])).await.unwrap();
        assert_eq!(result, json!(0.25));
    }

    #[tokio::test]
    async fn test_execute_multiple_results() {
        let handle = ToolHandle::new(pair_tool(), CallContext::new());
        let result = handle.execute(json!(["abc"])).await.unwrap();
        assert_eq!(result, json!([3, "ABC"]));
    }

    #[tokio::test]
    async fn test_execute_errors_convert() {
        let handle = ToolHandle::new(divide_tool(), CallContext::new());

        let err = handle.execute(json!({"a": 1, "b": 0})).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Processing failed: tool call failed: division by zero"
        );

        let err = handle.execute(json!("1/0")).await.unwrap_err();
        assert!(matches!(err, Error::ProcessingFailed(_)));
    }

    #[test]
    fn test_schema_failure_becomes_null() {
        let err = ToolError::InvalidFormat("failed to encode schema".to_string());
        assert_eq!(schema_or_null("divide", Err(err)), serde_json::Value::Null);

        let definition = DefinitionAdapter.adapt(&divide_tool()).unwrap();
        let expected = definition.input_schema.clone();
        assert_eq!(schema_or_null("divide", Ok(definition)), expected);
    }

    #[test]
    fn test_cancelled_context_is_refused() {
        let context = CallContext::new();
        context.cancel();
        let handle = ToolHandle::new(divide_tool(), context);

        let err = tokio_test::block_on(handle.execute(json!([1, 1]))).unwrap_err();
        assert!(matches!(err, Error::Cancelled(_)));
    }

    #[test]
    fn test_expired_context_is_refused() {
        let context = CallContext::new().with_deadline(Instant::now());
        std::thread::sleep(Duration::from_millis(2));
        let handle = ToolHandle::new(divide_tool(), context);

        let err = tokio_test::block_on(handle.execute(json!([1, 1]))).unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded(_)));
    }
}

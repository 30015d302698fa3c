//! Tool registry for managing available tools

use crate::Value;
use crate::adapter::ToolAdapter;
use crate::error::{Result, ToolError};
use crate::tool::Tool;
use fncall_core::CallContext;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry for managing tools
///
/// # Example
///
/// ```
/// use fncall_core::CallContext;
/// use fncall_tools::{Function, SchemaDeriver, ToolRegistry, Value};
///
/// fn add(a: i64, b: i64) -> i64 {
///     a + b
/// }
///
/// let registry = ToolRegistry::new();
/// let tool = SchemaDeriver::default()
///     .derive(Function::new(add).params(["a", "b"]).into_callable())
///     .unwrap();
/// registry.register(tool);
///
/// let results = registry
///     .invoke_json(&CallContext::new(), "add", r#"{"a": 2, "b": 3}"#)
///     .unwrap();
/// assert_eq!(results, vec![Value::Int(5)]);
/// ```
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<Tool>>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&self, tool: impl Into<Arc<Tool>>) -> Option<Arc<Tool>> {
        let tool = tool.into();
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        let previous = tools.insert(tool.name().to_string(), tool);
        if let Some(previous) = &previous {
            tracing::warn!(tool = %previous.name(), "Replaced registered tool");
        }
        previous
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.get(name).cloned()
    }

    /// Remove a tool by name
    pub fn remove(&self, name: &str) -> Option<Arc<Tool>> {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        tools.remove(name)
    }

    /// List all registered tools, sorted by name
    pub fn list_tools(&self) -> Vec<Arc<Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        let mut list: Vec<_> = tools.values().cloned().collect();
        list.sort_by(|a, b| a.name().cmp(b.name()));
        list
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.is_empty()
    }

    /// Invoke the tool `name` with raw JSON argument text
    pub fn invoke_json(&self, ctx: &CallContext, name: &str, text: &str) -> Result<Vec<Value>> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.invoke_json(ctx, text)
    }

    /// Describe every registered tool through `adapter`, sorted by name
    pub fn definitions<A: ToolAdapter>(&self, adapter: &A) -> Result<Vec<A::Output>> {
        self.list_tools()
            .iter()
            .map(|tool| adapter.adapt(tool))
            .collect()
    }
}

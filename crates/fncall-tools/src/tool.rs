//! The tool entity
//!
//! A [`Tool`] pairs the model-facing description of a function ([`FuncDef`])
//! with the callable that implements it. Only the description is ever
//! serialized; the callable is attached at derivation time and re-attached
//! when a persisted tool is loaded.

use crate::callable::Callable;
use crate::error::{Result, ToolError};
use crate::schema::ParameterSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How the host should surface the tool's activity in a streamed chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StreamSignal {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "function")]
    Function,
    #[serde(rename = "function_finish")]
    FunctionFinish,
    #[serde(rename = "function_new_question")]
    FunctionNewQuestion,
    #[serde(rename = "end")]
    End,
    /// No signal
    #[default]
    #[serde(rename = "")]
    None,
}

/// Model-facing description of a function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDef {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Provider strict-mode flag
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strict: bool,

    /// Parameter names in positional order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub param_order: Vec<String>,

    pub parameters: ParameterSchema,

    /// Raw argument text a provider echoed back for this function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// A function exposed to a language model
#[derive(Clone, Serialize, Deserialize)]
pub struct Tool {
    pub function: FuncDef,

    #[serde(skip)]
    callable: Option<Arc<dyn Callable>>,

    /// End the conversation loop after this tool runs
    #[serde(default)]
    pub exit_func: bool,

    #[serde(default)]
    pub write_to_chat: StreamSignal,
}

impl Tool {
    /// Create a tool without a callable
    pub fn new(function: FuncDef) -> Self {
        Self {
            function,
            callable: None,
            exit_func: false,
            write_to_chat: StreamSignal::None,
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn description(&self) -> &str {
        &self.function.description
    }

    pub fn parameters(&self) -> &ParameterSchema {
        &self.function.parameters
    }

    pub fn param_order(&self) -> &[String] {
        &self.function.param_order
    }

    /// The attached callable, if any
    pub fn callable(&self) -> Option<&Arc<dyn Callable>> {
        self.callable.as_ref()
    }

    pub fn is_invocable(&self) -> bool {
        self.callable.is_some()
    }

    /// Attach (or replace) the callable
    pub fn with_callable(mut self, callable: Arc<dyn Callable>) -> Self {
        self.callable = Some(callable);
        self
    }

    pub fn with_exit_func(mut self, exit_func: bool) -> Self {
        self.exit_func = exit_func;
        self
    }

    pub fn with_write_to_chat(mut self, signal: StreamSignal) -> Self {
        self.write_to_chat = signal;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.function.strict = strict;
        self
    }

    /// Check the structural invariants of a decoded tool
    pub fn validate(&self) -> Result<()> {
        if self.function.name.is_empty() {
            return Err(ToolError::InvalidFormat("tool name is empty".to_string()));
        }
        self.function
            .parameters
            .validate()
            .map_err(ToolError::InvalidFormat)?;

        let order = &self.function.param_order;
        if order.len() != self.function.parameters.len() {
            return Err(ToolError::InvalidFormat(format!(
                "param_order lists {} names but parameters define {}",
                order.len(),
                self.function.parameters.len()
            )));
        }
        if let Some(name) = order
            .iter()
            .find(|name| self.function.parameters.property(name).is_none())
        {
            return Err(ToolError::InvalidFormat(format!(
                "param_order names unknown parameter '{name}'"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("function", &self.function)
            .field("callable", &self.callable.as_ref().map(|c| &c.signature().name))
            .field("exit_func", &self.exit_func)
            .field("write_to_chat", &self.write_to_chat)
            .finish()
    }
}

//! Tool definition and invocation engine for fncall
//!
//! Exposes ordinary Rust functions to a language model as callable tools:
//!
//! - [`SchemaDeriver`] derives a [`Tool`] (name, description and a JSON
//!   parameter schema) from a [`Function`] or a record type.
//! - [`save`] and [`load_and_verify`] persist tools as JSON and reload them,
//!   checking the stored schema against the live callable.
//! - [`Tool::invoke`], [`Tool::invoke_named`] and [`Tool::invoke_json`] call
//!   the function from positional values, named values or raw model output.
//! - [`adapter`] converts tools into protocol-specific descriptions, and
//!   [`ToolRegistry`] / [`ToolHandle`] serve them to a host.
//!
//! # Example
//!
//! ```
//! use fncall_core::CallContext;
//! use fncall_tools::{Function, SchemaDeriver, Target, Value};
//!
//! fn get_weather(city: String, days: u8) -> String {
//!     format!("{city}: sunny for {days} days")
//! }
//!
//! let function = Function::new(get_weather)
//!     .describe("Weather forecast for a city")
//!     .params(["city", "days"]);
//! let tool = SchemaDeriver::default()
//!     .derive(Target::callable(function))
//!     .unwrap();
//!
//! let results = tool
//!     .invoke_json(&CallContext::new(), r#"{"city": "Oslo", "days": 2}"#)
//!     .unwrap();
//! assert_eq!(results, vec![Value::from("Oslo: sunny for 2 days")]);
//! ```

pub mod adapter;
pub mod callable;
pub mod catalog;
pub mod config;
mod convert;
pub mod deriver;
pub mod describe;
pub mod dispatch;
pub mod error;
mod invoke;
pub mod kind;
pub mod registry;
pub mod schema;
pub mod store;
pub mod tool;
pub mod value;
pub mod verify;

pub use adapter::{DefinitionAdapter, OptionListAdapter, ToolAdapter};
pub use callable::{Callable, Function, Signature};
pub use catalog::{Catalog, DocSource};
pub use config::EngineConfig;
pub use deriver::{SchemaDeriver, Target};
pub use describe::{Describe, FieldInfo, TypeInfo};
pub use dispatch::{ToolExecutor, ToolHandle};
pub use error::{Result, ToolError};
pub use kind::{Kind, map_type};
pub use registry::ToolRegistry;
pub use schema::ParameterSchema;
pub use store::{ToolStore, load_and_verify, load_from_bytes, save};
pub use tool::{FuncDef, StreamSignal, Tool};
pub use value::Value;
pub use verify::Verification;

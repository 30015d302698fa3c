//! Tool persistence
//!
//! Tools are stored as indented JSON documents, one file per tool. Loading
//! never trusts the file on its own: the live callable is re-derived and the
//! persisted schema is verified against it before the callable is attached.

use crate::callable::Callable;
use crate::config::EngineConfig;
use crate::deriver::{DEFAULT_MAX_DEPTH, SchemaDeriver};
use crate::error::{Result, ToolError};
use crate::tool::Tool;
use crate::verify::{Verification, verify};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const EXTENSION: &str = "json";

/// Write `tool` to `<dir>/<name>.json`, creating `dir` if needed
///
/// An empty `name` defaults to the tool's name. Existing files are
/// overwritten.
pub fn save(dir: impl AsRef<Path>, name: &str, tool: &Tool) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| ToolError::io(dir, e))?;

    let name = if name.is_empty() { tool.name() } else { name };
    let path = dir.join(format!("{name}.{EXTENSION}"));
    let text = serde_json::to_string_pretty(tool)
        .map_err(|e| ToolError::InvalidFormat(format!("failed to encode tool: {e}")))?;
    std::fs::write(&path, text).map_err(|e| ToolError::io(&path, e))?;

    tracing::info!(tool = %tool.name(), path = %path.display(), "Saved tool");
    Ok(path)
}

/// Load a persisted tool and attach `callable` after deep verification
pub fn load_and_verify(callable: Arc<dyn Callable>, path: impl AsRef<Path>) -> Result<Tool> {
    load_and_verify_with(callable, path, Verification::Deep)
}

/// Load a persisted tool and attach `callable` after verification at `level`
pub fn load_and_verify_with(
    callable: Arc<dyn Callable>,
    path: impl AsRef<Path>,
    level: Verification,
) -> Result<Tool> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ToolError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|e| ToolError::io(path, e))?;
    let tool = Loader::new(level).load(callable, &bytes)?;
    tracing::info!(tool = %tool.name(), path = %path.display(), "Loaded tool");
    Ok(tool)
}

/// Decode a persisted tool from memory and attach `callable` after deep verification
pub fn load_from_bytes(callable: Arc<dyn Callable>, bytes: &[u8]) -> Result<Tool> {
    Loader::new(Verification::Deep).load(callable, bytes)
}

struct Loader {
    level: Verification,
    max_depth: usize,
}

impl Loader {
    fn new(level: Verification) -> Self {
        Self {
            level,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    fn load(&self, callable: Arc<dyn Callable>, bytes: &[u8]) -> Result<Tool> {
        let tool: Tool = serde_json::from_slice(bytes)
            .map_err(|e| ToolError::InvalidFormat(format!("failed to decode tool: {e}")))?;
        tool.validate()?;

        let derived = SchemaDeriver::default()
            .with_max_depth(self.max_depth)
            .derive(Arc::clone(&callable))?;
        verify(&tool.function, &derived.function, self.level).inspect_err(|e| {
            tracing::warn!(tool = %tool.name(), error = %e, "Persisted tool does not match callable");
        })?;

        Ok(tool.with_callable(callable))
    }
}

/// A directory of persisted tools
///
/// # Example
///
/// ```no_run
/// use fncall_tools::{Function, SchemaDeriver, ToolStore};
///
/// fn add(a: i64, b: i64) -> i64 {
///     a + b
/// }
///
/// let function = Function::new(add).params(["a", "b"]).into_callable();
/// let tool = SchemaDeriver::default().derive(function.clone())?;
///
/// let store = ToolStore::new("./tools");
/// store.save(&tool)?;
/// let loaded = store.load("add", function)?;
/// assert!(loaded.is_invocable());
/// # Ok::<(), fncall_tools::ToolError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ToolStore {
    dir: PathBuf,
    verification: Verification,
    max_depth: usize,
}

impl ToolStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            verification: Verification::Deep,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            dir: config.tools_dir.clone(),
            verification: config.verification,
            max_depth: config.max_depth,
        }
    }

    pub fn with_verification(mut self, verification: Verification) -> Self {
        self.verification = verification;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `name`
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{EXTENSION}"))
    }

    /// Save under the tool's own name
    pub fn save(&self, tool: &Tool) -> Result<PathBuf> {
        save(&self.dir, "", tool)
    }

    pub fn save_as(&self, name: &str, tool: &Tool) -> Result<PathBuf> {
        save(&self.dir, name, tool)
    }

    /// Load `name` and attach `callable` after verification
    pub fn load(&self, name: &str, callable: Arc<dyn Callable>) -> Result<Tool> {
        let path = self.path_of(name);
        if !path.exists() {
            return Err(ToolError::NotFound(path));
        }
        let bytes = std::fs::read(&path).map_err(|e| ToolError::io(&path, e))?;
        let loader = Loader {
            level: self.verification,
            max_depth: self.max_depth,
        };
        loader.load(callable, &bytes)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    /// Names of all stored tools, sorted
    ///
    /// A missing directory holds no tools.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| ToolError::io(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ToolError::io(&self.dir, e))?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Function;
    use crate::describe::{Describe, FieldInfo, TypeInfo};
    use crate::error::Mismatch;
    use crate::kind::Kind;
    use crate::schema::ParameterSchema;
    use crate::tool::StreamSignal;
    use serde::Deserialize;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Deserialize)]
    struct Person {
        name: String,
        age: i64,
    }

    impl Describe for Person {
        fn type_info() -> TypeInfo {
            TypeInfo::record("Person", || {
                vec![FieldInfo::of::<String>("name"), FieldInfo::of::<i64>("age")]
            })
        }
    }

    fn print_test(name: String, amount: i64) -> String {
        format!("{name} {amount}")
    }

    fn print_callable() -> Arc<dyn Callable> {
        Function::new(print_test)
            .params(["name", "amount"])
            .into_callable()
    }

    fn derive(callable: &Arc<dyn Callable>) -> Tool {
        SchemaDeriver::default().derive(Arc::clone(callable)).unwrap()
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let callable = print_callable();
        let tool = derive(&callable).with_write_to_chat(StreamSignal::Text);

        let path = save(dir.path().join("nested"), "", &tool).unwrap();
        assert_eq!(path, dir.path().join("nested").join("print_test.json"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"function\""));

        let loaded = load_and_verify(Arc::clone(&callable), &path).unwrap();
        assert_eq!(loaded.function, tool.function);
        assert_eq!(loaded.write_to_chat, StreamSignal::Text);
        assert!(loaded.is_invocable());
    }

    #[test]
    fn test_save_with_explicit_name_overwrites() {
        let dir = tempdir().unwrap();
        let tool = derive(&print_callable());
        let first = save(dir.path(), "custom", &tool).unwrap();
        let second = save(dir.path(), "custom", &tool.clone().with_exit_func(true)).unwrap();
        assert_eq!(first, second);
        assert!(fs::read_to_string(&second).unwrap().contains("\"exit_func\": true"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_and_verify(print_callable(), dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_format() {
        let err = load_from_bytes(print_callable(), b"not json").unwrap_err();
        assert!(matches!(err, ToolError::InvalidFormat(_)));

        let err = load_from_bytes(
            print_callable(),
            br#"{"function": {"name": "x", "parameters": {"type": "array"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidFormat(_)));
    }

    #[test]
    fn test_load_detects_count_mismatch() {
        let dir = tempdir().unwrap();
        let one_param = Function::new(|name: String| name)
            .named("print_test")
            .into_callable();
        let path = save(dir.path(), "", &derive(&one_param)).unwrap();

        let err = load_and_verify(print_callable(), &path).unwrap_err();
        assert!(matches!(
            err,
            ToolError::SchemaMismatch(Mismatch::Count {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_load_detects_nested_mismatch() {
        let dir = tempdir().unwrap();
        let greet = |p: Person| format!("{} {}", p.name, p.age);
        let callable = Function::new(greet).named("greet").into_callable();
        let mut tool = derive(&callable);

        let edited = ParameterSchema::object()
            .with_property("name", ParameterSchema::primitive(Kind::String), true)
            .with_property("age", ParameterSchema::primitive(Kind::String), true);
        tool.function.parameters = ParameterSchema::object()
            .with_property("param0", edited, true);
        let path = save(dir.path(), "", &tool).unwrap();

        let err = load_and_verify(Arc::clone(&callable), &path).unwrap_err();
        assert!(matches!(err, ToolError::SchemaMismatch(Mismatch::Kind { .. })));

        let loaded = load_and_verify_with(callable, &path, Verification::Shallow).unwrap();
        assert!(loaded.is_invocable());
    }

    #[test]
    fn test_hand_edited_descriptions_survive() {
        let callable = print_callable();
        let mut value = serde_json::to_value(derive(&callable)).unwrap();
        value["function"]["description"] = "edited".into();
        value["function"]["parameters"]["properties"]["name"]["description"] =
            "who to print".into();
        let bytes = serde_json::to_vec(&value).unwrap();

        let loaded = load_from_bytes(callable, &bytes).unwrap();
        assert_eq!(loaded.description(), "edited");
        assert_eq!(
            loaded.parameters().property("name").unwrap().description(),
            "who to print"
        );
    }

    #[test]
    fn test_load_pairs_parameters_by_param_order() {
        let doc = br#"{
            "function": {
                "name": "print_test",
                "param_order": ["name", "amount"],
                "parameters": {
                    "type": "object",
                    "properties": {
                        "amount": {"type": "integer"},
                        "name": {"type": "string"}
                    },
                    "required": ["amount", "name"]
                }
            }
        }"#;

        let loaded = load_from_bytes(print_callable(), doc).unwrap();
        assert_eq!(loaded.param_order(), ["name", "amount"]);
        let results = loaded
            .invoke_json(&fncall_core::CallContext::new(), r#"{"amount": 3, "name": "a"}"#)
            .unwrap();
        assert_eq!(results, vec![crate::Value::from("a 3")]);
    }

    #[test]
    fn test_store_list_and_exists() {
        let dir = tempdir().unwrap();
        let store = ToolStore::new(dir.path().join("tools"));
        assert!(store.list().unwrap().is_empty());

        let callable = print_callable();
        let tool = derive(&callable);
        store.save(&tool).unwrap();
        store.save_as("backup", &tool).unwrap();
        fs::write(dir.path().join("tools").join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list().unwrap(), vec!["backup", "print_test"]);
        assert!(store.exists("print_test"));
        assert!(!store.exists("notes"));

        let loaded = store.load("backup", callable).unwrap();
        assert_eq!(loaded.name(), "print_test");
        assert!(matches!(
            store.load("missing", print_callable()),
            Err(ToolError::NotFound(_))
        ));
    }

    #[test]
    fn test_store_from_config() {
        let config = EngineConfig {
            tools_dir: PathBuf::from("/var/lib/tools"),
            verification: Verification::Shallow,
            ..EngineConfig::default()
        };
        let store = ToolStore::from_config(&config);
        assert_eq!(store.dir(), Path::new("/var/lib/tools"));
        assert_eq!(store.path_of("x"), PathBuf::from("/var/lib/tools/x.json"));
    }
}

//! Derive, persist, reload and call a tool that returns a record
//!
//! Run with `cargo run -p fncall-tools --example person`.

use anyhow::Context;
use fncall_core::CallContext;
use fncall_tools::{
    Catalog, DefinitionAdapter, Describe, FieldInfo, Function, SchemaDeriver, ToolAdapter,
    ToolStore, TypeInfo, load_and_verify,
};
use serde::{Deserialize, Serialize};

/// A person
#[derive(Debug, Default, Serialize, Deserialize)]
struct Person {
    name: String,
    age: i64,
}

impl Describe for Person {
    fn type_info() -> TypeInfo {
        TypeInfo::record("Person", || {
            vec![
                FieldInfo::of::<String>("name").describe("name of the person ie firstname lastname"),
                FieldInfo::of::<i64>("age").describe("age of the person"),
            ]
        })
    }
}

fn get_person(name: String) -> Person {
    Person { name, age: 42 }
}

fn get_person_ctx(ctx: &CallContext, name: String) -> Person {
    tracing::info!(session = ctx.session_id().unwrap_or("-"), "looking up {name}");
    Person { name, age: 7 }
}

fn main() -> anyhow::Result<()> {
    fncall_utils::init_tracing_with(&fncall_utils::Config::from_env());

    let catalog = Catalog::new()
        .with_callable("get_person", "Look up a person by name", ["name"])
        .with_callable("get_person_ctx", "Look up a person within a session", ["name"]);
    let deriver = SchemaDeriver::new(catalog);

    let callable = Function::new(get_person).into_callable();
    let person_tool = deriver.derive(callable.clone())?;

    let dir = std::env::temp_dir().join("fncall-toolsjson");
    let store = ToolStore::new(&dir);
    let path = store.save(&person_tool)?;
    println!("saved tool: {}", path.display());

    let reloaded = load_and_verify(callable, &path).context("reloading get_person")?;
    let definition = DefinitionAdapter.adapt(&reloaded)?;
    println!("{}", serde_json::to_string_pretty(&definition)?);

    let ctx_tool = deriver.derive(Function::with_context(get_person_ctx).into_callable())?;
    let ctx = CallContext::new().with_session_id("demo");

    println!("{:?}", reloaded.invoke_json(&ctx, r#"["name"]"#)?);
    println!("{:?}", ctx_tool.invoke_json(&ctx, r#"{"name": "name2"}"#)?);

    let record_tool = deriver.derive(Person::type_info())?;
    println!("{}", serde_json::to_string_pretty(&record_tool)?);
    Ok(())
}

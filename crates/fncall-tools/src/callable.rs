//! Callables: type-erased functions with a describable signature
//!
//! Plain Rust functions and closures become [`Function`]s, which implement
//! [`Callable`]. A `Function` records the declared parameter and return types
//! as [`TypeInfo`] so that the deriver can build a schema and the invocation
//! engine can validate arguments without knowing the concrete types.
//!
//! # Example
//!
//! ```
//! use fncall_core::CallContext;
//! use fncall_tools::{Callable, Function};
//!
//! fn print_test(name: String, amount: i64) -> String {
//!     format!("{name} {amount}")
//! }
//!
//! let plain = Function::new(print_test).params(["name", "amount"]);
//! assert_eq!(plain.signature().name, "print_test");
//! assert!(!plain.signature().takes_context());
//!
//! let with_ctx = Function::with_context(|ctx: &CallContext, name: String| {
//!     format!("{name} cancelled={}", ctx.is_cancelled())
//! })
//! .named("greet");
//! assert!(with_ctx.signature().takes_context());
//! assert_eq!(with_ctx.signature().schema_params().len(), 1);
//! ```

use crate::Value;
use crate::describe::{Describe, TypeInfo};
use crate::error::BoxError;
use fncall_core::CallContext;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Declared shape of a callable
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// Name the tool is exposed under
    pub name: String,
    /// Summary, when supplied at registration
    pub description: Option<String>,
    /// Parameter names, context parameter excluded, when supplied at registration
    pub param_names: Option<Vec<String>>,
    /// Declared parameter types, including a leading [`TypeInfo::Context`]
    pub params: Vec<TypeInfo>,
    /// Declared return types; a trailing [`TypeInfo::Error`] marks a fallible call
    pub returns: Vec<TypeInfo>,
}

impl Signature {
    pub fn new(name: impl Into<String>, params: Vec<TypeInfo>, returns: Vec<TypeInfo>) -> Self {
        Self {
            name: name.into(),
            description: None,
            param_names: None,
            params,
            returns,
        }
    }

    /// Whether the first declared parameter is the call context
    pub fn takes_context(&self) -> bool {
        self.params.first().is_some_and(TypeInfo::is_context)
    }

    /// Parameters the caller must supply (the context is excluded)
    pub fn schema_params(&self) -> &[TypeInfo] {
        if self.takes_context() {
            &self.params[1..]
        } else {
            &self.params
        }
    }

    /// Whether the last declared return value is an error
    pub fn returns_error(&self) -> bool {
        self.returns.last().is_some_and(TypeInfo::is_error)
    }
}

/// One positional argument as handed to a callable
#[derive(Debug, Clone)]
pub enum Argument {
    Context(CallContext),
    Value(Value),
}

/// What a callable produced
#[derive(Debug, Default)]
pub struct Output {
    /// Non-error return values in declaration order; `Null` for empty slots
    pub values: Vec<Value>,
    /// The error half of a fallible return, when the call failed
    pub error: Option<BoxError>,
}

/// An argument the callable could not accept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentError {
    /// Position among the caller-supplied arguments
    pub index: usize,
    pub expected: String,
    pub actual: String,
}

/// A function the engine can describe and invoke
pub trait Callable: Send + Sync {
    /// The declared signature
    fn signature(&self) -> &Signature;

    /// Invoke with fully prepared arguments
    ///
    /// The engine has already checked the arity, converted every value to
    /// its declared type and prepended the context when one is expected.
    fn call(&self, args: Vec<Argument>) -> Result<Output, ArgumentError>;
}

/// Return types a [`Function`] can produce
pub trait IntoOutput {
    /// Declared return types
    fn return_types() -> Vec<TypeInfo>;

    fn into_output(self) -> Output;
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value).map(Value::from)
}

impl<T: Describe + Serialize> IntoOutput for T {
    fn return_types() -> Vec<TypeInfo> {
        match T::type_info() {
            TypeInfo::Unit => Vec::new(),
            info => vec![info],
        }
    }

    fn into_output(self) -> Output {
        if matches!(T::type_info(), TypeInfo::Unit) {
            return Output::default();
        }
        match to_value(&self) {
            Ok(value) => Output {
                values: vec![value],
                error: None,
            },
            Err(e) => Output {
                values: vec![Value::Null],
                error: Some(Box::new(e)),
            },
        }
    }
}

macro_rules! impl_tuple_output {
    ($($ty:ident),+) => {
        impl<$($ty: Describe + Serialize),+> IntoOutput for ($($ty,)+) {
            fn return_types() -> Vec<TypeInfo> {
                vec![$($ty::type_info()),+]
            }

            #[allow(non_snake_case)]
            fn into_output(self) -> Output {
                let ($($ty,)+) = self;
                let mut output = Output::default();
                $(
                    match to_value(&$ty) {
                        Ok(value) => output.values.push(value),
                        Err(e) => {
                            output.values.push(Value::Null);
                            output.error.get_or_insert_with(|| Box::new(e));
                        }
                    }
                )+
                output
            }
        }
    };
}

impl_tuple_output!(A, B);
impl_tuple_output!(A, B, C);

impl<T: IntoOutput, E: Into<BoxError>> IntoOutput for Result<T, E> {
    fn return_types() -> Vec<TypeInfo> {
        let mut types = T::return_types();
        types.push(TypeInfo::Error);
        types
    }

    fn into_output(self) -> Output {
        match self {
            Ok(value) => value.into_output(),
            Err(e) => Output {
                values: vec![Value::Null; T::return_types().len()],
                error: Some(e.into()),
            },
        }
    }
}

type Invoke = dyn Fn(Vec<Argument>) -> Result<Output, ArgumentError> + Send + Sync;

/// A Rust function or closure adapted into a [`Callable`]
pub struct Function {
    signature: Signature,
    invoke: Box<Invoke>,
}

/// Marker for functions without a context parameter
pub struct Plain<Args>(PhantomData<Args>);

/// Marker for functions taking `&CallContext` first
pub struct Contextual<Args>(PhantomData<Args>);

/// Conversion of a function or closure into a [`Function`]
///
/// Implemented for `Fn` items of up to six arguments whose parameters are
/// `Describe + DeserializeOwned` and whose return type is [`IntoOutput`].
pub trait IntoFunction<M> {
    fn into_function(self) -> Function;
}

impl Function {
    /// Adapt a function whose parameters are all caller-supplied
    pub fn new<M>(f: impl IntoFunction<Plain<M>>) -> Self {
        f.into_function()
    }

    /// Adapt a function whose first parameter is `&CallContext`
    pub fn with_context<M>(f: impl IntoFunction<Contextual<M>>) -> Self {
        f.into_function()
    }

    fn from_parts(signature: Signature, invoke: Box<Invoke>) -> Self {
        Self { signature, invoke }
    }

    /// Override the name derived from the function's path
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.signature.name = name.into();
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.signature.description = Some(description.into());
        self
    }

    /// Parameter names in order, context parameter excluded
    pub fn params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signature.param_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn into_callable(self) -> Arc<dyn Callable> {
        Arc::new(self)
    }
}

impl Callable for Function {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, args: Vec<Argument>) -> Result<Output, ArgumentError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Last path segment of a function's type name, `closure` for closures
fn function_name<F>() -> String {
    let full = std::any::type_name::<F>();
    if full.contains("{{closure}}") {
        return "closure".to_string();
    }
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path).to_string()
}

struct Arguments {
    iter: std::vec::IntoIter<Argument>,
    index: usize,
}

impl Arguments {
    fn new(args: Vec<Argument>) -> Self {
        Self {
            iter: args.into_iter(),
            index: 0,
        }
    }

    fn context(&mut self) -> Result<CallContext, ArgumentError> {
        match self.iter.next() {
            Some(Argument::Context(ctx)) => Ok(ctx),
            other => Err(ArgumentError {
                index: 0,
                expected: TypeInfo::Context.to_string(),
                actual: describe_argument(other.as_ref()),
            }),
        }
    }

    fn next<T: Describe + DeserializeOwned>(&mut self) -> Result<T, ArgumentError> {
        let index = self.index;
        self.index += 1;
        let mismatch = |actual: String| ArgumentError {
            index,
            expected: T::type_info().to_string(),
            actual,
        };
        match self.iter.next() {
            Some(Argument::Value(value)) => {
                let actual = value.type_name();
                serde_json::from_value(value.into()).map_err(|e| mismatch(format!("{actual} ({e})")))
            }
            other => Err(mismatch(describe_argument(other.as_ref()))),
        }
    }
}

fn describe_argument(arg: Option<&Argument>) -> String {
    match arg {
        Some(Argument::Value(value)) => value.type_name().to_string(),
        Some(Argument::Context(_)) => TypeInfo::Context.to_string(),
        None => "nothing".to_string(),
    }
}

macro_rules! impl_into_function {
    ($($arg:ident),*) => {
        impl<F, R, $($arg,)*> IntoFunction<Plain<($($arg,)*)>> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoOutput,
            $($arg: Describe + DeserializeOwned,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_function(self) -> Function {
                let signature = Signature::new(
                    function_name::<F>(),
                    vec![$($arg::type_info()),*],
                    R::return_types(),
                );
                let f = self;
                Function::from_parts(
                    signature,
                    Box::new(move |args: Vec<Argument>| {
                        let mut args = Arguments::new(args);
                        $(let $arg = args.next::<$arg>()?;)*
                        Ok(f($($arg),*).into_output())
                    }),
                )
            }
        }

        impl<F, R, $($arg,)*> IntoFunction<Contextual<($($arg,)*)>> for F
        where
            F: Fn(&CallContext, $($arg),*) -> R + Send + Sync + 'static,
            R: IntoOutput,
            $($arg: Describe + DeserializeOwned,)*
        {
            #[allow(non_snake_case, unused_mut)]
            fn into_function(self) -> Function {
                let signature = Signature::new(
                    function_name::<F>(),
                    vec![TypeInfo::Context $(, $arg::type_info())*],
                    R::return_types(),
                );
                let f = self;
                Function::from_parts(
                    signature,
                    Box::new(move |args: Vec<Argument>| {
                        let mut args = Arguments::new(args);
                        let ctx = args.context()?;
                        $(let $arg = args.next::<$arg>()?;)*
                        Ok(f(&ctx $(, $arg)*).into_output())
                    }),
                )
            }
        }
    };
}

impl_into_function!();
impl_into_function!(A1);
impl_into_function!(A1, A2);
impl_into_function!(A1, A2, A3);
impl_into_function!(A1, A2, A3, A4);
impl_into_function!(A1, A2, A3, A4, A5);
impl_into_function!(A1, A2, A3, A4, A5, A6);

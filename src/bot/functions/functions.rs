use std::sync::Arc;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::bot::registry::manager::ApplicationCommandManager;

/// Handed to every function call. Functions reach the manager through this,
/// never through shared client state.
#[derive(Clone, Default)]
pub struct FunctionContext {
    pub manager: Option<Arc<ApplicationCommandManager>>,
}

impl FunctionContext {
    pub fn new(manager: Arc<ApplicationCommandManager>) -> Self {
        Self { manager: Some(manager) }
    }
}

/// What a function leaves behind for the caller when it continues normally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionResult {
    pub reply: Option<String>,
    pub success: Option<bool>,
}

/// Failures shown to the invoking user. They never abort the bot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FunctionError {
    #[error("Cannot find an instance")]
    ManagerNotFound,
    #[error("Cannot sync empty commands")]
    EmptyCommandSet,
    #[error("Cannot find a specification directory")]
    NoSpecificationDirectory,
    #[error("{0}")]
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionOutcome {
    Continue(FunctionResult),
    Reported(FunctionError),
}

pub trait ScriptFunction: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn usage(&self) -> &str;

    fn call(&self, ctx: FunctionContext, args: Vec<String>) -> BoxFuture<'static, FunctionOutcome>;
}

pub struct FnFunction<F> {func: F, desc: String, usage: String, name: String} impl<F> FnFunction<F>
    where
        F: Fn(FunctionContext, Vec<String>) -> BoxFuture<'static, FunctionOutcome> + Send + Sync + 'static {
    pub fn new(func: F, desc: impl Into<String>, usage: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            func,
            desc: desc.into(),
            usage: usage.into(),
            name: name.into(),
        }
    }
}

impl<F> ScriptFunction for FnFunction<F> where
    F: Fn(FunctionContext, Vec<String>) -> BoxFuture<'static, FunctionOutcome> + Send + Sync + 'static {
        fn call(&self, ctx: FunctionContext, args: Vec<String>) -> BoxFuture<'static, FunctionOutcome> {
            (self.func)(ctx, args)
        }

        fn name(&self) -> &str { &self.name }
        fn description(&self) -> &str { &self.desc }
        fn usage(&self) -> &str { &self.usage }
}

#[macro_export]
macro_rules! func {
    ($function:expr, $($alias:expr),+ $(,)?) => {
        FunctionRegistration {
            aliases: vec![$($alias.to_string()),+],
            function: $function,
        }
    };
}

use tracing::debug;

use crate::bot::functions::{functions::{FunctionContext, FunctionOutcome}, FunctionRegistry};

/// Splits `<prefix><name> [args...]` into the function name and its arguments.
/// Arguments may be separated by whitespace or commas.
pub fn parse_invocation<'a>(prefix: &str, message: &'a str) -> Option<(&'a str, Vec<String>)> {
    let rest = message.trim_start().strip_prefix(prefix)?;
    let mut parts = rest.split(|c: char| c.is_whitespace() || c == ',').filter(|part| !part.is_empty());

    let name = parts.next()?;
    Some((name, parts.map(str::to_string).collect()))
}

/// Runs the function a chat message invokes, if any.
pub async fn dispatch_message(functions: &FunctionRegistry, ctx: FunctionContext, prefix: &str, message: &str) -> Option<FunctionOutcome> {
    let (name, args) = parse_invocation(prefix, message)?;
    let function = functions.get(name)?;

    debug!("Invoking {} with {} argument(s)", function.name(), args.len());
    Some(function.call(ctx, args).await)
}

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bot::state::def::{BotError, BotResult};

/// Wire-format body of one application command, as the bulk overwrite
/// endpoint expects it. Only `name` is interpreted; every other field
/// (`description`, `options`, `type`, localizations, ...) is passed
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

#[cfg(test)]
impl CommandDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), body: Map::new() }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.body.get("description").and_then(Value::as_str)
    }
}

/// Parses a command file: either one command body or an array of them.
pub fn parse_command_file(path: &Path, raw: &str) -> BotResult<Vec<CommandDefinition>> {
    let invalid = |reason: String| BotError::InvalidCommandSpecification {
        path: path.to_path_buf(),
        reason,
    };

    let value: Value = serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?;
    let entries = match value {
        Value::Array(items) => items,
        Value::Object(map) => vec![Value::Object(map)],
        other => {
            return Err(invalid(format!(
                "expected a command object or an array of them, found {}",
                json_kind(&other)
            )))
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            if !entry.is_object() {
                return Err(invalid(format!("entry {index} is {}, not a command object", json_kind(&entry))));
            }
            let definition: CommandDefinition =
                serde_json::from_value(entry).map_err(|e| invalid(format!("entry {index}: {e}")))?;
            if definition.name.trim().is_empty() {
                return Err(invalid(format!("entry {index} has an empty name")));
            }
            Ok(definition)
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

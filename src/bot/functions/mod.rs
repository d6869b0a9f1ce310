use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::bot::functions::{functions::ScriptFunction, registry::commands::REGISTRY_FUNCTIONS};

pub mod functions;
pub mod registry;

#[derive(Clone)]
pub struct FunctionRegistration {
    pub aliases: Vec<String>,
    pub function: Arc<dyn ScriptFunction>
}

pub struct FunctionGroup {
    pub name: String,
    pub functions: Vec<FunctionRegistration>,
}

/// Invocable functions by name and alias.
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn ScriptFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.add_group(&REGISTRY_FUNCTIONS);
        registry
    }

    pub fn empty() -> Self {
        Self { functions: HashMap::new() }
    }

    pub fn add_group(&mut self, group: &FunctionGroup) {
        debug!("Registering function group {}", group.name);
        for reg in &group.functions {
            self.register(reg.clone());
        }
    }

    pub fn register(&mut self, reg: FunctionRegistration) {
        debug!("{} - {} ({})", reg.function.name(), reg.function.description(), reg.function.usage());
        for alias in &reg.aliases {
            self.functions.insert(alias.to_ascii_lowercase(), reg.function.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ScriptFunction>> {
        self.functions.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

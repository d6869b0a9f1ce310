use indexmap::IndexMap;

use crate::bot::registry::definition::CommandDefinition;

/// Commands keyed by name, in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct CommandStore {
    commands: IndexMap<String, CommandDefinition>,
}

impl CommandStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) -> &mut Self {
        self.commands.clear();
        self
    }

    /// Adds or overwrites by name. An overwritten entry keeps its position.
    pub fn insert(&mut self, definition: CommandDefinition) -> Option<CommandDefinition> {
        self.commands.insert(definition.name.clone(), definition)
    }

    pub fn merge(&mut self, other: CommandStore) {
        for definition in other.commands.into_values() {
            self.insert(definition);
        }
    }

    /// Removes by name, keeping the order of what remains.
    pub fn remove(&mut self, name: &str) -> Option<CommandDefinition> {
        self.commands.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// Point-in-time copy of every definition, used as a sync payload.
    pub fn values(&self) -> Vec<CommandDefinition> {
        self.commands.values().cloned().collect()
    }
}

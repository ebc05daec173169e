//! Tool registry, immutable once built
//!
//! The registry is assembled at wiring time and then frozen: runs resolve and
//! invoke entries but never mutate the map, so a single `Arc<ToolRegistry>`
//! is safe to share across any number of concurrent runs without locking.
//! Per-test tool substitution happens by building a different registry, not
//! by swapping entries in a shared one.

use crate::Tool;
use std::collections::HashMap;
use std::sync::Arc;

/// Capability-keyed map from tool name to executable contract
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Start assembling a registry
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Resolve a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Names of all registered tools, sorted for deterministic consumption
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Builder for [`ToolRegistry`]; the only place registration can happen
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    /// Register a tool under its own name; a later tool with the same name
    /// replaces the earlier one
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    /// Freeze the registry
    pub fn build(self) -> ToolRegistry {
        ToolRegistry { tools: self.tools }
    }
}

//! Registry configuration: which member names act as constructors and
//! which make a class callable as a function.

use serde::{Deserialize, Serialize};

/// Configuration shared by every definition in one registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Constructor aliases, in priority order. Only the first one present on
    /// a class runs.
    pub constructors: Vec<String>,
    /// Callable aliases, in priority order.
    pub callables: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            constructors: ["__construct", "construct", "->", "=>"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            callables: ["__call", "<>"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RegistryConfig {
    pub fn add_constructor(&mut self, name: &str) {
        add_alias(&mut self.constructors, name);
    }

    pub fn remove_constructor(&mut self, name: &str) {
        self.constructors.retain(|c| c != name);
    }

    pub fn add_callable(&mut self, name: &str) {
        add_alias(&mut self.callables, name);
    }

    pub fn remove_callable(&mut self, name: &str) {
        self.callables.retain(|c| c != name);
    }

    pub fn is_callable(&self, name: &str) -> bool {
        self.callables.iter().any(|c| c == name)
    }
}

fn add_alias(aliases: &mut Vec<String>, name: &str) {
    if !aliases.iter().any(|a| a == name) {
        aliases.push(name.to_string());
    }
}

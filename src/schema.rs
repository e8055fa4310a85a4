//! JSON schema files describing declarations.
//!
//! A schema lists enums, interfaces and classes in definition order:
//!
//! ```json
//! {
//!   "config": { "constructors": ["init"] },
//!   "definitions": [
//!     { "kind": "enum", "name": "Color", "constants": { "RED": "red" } },
//!     { "kind": "interface", "name": "Saveable",
//!       "members": [{ "decl": "public save(string)", "method": true }] },
//!     { "kind": "class", "name": "Doc", "implements": ["Saveable"],
//!       "members": [
//!         { "decl": "public nullable string title", "value": null },
//!         { "decl": "public save(string)", "method": true }
//!       ] }
//!   ]
//! }
//! ```
//!
//! Methods in a schema are signatures only; their bodies return `null`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::config::RegistryConfig;
use crate::error::Result;
use crate::registry::{Definition, Registry};
use crate::value::{Method, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub config: Option<RegistryConfig>,
    #[serde(default)]
    pub definitions: Vec<SchemaDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SchemaDefinition {
    Class(TypeDecl),
    Interface(TypeDecl),
    Enum(EnumDecl),
}

impl SchemaDefinition {
    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaDefinition::Class(decl) | SchemaDefinition::Interface(decl) => {
                decl.name.as_deref()
            }
            SchemaDefinition::Enum(decl) => Some(&decl.name),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDecl {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default, rename = "enum")]
    pub enum_name: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDecl {
    pub decl: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub method: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub constants: IndexMap<String, serde_json::Value>,
}

impl Schema {
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    /// A registry configured from the schema's `config`, or the defaults.
    pub fn registry(&self) -> Registry {
        Registry::with_config(self.config.clone().unwrap_or_default())
    }

    /// Define every entry in order, stopping at the first failure.
    pub fn apply(&self, registry: &Registry) -> Result<()> {
        for definition in &self.definitions {
            match definition {
                SchemaDefinition::Class(decl) => {
                    registry.define_class(decl.definition())?;
                }
                SchemaDefinition::Interface(decl) => {
                    registry.define_interface(decl.definition())?;
                }
                SchemaDefinition::Enum(decl) => {
                    let constants = decl
                        .constants
                        .iter()
                        .map(|(key, value)| (key.clone(), Value::from_json(value)))
                        .collect();
                    registry.define_enum(decl.name.clone(), constants)?;
                }
            }
        }
        Ok(())
    }
}

impl TypeDecl {
    fn definition(&self) -> Definition {
        let mut definition = match &self.name {
            Some(name) => Definition::new(name.clone()),
            None => Definition::anonymous(),
        };
        if let Some(parent) = &self.extends {
            definition = definition.extends(parent.clone());
        }
        for interface in &self.implements {
            definition = definition.implements(interface.clone());
        }
        if self.is_abstract {
            definition = definition.mark_abstract();
        }
        if self.is_final {
            definition = definition.mark_final();
        }
        if let Some(enum_name) = &self.enum_name {
            definition = definition.expose_enum(enum_name.clone());
        }

        let body = self
            .members
            .iter()
            .map(|member| {
                let value = if member.method {
                    Value::Function(Method::noop())
                } else {
                    Value::from_json(&member.value)
                };
                (member.decl.clone(), value)
            })
            .collect::<Body>();
        definition.body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SAMPLE: &str = r#"{
        "config": { "constructors": ["init"] },
        "definitions": [
            { "kind": "enum", "name": "Color", "constants": { "RED": "red", "BLUE": "blue" } },
            { "kind": "interface", "name": "Saveable",
              "members": [{ "decl": "public save(string)", "method": true }] },
            { "kind": "class", "name": "Doc", "implements": ["Saveable"],
              "members": [
                  { "decl": "public Color color", "value": "red" },
                  { "decl": "public save(string)", "method": true }
              ] }
        ]
    }"#;

    #[test]
    fn parses_and_applies() {
        let schema = Schema::from_json(SAMPLE).unwrap();
        assert_eq!(schema.definitions.len(), 3);
        assert_eq!(schema.definitions[1].name(), Some("Saveable"));

        let registry = schema.registry();
        assert_eq!(registry.config().constructors, vec!["init".to_string()]);
        schema.apply(&registry).unwrap();

        let doc = registry.class("Doc").unwrap();
        assert!(doc.descriptor().instance_of("Saveable"));
        let instance = doc.new_instance(vec![]).unwrap();
        assert_eq!(instance.call("save", vec![Value::from("x")]).unwrap(), Value::Null);
        assert!(instance.call("setColor", vec![Value::from("green")]).is_err());
    }

    #[test]
    fn stops_at_first_failure() {
        let schema = Schema::from_json(
            r#"{ "definitions": [
                { "kind": "interface", "name": "Saveable",
                  "members": [{ "decl": "public save(string)", "method": true }] },
                { "kind": "class", "name": "Broken", "implements": ["Saveable"] },
                { "kind": "class", "name": "Never" }
            ] }"#,
        )
        .unwrap();
        let registry = schema.registry();
        assert!(matches!(
            schema.apply(&registry),
            Err(Error::MissingImplementation { .. })
        ));
        assert!(registry.class("Never").is_none());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(Schema::from_json(r#"{ "definitions": [{ "kind": "struct", "name": "X" }] }"#).is_err());
    }
}

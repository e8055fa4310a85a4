//! Owned class, interface and enum registries and the definition entry
//! points.
//!
//! A [`Registry`] is a cheap handle over shared tables; clones see the same
//! definitions. Names are unique per table, registered once and never
//! removed. Enum names are case-insensitive.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;
use uuid::Uuid;

use crate::body::Body;
use crate::config::RegistryConfig;
use crate::descriptor::{Descriptor, DescriptorKind, EnumDescriptor};
use crate::error::{Error, Result};
use crate::instance::{Class, Instance};
use crate::interface;
use crate::merge::{merge, MergeInput};
use crate::types::TypeScope;
use crate::value::Value;

/// Names an interface may not take: they are type tokens already.
pub const RESERVED_NAMES: &[&str] = &[
    "undefined",
    "object",
    "boolean",
    "number",
    "string",
    "symbol",
    "function",
    "const",
];

/// Options and body of one class or interface definition.
#[derive(Debug, Clone, Default)]
pub struct Definition {
    name: Option<String>,
    extends: Option<String>,
    implements: Vec<String>,
    uses: Vec<Body>,
    is_abstract: bool,
    is_final: bool,
    enum_name: Option<String>,
    body: Body,
}

impl Definition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A definition without a name. One is generated when it is registered.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }

    /// Mix a trait body in. Traits apply in the order they are added.
    pub fn uses(mut self, body: Body) -> Self {
        self.uses.push(body);
        self
    }

    pub fn mark_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn mark_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Also register the definition's constants as an enum named `name`.
    pub fn expose_enum(mut self, name: impl Into<String>) -> Self {
        self.enum_name = Some(name.into());
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug, Default)]
struct Shared {
    config: RefCell<RegistryConfig>,
    classes: RefCell<IndexMap<String, Rc<Descriptor>>>,
    interfaces: RefCell<IndexMap<String, Rc<Descriptor>>>,
    enums: RefCell<IndexMap<String, Rc<EnumDescriptor>>>,
    forward: RefCell<HashSet<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    shared: Rc<Shared>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let registry = Self::default();
        *registry.shared.config.borrow_mut() = config;
        registry
    }

    pub fn config(&self) -> RegistryConfig {
        self.shared.config.borrow().clone()
    }

    /// Change the configuration. Affects instances created afterwards.
    pub fn update_config(&self, update: impl FnOnce(&mut RegistryConfig)) {
        update(&mut self.shared.config.borrow_mut());
    }

    pub(crate) fn is_callable(&self, name: &str) -> bool {
        self.shared.config.borrow().is_callable(name)
    }

    /// Reserve a class name so declarations can use it as a type before the
    /// class itself is defined.
    pub fn forward_declare(&self, name: impl Into<String>) {
        self.shared.forward.borrow_mut().insert(name.into());
    }

    pub fn define_class(&self, definition: Definition) -> Result<Class> {
        let name = resolve_name(definition.name);
        if self.shared.classes.borrow().contains_key(&name) {
            return Err(Error::declaration(format!(
                "another class named \"{}\" already exists",
                name
            )));
        }

        let parent = definition
            .extends
            .map(|parent| {
                self.class_descriptor(&parent).ok_or(Error::UnknownType {
                    kind: "class",
                    name: parent,
                })
            })
            .transpose()?;
        let interfaces = definition
            .implements
            .into_iter()
            .map(|iface| {
                self.interface(&iface).ok_or(Error::UnknownType {
                    kind: "interface",
                    name: iface,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let descriptor = Rc::new(merge(
            MergeInput {
                name: name.clone(),
                kind: DescriptorKind::Class,
                body: &definition.body,
                traits: &definition.uses,
                parent,
                interfaces,
                is_abstract: definition.is_abstract,
                is_final: definition.is_final,
            },
            self,
        )?);

        for iface in descriptor.all_interfaces() {
            interface::verify(&descriptor, &iface)?;
        }
        if let Some(enum_name) = definition.enum_name {
            self.define_enum(enum_name, descriptor.constants().clone())?;
        }

        self.shared.forward.borrow_mut().remove(&name);
        self.shared
            .classes
            .borrow_mut()
            .insert(name.clone(), descriptor.clone());
        debug!(class = %name, abstract_ = descriptor.is_abstract(), "registered class");

        Ok(Class::new(self.clone(), descriptor))
    }

    pub fn define_interface(&self, definition: Definition) -> Result<Rc<Descriptor>> {
        let name = resolve_name(definition.name);
        if self.shared.interfaces.borrow().contains_key(&name) {
            return Err(Error::declaration(format!(
                "another interface named \"{}\" already exists",
                name
            )));
        }
        if RESERVED_NAMES.contains(&name.as_str()) {
            return Err(Error::declaration(format!(
                "an interface may not be named \"{}\", because that name is reserved",
                name
            )));
        }
        if !definition.implements.is_empty() {
            return Err(Error::declaration(format!(
                "interface \"{}\" cannot implement other interfaces, extend them instead",
                name
            )));
        }

        let parent = definition
            .extends
            .map(|parent| {
                self.interface(&parent).ok_or(Error::UnknownType {
                    kind: "interface",
                    name: parent,
                })
            })
            .transpose()?;

        let descriptor = Rc::new(merge(
            MergeInput {
                name: name.clone(),
                kind: DescriptorKind::Interface,
                body: &definition.body,
                traits: &definition.uses,
                parent,
                interfaces: Vec::new(),
                is_abstract: definition.is_abstract,
                is_final: definition.is_final,
            },
            self,
        )?);
        interface::validate_body(&descriptor)?;

        if let Some(enum_name) = definition.enum_name {
            self.define_enum(enum_name, descriptor.constants().clone())?;
        }

        self.shared
            .interfaces
            .borrow_mut()
            .insert(name.clone(), descriptor.clone());
        debug!(interface = %name, "registered interface");

        Ok(descriptor)
    }

    /// Register an enum. Names are compared case-insensitively.
    pub fn define_enum(
        &self,
        name: impl Into<String>,
        constants: IndexMap<String, Value>,
    ) -> Result<Rc<EnumDescriptor>> {
        let name = name.into();
        let key = name.to_lowercase();
        if self.shared.enums.borrow().contains_key(&key) {
            return Err(Error::declaration(format!(
                "enumerator \"{}\" already exists",
                name
            )));
        }
        let descriptor = Rc::new(EnumDescriptor::new(name, constants)?);
        self.shared
            .enums
            .borrow_mut()
            .insert(key, descriptor.clone());
        debug!(name = %descriptor.name(), constants = descriptor.constants().len(), "registered enum");
        Ok(descriptor)
    }

    pub fn class(&self, name: &str) -> Option<Class> {
        self.class_descriptor(name)
            .map(|descriptor| Class::new(self.clone(), descriptor))
    }

    pub fn interface(&self, name: &str) -> Option<Rc<Descriptor>> {
        self.shared.interfaces.borrow().get(name).cloned()
    }

    pub fn enumeration(&self, name: &str) -> Option<Rc<EnumDescriptor>> {
        self.shared.enums.borrow().get(&name.to_lowercase()).cloned()
    }

    /// Names of every registered class, in registration order.
    pub fn class_names(&self) -> Vec<String> {
        self.shared.classes.borrow().keys().cloned().collect()
    }

    pub fn interface_names(&self) -> Vec<String> {
        self.shared.interfaces.borrow().keys().cloned().collect()
    }

    pub fn enum_names(&self) -> Vec<String> {
        self.shared
            .enums
            .borrow()
            .values()
            .map(|e| e.name().to_string())
            .collect()
    }

    /// Instantiate a registered class by name.
    pub fn new_instance(&self, class: &str, args: Vec<Value>) -> Result<Instance> {
        self.require_class(class)?.new_instance(args)
    }

    /// Call a registered class as a function.
    pub fn call_class(&self, class: &str, args: Vec<Value>) -> Result<Value> {
        self.require_class(class)?.call(args)
    }

    fn require_class(&self, name: &str) -> Result<Class> {
        self.class(name).ok_or_else(|| Error::UnknownType {
            kind: "class",
            name: name.to_string(),
        })
    }

    fn class_descriptor(&self, name: &str) -> Option<Rc<Descriptor>> {
        self.shared.classes.borrow().get(name).cloned()
    }
}

impl TypeScope for Registry {
    fn has_object_type(&self, name: &str) -> bool {
        self.shared.classes.borrow().contains_key(name)
            || self.shared.interfaces.borrow().contains_key(name)
            || self.shared.forward.borrow().contains(name)
    }

    fn find_enum(&self, name: &str) -> Option<Rc<EnumDescriptor>> {
        self.enumeration(name)
    }
}

fn resolve_name(name: Option<String>) -> String {
    name.unwrap_or_else(|| Uuid::new_v4().to_string())
}

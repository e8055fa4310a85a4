//! Merged class and interface definitions.
//!
//! A [`Descriptor`] is produced once by the merger and never mutated
//! afterwards. Parents are shared through `Rc`: since descriptors are
//! immutable, a shared parent is indistinguishable from a private copy
//! taken at definition time.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::decl::MemberMeta;
use crate::error::{Error, Result};
use crate::overload::OverloadSet;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    Class,
    Interface,
}

impl DescriptorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorKind::Class => "class",
            DescriptorKind::Interface => "interface",
        }
    }
}

/// A property with its default value.
#[derive(Debug, Clone)]
pub struct DataMember {
    pub meta: MemberMeta,
    pub default: Value,
}

/// A method with its registered signatures.
#[derive(Debug, Clone)]
pub struct MethodMember {
    pub meta: MemberMeta,
    pub overloads: OverloadSet,
}

impl MethodMember {
    pub fn new(meta: MemberMeta) -> Self {
        Self {
            meta,
            overloads: OverloadSet::new(),
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.overloads.is_abstract()
    }
}

#[derive(Debug, Clone)]
pub enum Member {
    Data(DataMember),
    Method(MethodMember),
}

impl Member {
    pub fn meta(&self) -> &MemberMeta {
        match self {
            Member::Data(data) => &data.meta,
            Member::Method(method) => &method.meta,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Member::Method(_))
    }

    pub fn as_data(&self) -> Option<&DataMember> {
        match self {
            Member::Data(data) => Some(data),
            Member::Method(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodMember> {
        match self {
            Member::Method(method) => Some(method),
            Member::Data(_) => None,
        }
    }
}

/// The merged structural definition of a class or interface.
#[derive(Debug)]
pub struct Descriptor {
    pub(crate) name: String,
    pub(crate) kind: DescriptorKind,
    pub(crate) parent: Option<Rc<Descriptor>>,
    pub(crate) members: IndexMap<String, Member>,
    pub(crate) constants: IndexMap<String, Value>,
    /// Own name followed by every ancestor's name, root-ward.
    pub(crate) implementations: Vec<String>,
    /// Interfaces declared on this descriptor (not its ancestors).
    pub(crate) interfaces: Vec<Rc<Descriptor>>,
    pub(crate) is_abstract: bool,
    pub(crate) is_final: bool,
}

impl Descriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == DescriptorKind::Interface
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn parent(&self) -> Option<&Rc<Descriptor>> {
        self.parent.as_ref()
    }

    /// The ancestor chain, starting at the direct parent.
    pub fn ancestors(&self) -> impl Iterator<Item = &Rc<Descriptor>> {
        std::iter::successors(self.parent.as_ref(), |d| d.parent.as_ref())
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(name, member)| (name.as_str(), member))
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodMember> {
        self.members.get(name).and_then(Member::as_method)
    }

    pub fn constants(&self) -> &IndexMap<String, Value> {
        &self.constants
    }

    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants.get(name)
    }

    pub fn implementations(&self) -> &[String] {
        &self.implementations
    }

    /// Interfaces declared directly on this descriptor.
    pub fn interfaces(&self) -> &[Rc<Descriptor>] {
        &self.interfaces
    }

    /// Interfaces declared anywhere along the ancestor chain, root-most
    /// ancestor's first.
    pub fn all_interfaces(&self) -> Vec<Rc<Descriptor>> {
        let mut all = self
            .parent
            .as_ref()
            .map(|parent| parent.all_interfaces())
            .unwrap_or_default();
        for iface in &self.interfaces {
            if !all.iter().any(|known| Rc::ptr_eq(known, iface)) {
                all.push(iface.clone());
            }
        }
        all
    }

    /// Reflexive, transitive identity check across the ancestor chain and
    /// every interface reachable through it.
    pub fn instance_of(&self, name: &str) -> bool {
        if self.name == name {
            return true;
        }
        let via_interface = self.interfaces.iter().any(|iface| {
            iface.name == name || iface.implementations.iter().any(|n| n == name)
        });
        if via_interface {
            return true;
        }
        self.parent
            .as_ref()
            .map_or(false, |parent| parent.instance_of(name))
    }
}

/// A named set of constants usable as a type.
#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    name: String,
    constants: IndexMap<String, Value>,
}

impl EnumDescriptor {
    /// Build an enum. Constants must be plain scalar values.
    pub fn new(name: impl Into<String>, constants: IndexMap<String, Value>) -> Result<Self> {
        let name = name.into();
        for (key, value) in &constants {
            match value {
                Value::Function(_) => {
                    return Err(Error::declaration(format!(
                        "an enumerator cannot contain functions, \"{}\" is a function",
                        key
                    )))
                }
                Value::List(_) | Value::Map(_) | Value::Instance(_) => {
                    return Err(Error::declaration(format!(
                        "an enumerator cannot contain objects, \"{}\" is an object",
                        key
                    )))
                }
                _ => {}
            }
        }
        Ok(Self { name, constants })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constants(&self) -> &IndexMap<String, Value> {
        &self.constants
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.constants.get(key)
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.constants.values().any(|v| v == value)
    }
}

//! Read-only reflection over descriptors.
//!
//! [`ClassReflector`] lists a descriptor's properties and methods in
//! declaration order (own members first, then inherited ones, then
//! generated accessors). Member reflectors carry owned copies of the
//! metadata they describe.

pub mod hash;

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::decl::{format_params, MemberMeta, Param, TypeRef, Visibility};
use crate::descriptor::{Descriptor, DescriptorKind, Member};
use crate::error::{Error, Result};
use crate::value::Value;

pub use hash::SignatureHash;

#[derive(Debug, Clone)]
pub struct ClassReflector {
    descriptor: Rc<Descriptor>,
}

impl ClassReflector {
    pub fn new(descriptor: Rc<Descriptor>) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &Rc<Descriptor> {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn kind(&self) -> DescriptorKind {
        self.descriptor.kind()
    }

    pub fn is_interface(&self) -> bool {
        self.descriptor.is_interface()
    }

    pub fn is_abstract(&self) -> bool {
        self.descriptor.is_abstract()
    }

    pub fn is_final(&self) -> bool {
        self.descriptor.is_final()
    }

    pub fn has_parent(&self) -> bool {
        self.descriptor.parent().is_some()
    }

    pub fn parent(&self) -> Option<ClassReflector> {
        self.descriptor.parent().cloned().map(ClassReflector::new)
    }

    pub fn constants(&self) -> &IndexMap<String, Value> {
        self.descriptor.constants()
    }

    /// Names of every interface implemented along the ancestor chain.
    pub fn interfaces(&self) -> Vec<String> {
        self.descriptor
            .all_interfaces()
            .iter()
            .map(|iface| iface.name().to_string())
            .collect()
    }

    pub fn properties(&self) -> Vec<PropertyReflector> {
        self.descriptor
            .members()
            .filter_map(|(_, member)| match member {
                Member::Data(data) => Some(PropertyReflector {
                    meta: data.meta.clone(),
                    default: data.default.clone(),
                }),
                Member::Method(_) => None,
            })
            .collect()
    }

    pub fn methods(&self) -> Vec<MethodReflector> {
        self.descriptor
            .members()
            .filter_map(|(_, member)| member.as_method().map(MethodReflector::from_member))
            .collect()
    }

    pub fn has_property(&self, name: &str) -> bool {
        matches!(self.descriptor.member(name), Some(Member::Data(_)))
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.descriptor.method(name).is_some()
    }

    pub fn property(&self, name: &str) -> Result<PropertyReflector> {
        match self.descriptor.member(name) {
            Some(Member::Data(data)) => Ok(PropertyReflector {
                meta: data.meta.clone(),
                default: data.default.clone(),
            }),
            _ => Err(self.undefined(name)),
        }
    }

    pub fn method(&self, name: &str) -> Result<MethodReflector> {
        self.descriptor
            .method(name)
            .map(MethodReflector::from_member)
            .ok_or_else(|| self.undefined(name))
    }

    pub fn signature_hash(&self) -> SignatureHash {
        hash::hash_descriptor(self)
    }

    fn undefined(&self, name: &str) -> Error {
        Error::UndefinedMember {
            class: self.name().to_string(),
            member: name.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyReflector {
    meta: MemberMeta,
    default: Value,
}

impl PropertyReflector {
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn meta(&self) -> &MemberMeta {
        &self.meta
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn declared_type(&self) -> &TypeRef {
        &self.meta.ty
    }

    /// Declared type name. Untyped, non-nullable properties report the
    /// kind of their default value; `mixed` when that is `null`.
    pub fn type_name(&self) -> String {
        match (&self.meta.ty, &self.default) {
            (TypeRef::Any, Value::Null) => "mixed".to_string(),
            (TypeRef::Any, _) if self.meta.is_nullable => "mixed".to_string(),
            (TypeRef::Any, default) => default.kind().name().to_string(),
            (ty, _) => ty.name().to_string(),
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.meta.visibility
    }

    pub fn is_public(&self) -> bool {
        self.meta.visibility == Visibility::Public
    }

    pub fn is_protected(&self) -> bool {
        self.meta.visibility == Visibility::Protected
    }

    pub fn is_private(&self) -> bool {
        self.meta.visibility == Visibility::Private
    }

    pub fn is_abstract(&self) -> bool {
        self.meta.is_abstract
    }

    pub fn is_final(&self) -> bool {
        self.meta.is_final
    }

    pub fn is_nullable(&self) -> bool {
        self.meta.is_nullable
    }

    pub fn is_read_only(&self) -> bool {
        self.meta.is_read_only
    }

    pub fn is_constant(&self) -> bool {
        self.meta.is_constant
    }

    pub fn is_serializable(&self) -> bool {
        self.meta.serializable
    }
}

/// `public nullable string "name": "x"`
impl fmt::Display for PropertyReflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_prefix(f, &self.meta, &self.type_name())?;
        match &self.default {
            Value::List(items) => write!(f, "[Object ({})]", items.len()),
            Value::Map(entries) => write!(f, "[Object ({})]", entries.len()),
            other => write!(f, "{}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodReflector {
    meta: MemberMeta,
    abstract_flags: Vec<bool>,
    parameters: Vec<Vec<Param>>,
}

impl MethodReflector {
    fn from_member(method: &crate::descriptor::MethodMember) -> Self {
        Self {
            meta: method.meta.clone(),
            abstract_flags: method.overloads.iter().map(|o| o.is_abstract).collect(),
            parameters: method.overloads.iter().map(|o| o.params.clone()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn meta(&self) -> &MemberMeta {
        &self.meta
    }

    pub fn visibility(&self) -> Visibility {
        self.meta.visibility
    }

    pub fn is_public(&self) -> bool {
        self.meta.visibility == Visibility::Public
    }

    /// True while any signature is abstract.
    pub fn is_abstract(&self) -> bool {
        self.abstract_flags.iter().any(|a| *a)
    }

    pub fn is_final(&self) -> bool {
        self.meta.is_final
    }

    pub fn is_generated(&self) -> bool {
        self.meta.is_generated
    }

    /// One parameter list per registered signature, in registration order.
    pub fn parameters(&self) -> &[Vec<Param>] {
        &self.parameters
    }

    pub fn has_signature(&self, params: &[Param]) -> bool {
        self.parameters.iter().any(|p| p == params)
    }
}

/// `public function "speak": [Function (string) (number, ...)]`
impl fmt::Display for MethodReflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = match &self.meta.ty {
            TypeRef::Any => "function".to_string(),
            ty => ty.name().to_string(),
        };
        write_prefix(f, &self.meta, &type_name)?;
        f.write_str("[Function")?;
        let untyped = matches!(self.parameters.as_slice(), [only] if only.is_empty());
        if !untyped {
            for params in &self.parameters {
                write!(f, " ({})", format_params(params))?;
            }
        }
        f.write_str("]")
    }
}

fn write_prefix(f: &mut fmt::Formatter<'_>, meta: &MemberMeta, type_name: &str) -> fmt::Result {
    if meta.is_abstract {
        f.write_str("abstract ")?;
    }
    if meta.is_final {
        f.write_str("final ")?;
    }
    write!(f, "{} ", meta.visibility)?;
    if meta.is_nullable {
        f.write_str("nullable ")?;
    }
    if meta.is_read_only {
        f.write_str("read ")?;
    }
    write!(f, "{} \"{}\": ", type_name, meta.name)
}

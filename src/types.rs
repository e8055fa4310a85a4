//! Type compatibility between runtime values and declared types.
//!
//! Class, interface and enum tokens only mean something relative to a
//! registry, so every check goes through a [`TypeScope`].

use std::rc::Rc;

use crate::decl::TypeRef;
use crate::descriptor::EnumDescriptor;
use crate::value::{Value, ValueKind};

/// Name resolution for type tokens.
pub trait TypeScope {
    /// Whether `name` is a registered (or forward-declared) class or
    /// interface. Case-sensitive.
    fn has_object_type(&self, name: &str) -> bool;

    /// Look up an enum by name. Case-insensitive.
    fn find_enum(&self, name: &str) -> Option<Rc<EnumDescriptor>>;
}

/// A scope with nothing registered: only primitive tokens resolve.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScope;

impl TypeScope for EmptyScope {
    fn has_object_type(&self, _name: &str) -> bool {
        false
    }

    fn find_enum(&self, _name: &str) -> Option<Rc<EnumDescriptor>> {
        None
    }
}

/// Whether `value` may be passed for a parameter declared as `token`.
///
/// A class or interface token matches instances whose `instance_of` check
/// succeeds for it; an enum token matches the enum's constant values; a
/// primitive token matches by runtime kind. Unknown tokens match nothing.
pub fn is_compatible(value: &Value, token: &str, scope: &dyn TypeScope) -> bool {
    if scope.has_object_type(token) {
        return value
            .as_instance()
            .map_or(false, |instance| instance.instance_of(token));
    }
    let lowered = token.to_lowercase();
    if let Some(found) = scope.find_enum(&lowered) {
        return found.contains(value);
    }
    match ValueKind::from_token(&lowered) {
        Some(kind) => value.kind() == kind,
        None => false,
    }
}

/// Whether `token` names anything a value could be checked against: a
/// primitive kind, a registered or forward-declared class or interface, or
/// an enum.
pub fn is_known_token(token: &str, scope: &dyn TypeScope) -> bool {
    if scope.has_object_type(token) {
        return true;
    }
    let lowered = token.to_lowercase();
    ValueKind::from_token(&lowered).is_some() || scope.find_enum(&lowered).is_some()
}

/// Whether `value` satisfies a member's declared type.
pub fn matches_type(value: &Value, ty: &TypeRef, scope: &dyn TypeScope) -> bool {
    match ty {
        TypeRef::Any => true,
        TypeRef::Primitive(kind) => value.kind() == *kind,
        TypeRef::Object(name) => value
            .as_instance()
            .map_or(false, |instance| instance.instance_of(name)),
        TypeRef::Enum(name) => scope
            .find_enum(name)
            .map_or(false, |found| found.contains(value)),
    }
}

//! Getter and setter synthesis for data members.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::decl::{camel_case, MemberMeta, TypeRef, Visibility};
use crate::descriptor::{Member, MethodMember};
use crate::overload::{Implementation, Overload, OverloadSet, SetterSpec};
use crate::value::ValueKind;

/// Getter name for a data member: `getFirstName`, or `isActive` for
/// booleans. A boolean whose CamelCase name already starts with `Is`
/// keeps it: `is_valid` gets `isValid`.
pub fn getter_name(meta: &MemberMeta) -> String {
    let camel = camel_case(&meta.name);
    if meta.ty.is_boolean() {
        if camel.starts_with("Is") {
            let mut chars = camel.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => camel,
            }
        } else {
            format!("is{}", camel)
        }
    } else {
        format!("get{}", camel)
    }
}

pub fn setter_name(meta: &MemberMeta) -> String {
    format!("set{}", camel_case(&meta.name))
}

fn accessor_meta(name: &str, data: &MemberMeta) -> MemberMeta {
    let mut meta = MemberMeta::named(name);
    meta.visibility = data.visibility;
    meta.is_abstract = data.is_abstract;
    meta.is_final = data.is_final;
    meta.is_generated = true;
    meta.ty = TypeRef::Primitive(ValueKind::Function);
    meta
}

pub fn getter(data: &MemberMeta) -> MethodMember {
    let name = getter_name(data);
    let mut member = MethodMember::new(accessor_meta(&name, data));
    member.overloads = OverloadSet::single(Overload {
        params: Vec::new(),
        implementation: Implementation::Getter(data.name.clone()),
        is_abstract: data.is_abstract,
    });
    member
}

/// `None` for read-only members and constants.
pub fn setter(data: &MemberMeta) -> Option<MethodMember> {
    if data.is_read_only || data.is_constant {
        return None;
    }
    let name = setter_name(data);
    let mut member = MethodMember::new(accessor_meta(&name, data));
    member.overloads = OverloadSet::single(Overload {
        params: Vec::new(),
        implementation: Implementation::Setter(SetterSpec {
            setter: name,
            field: data.name.clone(),
            ty: data.ty.clone(),
            nullable: data.is_nullable,
        }),
        is_abstract: data.is_abstract,
    });
    Some(member)
}

/// Append accessors for every non-private data member of a merged table.
///
/// `own` holds the names declared by the descriptor itself. An accessor
/// slot is filled when it is empty, or when it holds an inherited method
/// that is either synthesized or shadowed by an own redeclaration of the
/// data member. Accessors declared in the body itself are never replaced.
pub fn generate(members: &mut IndexMap<String, Member>, own: &HashSet<String>) {
    let data: Vec<MemberMeta> = members
        .values()
        .filter_map(Member::as_data)
        .filter(|d| d.meta.visibility != Visibility::Private)
        .map(|d| d.meta.clone())
        .collect();

    for meta in data {
        let own_data = own.contains(&meta.name);
        let getter = getter(&meta);
        if may_fill(members, own, &getter.meta.name, own_data) {
            members.insert(getter.meta.name.clone(), Member::Method(getter));
        }
        if let Some(setter) = setter(&meta) {
            if may_fill(members, own, &setter.meta.name, own_data) {
                members.insert(setter.meta.name.clone(), Member::Method(setter));
            }
        }
    }
}

fn may_fill(
    members: &IndexMap<String, Member>,
    own: &HashSet<String>,
    name: &str,
    own_data: bool,
) -> bool {
    match members.get(name) {
        None => true,
        Some(Member::Data(_)) => false,
        Some(Member::Method(existing)) => {
            !own.contains(name) && (own_data || existing.meta.is_generated)
        }
    }
}

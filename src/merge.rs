//! Descriptor merging.
//!
//! Combines a declared body, its mixed-in traits and an optional parent
//! descriptor into one immutable [`Descriptor`]:
//!
//! 1. traits are mixed into a copy of the body, later traits winning;
//! 2. every entry is parsed and becomes a method overload, a constant or a
//!    data member;
//! 3. parent members are inherited, with redeclarations checked against
//!    the member they override and parent signatures forwarded to the
//!    ancestor that defines them;
//! 4. accessors are generated for the resulting data members.

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::accessor;
use crate::body::Body;
use crate::decl::{parse_declaration, MemberMeta, Param};
use crate::descriptor::{DataMember, Descriptor, DescriptorKind, Member, MethodMember};
use crate::error::{Error, Result};
use crate::overload::{Implementation, Overload};
use crate::types::{is_known_token, TypeScope};
use crate::value::Value;

/// Everything a descriptor is built from.
#[derive(Debug)]
pub struct MergeInput<'a> {
    pub name: String,
    pub kind: DescriptorKind,
    pub body: &'a Body,
    pub traits: &'a [Body],
    pub parent: Option<Rc<Descriptor>>,
    pub interfaces: Vec<Rc<Descriptor>>,
    pub is_abstract: bool,
    pub is_final: bool,
}

pub fn merge(input: MergeInput<'_>, scope: &dyn TypeScope) -> Result<Descriptor> {
    let kind = input.kind;
    if input.is_abstract && input.is_final {
        return Err(Error::declaration(format!(
            "a {} cannot be both abstract and final simultaneously",
            kind.as_str()
        )));
    }
    if input.is_abstract && kind == DescriptorKind::Interface {
        return Err(Error::declaration("an interface cannot be declared abstract"));
    }

    let mut body = input.body.clone();
    for used in input.traits {
        body.mix(used);
    }

    let mut members: IndexMap<String, Member> = IndexMap::new();
    let mut constants: IndexMap<String, Value> = IndexMap::new();
    let mut own: HashSet<String> = HashSet::new();

    for (declaration, value) in body.entries() {
        let meta = parse_declaration(declaration, scope)?;
        own.insert(meta.name.clone());

        let overloads_existing = matches!(members.get(&meta.name), Some(Member::Method(_)));
        if value.is_function() || !meta.params.is_empty() || overloads_existing {
            let Value::Function(method) = value else {
                return Err(Error::declaration(if meta.params.is_empty() {
                    format!(
                        "member {} overloads an existing function, but its value isn't a function",
                        meta.name
                    )
                } else {
                    format!(
                        "member {} specifies parameters, but its value isn't a function",
                        meta.name
                    )
                }));
            };
            for param in &meta.params {
                if let Param::Typed(token) = param {
                    if !is_known_token(token, scope) {
                        debug!(member = %meta.name, token = %token, "parameter type is not defined yet");
                    }
                }
            }
            add_overload(
                &mut members,
                &meta,
                Implementation::Native(method.clone()),
                meta.is_abstract,
                false,
            )?;
        } else {
            if meta.is_constant {
                constants.insert(meta.name.clone(), value.clone());
            }
            members.insert(
                meta.name.clone(),
                Member::Data(DataMember {
                    meta,
                    default: value.clone(),
                }),
            );
        }
    }

    let mut implementations = vec![input.name.clone()];
    if let Some(parent) = &input.parent {
        if parent.is_final {
            return Err(Error::declaration(format!(
                "unable to extend on the final {} {}",
                parent.kind.as_str(),
                parent.name
            )));
        }
        if parent.kind != kind {
            return Err(Error::declaration(format!(
                "a {} may only extend a {}",
                kind.as_str(),
                kind.as_str()
            )));
        }
        debug!(name = %input.name, parent = %parent.name, "merging parent");

        implementations.extend(parent.implementations.iter().cloned());
        for (name, value) in &parent.constants {
            constants
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        inherit(&mut members, parent, kind)?;
    }

    accessor::generate(&mut members, &own);

    for member in members.values_mut() {
        if let Member::Method(method) = member {
            method.meta.is_abstract = method.overloads.is_abstract();
        }
    }

    Ok(Descriptor {
        name: input.name,
        kind,
        parent: input.parent,
        members,
        constants,
        implementations,
        interfaces: input.interfaces,
        is_abstract: input.is_abstract,
        is_final: input.is_final,
    })
}

/// Register one signature under `meta.name`, creating the method member on
/// first use.
fn add_overload(
    members: &mut IndexMap<String, Member>,
    meta: &MemberMeta,
    implementation: Implementation,
    is_abstract: bool,
    ignore_duplicate: bool,
) -> Result<bool> {
    let entry = members.entry(meta.name.clone()).or_insert_with(|| {
        let mut member_meta = meta.clone();
        member_meta.params.clear();
        Member::Method(MethodMember::new(member_meta))
    });
    let method = match entry {
        Member::Method(method) => method,
        Member::Data(_) => {
            return Err(Error::declaration(format!(
                "member {} overloads an existing property, but the previous property isn't a function",
                meta.name
            )))
        }
    };
    if method.meta.visibility != meta.visibility {
        return Err(Error::declaration(format!(
            "member {}: inconsistent visibility",
            meta.name
        )));
    }
    method.overloads.insert(
        &meta.name,
        Overload {
            params: meta.params.clone(),
            implementation,
            is_abstract,
        },
        ignore_duplicate,
    )
}

fn inherit(
    members: &mut IndexMap<String, Member>,
    parent: &Descriptor,
    kind: DescriptorKind,
) -> Result<()> {
    for (name, inherited) in &parent.members {
        let parent_meta = inherited.meta();

        if let Some(local) = members.get(name) {
            let local_meta = local.meta();
            if !local_meta.is_generated {
                check_override(name, parent_meta, local_meta, kind)?;
            }
            if local.is_method() != inherited.is_method() {
                return Err(Error::declaration(format!(
                    "member \"{}\" must be a {} as defined in the parent {}",
                    name,
                    if inherited.is_method() { "method" } else { "property" },
                    kind.as_str()
                )));
            }
        }

        match inherited {
            Member::Data(data) => {
                if !members.contains_key(name) {
                    members.insert(name.clone(), Member::Data(data.clone()));
                }
            }
            Member::Method(method) => {
                for overload in method.overloads.iter() {
                    let mut forward_meta = parent_meta.clone();
                    forward_meta.params = overload.params.clone();
                    add_overload(
                        members,
                        &forward_meta,
                        Implementation::Inherited,
                        overload.is_abstract,
                        true,
                    )?;
                }
            }
        }
    }
    Ok(())
}

/// A redeclared member keeps the visibility, read-only-ness and
/// nullability of the member it overrides, and never overrides a final one.
fn check_override(
    name: &str,
    parent: &MemberMeta,
    local: &MemberMeta,
    kind: DescriptorKind,
) -> Result<()> {
    let kind = kind.as_str();
    if parent.visibility != local.visibility {
        return Err(Error::declaration(format!(
            "member \"{}\" must be {} as defined in the parent {}",
            name, parent.visibility, kind
        )));
    }
    if parent.is_final {
        return Err(Error::declaration(format!(
            "final member \"{}\" cannot be overwritten",
            name
        )));
    }
    if parent.is_read_only != local.is_read_only {
        return Err(Error::declaration(format!(
            "member \"{}\" must {}be read-only as defined in the parent {}",
            name,
            if parent.is_read_only { "" } else { "not " },
            kind
        )));
    }
    if parent.is_nullable != local.is_nullable {
        return Err(Error::declaration(format!(
            "member \"{}\" must {}be nullable as defined in the parent {}",
            name,
            if parent.is_nullable { "" } else { "not " },
            kind
        )));
    }
    Ok(())
}

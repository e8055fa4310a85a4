//! Member declaration parsing.
//!
//! A declaration string is a list of whitespace-separated modifier tokens,
//! followed by the member name and an optional parenthesized parameter-type
//! list:
//!
//! ```text
//! public nullable string name
//! protected abstract function speak(string, ...)
//! const MAX
//! ```
//!
//! Modifiers may appear in any order. A token that is not a modifier is
//! read as the member's type: a registered class or interface name
//! (case-sensitive), a registered enum name (case-insensitive), or one of
//! the primitive kinds.

use std::fmt;

use crate::error::{Error, Result};
use crate::types::TypeScope;
use crate::value::ValueKind;

/// The variadic marker. Only valid as the last parameter.
pub const VARIADIC: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TypeRef {
    /// No type token: every value is accepted.
    #[default]
    Any,
    Primitive(ValueKind),
    /// A class or interface name.
    Object(String),
    /// An enum name, as registered (lower-cased).
    Enum(String),
}

impl TypeRef {
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Any => "any",
            TypeRef::Primitive(kind) => kind.name(),
            TypeRef::Object(name) | TypeRef::Enum(name) => name,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, TypeRef::Primitive(ValueKind::Boolean))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of a parameter-type list.
///
/// Typed parameters keep the token as written; it is resolved against the
/// registry when a call is dispatched, so a parameter may name a class that
/// is defined after the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Param {
    Typed(String),
    Variadic,
}

impl Param {
    pub fn token(&self) -> &str {
        match self {
            Param::Typed(token) => token,
            Param::Variadic => VARIADIC,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Render a parameter list the way signatures are written: `string, ...`.
pub fn format_params(params: &[Param]) -> String {
    params
        .iter()
        .map(Param::token)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Structured metadata parsed from a declaration string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberMeta {
    pub name: String,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_nullable: bool,
    pub is_read_only: bool,
    pub is_constant: bool,
    pub is_enum: bool,
    /// Synthesized accessor rather than a declared member.
    pub is_generated: bool,
    pub serializable: bool,
    pub ty: TypeRef,
    pub params: Vec<Param>,
}

impl MemberMeta {
    /// Metadata for a plain public, untyped member.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_abstract: false,
            is_final: false,
            is_nullable: false,
            is_read_only: false,
            is_constant: false,
            is_enum: false,
            is_generated: false,
            serializable: false,
            ty: TypeRef::Any,
            params: Vec::new(),
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self.params.last(), Some(Param::Variadic))
    }
}

#[derive(Default)]
struct Modifiers {
    visibility: Vec<Visibility>,
    is_abstract: bool,
    is_final: bool,
    is_nullable: bool,
    is_read_only: bool,
    is_constant: bool,
    serializable: Option<bool>,
    serializable_set: Vec<bool>,
    ty: Option<TypeRef>,
}

/// Parse a declaration string into member metadata.
///
/// Type tokens are resolved against `scope`, so the result depends on what
/// is registered at the time of the call.
pub fn parse_declaration(source: &str, scope: &dyn TypeScope) -> Result<MemberMeta> {
    let source = source.trim();
    let (head, params) = split_params(source)?;

    let mut tokens: Vec<&str> = head.split_whitespace().collect();
    let name = tokens
        .pop()
        .ok_or_else(|| Error::declaration(format!("empty declaration '{}'", source)))?
        .to_string();

    let mut modifiers = Modifiers::default();
    for raw in tokens {
        // Class and interface names are case-sensitive; everything else is not.
        let token = if scope.has_object_type(raw) {
            raw.to_string()
        } else {
            raw.to_lowercase()
        };
        apply_token(&mut modifiers, &token, &name, scope)?;
    }

    check_conflicts(&modifiers, &name)?;

    let visibility = modifiers.visibility.first().copied().unwrap_or_default();
    let ty = modifiers.ty.unwrap_or_default();
    let serializable = modifiers
        .serializable
        .unwrap_or(modifiers.visibility.contains(&Visibility::Public));

    let meta = MemberMeta {
        name,
        visibility,
        is_abstract: modifiers.is_abstract,
        is_final: modifiers.is_final,
        is_nullable: modifiers.is_nullable,
        is_read_only: modifiers.is_read_only || modifiers.is_constant,
        is_constant: modifiers.is_constant,
        is_enum: matches!(ty, TypeRef::Enum(_)),
        is_generated: false,
        serializable,
        ty,
        params,
    };

    if let Some(pos) = meta.params.iter().position(|p| *p == Param::Variadic) {
        if pos + 1 != meta.params.len() {
            return Err(Error::declaration(format!(
                "member {}: variadic parameter (...) must be the last in the function parameter list",
                meta.name
            )));
        }
    }

    Ok(meta)
}

fn split_params(source: &str) -> Result<(&str, Vec<Param>)> {
    let Some(open) = source.find('(') else {
        if source.contains(')') {
            return Err(Error::declaration(format!(
                "unbalanced parameter list in '{}'",
                source
            )));
        }
        return Ok((source, Vec::new()));
    };

    let close = match source.rfind(')') {
        Some(close) if close > open && source[close + 1..].trim().is_empty() => close,
        _ => {
            return Err(Error::declaration(format!(
                "unbalanced parameter list in '{}'",
                source
            )))
        }
    };

    let params = source[open + 1..close]
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            if token == VARIADIC {
                Param::Variadic
            } else {
                Param::Typed(token.to_string())
            }
        })
        .collect();

    Ok((&source[..open], params))
}

fn apply_token(
    modifiers: &mut Modifiers,
    token: &str,
    name: &str,
    scope: &dyn TypeScope,
) -> Result<()> {
    match token {
        "public" => modifiers.visibility.push(Visibility::Public),
        "protected" => modifiers.visibility.push(Visibility::Protected),
        "private" => modifiers.visibility.push(Visibility::Private),
        "abstract" => modifiers.is_abstract = true,
        "final" => modifiers.is_final = true,
        "nullable" => modifiers.is_nullable = true,
        "read" | "immutable" => modifiers.is_read_only = true,
        "const" => modifiers.is_constant = true,
        "serializable" => {
            modifiers.serializable = Some(true);
            modifiers.serializable_set.push(true);
        }
        "notserializable" => {
            modifiers.serializable = Some(false);
            modifiers.serializable_set.push(false);
        }
        _ => {
            let ty = resolve_type(token, scope).ok_or_else(|| {
                Error::declaration(format!(
                    "syntax error: unexpected \"{}\" in property declaration of \"{}\"",
                    token, name
                ))
            })?;
            if modifiers.ty.is_some() {
                return Err(Error::declaration(format!(
                    "property \"{}\" has multiple type definitions",
                    name
                )));
            }
            modifiers.ty = Some(ty);
        }
    }
    Ok(())
}

fn resolve_type(token: &str, scope: &dyn TypeScope) -> Option<TypeRef> {
    if let Some(kind) = ValueKind::from_token(token) {
        return Some(TypeRef::Primitive(kind));
    }
    if scope.has_object_type(token) {
        return Some(TypeRef::Object(token.to_string()));
    }
    scope
        .find_enum(token)
        .map(|found| TypeRef::Enum(found.name().to_string()))
}

fn check_conflicts(modifiers: &Modifiers, name: &str) -> Result<()> {
    if let Some(first) = modifiers.visibility.first() {
        if let Some(other) = modifiers.visibility.iter().find(|v| *v != first) {
            return Err(Error::declaration(format!(
                "property \"{}\" cannot be both {} and {} at the same time",
                name, first, other
            )));
        }
    }
    if modifiers.is_abstract && modifiers.is_final {
        return Err(Error::declaration(format!(
            "property \"{}\" cannot be both abstract and final at the same time",
            name
        )));
    }
    if modifiers.serializable_set.contains(&true) && modifiers.serializable_set.contains(&false) {
        return Err(Error::declaration(format!(
            "property \"{}\" cannot be both serializable and notserializable",
            name
        )));
    }
    if modifiers.is_constant {
        if !modifiers.visibility.is_empty() {
            return Err(Error::declaration(
                "a constant cannot have visibility modifiers",
            ));
        }
        if modifiers.is_final {
            return Err(Error::declaration("a constant cannot be final"));
        }
        if modifiers.is_abstract {
            return Err(Error::declaration("a constant cannot be abstract"));
        }
        if modifiers.is_nullable || modifiers.is_read_only {
            return Err(Error::declaration(
                "a constant cannot be nullable or immutable",
            ));
        }
    }
    Ok(())
}

/// Underscore-delimited words, each capitalized and concatenated:
/// `first_name` becomes `FirstName`.
pub fn camel_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

//! Overload registry and dispatcher.
//!
//! Every method member owns an [`OverloadSet`]: its signatures in
//! registration order. A call is matched in two passes:
//!
//! 1. exact arity: the first non-variadic signature whose length equals the
//!    argument count and whose every parameter accepts its argument;
//! 2. variadic: among signatures ending in `...` whose fixed parameters all
//!    accept their arguments, the one with the most fixed parameters wins
//!    (the earliest on a tie). Trailing arguments are bound as one list.
//!
//! A member with a single zero-parameter signature is untyped and accepts
//! any arguments.

use tracing::trace;

use crate::decl::{format_params, Param, TypeRef};
use crate::error::{Error, Result};
use crate::types::{is_compatible, is_known_token, TypeScope};
use crate::value::{Method, Value};

/// What runs when an overload is selected.
#[derive(Debug, Clone)]
pub enum Implementation {
    /// A body supplied with the declaration.
    Native(Method),
    /// Forwards to the nearest ancestor defining the member.
    Inherited,
    /// Synthesized getter returning the named field.
    Getter(String),
    /// Synthesized setter validating and writing a field.
    Setter(SetterSpec),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetterSpec {
    /// Name of the setter member, used in error messages.
    pub setter: String,
    pub field: String,
    pub ty: TypeRef,
    pub nullable: bool,
}

/// One registered signature of a member.
#[derive(Debug, Clone)]
pub struct Overload {
    pub params: Vec<Param>,
    pub implementation: Implementation,
    pub is_abstract: bool,
}

impl Overload {
    pub fn new(params: Vec<Param>, implementation: Implementation) -> Self {
        Self {
            params,
            implementation,
            is_abstract: false,
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self.params.last(), Some(Param::Variadic))
    }

    /// Parameters before the variadic marker (all of them if there is none).
    pub fn fixed_params(&self) -> &[Param] {
        if self.is_variadic() {
            &self.params[..self.params.len() - 1]
        } else {
            &self.params
        }
    }
}

/// A selected overload and the arguments bound for it.
#[derive(Debug)]
pub struct Resolution<'a> {
    pub overload: &'a Overload,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct OverloadSet {
    overloads: Vec<Overload>,
}

impl OverloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(overload: Overload) -> Self {
        Self {
            overloads: vec![overload],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overload> {
        self.overloads.iter()
    }

    pub fn len(&self) -> usize {
        self.overloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    /// True while any registered signature is still abstract.
    pub fn is_abstract(&self) -> bool {
        self.overloads.iter().any(|o| o.is_abstract)
    }

    /// The overload registered for exactly this parameter list.
    pub fn find(&self, params: &[Param]) -> Option<&Overload> {
        self.overloads.iter().find(|o| o.params == params)
    }

    /// Register a signature.
    ///
    /// A concrete signature replaces an abstract one with identical
    /// parameters. Any other duplicate is an error, or is skipped (returning
    /// `false`) when `ignore_duplicate` is set.
    pub fn insert(
        &mut self,
        member: &str,
        overload: Overload,
        ignore_duplicate: bool,
    ) -> Result<bool> {
        if let Some(pos) = overload.params.iter().position(|p| *p == Param::Variadic) {
            if pos + 1 != overload.params.len() {
                return Err(Error::declaration(format!(
                    "member {}: variadic parameter (...) must be the last in the function parameter list",
                    member
                )));
            }
        }

        if let Some(pos) = self.overloads.iter().position(|o| o.params == overload.params) {
            if self.overloads[pos].is_abstract {
                self.overloads.remove(pos);
            } else if ignore_duplicate {
                return Ok(false);
            } else {
                return Err(Error::declaration(format!(
                    "member {}({}) is defined twice",
                    member,
                    format_params(&overload.params)
                )));
            }
        }

        self.overloads.push(overload);
        Ok(true)
    }

    /// Select the overload for a call with `args`.
    pub fn resolve(
        &self,
        member: &str,
        args: &[Value],
        scope: &dyn TypeScope,
    ) -> Result<Resolution<'_>> {
        if let [only] = self.overloads.as_slice() {
            if only.params.is_empty() {
                return Ok(Resolution {
                    overload: only,
                    args: args.to_vec(),
                });
            }
        }

        for overload in self.overloads.iter().filter(|o| !o.is_variadic()) {
            if overload.params.len() == args.len() && accepts(&overload.params, args, scope) {
                trace!(member, params = %format_params(&overload.params), "exact overload match");
                return Ok(Resolution {
                    overload,
                    args: args.to_vec(),
                });
            }
        }

        let mut closest: Option<&Overload> = None;
        for overload in self.overloads.iter().filter(|o| o.is_variadic()) {
            let fixed = overload.fixed_params();
            if args.len() < fixed.len() || !accepts(fixed, &args[..fixed.len()], scope) {
                continue;
            }
            if closest.map_or(true, |best| fixed.len() > best.fixed_params().len()) {
                closest = Some(overload);
            }
        }

        if let Some(overload) = closest {
            let fixed = overload.fixed_params().len();
            trace!(member, params = %format_params(&overload.params), "variadic overload match");
            let mut bound = args[..fixed].to_vec();
            bound.push(Value::List(args[fixed..].to_vec()));
            return Ok(Resolution {
                overload,
                args: bound,
            });
        }

        // A signature naming a type that still does not exist can never
        // match; report the token rather than the call.
        let unknown = self
            .overloads
            .iter()
            .flat_map(|o| o.params.iter())
            .find_map(|param| match param {
                Param::Typed(token) if !is_known_token(token, scope) => Some(token),
                _ => None,
            });
        if let Some(token) = unknown {
            return Err(Error::UnknownType {
                kind: "type",
                name: token.clone(),
            });
        }

        Err(Error::Dispatch {
            call: format!(
                "{}({})",
                member,
                args.iter()
                    .map(Value::type_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
    }
}

fn accepts(params: &[Param], args: &[Value], scope: &dyn TypeScope) -> bool {
    params.iter().zip(args).all(|(param, arg)| match param {
        Param::Typed(token) => is_compatible(arg, token, scope),
        Param::Variadic => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmptyScope;

    fn typed(tokens: &[&str]) -> Vec<Param> {
        tokens
            .iter()
            .map(|t| {
                if *t == "..." {
                    Param::Variadic
                } else {
                    Param::Typed(t.to_string())
                }
            })
            .collect()
    }

    fn native(tokens: &[&str]) -> Overload {
        Overload::new(typed(tokens), Implementation::Native(Method::noop()))
    }

    fn set(signatures: &[&[&str]]) -> OverloadSet {
        let mut set = OverloadSet::new();
        for sig in signatures {
            set.insert("f", native(sig), false).unwrap();
        }
        set
    }

    #[test]
    fn exact_match_by_type() {
        let set = set(&[&["string"], &["number"]]);
        let r = set.resolve("f", &[Value::from("a")], &EmptyScope).unwrap();
        assert_eq!(r.overload.params, typed(&["string"]));
        let r = set.resolve("f", &[Value::from(1)], &EmptyScope).unwrap();
        assert_eq!(r.overload.params, typed(&["number"]));
    }

    #[test]
    fn no_match_names_the_call() {
        let set = set(&[&["string"], &["number"]]);
        let err = set
            .resolve("f", &[Value::from(true)], &EmptyScope)
            .unwrap_err();
        match err {
            Error::Dispatch { call } => assert_eq!(call, "f(boolean)"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn variadic_binds_trailing_arguments() {
        let set = set(&[&["string", "..."]]);
        let args = [Value::from("a"), Value::from("b"), Value::from("c")];
        let r = set.resolve("f", &args, &EmptyScope).unwrap();
        assert_eq!(
            r.args,
            vec![
                Value::from("a"),
                Value::List(vec![Value::from("b"), Value::from("c")])
            ]
        );
    }

    #[test]
    fn exact_pass_wins_over_variadic() {
        let set = set(&[&["string", "..."], &["string", "string"]]);
        let args = [Value::from("a"), Value::from("b")];
        let r = set.resolve("f", &args, &EmptyScope).unwrap();
        assert_eq!(r.overload.params, typed(&["string", "string"]));
    }

    #[test]
    fn most_fixed_parameters_wins() {
        let set = set(&[&["..."], &["string", "..."], &["string", "number", "..."]]);
        let args = [Value::from("a"), Value::from(1), Value::from(2)];
        let r = set.resolve("f", &args, &EmptyScope).unwrap();
        assert_eq!(r.overload.params, typed(&["string", "number", "..."]));

        let r = set.resolve("f", &[Value::from(true)], &EmptyScope).unwrap();
        assert_eq!(r.overload.params, typed(&["..."]));
        assert_eq!(r.args, vec![Value::List(vec![Value::from(true)])]);
    }

    #[test]
    fn variadic_accepts_no_trailing_arguments() {
        let set = set(&[&["string", "..."]]);
        let r = set.resolve("f", &[Value::from("a")], &EmptyScope).unwrap();
        assert_eq!(r.args, vec![Value::from("a"), Value::List(vec![])]);
    }

    #[test]
    fn single_untyped_signature_accepts_anything() {
        let set = set(&[&[]]);
        let args = [Value::from(1), Value::from("x")];
        let r = set.resolve("f", &args, &EmptyScope).unwrap();
        assert_eq!(r.args.len(), 2);
    }

    #[test]
    fn duplicate_signature_fails() {
        let mut set = set(&[&["string"]]);
        let err = set.insert("f", native(&["string"]), false).unwrap_err();
        assert!(err.to_string().contains("f(string) is defined twice"));
        assert!(!set.insert("f", native(&["string"]), true).unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn concrete_replaces_abstract() {
        let mut set = OverloadSet::new();
        let mut abstract_sig = native(&["string"]);
        abstract_sig.is_abstract = true;
        set.insert("f", abstract_sig, false).unwrap();
        set.insert("f", native(&["number"]), false).unwrap();
        assert!(set.is_abstract());

        set.insert("f", native(&["string"]), false).unwrap();
        assert!(!set.is_abstract());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn variadic_must_be_last() {
        let mut set = OverloadSet::new();
        assert!(set.insert("f", native(&["...", "string"]), false).is_err());
    }
}

//! Declaration string parsing against a live registry.

use indexmap::IndexMap;
use klass::{
    parse_declaration, Body, Definition, EmptyScope, Error, Param, Registry, TypeRef, Value,
    ValueKind, Visibility,
};
use proptest::prelude::*;

// ============================================================================
// Fixed cases
// ============================================================================

#[test]
fn full_declaration() {
    let meta = parse_declaration("protected final nullable number count", &EmptyScope).unwrap();
    assert_eq!(meta.name, "count");
    assert_eq!(meta.visibility, Visibility::Protected);
    assert!(meta.is_final);
    assert!(meta.is_nullable);
    assert!(!meta.is_read_only);
    assert_eq!(meta.ty, TypeRef::Primitive(ValueKind::Number));
    assert!(!meta.serializable);
}

#[test]
fn parameter_lists() {
    let meta = parse_declaration("public speak(string, number, ...)", &EmptyScope).unwrap();
    assert_eq!(
        meta.params,
        vec![
            Param::Typed("string".into()),
            Param::Typed("number".into()),
            Param::Variadic
        ]
    );
    assert!(meta.is_variadic());

    assert!(parse_declaration("public speak(..., string)", &EmptyScope).is_err());
    assert!(parse_declaration("public speak(string", &EmptyScope).is_err());
}

#[test]
fn conflicting_modifiers() {
    for source in [
        "public private name",
        "abstract final name",
        "serializable notserializable name",
        "const public MAX",
        "const final MAX",
        "const nullable MAX",
    ] {
        assert!(
            matches!(
                parse_declaration(source, &EmptyScope),
                Err(Error::Declaration(_))
            ),
            "{} should fail",
            source
        );
    }
}

#[test]
fn unknown_tokens_fail() {
    let err = parse_declaration("public shiny name", &EmptyScope).unwrap_err();
    assert!(err.to_string().contains("unexpected"));
    assert!(parse_declaration("string number name", &EmptyScope).is_err());
}

#[test]
fn registered_names_become_types() {
    let registry = Registry::new();
    registry.define_class(Definition::new("Author")).unwrap();
    let mut constants = IndexMap::new();
    constants.insert("DRAFT".to_string(), Value::from("draft"));
    registry.define_enum("Status", constants).unwrap();

    let author = parse_declaration("public nullable Author author", &registry).unwrap();
    assert_eq!(author.ty, TypeRef::Object("Author".into()));

    let status = parse_declaration("public status state", &registry).unwrap();
    assert!(status.is_enum);
    assert_eq!(status.ty, TypeRef::Enum("Status".into()));

    // Class names are case-sensitive.
    assert!(parse_declaration("public author owner", &registry).is_err());
}

#[test]
fn declaration_order_matters_without_forward_declaration() {
    let registry = Registry::new();
    let body = || Body::new().with("public nullable Page next", Value::Null);

    assert!(registry.define_class(Definition::new("Page").body(body())).is_err());
    registry.forward_declare("Page");
    registry.define_class(Definition::new("Page").body(body())).unwrap();
}

// ============================================================================
// Properties
// ============================================================================

const MODIFIERS: &[&str] = &[
    "public",
    "final",
    "nullable",
    "read",
    "string",
    "serializable",
];

fn modifier_orders() -> impl Strategy<Value = (Vec<&'static str>, Vec<&'static str>)> {
    proptest::sample::subsequence(MODIFIERS.to_vec(), 0..=MODIFIERS.len())
        .prop_flat_map(|subset| (Just(subset.clone()), Just(subset).prop_shuffle()))
}

proptest! {
    #[test]
    fn modifier_order_is_irrelevant((ordered, shuffled) in modifier_orders()) {
        let a = format!("{} name", ordered.join(" "));
        let b = format!("{} name", shuffled.join(" "));
        let left = parse_declaration(&a, &EmptyScope).unwrap();
        let right = parse_declaration(&b, &EmptyScope).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn arbitrary_names_parse(name in "[a-z][a-z0-9_]{0,12}") {
        prop_assume!(!MODIFIERS.contains(&name.as_str()));
        let meta = parse_declaration(&format!("protected {}", name), &EmptyScope).unwrap();
        prop_assert_eq!(meta.name, name);
        prop_assert_eq!(meta.visibility, Visibility::Protected);
    }
}

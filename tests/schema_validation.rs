use klass::{Error, Schema, Value};

const LIBRARY: &str = r#"{
    "definitions": [
        { "kind": "enum", "name": "Genre", "constants": { "FICTION": "fiction", "POETRY": "poetry" } },
        { "kind": "interface", "name": "Lendable",
          "members": [
              { "decl": "public lend(string)", "method": true },
              { "decl": "public boolean available", "value": true }
          ] },
        { "kind": "class", "name": "Item", "abstract": true, "implements": ["Lendable"],
          "members": [
              { "decl": "public string title", "value": "" },
              { "decl": "public boolean available", "value": true },
              { "decl": "abstract public lend(string)", "method": true }
          ] },
        { "kind": "class", "name": "Book", "extends": "Item", "final": true,
          "members": [
              { "decl": "public Genre genre", "value": "fiction" },
              { "decl": "public lend(string)", "method": true },
              { "decl": "const SHELF", "value": "B" }
          ] }
    ]
}"#;

#[test]
fn library_schema_applies() {
    let schema = Schema::from_json(LIBRARY).expect("parse");
    let registry = schema.registry();
    schema.apply(&registry).expect("apply");

    assert_eq!(registry.class_names(), vec!["Item", "Book"]);
    assert_eq!(registry.interface_names(), vec!["Lendable"]);
    assert!(registry.enumeration("GENRE").is_some());

    let book = registry.new_instance("Book", vec![]).expect("instantiate");
    assert!(book.instance_of("Lendable"));
    assert_eq!(book.call("isAvailable", vec![]).unwrap(), Value::from(true));
    assert!(book.call("setGenre", vec![Value::from("poetry")]).is_ok());
    assert!(book.call("setGenre", vec![Value::from("cooking")]).is_err());
    assert_eq!(
        registry.class("Book").unwrap().constant("SHELF"),
        Some(Value::from("B"))
    );
}

#[test]
fn abstract_item_cannot_be_instantiated() {
    let schema = Schema::from_json(LIBRARY).expect("parse");
    let registry = schema.registry();
    schema.apply(&registry).expect("apply");
    assert!(matches!(
        registry.new_instance("Item", vec![]),
        Err(Error::AbstractMember { .. })
    ));
}

#[test]
fn reject_class_missing_interface_property() {
    let schema = Schema::from_json(
        r#"{ "definitions": [
            { "kind": "interface", "name": "Lendable",
              "members": [{ "decl": "public boolean available", "value": true }] },
            { "kind": "class", "name": "Dvd", "implements": ["Lendable"] }
        ] }"#,
    )
    .expect("parse");
    let registry = schema.registry();
    let err = schema.apply(&registry).unwrap_err();
    assert!(matches!(err, Error::MissingImplementation { ref member, .. } if member == "available"));
}

#[test]
fn reject_unknown_parent() {
    let schema = Schema::from_json(
        r#"{ "definitions": [{ "kind": "class", "name": "Orphan", "extends": "Nobody" }] }"#,
    )
    .expect("parse");
    let registry = schema.registry();
    assert!(matches!(
        schema.apply(&registry),
        Err(Error::UnknownType { kind: "class", .. })
    ));
}

#[test]
fn reject_malformed_declaration() {
    let schema = Schema::from_json(
        r#"{ "definitions": [
            { "kind": "class", "name": "Odd",
              "members": [{ "decl": "public private name", "value": null }] }
        ] }"#,
    )
    .expect("parse");
    let registry = schema.registry();
    assert!(matches!(schema.apply(&registry), Err(Error::Declaration(_))));
}

#[test]
fn anonymous_definitions_are_named() {
    let schema = Schema::from_json(r#"{ "definitions": [{ "kind": "class" }] }"#).expect("parse");
    let registry = schema.registry();
    schema.apply(&registry).expect("apply");
    assert_eq!(registry.class_names().len(), 1);
}

//! Inheritance, abstractness and ancestor calls.

use klass::{Body, Definition, Error, Registry, Value};

fn animals() -> Registry {
    let registry = Registry::new();
    registry
        .define_class(
            Definition::new("Animal").mark_abstract().body(
                Body::new()
                    .with("public string name", "unnamed")
                    .signature("abstract public speak")
                    .method("public describe", |this, _| {
                        let sound = this.call("speak", vec![])?;
                        Ok(Value::from(format!(
                            "{} says {}",
                            this.get("name")?.as_str().unwrap_or_default(),
                            sound.as_str().unwrap_or_default()
                        )))
                    }),
            ),
        )
        .unwrap();
    registry
        .define_class(
            Definition::new("Dog")
                .extends("Animal")
                .body(Body::new().method("public speak", |_, _| Ok(Value::from("Woof")))),
        )
        .unwrap();
    registry
}

#[test]
fn abstract_class_cannot_be_instantiated() {
    let registry = animals();
    assert!(matches!(
        registry.new_instance("Animal", vec![]),
        Err(Error::AbstractMember { .. })
    ));
}

#[test]
fn concrete_subclass_implements_abstract_member() {
    let registry = animals();
    let dog = registry.new_instance("Dog", vec![]).unwrap();
    assert_eq!(dog.call("speak", vec![]).unwrap(), Value::from("Woof"));
    // Inherited bodies dispatch virtually on the concrete class.
    assert_eq!(
        dog.call("describe", vec![]).unwrap(),
        Value::from("unnamed says Woof")
    );
    assert_eq!(dog.call("getName", vec![]).unwrap(), Value::from("unnamed"));
}

#[test]
fn unimplemented_abstract_member_blocks_instantiation() {
    let registry = animals();
    registry
        .define_class(Definition::new("Cat").extends("Animal"))
        .unwrap();
    let err = registry.new_instance("Cat", vec![]).unwrap_err();
    assert!(matches!(err, Error::AbstractMember { ref reason, .. } if reason.contains("speak")));
}

#[test]
fn abstract_and_final_conflict() {
    let registry = Registry::new();
    assert!(matches!(
        registry.define_class(Definition::new("Odd").mark_abstract().mark_final()),
        Err(Error::Declaration(_))
    ));
    assert!(registry.class("Odd").is_none());
}

#[test]
fn final_classes_cannot_be_extended() {
    let registry = Registry::new();
    registry
        .define_class(Definition::new("Sealed").mark_final())
        .unwrap();
    assert!(matches!(
        registry.define_class(Definition::new("Child").extends("Sealed")),
        Err(Error::Declaration(_))
    ));
}

#[test]
fn final_members_cannot_be_redeclared() {
    let registry = Registry::new();
    registry
        .define_class(Definition::new("Base").body(
            Body::new()
                .with("final public version", 1)
                .method("final public id", |_, _| Ok(Value::from(1))),
        ))
        .unwrap();

    let property = registry.define_class(
        Definition::new("A")
            .extends("Base")
            .body(Body::new().with("final public version", 2)),
    );
    assert!(matches!(property, Err(Error::Declaration(ref m)) if m.contains("final")));

    let method = registry.define_class(
        Definition::new("B")
            .extends("Base")
            .body(Body::new().method("final public id", |_, _| Ok(Value::from(2)))),
    );
    assert!(method.is_err());
}

#[test]
fn override_must_keep_visibility_and_nullability() {
    let registry = Registry::new();
    registry
        .define_class(Definition::new("Base").body(
            Body::new()
                .with("public nullable string title", Value::Null)
                .method("protected run", |_, _| Ok(Value::Null)),
        ))
        .unwrap();

    assert!(registry
        .define_class(
            Definition::new("A")
                .extends("Base")
                .body(Body::new().method("public run", |_, _| Ok(Value::Null)))
        )
        .is_err());
    assert!(registry
        .define_class(
            Definition::new("B")
                .extends("Base")
                .body(Body::new().with("public string title", "x"))
        )
        .is_err());
    registry
        .define_class(
            Definition::new("C")
                .extends("Base")
                .body(Body::new().with("public nullable string title", "x")),
        )
        .unwrap();
}

#[test]
fn instance_of_is_transitive() {
    let registry = Registry::new();
    registry.define_interface(Definition::new("Named")).unwrap();
    registry
        .define_class(Definition::new("A").implements("Named"))
        .unwrap();
    registry
        .define_class(Definition::new("B").extends("A"))
        .unwrap();
    let c = registry
        .define_class(Definition::new("C").extends("B"))
        .unwrap();

    let instance = c.new_instance(vec![]).unwrap();
    for name in ["C", "B", "A", "Named"] {
        assert!(instance.instance_of(name), "C should be an instance of {}", name);
    }
    assert!(!instance.instance_of("D"));
    assert_eq!(c.descriptor().implementations().join(","), "C,B,A");
}

#[test]
fn parent_calls_walk_the_chain() {
    let registry = Registry::new();
    registry
        .define_class(Definition::new("A").body(
            Body::new().method("public greet(string)", |_, args| {
                Ok(Value::from(format!("A:{}", args[0].as_str().unwrap_or_default())))
            }),
        ))
        .unwrap();
    // B skips greet entirely.
    registry
        .define_class(Definition::new("B").extends("A"))
        .unwrap();
    let c = registry
        .define_class(Definition::new("C").extends("B").body(
            Body::new()
                .method("public greet(string)", |this, args| {
                    let inner = this.call_parent("greet", args)?;
                    Ok(Value::from(format!("C>{}", inner.as_str().unwrap_or_default())))
                })
                .method("public missing", |this, _| this.call_parent("nowhere", vec![])),
        ))
        .unwrap();

    let instance = c.new_instance(vec![]).unwrap();
    assert_eq!(
        instance.call("greet", vec![Value::from("hi")]).unwrap(),
        Value::from("C>A:hi")
    );
    assert!(matches!(
        instance.call("missing", vec![]),
        Err(Error::MemberNotFound { .. })
    ));
}

#[test]
fn inherited_overloads_forward_to_the_parent() {
    let registry = Registry::new();
    registry
        .define_class(Definition::new("Base").body(
            Body::new()
                .method("public f(string)", |_, _| Ok(Value::from("base string")))
                .method("public f(number)", |_, _| Ok(Value::from("base number"))),
        ))
        .unwrap();
    let child = registry
        .define_class(Definition::new("Child").extends("Base").body(
            Body::new().method("public f(boolean)", |_, _| Ok(Value::from("child boolean"))),
        ))
        .unwrap();

    let instance = child.new_instance(vec![]).unwrap();
    assert_eq!(instance.call("f", vec![Value::from(true)]).unwrap(), Value::from("child boolean"));
    assert_eq!(instance.call("f", vec![Value::from("s")]).unwrap(), Value::from("base string"));
    assert_eq!(instance.call("f", vec![Value::from(1)]).unwrap(), Value::from("base number"));
}

#[test]
fn child_constants_win() {
    let registry = Registry::new();
    registry
        .define_class(Definition::new("Base").body(Body::new().with("const LIMIT", 1).with("const KIND", "base")))
        .unwrap();
    let child = registry
        .define_class(Definition::new("Child").extends("Base").body(Body::new().with("const LIMIT", 2)))
        .unwrap();
    assert_eq!(child.constant("LIMIT"), Some(Value::from(2)));
    assert_eq!(child.constant("KIND"), Some(Value::from("base")));
}

#[test]
fn traits_are_mixed_in() {
    let registry = Registry::new();
    let greeter = Body::new().method("public greet", |_, _| Ok(Value::from("hello")));
    let class = registry
        .define_class(Definition::new("Person").uses(greeter).body(Body::new().with("public name", "x")))
        .unwrap();
    let person = class.new_instance(vec![]).unwrap();
    assert_eq!(person.call("greet", vec![]).unwrap(), Value::from("hello"));
}

#[test]
fn child_hooks_reached_from_ancestor_bodies_run_as_the_child() {
    let registry = Registry::new();
    registry
        .define_class(
            Definition::new("Template").body(
                Body::new()
                    .method("public run", |this, _| this.call("hook", vec![]))
                    .method("public hook", |_, _| Ok(Value::from("Template.hook")))
                    .method("public inspect", |this, _| this.call("check", vec![]))
                    .method("public check", |_, _| Ok(Value::from(false))),
            ),
        )
        .unwrap();
    let concrete = registry
        .define_class(
            Definition::new("Concrete").extends("Template").body(
                Body::new()
                    .method("public hook", |this, _| {
                        let inner = this.call_parent("hook", vec![])?;
                        Ok(Value::from(format!(
                            "Concrete>{}",
                            inner.as_str().unwrap_or_default()
                        )))
                    })
                    .method("public check", |this, _| {
                        Ok(Value::from(format!(
                            "{}:{}",
                            this.identity(),
                            this.instance_of("Concrete")
                        )))
                    }),
            ),
        )
        .unwrap();

    let instance = concrete.new_instance(vec![]).unwrap();
    assert_eq!(
        instance.call("hook", vec![]).unwrap(),
        Value::from("Concrete>Template.hook")
    );
    assert_eq!(
        instance.call("run", vec![]).unwrap(),
        Value::from("Concrete>Template.hook")
    );
    assert_eq!(
        instance.call("check", vec![]).unwrap(),
        Value::from("Concrete:true")
    );
    assert_eq!(
        instance.call("inspect", vec![]).unwrap(),
        Value::from("Concrete:true")
    );
}

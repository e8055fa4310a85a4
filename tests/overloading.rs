//! Signature selection for overloaded members.

use klass::{Body, Class, Definition, Error, Registry, Value};

fn echo(label: &'static str) -> impl Fn(&klass::This, Vec<Value>) -> klass::Result<Value> {
    move |_, args| {
        let mut out = vec![Value::from(label)];
        out.extend(args);
        Ok(Value::List(out))
    }
}

fn define(registry: &Registry, body: Body) -> Class {
    registry
        .define_class(Definition::new("Subject").body(body))
        .unwrap()
}

fn label(result: &Value) -> &str {
    result.as_list().and_then(|l| l[0].as_str()).unwrap_or_default()
}

#[test]
fn selects_by_argument_type() {
    let registry = Registry::new();
    let class = define(
        &registry,
        Body::new()
            .method("public f(string)", echo("string"))
            .method("public f(number)", echo("number")),
    );
    let subject = class.new_instance(vec![]).unwrap();

    assert_eq!(label(&subject.call("f", vec![Value::from("a")]).unwrap()), "string");
    assert_eq!(label(&subject.call("f", vec![Value::from(1)]).unwrap()), "number");

    let err = subject.call("f", vec![Value::from(true)]).unwrap_err();
    assert!(matches!(err, Error::Dispatch { ref call } if call == "f(boolean)"));
}

#[test]
fn arity_is_part_of_the_match() {
    let registry = Registry::new();
    let class = define(
        &registry,
        Body::new()
            .method("public f(string)", echo("one"))
            .method("public f(string, string)", echo("two")),
    );
    let subject = class.new_instance(vec![]).unwrap();
    assert_eq!(
        label(&subject.call("f", vec![Value::from("a"), Value::from("b")]).unwrap()),
        "two"
    );
    assert!(subject.call("f", vec![]).is_err());
}

#[test]
fn variadic_tail_is_bound_as_a_list() {
    let registry = Registry::new();
    let class = define(
        &registry,
        Body::new().method("public f(string, ...)", echo("variadic")),
    );
    let subject = class.new_instance(vec![]).unwrap();

    let result = subject
        .call(
            "f",
            vec![Value::from("a"), Value::from("b"), Value::from("c")],
        )
        .unwrap();
    let items = result.as_list().unwrap();
    assert_eq!(items[1], Value::from("a"));
    assert_eq!(
        items[2],
        Value::List(vec![Value::from("b"), Value::from("c")])
    );

    // An empty tail still matches.
    let result = subject.call("f", vec![Value::from("a")]).unwrap();
    assert_eq!(result.as_list().unwrap()[2], Value::List(vec![]));
}

#[test]
fn exact_match_beats_variadic() {
    let registry = Registry::new();
    let class = define(
        &registry,
        Body::new()
            .method("public f(string, ...)", echo("variadic"))
            .method("public f(string, number)", echo("exact")),
    );
    let subject = class.new_instance(vec![]).unwrap();
    assert_eq!(
        label(&subject.call("f", vec![Value::from("a"), Value::from(1)]).unwrap()),
        "exact"
    );
    assert_eq!(
        label(&subject.call("f", vec![Value::from("a"), Value::from("b")]).unwrap()),
        "variadic"
    );
}

#[test]
fn longest_fixed_prefix_wins() {
    let registry = Registry::new();
    let class = define(
        &registry,
        Body::new()
            .method("public f(...)", echo("any"))
            .method("public f(string, ...)", echo("string"))
            .method("public f(string, number, ...)", echo("string number")),
    );
    let subject = class.new_instance(vec![]).unwrap();
    assert_eq!(
        label(&subject.call("f", vec![Value::from("a"), Value::from(1), Value::from(2)]).unwrap()),
        "string number"
    );
    assert_eq!(
        label(&subject.call("f", vec![Value::from("a"), Value::from(true)]).unwrap()),
        "string"
    );
    assert_eq!(label(&subject.call("f", vec![Value::from(true)]).unwrap()), "any");
}

#[test]
fn single_untyped_signature_accepts_anything() {
    let registry = Registry::new();
    let class = define(&registry, Body::new().method("public f", echo("untyped")));
    let subject = class.new_instance(vec![]).unwrap();
    let result = subject
        .call("f", vec![Value::from(1), Value::from("two")])
        .unwrap();
    assert_eq!(result.as_list().unwrap().len(), 3);
}

#[test]
fn duplicate_signatures_fail() {
    let registry = Registry::new();
    let result = registry.define_class(Definition::new("Twice").body(
        Body::new()
            .method("public f(string)", echo("a"))
            .method("public  f(string)", echo("b")),
    ));
    assert!(matches!(result, Err(Error::Declaration(ref m)) if m.contains("defined twice")));
}

#[test]
fn class_typed_parameters() {
    let registry = Registry::new();
    registry.define_class(Definition::new("Point")).unwrap();
    registry.define_class(Definition::new("Other")).unwrap();
    let class = define(
        &registry,
        Body::new()
            .method("public f(Point)", echo("point"))
            .method("public f(object)", echo("object")),
    );
    let subject = class.new_instance(vec![]).unwrap();
    let point = registry.new_instance("Point", vec![]).unwrap();
    let other = registry.new_instance("Other", vec![]).unwrap();

    assert_eq!(
        label(&subject.call("f", vec![Value::Instance(point)]).unwrap()),
        "point"
    );
    assert_eq!(
        label(&subject.call("f", vec![Value::Instance(other)]).unwrap()),
        "object"
    );
    // Null is not a Point.
    assert!(matches!(
        subject.call("f", vec![Value::Null]),
        Err(Error::Dispatch { .. })
    ));
}

#[test]
fn misspelled_parameter_types_are_reported() {
    let registry = Registry::new();
    let class = define(
        &registry,
        Body::new()
            .method("public f(strnig)", echo("typo"))
            .method("public g(Later)", echo("later"))
            .method("public g(number)", echo("number")),
    );
    let subject = class.new_instance(vec![]).unwrap();

    let err = subject.call("f", vec![Value::from("x")]).unwrap_err();
    assert!(matches!(
        err,
        Error::UnknownType { kind: "type", ref name } if name == "strnig"
    ));

    // A matching sibling still wins over the unknown token.
    assert_eq!(label(&subject.call("g", vec![Value::from(1)]).unwrap()), "number");
    assert!(matches!(
        subject.call("g", vec![Value::from("x")]),
        Err(Error::UnknownType { ref name, .. }) if name == "Later"
    ));

    // Defining the type afterwards makes the signature usable.
    registry.define_class(Definition::new("Later")).unwrap();
    let later = registry.new_instance("Later", vec![]).unwrap();
    assert_eq!(
        label(&subject.call("g", vec![Value::Instance(later)]).unwrap()),
        "later"
    );
    assert!(matches!(
        subject.call("g", vec![Value::from("x")]),
        Err(Error::Dispatch { .. })
    ));
}

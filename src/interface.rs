//! Interface conformance.
//!
//! A class conforms to an interface when, for every interface member, it
//! defines a same-named member with the same visibility; properties must
//! also agree on type and nullability, and methods must carry every
//! interface signature with identical parameter types. Interface constants
//! are values rather than requirements and are not checked.

use std::rc::Rc;

use tracing::debug;

use crate::decl::format_params;
use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::reflect::ClassReflector;

/// Check `class` against `interface`. Abstract classes are skipped; their
/// concrete subclasses are checked when they are defined.
pub fn verify(class: &Rc<Descriptor>, interface: &Rc<Descriptor>) -> Result<()> {
    let implementor = ClassReflector::new(class.clone());
    if implementor.is_abstract() {
        return Ok(());
    }
    let required = ClassReflector::new(interface.clone());
    debug!(class = %class.name(), interface = %interface.name(), "verifying interface");

    let missing = |member: &str| Error::MissingImplementation {
        class: class.name().to_string(),
        interface: interface.name().to_string(),
        member: member.to_string(),
    };
    let mismatch = |member: &str, reason: String| Error::SignatureMismatch {
        class: class.name().to_string(),
        interface: interface.name().to_string(),
        member: member.to_string(),
        reason,
    };

    for expected in required.properties().iter().filter(|p| !p.is_constant()) {
        let name = expected.name();
        let actual = implementor.property(name).map_err(|_| missing(name))?;

        if expected.visibility() != actual.visibility() {
            return Err(mismatch(
                name,
                format!(
                    "property cannot be {} because the interface declared it {}",
                    actual.visibility(),
                    expected.visibility()
                ),
            ));
        }
        if expected.type_name() != actual.type_name() {
            return Err(mismatch(
                name,
                format!(
                    "property cannot be declared as {} because the interface declared it as {}",
                    actual.type_name(),
                    expected.type_name()
                ),
            ));
        }
        if expected.is_nullable() != actual.is_nullable() {
            return Err(mismatch(
                name,
                format!(
                    "property must {}be nullable",
                    if expected.is_nullable() { "" } else { "not " }
                ),
            ));
        }
    }

    // Accessors follow from the properties checked above.
    for expected in required.methods().into_iter().filter(|m| !m.is_generated()) {
        let name = expected.name();
        let actual = implementor.method(name).map_err(|_| missing(name))?;

        if expected.visibility() != actual.visibility() {
            return Err(mismatch(
                name,
                format!(
                    "method cannot be {} because the interface declared it {}",
                    actual.visibility(),
                    expected.visibility()
                ),
            ));
        }
        for params in expected.parameters() {
            if !actual.has_signature(params) {
                return Err(mismatch(
                    name,
                    format!("no signature matching ({})", format_params(params)),
                ));
            }
        }
    }

    Ok(())
}

/// Interfaces declare signatures only; abstract or final members make no
/// sense there.
pub fn validate_body(interface: &Rc<Descriptor>) -> Result<()> {
    let reflector = ClassReflector::new(interface.clone());
    let properties = reflector
        .properties()
        .into_iter()
        .map(|p| ("property", p.name().to_string(), p.is_abstract(), p.is_final()));
    let methods = reflector
        .methods()
        .into_iter()
        .map(|m| ("method", m.name().to_string(), m.is_abstract(), m.is_final()));

    for (kind, name, is_abstract, is_final) in properties.chain(methods) {
        if is_abstract {
            return Err(Error::declaration(format!(
                "an interface may not contain abstract definitions, {} {} is abstract in interface {}",
                kind,
                name,
                interface.name()
            )));
        }
        if is_final {
            return Err(Error::declaration(format!(
                "an interface may not contain final definitions, {} {} is final in interface {}",
                kind,
                name,
                interface.name()
            )));
        }
    }
    Ok(())
}

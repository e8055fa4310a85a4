//! Instances and method execution.
//!
//! An instance has two views over one shared core:
//!
//! - [`This`], the inner scope a method body receives. It reads and writes
//!   declared fields and calls members of any visibility.
//! - [`Instance`], the facade handed to callers. It only exposes public
//!   methods; everything else is simply absent.
//!
//! Calls dispatch virtually on the concrete class. Inherited signatures
//! forward to the nearest ancestor defining the member, and while that
//! ancestor's body runs the core's identity is rebound to it so that
//! `instance_of` and parent calls resolve relative to the running body.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use crate::decl::{format_params, TypeRef, Visibility};
use crate::descriptor::{Descriptor, Member};
use crate::error::{Error, Result};
use crate::overload::{Implementation, SetterSpec};
use crate::reflect::ClassReflector;
use crate::registry::Registry;
use crate::types::matches_type;
use crate::value::Value;

// ============================================================================
// Classes
// ============================================================================

/// A registered class: the instantiable handle for a class descriptor.
#[derive(Debug, Clone)]
pub struct Class {
    registry: Registry,
    descriptor: Rc<Descriptor>,
}

impl Class {
    pub(crate) fn new(registry: Registry, descriptor: Rc<Descriptor>) -> Self {
        Self {
            registry,
            descriptor,
        }
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &Rc<Descriptor> {
        &self.descriptor
    }

    pub fn constant(&self, name: &str) -> Option<Value> {
        self.descriptor.constant(name).cloned()
    }

    pub fn reflect(&self) -> ClassReflector {
        ClassReflector::new(self.descriptor.clone())
    }

    /// Construct an instance, running the first constructor alias the class
    /// defines with `args`.
    pub fn new_instance(&self, args: Vec<Value>) -> Result<Instance> {
        let class = &self.descriptor;
        if class.is_abstract() {
            return Err(Error::AbstractMember {
                class: class.name().to_string(),
                reason: "an abstract class cannot be instantiated".to_string(),
            });
        }
        check_implemented(class)?;

        let core = Core::new(self.registry.clone(), class.clone());
        let constructors = self.registry.config().constructors;
        if let Some(alias) = constructors.iter().find(|c| class.method(c).is_some()) {
            trace!(class = %class.name(), constructor = %alias, "running constructor");
            core.dispatch(class, alias, args)?;
        }
        Ok(Instance { core })
    }

    /// Call the class as a function, delegating to its first callable
    /// alias. The callable runs on a fresh scope that it may not return.
    pub fn call(&self, args: Vec<Value>) -> Result<Value> {
        let class = &self.descriptor;
        let callables = self.registry.config().callables;
        let Some(alias) = callables.iter().find(|c| class.method(c).is_some()) else {
            return Err(Error::NotCallable {
                class: class.name().to_string(),
                reason: "it is lacking a callable member such as __call".to_string(),
            });
        };

        let core = Core::new(self.registry.clone(), class.clone());
        let result = core.dispatch(class, alias, args)?;
        if let Value::Instance(returned) = &result {
            if Rc::ptr_eq(&returned.core, &core) {
                return Err(Error::NotCallable {
                    class: class.name().to_string(),
                    reason: format!("{} cannot return itself", alias),
                });
            }
        }
        Ok(result)
    }
}

/// Every abstract signature or member must have been implemented.
fn check_implemented(class: &Descriptor) -> Result<()> {
    for (name, member) in class.members() {
        match member {
            Member::Method(method) => {
                if let Some(overload) = method.overloads.iter().find(|o| o.is_abstract) {
                    return Err(Error::AbstractMember {
                        class: class.name().to_string(),
                        reason: format!(
                            "missing abstract member implementation of {}({})",
                            name,
                            format_params(&overload.params)
                        ),
                    });
                }
            }
            Member::Data(data) if data.meta.is_abstract => {
                return Err(Error::AbstractMember {
                    class: class.name().to_string(),
                    reason: format!("missing abstract member implementation of \"{}\"", name),
                });
            }
            Member::Data(_) => {}
        }
    }
    Ok(())
}

// ============================================================================
// Core
// ============================================================================

struct Core {
    registry: Registry,
    class: Rc<Descriptor>,
    /// The descriptor whose body is currently running.
    identity: RefCell<Rc<Descriptor>>,
    fields: RefCell<IndexMap<String, Value>>,
}

impl Core {
    fn new(registry: Registry, class: Rc<Descriptor>) -> Rc<Self> {
        let fields = class
            .members()
            .filter_map(|(name, member)| {
                member
                    .as_data()
                    .map(|data| (name.to_string(), data.default.clone()))
            })
            .collect();
        Rc::new(Self {
            registry,
            identity: RefCell::new(class.clone()),
            class,
            fields: RefCell::new(fields),
        })
    }

    /// Resolve and run `name` against the signatures registered on `owner`.
    fn dispatch(self: &Rc<Self>, owner: &Rc<Descriptor>, name: &str, args: Vec<Value>) -> Result<Value> {
        let method = owner.method(name).ok_or_else(|| Error::UndefinedMember {
            class: owner.name().to_string(),
            member: name.to_string(),
        })?;
        let resolution = method.overloads.resolve(name, &args, &self.registry)?;

        match &resolution.overload.implementation {
            Implementation::Native(body) => {
                // A body owned by `owner` runs as `owner`, also when reached
                // virtually from an ancestor's body.
                let _bound = IdentityGuard::bind(self, owner.clone());
                body.invoke(&This { core: self.clone() }, resolution.args)
            }
            // Forwarded calls re-dispatch on the ancestor with the original
            // arguments; variadic binding happens there.
            Implementation::Inherited => self.call_ancestor(owner, name, args),
            Implementation::Getter(field) => Ok(self
                .fields
                .borrow()
                .get(field)
                .cloned()
                .unwrap_or_default()),
            Implementation::Setter(spec) => {
                let value = resolution.args.into_iter().next().unwrap_or_default();
                self.assign(spec, value)?;
                Ok(Value::Instance(Instance { core: self.clone() }))
            }
        }
    }

    fn assign(&self, spec: &SetterSpec, value: Value) -> Result<()> {
        self.check(spec, &value)?;
        self.fields.borrow_mut().insert(spec.field.clone(), value);
        Ok(())
    }

    fn check(&self, spec: &SetterSpec, value: &Value) -> Result<()> {
        let accepted =
            (spec.nullable && value.is_null()) || matches_type(value, &spec.ty, &self.registry);
        if accepted {
            return Ok(());
        }
        let expected = match &spec.ty {
            TypeRef::Object(name) => format!("an instance of {}", name),
            TypeRef::Enum(name) => format!("a member of enum {}", name),
            ty => ty.name().to_string(),
        };
        Err(Error::TypeMismatch {
            setter: spec.setter.clone(),
            expected,
            actual: value.type_name(),
        })
    }

    /// Run `name` on the nearest ancestor of `from` that defines it.
    fn call_ancestor(self: &Rc<Self>, from: &Descriptor, name: &str, args: Vec<Value>) -> Result<Value> {
        let ancestor = from
            .ancestors()
            .find(|ancestor| ancestor.method(name).is_some())
            .cloned()
            .ok_or_else(|| Error::MemberNotFound {
                class: from.name().to_string(),
                member: name.to_string(),
            })?;

        trace!(member = %name, ancestor = %ancestor.name(), "calling ancestor");
        let _rebound = IdentityGuard::bind(self, ancestor.clone());
        self.dispatch(&ancestor, name, args)
    }
}

/// Rebinds a core's identity for the duration of an ancestor call.
struct IdentityGuard<'a> {
    core: &'a Core,
    previous: Rc<Descriptor>,
}

impl<'a> IdentityGuard<'a> {
    fn bind(core: &'a Core, next: Rc<Descriptor>) -> Self {
        let previous = core.identity.replace(next);
        Self { core, previous }
    }
}

impl Drop for IdentityGuard<'_> {
    fn drop(&mut self) {
        self.core.identity.replace(self.previous.clone());
    }
}

// ============================================================================
// Facade
// ============================================================================

/// The public face of an instance.
///
/// Handles are reference-counted. Instances that refer to each other
/// through their fields, directly or in a cycle, keep each other alive
/// until one of those fields is cleared.
#[derive(Clone)]
pub struct Instance {
    core: Rc<Core>,
}

impl Instance {
    pub fn class_name(&self) -> &str {
        self.core.class.name()
    }

    pub fn descriptor(&self) -> &Rc<Descriptor> {
        &self.core.class
    }

    /// Call a public method.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        if !self.has_method(name) {
            return Err(Error::UndefinedMember {
                class: self.class_name().to_string(),
                member: name.to_string(),
            });
        }
        let class = self.core.class.clone();
        self.core.dispatch(&class, name, args)
    }

    /// Whether `name` is exposed on the facade.
    pub fn has_method(&self, name: &str) -> bool {
        self.core.class.method(name).map_or(false, |method| {
            method.meta.visibility == Visibility::Public
                && !self.core.registry.is_callable(name)
        })
    }

    /// Names of every method exposed on the facade.
    pub fn methods(&self) -> Vec<String> {
        self.core
            .class
            .members()
            .filter(|(name, member)| member.is_method() && self.has_method(name))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn instance_of(&self, name: &str) -> bool {
        self.core.class.instance_of(name)
    }

    /// Current values of every serializable field.
    pub fn serializable_fields(&self) -> IndexMap<String, Value> {
        let fields = self.core.fields.borrow();
        self.core
            .class
            .members()
            .filter_map(|(name, member)| member.as_data().map(|data| (name, data)))
            .filter(|(_, data)| data.meta.serializable && !data.meta.is_constant)
            .map(|(name, _)| {
                (
                    name.to_string(),
                    fields.get(name).cloned().unwrap_or_default(),
                )
            })
            .collect()
    }

    /// Write back fields produced by [`Instance::serializable_fields`].
    ///
    /// Entries that do not name a serializable field are ignored. Every value
    /// is checked against its field's declared type before any is written, so
    /// a failed restore leaves the instance unchanged.
    pub fn restore_fields(&self, values: &IndexMap<String, Value>) -> Result<()> {
        let mut accepted = Vec::new();
        for (name, value) in values {
            let Some(data) = self.core.class.member(name).and_then(Member::as_data) else {
                continue;
            };
            if !data.meta.serializable || data.meta.is_constant {
                continue;
            }
            let spec = SetterSpec {
                setter: "restore".to_string(),
                field: name.clone(),
                ty: data.meta.ty.clone(),
                nullable: data.meta.is_nullable,
            };
            self.core.check(&spec, value)?;
            accepted.push((name.clone(), value.clone()));
        }

        self.core.fields.borrow_mut().extend(accepted);
        Ok(())
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class_name())
            .finish()
    }
}

// ============================================================================
// Inner scope
// ============================================================================

/// The receiver of a method body.
#[derive(Clone)]
pub struct This {
    core: Rc<Core>,
}

impl This {
    /// Read a field or constant.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.core
            .fields
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| self.undefined(name))
    }

    /// Write a declared field. Constants are read-only.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        match self.core.class.member(name) {
            Some(Member::Data(data)) if data.meta.is_constant => Err(Error::ReadOnly {
                class: self.core.class.name().to_string(),
                member: name.to_string(),
            }),
            Some(Member::Data(_)) => {
                self.core
                    .fields
                    .borrow_mut()
                    .insert(name.to_string(), value.into());
                Ok(())
            }
            _ => Err(self.undefined(name)),
        }
    }

    /// Call a method of any visibility, dispatching on the concrete class.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let class = self.core.class.clone();
        self.core.dispatch(&class, name, args)
    }

    /// Call `name` on the nearest ancestor of the running body's class.
    pub fn call_parent(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let identity = self.core.identity.borrow().clone();
        self.core.call_ancestor(&identity, name, args)
    }

    /// The public facade of this instance, for fluent returns.
    pub fn api(&self) -> Instance {
        Instance {
            core: self.core.clone(),
        }
    }

    /// Identity check relative to the running body's class.
    pub fn instance_of(&self, name: &str) -> bool {
        self.core.identity.borrow().instance_of(name)
    }

    pub fn class_name(&self) -> &str {
        self.core.class.name()
    }

    /// Name of the class whose body is currently running.
    pub fn identity(&self) -> String {
        self.core.identity.borrow().name().to_string()
    }

    pub fn constant(&self, name: &str) -> Option<Value> {
        self.core.class.constant(name).cloned()
    }

    pub fn registry(&self) -> &Registry {
        &self.core.registry
    }

    fn undefined(&self, name: &str) -> Error {
        Error::UndefinedMember {
            class: self.core.class.name().to_string(),
            member: name.to_string(),
        }
    }
}

impl fmt::Debug for This {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("This")
            .field("class", &self.class_name())
            .field("identity", &self.identity())
            .finish()
    }
}

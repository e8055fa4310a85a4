//! Dynamic values flowing through members, arguments and fields.
//!
//! `Value` is the host-language value model the object system is layered
//! onto. Data variants (`List`, `Map`) clone deeply, which is what gives every
//! instance its own copy of default member values. `Function` and `Instance`
//! are reference types and clone by sharing.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::Result;
use crate::instance::{Instance, This};

// ============================================================================
// Runtime kinds
// ============================================================================

/// Runtime kind of a value, as reported to type checks and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Object,
    Function,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Object => "object",
            ValueKind::Function => "function",
        }
    }

    /// Resolve a primitive type token (`"string"`, `"number"`, ...).
    ///
    /// `null` is a value, not a declarable type, so it has no token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "boolean" => Some(ValueKind::Boolean),
            "number" => Some(ValueKind::Number),
            "string" => Some(ValueKind::String),
            "object" => Some(ValueKind::Object),
            "function" => Some(ValueKind::Function),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Method bodies
// ============================================================================

type NativeFn = dyn Fn(&This, Vec<Value>) -> Result<Value>;

/// A method body. Receives the inner scope of the instance it runs on.
#[derive(Clone)]
pub struct Method(Rc<NativeFn>);

impl Method {
    pub fn new(body: impl Fn(&This, Vec<Value>) -> Result<Value> + 'static) -> Self {
        Method(Rc::new(body))
    }

    /// A body that does nothing and returns `null`. Used for signatures.
    pub fn noop() -> Self {
        Method::new(|_, _| Ok(Value::Null))
    }

    pub fn invoke(&self, this: &This, args: Vec<Value>) -> Result<Value> {
        (self.0)(this, args)
    }

    pub fn ptr_eq(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Function]")
    }
}

// ============================================================================
// Values
// ============================================================================

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Function(Method),
    Instance(Instance),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::List(_) | Value::Map(_) | Value::Instance(_) => ValueKind::Object,
            Value::Function(_) => ValueKind::Function,
        }
    }

    /// Most specific known type name: the class name for instances, the
    /// runtime kind otherwise.
    pub fn type_name(&self) -> String {
        match self {
            Value::Instance(instance) => instance.class_name().to_string(),
            other => other.kind().name().to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Value::Function(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Convert to JSON for external serializers.
    ///
    /// Functions become `null`; instances become an object holding their
    /// serializable fields plus a `__type` entry naming the class. An
    /// instance reached again through its own fields becomes
    /// `{"__type": ..., "__ref": true}` instead of being expanded.
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_within(&mut Vec::new())
    }

    /// `open` holds the instances currently being expanded.
    fn to_json_within(&self, open: &mut Vec<Instance>) -> serde_json::Value {
        match self {
            Value::Null | Value::Function(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(
                items.iter().map(|item| item.to_json_within(open)).collect(),
            ),
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_within(open)))
                    .collect(),
            ),
            Value::Instance(instance) => {
                let mut object = serde_json::Map::new();
                object.insert(
                    "__type".to_string(),
                    serde_json::Value::String(instance.class_name().to_string()),
                );
                if open.iter().any(|seen| seen.ptr_eq(instance)) {
                    object.insert("__ref".to_string(), serde_json::Value::Bool(true));
                    return serde_json::Value::Object(object);
                }
                open.push(instance.clone());
                for (name, value) in instance.serializable_fields() {
                    object.insert(name, value.to_json_within(open));
                }
                open.pop();
                serde_json::Value::Object(object)
            }
        }
    }

    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// Structural equality for data, identity for functions and instances.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Function(_) => f.write_str("[Function]"),
            Value::Instance(instance) => write!(f, "[object {}]", instance.class_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

impl From<Method> for Value {
    fn from(method: Method) -> Self {
        Value::Function(method)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Instance(instance)
    }
}

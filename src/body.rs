//! Declared member bodies.
//!
//! A body maps declaration strings (`"public string name"`,
//! `"speak(string)"`) to values in declaration order. Method bodies are
//! [`Value::Function`] entries; everything else is a default value.

use indexmap::IndexMap;

use crate::error::Result;
use crate::instance::This;
use crate::value::{Method, Value};

#[derive(Debug, Clone, Default)]
pub struct Body {
    entries: IndexMap<String, Value>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration with a value.
    pub fn with(mut self, declaration: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(declaration, value);
        self
    }

    /// Add a method declaration with its body.
    pub fn method(
        self,
        declaration: impl Into<String>,
        body: impl Fn(&This, Vec<Value>) -> Result<Value> + 'static,
    ) -> Self {
        self.with(declaration, Method::new(body))
    }

    /// Add a method declaration whose body does nothing. Interfaces and
    /// abstract members only need the signature.
    pub fn signature(self, declaration: impl Into<String>) -> Self {
        self.with(declaration, Method::noop())
    }

    pub fn insert(&mut self, declaration: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(declaration.into(), value.into());
    }

    /// Mix another body in. Entries of `other` replace identical
    /// declarations already present.
    pub fn mix(&mut self, other: &Body) {
        for (declaration, value) in &other.entries {
            self.entries.insert(declaration.clone(), value.clone());
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Body {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut body = Body::new();
        for (declaration, value) in iter {
            body.insert(declaration, value);
        }
        body
    }
}

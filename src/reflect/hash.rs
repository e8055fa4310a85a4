//! Structural signature hashes.
//!
//! Each member is hashed from its shape (visibility, flags, type and
//! parameter lists) and a descriptor is hashed from its members:
//!
//! - properties and methods include their member names
//! - the descriptor's own name is excluded
//! - default values and method bodies are excluded
//!
//! Two descriptors with equal hashes expose the same member signatures.

use std::fmt;

use sha2::{Digest, Sha256};

use super::{ClassReflector, MethodReflector, PropertyReflector};
use crate::decl::Param;

/// A 256-bit structural hash of a descriptor or member signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureHash([u8; 32]);

impl SignatureHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// First 8 hex characters.
    pub fn to_short_hex(&self) -> String {
        self.0.iter().take(4).map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for SignatureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_short_hex())
    }
}

const HASH_TAG_PROPERTY: u8 = 0x20;
const HASH_TAG_METHOD: u8 = 0x21;
const HASH_TAG_SIGNATURE: u8 = 0x22;
const HASH_TAG_DESCRIPTOR: u8 = 0x23;

struct SignatureHasher {
    hasher: Sha256,
}

impl SignatureHasher {
    fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    fn tag(mut self, tag: u8) -> Self {
        self.hasher.update([tag]);
        self
    }

    fn flag(self, set: bool) -> Self {
        self.tag(u8::from(set))
    }

    fn string(mut self, s: &str) -> Self {
        self.hasher.update((s.len() as u32).to_le_bytes());
        self.hasher.update(s.as_bytes());
        self
    }

    fn child(mut self, hash: &SignatureHash) -> Self {
        self.hasher.update(hash.as_bytes());
        self
    }

    fn count(mut self, n: usize) -> Self {
        self.hasher.update((n as u32).to_le_bytes());
        self
    }

    fn finish(self) -> SignatureHash {
        let result = self.hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        SignatureHash(bytes)
    }
}

pub fn hash_property(property: &PropertyReflector) -> SignatureHash {
    SignatureHasher::new()
        .tag(HASH_TAG_PROPERTY)
        .string(property.name())
        .string(property.visibility().as_str())
        .string(&property.type_name())
        .flag(property.is_abstract())
        .flag(property.is_final())
        .flag(property.is_nullable())
        .flag(property.is_read_only())
        .flag(property.is_constant())
        .finish()
}

/// Hash one parameter list.
pub fn hash_signature(params: &[Param]) -> SignatureHash {
    let mut hasher = SignatureHasher::new()
        .tag(HASH_TAG_SIGNATURE)
        .count(params.len());
    for param in params {
        hasher = hasher.string(param.token());
    }
    hasher.finish()
}

pub fn hash_method(method: &MethodReflector) -> SignatureHash {
    let mut hasher = SignatureHasher::new()
        .tag(HASH_TAG_METHOD)
        .string(method.name())
        .string(method.visibility().as_str())
        .flag(method.is_abstract())
        .flag(method.is_final())
        .count(method.parameters().len());
    for params in method.parameters() {
        hasher = hasher.child(&hash_signature(params));
    }
    hasher.finish()
}

pub fn hash_descriptor(class: &ClassReflector) -> SignatureHash {
    let properties = class.properties();
    let methods = class.methods();

    let mut hasher = SignatureHasher::new()
        .tag(HASH_TAG_DESCRIPTOR)
        .string(class.kind().as_str())
        .flag(class.is_abstract())
        .flag(class.is_final())
        .count(properties.len());
    for property in &properties {
        hasher = hasher.child(&hash_property(property));
    }
    hasher = hasher.count(methods.len());
    for method in &methods {
        hasher = hasher.child(&hash_method(method));
    }
    hasher.finish()
}

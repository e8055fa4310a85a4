//! Error types shared by definition, instantiation and dispatch.

use thiserror::Error;

/// Errors raised while defining, instantiating or calling into classes.
///
/// Every failure is reported synchronously to the immediate caller; nothing
/// is retried or swallowed internally.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or conflicting declaration, duplicate overload signature,
    /// incompatible override, duplicate name, or extending a final class.
    #[error("declaration error: {0}")]
    Declaration(String),

    /// Instantiating an abstract class, or a class that still carries
    /// unimplemented abstract members.
    #[error("cannot instantiate {class}: {reason}")]
    AbstractMember { class: String, reason: String },

    /// No overload signature matches the runtime argument types.
    #[error("no overload matches {call}")]
    Dispatch { call: String },

    /// Ancestor invocation targets a member absent across the whole chain.
    #[error("member '{member}' does not exist in any ancestor of {class}")]
    MemberNotFound { class: String, member: String },

    /// Calling a class as a function without a usable callable member.
    #[error("{class} cannot be called as a function: {reason}")]
    NotCallable { class: String, reason: String },

    /// A class lacks a member required by one of its interfaces.
    #[error("{class} must implement '{member}' as defined in the interface {interface}")]
    MissingImplementation {
        class: String,
        interface: String,
        member: String,
    },

    /// A class member exists but does not match the interface declaration.
    #[error("{class}::{member} does not match the interface {interface}: {reason}")]
    SignatureMismatch {
        class: String,
        interface: String,
        member: String,
        reason: String,
    },

    /// A synthesized setter received a value of the wrong type.
    #[error("{setter} expects {expected}, {actual} given")]
    TypeMismatch {
        setter: String,
        expected: String,
        actual: String,
    },

    /// The member does not exist, or is not visible from where it was used.
    #[error("{class} has no accessible member '{member}'")]
    UndefinedMember { class: String, member: String },

    /// Assignment to a constant.
    #[error("cannot assign to constant '{member}' of {class}")]
    ReadOnly { class: String, member: String },

    /// A parent, interface, class or enum reference that is not registered.
    #[error("{kind} '{name}' does not exist")]
    UnknownType { kind: &'static str, name: String },

    /// Raised by a user-supplied method body.
    #[error("{0}")]
    Thrown(String),
}

impl Error {
    pub fn declaration(message: impl Into<String>) -> Self {
        Error::Declaration(message.into())
    }

    /// Build an error from inside a method body.
    pub fn thrown(message: impl Into<String>) -> Self {
        Error::Thrown(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

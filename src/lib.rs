//! Klass: classes, interfaces and enums over dynamic values
//!
//! Definitions are written as tables of declaration strings mapped to
//! values. A declaration carries modifiers, an optional type, a name and an
//! optional parameter list:
//!
//! ```text
//! "public nullable string title"    => null
//! "protected final number count"    => 0
//! "public speak(string)"            => <method body>
//! "public speak(number, ...)"       => <method body>
//! "const VERSION"                   => 3
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               Registry                  │
//! │                                         │
//! │  decl      - Declaration parsing        │
//! │  merge     - Descriptor construction    │
//! │  accessor  - Getter/setter synthesis    │
//! │  interface - Conformance checks         │
//! │                                         │
//! ├─────────────────────────────────────────┤
//! │  instance  - Instances and dispatch     │
//! │  overload  - Signature resolution       │
//! │  types     - Runtime type checks        │
//! │  reflect   - Read-only inspection       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use klass::{Body, Definition, Registry, Value};
//!
//! let registry = Registry::new();
//! let animal = registry
//!     .define_class(
//!         Definition::new("Animal").body(
//!             Body::new()
//!                 .with("public string name", "rex")
//!                 .method("public speak", |this, _| {
//!                     Ok(Value::from(format!("{} speaks", this.get("name")?.as_str().unwrap_or_default())))
//!                 }),
//!         ),
//!     )
//!     .unwrap();
//!
//! let rex = animal.new_instance(vec![]).unwrap();
//! assert_eq!(rex.call("speak", vec![]).unwrap(), Value::from("rex speaks"));
//! assert_eq!(rex.call("getName", vec![]).unwrap(), Value::from("rex"));
//! ```

pub mod accessor;
pub mod body;
pub mod config;
pub mod decl;
pub mod descriptor;
pub mod error;
pub mod instance;
pub mod interface;
pub mod merge;
pub mod overload;
pub mod reflect;
pub mod registry;
pub mod schema;
pub mod types;
pub mod value;

pub use body::Body;
pub use config::RegistryConfig;
pub use decl::{parse_declaration, MemberMeta, Param, TypeRef, Visibility};
pub use descriptor::{Descriptor, DescriptorKind, EnumDescriptor};
pub use error::{Error, Result};
pub use instance::{Class, Instance, This};
pub use reflect::{ClassReflector, MethodReflector, PropertyReflector, SignatureHash};
pub use registry::{Definition, Registry};
pub use schema::Schema;
pub use types::{is_compatible, EmptyScope, TypeScope};
pub use value::{Method, Value, ValueKind};

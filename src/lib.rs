//! # Tether - opaque host values for a block-based programming layer
//!
//! Tether carries arbitrary host values (objects, functions, built-in
//! singletons, values owned by other components) through a visual
//! programming environment that only understands a few primitive types.
//!
//! ## Quick Start
//!
//! ```
//! use tether::{Bridge, Value, Wrapper};
//!
//! let mut bridge = Bridge::new();
//! let alice = Wrapper::to_type(Value::plain_object([("name", Value::string("Alice"))]));
//! assert_eq!(alice.to_display_string(), "[Object]");
//!
//! let saved = bridge.serialize(&alice);
//! let back = bridge.deserialize(&saved).unwrap();
//! assert_eq!(back.inner().get("name").unwrap(), Value::string("Alice"));
//! ```
//!
//! ## Architecture
//!
//! 1. **Serializer** - cycle-safe, failure-tolerant JSON text of any value
//! 2. **Wrapper** - the opaque container the block layer stores and displays
//! 3. **Registry** - tokens for values that cannot be persisted by content
//! 4. **Codec** - persisted payloads, reconstruction, and component delegation
//!
//! A [`Bridge`] owns one of each per runtime instance, together with the
//! built-in [`Realm`](realm::Realm) and the [`Executor`](exec::Executor)
//! that runs user code on the host's behalf.

pub mod blocks;
pub mod bridge;
pub mod codec;
pub mod companion;
pub mod component;
pub mod config;
pub mod error;
pub mod exec;
pub mod globals;
pub mod project;
pub mod realm;
pub mod registry;
pub mod serializer;
pub mod value;
pub mod wrapper;

pub use bridge::Bridge;
pub use codec::{Exported, Opaque, Payload, ReferenceMarker};
pub use component::{Component, ComponentRegistry};
pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use exec::{ExecMode, Executor, NullExecutor};
pub use project::{restore_variables, save_variables};
pub use registry::{LookupRegistry, Token};
pub use value::Value;
pub use wrapper::Wrapper;

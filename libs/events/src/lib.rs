//! # superschema-events
//!
//! A shared event envelope for microservices and a dispatcher that routes
//! validated events to type-specific handlers.
//!
//! ## Event Envelope
//!
//! Every event carries:
//! - A unique message ID (`id`, UUIDv4)
//! - A type name (`type`), optionally versioned as `Name:2`
//! - Tracing and authorization metadata (`metadata`): correlation ID (`cid`),
//!   producer ID (`pid`), and optionally transaction ID (`tid`), user ID
//!   (`uid`) and bearer token (`token`)
//! - An optional object payload (`data`)
//!
//! ## Validation
//!
//! [`is_valid_event`] performs hand-written structural checks on an untyped
//! [`serde_json::Value`]. It never panics. [`validate_event`] reports which
//! rule failed. The JSON Schema returned by [`super_schema`] describes the same
//! envelope for tooling and is not used at runtime.
//!
//! ## Dispatch
//!
//! [`get_event_dispatcher`] binds an error callback and an [`EventHandlers`]
//! registry. Each dispatched event goes to the handler for its exact type,
//! else for its base type, else to the default handler, else nowhere.

mod dispatcher;
mod envelope;
mod error;
mod schema;
mod validator;

pub use dispatcher::*;
pub use envelope::*;
pub use error::*;
pub use schema::*;
pub use validator::*;

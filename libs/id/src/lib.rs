//! # superschema-id
//!
//! Identifier type and format validation for the event envelope.
//!
//! ## Design Principles
//!
//! - Every identifier in the envelope (`id`, `cid`, `pid`, `tid`, `uid`) is a UUID version 4
//! - There is exactly one textual form that is accepted: the canonical hyphenated one
//! - The format check is a plain function so untyped input can be probed without parsing
//!
//! ## ID Format
//!
//! `xxxxxxxx-xxxx-4xxx-Nxxx-xxxxxxxxxxxx` where `x` is any hex digit and `N` is
//! one of `8`, `9`, `a`, `b`. Hex digits are case-insensitive.
//!
//! Example: `f47ac10b-58cc-4372-a567-0e02b2c3d479`

mod error;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-export uuid for consumers that need raw UUID operations
pub use uuid::Uuid;

//! `fieldops-core` — domain primitives shared across the workspace.
//!
//! This crate contains **pure domain** types (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::UserId;

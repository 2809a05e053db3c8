//! Infrastructure layer: credential store adapters.

pub mod credentials;

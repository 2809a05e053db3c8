//! `fieldops-auth` — credential verification, signed access tokens and
//! role-based permission checks.
//!
//! This crate is intentionally decoupled from HTTP and storage: the credential
//! store is consumed through [`CredentialStore`].

pub mod authenticator;
pub mod authorize;
pub mod claims;
pub mod config;
pub mod error;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod store;
pub mod token;

pub use authenticator::{Authenticator, Session, extract_bearer};
pub use authorize::{Authorizer, AuthzError, Capabilities, Grants};
pub use claims::{Claims, ClaimsError, validate_claims};
pub use config::AuthConfig;
pub use error::{AuthError, AuthFailure};
pub use password::{PasswordError, PasswordHash, PasswordManager};
pub use permissions::{Permission, resources};
pub use roles::{Role, UnknownRole};
pub use store::{CredentialStore, PublicUser, StoreError, UserRecord, UserUpdate};
pub use token::{TokenCodec, TokenError};

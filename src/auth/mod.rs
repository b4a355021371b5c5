//! Authentication core: credential codec, validation policy, store adapters,
//! and the orchestrating service.
//!
//! Everything here is transport-agnostic. The HTTP layer in [`crate::api`]
//! maps these operations onto endpoints; the stores own all persistence.

pub mod error;
pub mod events;
pub mod password;
pub mod service;
pub mod store;
pub mod token;
pub mod validation;

pub use error::AuthError;
pub use service::{AuthService, DEFAULT_RESET_TOKEN_TTL, DEFAULT_SESSION_TTL};
pub use store::{Account, AccountStore, IssuedResetToken, ResetTokenStore, SessionStore};

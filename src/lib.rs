//! # Custos (Credential and Session Authority)
//!
//! `custos` owns account credential storage, session issuance and expiry, and
//! the password-reset token lifecycle. Everything else (route wiring, CLI
//! bootstrap, schema files) exists to put those three things on the network.
//!
//! ## Credentials
//!
//! Passwords are hashed with Argon2id and a fresh random salt per hash; the
//! work factor travels inside the PHC string, so verification needs no
//! external state. Plaintext passwords and credential hashes never appear in
//! responses, events, or logs.
//!
//! ## Sessions
//!
//! Session identifiers are 32 bytes of OS entropy, stored only as SHA-256
//! hashes. Validation slides a 24-hour idle window forward atomically;
//! expired sessions are filtered at query time rather than swept.
//!
//! ## Password resets
//!
//! Reset tokens live for one hour, and at most one token per account resolves
//! at any instant: every new request deletes the account's prior tokens before
//! issuing. Completing a reset consumes the token.
//!
//! ## Anti-enumeration
//!
//! Login failures do not distinguish "no such account" from "wrong password",
//! and reset requests answer identically whether or not the email maps to an
//! account.

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

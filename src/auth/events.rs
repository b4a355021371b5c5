//! Structured audit events with mandatory redaction.
//!
//! Every event payload passes through [`sanitize`] before emission: fields
//! named like secrets are replaced with a fixed placeholder, so a future
//! caller adding a sensitive field to an event cannot leak it into logs.

use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

const REDACTED: &str = "[REDACTED]";

/// Field names that must never reach the logging collaborator verbatim.
const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "password_hash",
    "credential_hash",
    "token",
    "secret",
];

/// Replace the value of every sensitive-named field with [`REDACTED`].
///
/// Walks nested objects and arrays; key matching is exact.
pub fn sanitize(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if SENSITIVE_FIELDS.contains(&key.as_str()) {
                    *entry = Value::String(REDACTED.to_string());
                } else {
                    sanitize(entry);
                }
            }
        }
        Value::Array(entries) => {
            for entry in entries.iter_mut() {
                sanitize(entry);
            }
        }
        _ => {}
    }
}

fn emit(event: &str, mut fields: Value) {
    sanitize(&mut fields);
    info!(target: "custos::events", event, fields = %fields);
}

pub(crate) fn account_registered(account_id: Uuid, email: &str) {
    emit(
        "account_registered",
        json!({ "account_id": account_id.to_string(), "email": email }),
    );
}

pub(crate) fn login_succeeded(account_id: Uuid) {
    emit(
        "login_succeeded",
        json!({ "account_id": account_id.to_string() }),
    );
}

pub(crate) fn login_failed(email: &str) {
    emit("login_failed", json!({ "email": email }));
}

pub(crate) fn logout() {
    emit("logout", json!({}));
}

pub(crate) fn reset_requested(account_id: Option<Uuid>) {
    emit(
        "reset_requested",
        json!({ "account_known": account_id.is_some(),
                "account_id": account_id.map(|id| id.to_string()) }),
    );
}

pub(crate) fn reset_completed(account_id: Uuid) {
    emit(
        "reset_completed",
        json!({ "account_id": account_id.to_string() }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_redacts_sensitive_fields() {
        let mut value = json!({
            "email": "a@b.co",
            "password": "hunter22",
            "password_hash": "$argon2id$...",
            "credential_hash": "$argon2id$...",
            "token": "abc",
            "secret": "shh",
        });
        sanitize(&mut value);
        assert_eq!(value["email"], "a@b.co");
        for field in ["password", "password_hash", "credential_hash", "token", "secret"] {
            assert_eq!(value[field], REDACTED, "{field} should be redacted");
        }
    }

    #[test]
    fn sanitize_walks_nested_structures() {
        let mut value = json!({
            "request": { "token": "abc", "account_id": "1" },
            "attempts": [ { "password": "p" }, { "password": "q" } ],
        });
        sanitize(&mut value);
        assert_eq!(value["request"]["token"], REDACTED);
        assert_eq!(value["request"]["account_id"], "1");
        assert_eq!(value["attempts"][0]["password"], REDACTED);
        assert_eq!(value["attempts"][1]["password"], REDACTED);
    }

    #[test]
    fn sanitize_leaves_scalars_alone() {
        let mut value = json!("token");
        sanitize(&mut value);
        assert_eq!(value, "token");
    }
}

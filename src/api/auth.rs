//! HTTP Basic authentication for the fragments API
//!
//! Credentials are checked against the configured users. An authenticated
//! request carries an [`OwnerId`] extension: the lowercase hex SHA-256 of the
//! user's email, so raw emails never reach storage keys.

use super::response::ApiError;
use crate::config::AuthConfig;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// Owner identity attached to authenticated requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerId(pub String);

/// Outcome of an authentication check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Request is authenticated.
    Authenticated {
        /// Owner id derived from the email
        owner: OwnerId,
    },
    /// Request failed authentication.
    Rejected {
        /// Human-readable reason for rejection.
        reason: String,
    },
}

/// Lowercase hex SHA-256
pub fn sha256_hex(value: &str) -> String {
    format!("{:x}", Sha256::digest(value.as_bytes()))
}

/// Owner id for an email address
pub fn owner_for_email(email: &str) -> OwnerId {
    OwnerId(sha256_hex(email))
}

/// Verifies `Authorization: Basic ...` headers
pub struct BasicAuth {
    users: HashMap<String, String>,
}

impl BasicAuth {
    pub fn from_config(config: &AuthConfig) -> Self {
        let users = config
            .users
            .iter()
            .map(|u| (u.email.clone(), u.password_sha256.to_ascii_lowercase()))
            .collect();
        Self { users }
    }

    /// Number of configured users
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Check an `Authorization` header value
    pub fn verify(&self, authorization: Option<&str>) -> AuthOutcome {
        let reject = |reason: &str| AuthOutcome::Rejected {
            reason: reason.to_string(),
        };

        let Some(value) = authorization else {
            return reject("missing authorization header");
        };
        let Some(encoded) = value.strip_prefix("Basic ") else {
            return reject("unsupported authorization scheme");
        };
        let decoded = match STANDARD.decode(encoded.trim()) {
            Ok(bytes) => bytes,
            Err(_) => return reject("malformed basic credentials"),
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return reject("malformed basic credentials");
        };
        let Some((email, password)) = decoded.split_once(':') else {
            return reject("malformed basic credentials");
        };

        match self.users.get(email) {
            Some(expected) if *expected == sha256_hex(password) => AuthOutcome::Authenticated {
                owner: owner_for_email(email),
            },
            _ => reject("invalid email or password"),
        }
    }
}

/// Middleware rejecting unauthenticated requests with 401
pub async fn require_auth(
    State(auth): State<Arc<BasicAuth>>,
    mut req: Request,
    next: Next,
) -> Response {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth.verify(header_value) {
        AuthOutcome::Authenticated { owner } => {
            tracing::debug!(owner = %owner.0, "Authenticated request");
            req.extensions_mut().insert(owner);
            next.run(req).await
        }
        AuthOutcome::Rejected { reason } => {
            tracing::warn!(%reason, "Rejected credentials");
            let mut resp = ApiError::unauthorized().into_response();
            resp.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Basic realm=\"fragments\""),
            );
            resp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BasicUser;

    fn auth() -> BasicAuth {
        BasicAuth::from_config(&AuthConfig {
            users: vec![BasicUser {
                email: "user1@email.com".to_string(),
                password_sha256: sha256_hex("password1"),
            }],
        })
    }

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass)))
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_valid_credentials() {
        let outcome = auth().verify(Some(&basic("user1@email.com", "password1")));
        assert_eq!(
            outcome,
            AuthOutcome::Authenticated {
                owner: owner_for_email("user1@email.com")
            }
        );
    }

    #[test]
    fn test_wrong_password() {
        let outcome = auth().verify(Some(&basic("user1@email.com", "nope")));
        assert!(matches!(outcome, AuthOutcome::Rejected { .. }));
    }

    #[test]
    fn test_unknown_user() {
        let outcome = auth().verify(Some(&basic("invalid@email.com", "incorrect_password")));
        assert!(matches!(outcome, AuthOutcome::Rejected { .. }));
    }

    #[test]
    fn test_missing_or_malformed_header() {
        let auth = auth();
        assert!(matches!(auth.verify(None), AuthOutcome::Rejected { .. }));
        assert!(matches!(
            auth.verify(Some("Bearer token")),
            AuthOutcome::Rejected { .. }
        ));
        assert!(matches!(
            auth.verify(Some("Basic !!!not-base64")),
            AuthOutcome::Rejected { .. }
        ));
        assert!(matches!(
            auth.verify(Some(&format!("Basic {}", STANDARD.encode("no-colon")))),
            AuthOutcome::Rejected { .. }
        ));
    }

    #[test]
    fn test_owner_id_is_hashed_email() {
        let owner = owner_for_email("user1@email.com");
        assert_eq!(owner.0.len(), 64);
        assert!(!owner.0.contains('@'));
    }
}

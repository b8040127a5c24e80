use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::AppState;

/// Claims carried by the bearer tokens issued at login.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
    pub exp: usize,
}

/// Caller identity resolved from a verified token. The id is opaque here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    #[error("Access denied, no token provided")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = match self {
            AuthRejection::MissingToken => StatusCode::FORBIDDEN,
            AuthRejection::InvalidToken => StatusCode::UNAUTHORIZED,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Verifies HS256 bearer tokens against the configured secret.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<CallerIdentity, AuthRejection> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("token rejected: {}", e);
            AuthRejection::InvalidToken
        })?;
        if data.claims.id.trim().is_empty() {
            return Err(AuthRejection::InvalidToken);
        }
        Ok(CallerIdentity {
            user_id: data.claims.id,
        })
    }
}

/// Pulls the token out of an `Authorization` value; the `Bearer ` prefix is optional.
pub fn extract_token(value: &str) -> &str {
    value.strip_prefix("Bearer ").unwrap_or(value).trim()
}

pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthRejection::MissingToken)?;

    let raw = header_value.to_str().map_err(|_| {
        warn!("authorization header is not valid ASCII");
        AuthRejection::InvalidToken
    })?;

    let caller = state.verifier.verify(extract_token(raw))?;
    debug!(caller = %caller.user_id, path = %req.uri().path(), "authenticated request");
    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

//! Path, credential and validation extractors for API routes

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::types::ApiError;
use crate::core::constants::MAX_ID_LEN;
use crate::domain::provenance::Credential;

// ============================================================================
// Credential
// ============================================================================

/// Caller credential taken verbatim from the `Authorization` header.
///
/// Missing or blank headers are rejected with 401 `MISSING_CREDENTIAL`.
#[derive(Debug)]
pub struct AuthCredential(pub Credential);

impl<S> FromRequestParts<S> for AuthCredential
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
            return Err(ApiError::unauthorized(
                "MISSING_CREDENTIAL",
                "Authorization header is required",
            ));
        };
        let value = value.to_str().map_err(|_| {
            ApiError::bad_request(
                "INVALID_CREDENTIAL",
                "Authorization header must be visible ASCII",
            )
        })?;
        if value.trim().is_empty() {
            return Err(ApiError::unauthorized(
                "MISSING_CREDENTIAL",
                "Authorization header is empty",
            ));
        }
        Ok(Self(Credential::new(value)))
    }
}

// ============================================================================
// Path Extractors
// ============================================================================

/// Validate identifier length (epc, lot, event id)
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_ID_LEN
}

fn check_id(field: &'static str, id: &str) -> Result<(), ValidationRejection> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(ValidationRejection::InvalidId(field))
    }
}

#[derive(Debug, Deserialize)]
struct ItemPathRaw {
    epc: String,
}

/// Validated `{epc}` path
#[derive(Debug)]
pub struct ItemPath {
    pub epc: String,
}

impl<S> FromRequestParts<S> for ItemPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<ItemPathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;
        check_id("epc", &raw.epc)?;
        Ok(Self { epc: raw.epc })
    }
}

#[derive(Debug, Deserialize)]
struct LotPathRaw {
    epc: String,
    fecha: String,
}

/// Validated `{epc}/{fecha}` path; the date is echoed back, not interpreted
#[derive(Debug)]
pub struct LotPath {
    pub lote: String,
    pub fecha: String,
}

impl<S> FromRequestParts<S> for LotPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<LotPathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;
        check_id("lote", &raw.epc)?;
        check_id("fecha", &raw.fecha)?;
        Ok(Self {
            lote: raw.epc,
            fecha: raw.fecha,
        })
    }
}

#[derive(Debug, Deserialize)]
struct EventPathRaw {
    event_id: String,
}

/// Validated `{event_id}` path
#[derive(Debug)]
pub struct EventPath {
    pub event_id: String,
}

impl<S> FromRequestParts<S> for EventPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<EventPathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;
        check_id("event_id", &raw.event_id)?;
        Ok(Self {
            event_id: raw.event_id,
        })
    }
}

// ============================================================================
// Rejections
// ============================================================================

/// Validation rejection with structured error response
pub enum ValidationRejection {
    /// Failed to parse path parameters
    Path(PathRejection),
    /// Identifier empty or longer than the limit
    InvalidId(&'static str),
    /// Failed to parse JSON body
    Json(JsonRejection),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Path(rejection) => (
                StatusCode::BAD_REQUEST,
                "PATH_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::InvalidId(field) => (
                StatusCode::BAD_REQUEST,
                "INVALID_ID",
                format!("Invalid {}: must be 1-{} characters", field, MAX_ID_LEN),
            ),
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                "JSON_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format_validation_errors(&errors),
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": "bad_request",
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// JSON body extractor with automatic validation.
///
/// Returns a `ValidationRejection` on parse or validation failure.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http;

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("urn:epc:class:lgtin:4012345.012345.998877"));
        assert!(is_valid_id(&"a".repeat(MAX_ID_LEN)));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id(&"a".repeat(MAX_ID_LEN + 1)));
    }

    #[tokio::test]
    async fn test_credential_forwarded_verbatim() {
        let (mut parts, _) = http::Request::builder()
            .header("Authorization", "Bearer  abc.def ")
            .body(())
            .unwrap()
            .into_parts();
        let AuthCredential(credential) = AuthCredential::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(credential.expose(), "Bearer  abc.def ");
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let (mut parts, _) = http::Request::builder().body(()).unwrap().into_parts();
        let err = AuthCredential::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { ref code, .. } if code == "MISSING_CREDENTIAL"));
    }

    #[tokio::test]
    async fn test_blank_credential() {
        let (mut parts, _) = http::Request::builder()
            .header("Authorization", "   ")
            .body(())
            .unwrap()
            .into_parts();
        let err = AuthCredential::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
    }
}

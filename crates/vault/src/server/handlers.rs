//! Axum request handlers for all service endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, ErrorResponse,
    FieldFailureReport, HealthResponse,
};
use common::ServiceError;
use tracing::{debug, warn};

use super::state::AppState;
use crate::profile::FieldList;

/// `POST /encrypt` — encrypt the profile's fields in every record.
///
/// The profile is identified by the value of the `X-Record-Profile` request
/// header (or the configured header name). Records are returned in input
/// order. If any record cannot be encrypted the whole batch is rejected, so
/// the caller never persists a partially encrypted page.
pub async fn encrypt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<EncryptRequest>,
) -> Response {
    let (profile, fields) = match resolve_profile(&state, &headers) {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    let mut records = Vec::with_capacity(req.records.len());
    for (index, record) in req.records.iter().enumerate() {
        match state.codec.encrypt_fields(record, fields.as_slice()) {
            Ok(encrypted) => records.push(encrypted),
            Err(e) => {
                warn!(profile = %profile, record = index, error = %e, "encryption failed");
                return error_response(&ServiceError::EncryptionFailure(format!(
                    "record {index} could not be encrypted"
                )));
            }
        }
    }

    debug!(profile = %profile, records = records.len(), "records encrypted");
    (StatusCode::OK, Json(EncryptResponse { records })).into_response()
}

/// `POST /decrypt` — decrypt the profile's fields in every record.
///
/// Always answers `200 OK` once the profile resolves. Fields that cannot be
/// decrypted keep their stored value and are listed in `failures`.
pub async fn decrypt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DecryptRequest>,
) -> Response {
    let (profile, fields) = match resolve_profile(&state, &headers) {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    let mut records = Vec::with_capacity(req.records.len());
    let mut failures = Vec::new();
    for (index, record) in req.records.iter().enumerate() {
        let decrypted = state.codec.decrypt_fields(record, fields.as_slice());
        failures.extend(
            decrypted
                .failures
                .into_iter()
                .map(|f| FieldFailureReport {
                    record: index,
                    field: f.field,
                    code: f.error.code().to_owned(),
                    message: f.error.to_string(),
                }),
        );
        records.push(decrypted.record);
    }

    if !failures.is_empty() {
        warn!(
            profile = %profile,
            records = records.len(),
            failed_fields = failures.len(),
            "some fields could not be decrypted"
        );
    }

    (StatusCode::OK, Json(DecryptResponse { records, failures })).into_response()
}

/// `GET /health` — liveness and readiness check.
///
/// The key is validated before the server starts, so a running server is
/// always able to serve.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        profiles_loaded: state.profiles.len(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

/// Read the profile header and look the profile up in the registry.
fn resolve_profile(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(String, Arc<FieldList>), ServiceError> {
    let header = state.profile_header_name.as_str();
    let name = headers
        .get(header)
        .ok_or_else(|| ServiceError::BadRequest(format!("missing {header} header")))?
        .to_str()
        .map_err(|_| {
            ServiceError::BadRequest(format!("{header} header contains non-ASCII characters"))
        })?
        .trim()
        .to_owned();

    let fields = state.profiles.get(&name)?;
    Ok((name, fields))
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.to_response())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::post, Router};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route("/encrypt", post(encrypt))
            .route("/decrypt", post(decrypt))
            .with_state(state)
    }

    async fn call(app: Router, uri: &str, profile: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(p) = profile {
            builder = builder.header("X-Record-Profile", p);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn encrypt_then_decrypt_journal_batch() {
        let state = AppState::default();
        let entries = json!([
            {"title": "Hello", "tags": ["a", "b"], "mood": null, "userId": "u-1"},
            {"title": "Second", "content": "more words", "journalType": "audio"}
        ]);

        let (status, encrypted) = call(
            test_router(state.clone()),
            "/encrypt",
            Some("journal"),
            json!({"records": entries}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let first = &encrypted["records"][0];
        assert_ne!(first["title"], "Hello");
        assert!(first["title"].as_str().unwrap().contains(':'));
        assert_eq!(first["mood"], Value::Null);
        assert_eq!(first["userId"], "u-1");

        let (status, decrypted) = call(
            test_router(state),
            "/decrypt",
            Some("journal"),
            json!({"records": encrypted["records"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decrypted["records"], entries);
        assert!(decrypted.get("failures").is_none());
    }

    #[tokio::test]
    async fn decrypt_reports_corrupted_field_and_keeps_siblings() {
        let state = AppState::default();
        let entry = json!({"title": "Hello", "content": "body"});
        let (_, encrypted) = call(
            test_router(state.clone()),
            "/encrypt",
            Some("journal"),
            json!({"records": [entry.clone(), entry]}),
        )
        .await;

        let mut records = encrypted["records"].clone();
        records[1]["content"] = json!("not-a-ciphertext");

        let (status, decrypted) = call(
            test_router(state),
            "/decrypt",
            Some("journal"),
            json!({"records": records}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decrypted["records"][0]["content"], "body");
        assert_eq!(decrypted["records"][1]["title"], "Hello");
        assert_eq!(decrypted["records"][1]["content"], "not-a-ciphertext");
        assert_eq!(
            decrypted["failures"],
            json!([{
                "record": 1,
                "field": "content",
                "code": "malformed_ciphertext",
                "message": "malformed ciphertext: expected <iv_hex>:<ciphertext_hex>"
            }])
        );
    }

    #[tokio::test]
    async fn missing_profile_header_is_400() {
        let (status, body) = call(
            test_router(AppState::default()),
            "/encrypt",
            None,
            json!({"records": []}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "bad_request");
    }

    #[tokio::test]
    async fn unknown_profile_is_400() {
        let (status, body) = call(
            test_router(AppState::default()),
            "/decrypt",
            Some("diary"),
            json!({"records": []}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "unknown_profile");
    }

    #[tokio::test]
    async fn loaded_profile_is_used() {
        let state = AppState::default();
        state.profiles.replace_loaded(std::collections::HashMap::from([(
            "transcript".to_owned(),
            vec!["text".to_owned()],
        )]));
        let (status, body) = call(
            test_router(state),
            "/encrypt",
            Some("transcript"),
            json!({"records": [{"text": "spoken words", "title": "not encrypted here"}]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(body["records"][0]["text"], "spoken words");
        assert_eq!(body["records"][0]["title"], "not encrypted here");
    }

    #[tokio::test]
    async fn health_reports_profiles() {
        let app = Router::new()
            .route("/health", axum::routing::get(health))
            .with_state(AppState::default());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.profiles_loaded, 1);
    }
}

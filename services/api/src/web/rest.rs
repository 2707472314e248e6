//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use linguaverse_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

pub const MISSING_FIELDS_MESSAGE: &str = "Message and userId are required.";
pub const MESSAGE_ADDED: &str = "Message added successfully!";
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        submit_message_handler,
        health_handler,
    ),
    components(
        schemas(SubmitMessageRequest, SubmitMessageResponse, ErrorResponse, HealthResponse)
    ),
    tags(
        (name = "LinguaVerse API", description = "Server-side endpoints for the LinguaVerse client.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A message submitted by a signed-in user.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// The response payload sent after a message is stored.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessageResponse {
    pub success: bool,
    pub doc_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn bad_request() -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: MISSING_FIELDS_MESSAGE.to_string(),
            details: None,
        }),
    )
}

fn store_failure_detail(err: &PortError) -> String {
    match err {
        PortError::Provider(provider) => provider.message.clone(),
        other => other.to_string(),
    }
}

/// Present and non-empty.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Store a message.
///
/// Both `message` and `userId` must be non-empty strings. The message id and
/// timestamp are assigned by the server.
#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SubmitMessageRequest,
    responses(
        (status = 200, description = "Message stored", body = SubmitMessageResponse),
        (status = 400, description = "Missing fields or malformed body", body = ErrorResponse),
        (status = 500, description = "The message could not be stored", body = ErrorResponse)
    )
)]
pub async fn submit_message_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<SubmitMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected message body: {}", rejection.body_text());
        bad_request()
    })?;

    let (Some(text), Some(user_id)) = (required(request.message), required(request.user_id))
    else {
        return Err(bad_request());
    };

    match app_state.messages.add_message(&text, &user_id).await {
        Ok(stored) => {
            info!("Stored message {} from {}", stored.id, stored.author_id);
            Ok((
                StatusCode::OK,
                Json(SubmitMessageResponse {
                    success: true,
                    doc_id: stored.id,
                    message: MESSAGE_ADDED.to_string(),
                }),
            ))
        }
        Err(e) => {
            error!("Failed to store message: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: INTERNAL_SERVER_ERROR.to_string(),
                    details: Some(store_failure_detail(&e)),
                }),
            ))
        }
    }
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "The service is running", body = HealthResponse)
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

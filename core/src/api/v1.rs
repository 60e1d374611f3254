//! Version 1 of the REST API.
//!
//! Handlers are intentionally thin wrappers that validate input, invoke the
//! matching generation operation, and map pipeline errors to HTTP status
//! codes. Persistence of generated fields (attaching a summary to a stored
//! post, say) belongs to the blog CRUD service, not to this surface.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::GenerateError;
use crate::generate::{EnhanceOutput, GenerationEngine, SeoOutput, SummaryOutput, TagsOutput};

/// Shared state injected into each handler.
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<GenerationEngine>,
}

/// Assemble the v1 router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/ping", get(ping))
        .route("/api/blogs/generate-summary", post(generate_summary))
        .route("/api/blogs/generate-seo", post(generate_seo))
        .route("/api/blogs/enhance-content", post(enhance_content))
        .route("/api/blogs/generate-tags", post(generate_tags))
        .with_state(state)
}

/// Identity supplied by the upstream auth filter through trusted headers.
/// Used for log correlation only, never for prompt content.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub user_id: Option<String>,
    pub role: Option<String>,
}

impl Identity {
    fn user(&self) -> &str {
        self.user_id.as_deref().unwrap_or("anonymous")
    }

    fn role(&self) -> &str {
        self.role.as_deref().unwrap_or("user")
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        Ok(Self {
            user_id: header("x-user-id"),
            role: header("x-user-role"),
        })
    }
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        let status = match &self {
            GenerateError::InputMissing(_) | GenerateError::InputTooShort => {
                StatusCode::BAD_REQUEST
            }
            GenerateError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            GenerateError::AllModelsFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// Simple health-check endpoint.
async fn ping() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "ts": OffsetDateTime::now_utc().unix_timestamp(),
    }))
}

#[derive(Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub content: String,
}

async fn generate_summary(
    State(state): State<ApiState>,
    identity: Identity,
    Json(input): Json<SummaryRequest>,
) -> Result<Json<SummaryOutput>, GenerateError> {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, user = identity.user(), role = identity.role(), "generate-summary requested");
    let output = state
        .engine
        .generate_summary(&input.content)
        .await
        .map_err(|err| log_failure(request_id, "generate-summary", err))?;
    Ok(Json(output))
}

#[derive(Deserialize)]
pub struct SeoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize)]
pub struct SeoResponse {
    pub result: SeoOutput,
}

async fn generate_seo(
    State(state): State<ApiState>,
    identity: Identity,
    Json(input): Json<SeoRequest>,
) -> Result<Json<SeoResponse>, GenerateError> {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, user = identity.user(), role = identity.role(), "generate-seo requested");
    let result = state
        .engine
        .generate_seo(&input.title, &input.content)
        .await
        .map_err(|err| log_failure(request_id, "generate-seo", err))?;
    Ok(Json(SeoResponse { result }))
}

#[derive(Deserialize)]
pub struct EnhanceRequest {
    #[serde(default)]
    pub content: String,
}

async fn enhance_content(
    State(state): State<ApiState>,
    identity: Identity,
    Json(input): Json<EnhanceRequest>,
) -> Result<Json<EnhanceOutput>, GenerateError> {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, user = identity.user(), role = identity.role(), "enhance-content requested");
    let output = state
        .engine
        .enhance_content(&input.content)
        .await
        .map_err(|err| log_failure(request_id, "enhance-content", err))?;
    Ok(Json(output))
}

#[derive(Deserialize)]
pub struct TagsRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub category: Option<String>,
}

async fn generate_tags(
    State(state): State<ApiState>,
    identity: Identity,
    Json(input): Json<TagsRequest>,
) -> Result<Json<TagsOutput>, GenerateError> {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, user = identity.user(), role = identity.role(), "generate-tags requested");
    let output = state
        .engine
        .generate_tags(&input.title, &input.content, input.category.as_deref())
        .await
        .map_err(|err| log_failure(request_id, "generate-tags", err))?;
    Ok(Json(output))
}

fn log_failure(request_id: Uuid, action: &'static str, err: GenerateError) -> GenerateError {
    tracing::warn!(
        %request_id,
        action,
        code = err.code(),
        explain = err.explain(),
        error = %err,
        "generation request failed"
    );
    err
}

//! Route handlers and error mapping for the playground.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::AppState;
use crate::application::pipeline::new_correlation_id;
use crate::application::AnalysisRequest;
use crate::domain::error::PipelineError;
use crate::domain::models::{Brief, Strategy, StrategySummary, Tone};
use crate::infrastructure::store::ListFilter;
use crate::services::csv_validator::TableSource;

/// JSON error body with the HTTP status mapping from the error taxonomy.
pub struct ApiError {
    status: StatusCode,
    message: String,
    correlation_id: Option<String>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            correlation_id: None,
        }
    }

    fn from_pipeline(err: &PipelineError, correlation_id: String) -> Self {
        let status = StatusCode::from_u16(err.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            message: err.to_string(),
            correlation_id: Some(correlation_id),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "correlation_id": self.correlation_id,
        }));
        (self.status, body).into_response()
    }
}

/// `POST /analyze`: multipart CSV plus brief fields.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Strategy>, ApiError> {
    let mut csv: Option<Vec<u8>> = None;
    let mut competitors: Vec<Vec<u8>> = Vec::new();
    let mut goal: Option<String> = None;
    let mut audience: Option<String> = None;
    let mut tone: Option<String> = None;
    let mut language: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "csv" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable csv part: {e}")))?;
                csv = Some(bytes.to_vec());
            }
            "competitor" | "competitors" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable competitor part: {e}")))?;
                competitors.push(bytes.to_vec());
            }
            "goal" => goal = Some(read_text(field).await?),
            "audience" => audience = Some(read_text(field).await?),
            "tone" => tone = Some(read_text(field).await?),
            "language" => language = Some(read_text(field).await?),
            other => {
                warn!(field = other, "ignoring unknown multipart field");
            }
        }
    }

    let csv = csv.ok_or_else(|| ApiError::bad_request("missing csv file part"))?;
    let goal = goal.ok_or_else(|| ApiError::bad_request("missing goal field"))?;
    let audience = audience.ok_or_else(|| ApiError::bad_request("missing audience field"))?;
    let tone: Tone = tone
        .ok_or_else(|| ApiError::bad_request("missing tone field"))?
        .parse()
        .map_err(|e| ApiError::bad_request(format!("{e}")))?;

    let mut brief =
        Brief::new(goal, audience, tone).map_err(|e| ApiError::bad_request(e.to_string()))?;
    if let Some(language) = language {
        brief = brief.with_language_hint(language);
    }

    let request = AnalysisRequest {
        brief,
        creator: TableSource::Bytes(csv),
        competitors: competitors.into_iter().map(TableSource::Bytes).collect(),
    };

    let correlation_id = new_correlation_id();
    let outcome = state
        .pipeline
        .run_with_correlation(request, CancellationToken::new(), correlation_id.clone())
        .await
        .map_err(|err| ApiError::from_pipeline(&err, correlation_id))?;

    Ok(Json(outcome.strategy))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("unreadable field: {e}")))
}

/// `GET /strategies`: summaries, newest first.
pub async fn handle_list(State(state): State<AppState>) -> Json<Vec<StrategySummary>> {
    Json(state.store.list(&ListFilter::default(), 100, 0).await)
}

/// `GET /strategies/{id}`: one full strategy.
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Strategy>, ApiError> {
    state.store.get(&id).await.map(Json).map_err(|err| ApiError {
        status: match err {
            crate::domain::error::StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        message: err.to_string(),
        correlation_id: None,
    })
}

/// `GET /health`: fixed liveness document.
pub async fn handle_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.store.root().display().to_string(),
    }))
}

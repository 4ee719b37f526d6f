//! Document processing route.
//!
//! `POST /process-document` accepts a multipart form with either a
//! `text_input` field or an uploaded `file`, runs the workflow, and
//! returns the processing result. Workflow failures map to machine-
//! readable error codes with appropriate HTTP statuses.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Serialize;

use scribe_core::{DocumentInput, ProcessingResult, WorkflowError};

use crate::state::AppState;

/// JSON body for failed requests.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

/// Workflow error wrapper carrying the HTTP mapping.
pub struct ApiError(pub WorkflowError);

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            WorkflowError::MissingInput(_) => StatusCode::BAD_REQUEST,
            WorkflowError::OcrFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WorkflowError::LlmCallFailed(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
            code: self.0.code().to_string(),
        });

        (status, body).into_response()
    }
}

/// Create the processing router.
pub fn router() -> Router<AppState> {
    Router::new().route("/process-document", post(process_document))
}

/// POST /process-document
async fn process_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProcessingResult>, ApiError> {
    let input = read_input(multipart).await?;
    let result = state.workflow().run(input).await?;
    Ok(Json(result))
}

/// Collect the `text_input` and `file` fields from the multipart form.
async fn read_input(mut multipart: Multipart) -> Result<DocumentInput, ApiError> {
    let mut text: Option<String> = None;
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        // Reading the field consumes it, so detach the name first
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("text_input") => {
                text = Some(field.text().await.map_err(bad_multipart)?);
            }
            Some("file") => {
                image = Some(field.bytes().await.map_err(bad_multipart)?.to_vec());
            }
            other => {
                tracing::debug!(field = ?other, "ignoring unknown multipart field");
            }
        }
    }

    Ok(DocumentInput::from_parts(text, image)?)
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError(WorkflowError::MissingInput(format!(
        "Malformed multipart request: {err}"
    )))
}

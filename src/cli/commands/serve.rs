//! HTTP API server for the ingest and ask operations.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::SvarError;
use crate::orchestrator::{IngestOutcome, Orchestrator, SourceStatus};
use crate::rag::SourceRef;
use crate::source::{IngestInput, StagedUpload};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    temp_dir: PathBuf,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let max_upload_bytes = settings.server.max_upload_bytes;
    let temp_dir = settings.temp_dir();
    let orchestrator = Orchestrator::new(settings)?;

    let state = Arc::new(AppState {
        orchestrator,
        temp_dir,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/ask", post(ask))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Svar API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ingest", "POST /ingest");
    Output::kv("Ask (RAG)", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AskRequest {
    session_id: Option<String>,
    query: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestResponse {
    session_id: String,
    chunks: usize,
    added: usize,
    sources: Vec<SourceStatus>,
}

impl From<IngestOutcome> for IngestResponse {
    fn from(outcome: IngestOutcome) -> Self {
        Self {
            session_id: outcome.session_id,
            chunks: outcome.chunks,
            added: outcome.added,
            sources: outcome.sources,
        }
    }
}

#[derive(Serialize)]
struct AskResponse {
    text: String,
    sources: Vec<SourceRef>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Vec<String>>,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ingest(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut input = IngestInput::default();
    let mut staged: Option<PathBuf> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return client_error(
                    StatusCode::BAD_REQUEST,
                    &format!("malformed multipart body: {}", e),
                )
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("text") => match field.text().await {
                Ok(text) => input.text = Some(text),
                Err(e) => {
                    return client_error(StatusCode::BAD_REQUEST, &format!("bad text field: {}", e))
                }
            },
            Some("video_url") => match field.text().await {
                Ok(url) => input.video_url = Some(url),
                Err(e) => {
                    return client_error(
                        StatusCode::BAD_REQUEST,
                        &format!("bad video_url field: {}", e),
                    )
                }
            },
            Some("file") => {
                let original_name = field.file_name().map(str::to_string);
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        return client_error(
                            StatusCode::PAYLOAD_TOO_LARGE,
                            &format!("could not read upload: {}", e),
                        )
                    }
                };
                match stage_upload(&state.temp_dir, &bytes).await {
                    Ok(path) => {
                        staged = Some(path.clone());
                        input.upload = Some(StagedUpload {
                            path,
                            original_name,
                        });
                    }
                    Err(e) => return error_response(e),
                }
            }
            _ => {}
        }
    }

    let result = state.orchestrator.ingest(input).await;

    // Best-effort cleanup of the staged upload, success or not.
    if let Some(path) = staged {
        tokio::spawn(async move {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove staged upload {}: {}", path.display(), e);
            }
        });
    }

    match result {
        Ok(outcome) => Json(IngestResponse::from(outcome)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    let session_id = req.session_id.filter(|s| !s.trim().is_empty());
    let query = req.query.filter(|q| !q.trim().is_empty());
    let (Some(session_id), Some(query)) = (session_id, query) else {
        return client_error(StatusCode::BAD_REQUEST, "sessionId and query are required");
    };

    match state.orchestrator.ask(&session_id, &query).await {
        Ok(answer) => Json(AskResponse {
            text: answer.text,
            sources: answer.sources,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Write uploaded bytes to a uniquely named file under the temp dir.
async fn stage_upload(temp_dir: &Path, bytes: &[u8]) -> crate::error::Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix("svar-upload-")
        .tempfile_in(temp_dir)?;
    let path = file
        .into_temp_path()
        .keep()
        .map_err(|e| SvarError::SourceUnavailable(format!("cannot stage upload: {}", e)))?;
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

fn client_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
            notes: None,
        }),
    )
        .into_response()
}

/// Map pipeline errors onto HTTP statuses.
fn error_response(error: SvarError) -> Response {
    let status = match &error {
        SvarError::NoExtractableContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SvarError::InvalidSession(_) => StatusCode::NOT_FOUND,
        SvarError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let notes = match &error {
        SvarError::NoExtractableContent { notes } if !notes.is_empty() => Some(notes.clone()),
        _ => None,
    };

    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
            notes,
        }),
    )
        .into_response()
}

//! HTTP API server.
//!
//! Exposes claim verification over REST for presentation layers.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::VeritasError;
use crate::verification::{EnumDeviation, PresentedVerification, WireVerification};
use crate::verifier::Verifier;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Shared application state.
pub struct AppState {
    pub verifier: Verifier,
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/verify-claim", post(verify_claim))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Verify, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'veritas doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let verifier = Verifier::new(&settings)?;
    let app = router(Arc::new(AppState { verifier }));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Veritas API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Verify", "POST /verify-claim");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct VerifyRequest {
    #[serde(default)]
    claim: Option<String>,
}

#[derive(Serialize)]
struct VerifyResponse {
    verification: WireVerification,
    result: PresentedVerification,
    deviations: Vec<EnumDeviation>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

fn error_response(status: StatusCode, error: String, kind: Option<&'static str>) -> Response {
    (status, Json(ErrorResponse { error, kind })).into_response()
}

fn status_for(err: &VeritasError) -> StatusCode {
    match err {
        VeritasError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        VeritasError::SearchUnavailable(_) | VeritasError::OpenAI(_) | VeritasError::Session(_) => {
            StatusCode::BAD_GATEWAY
        }
        VeritasError::ToolProtocolViolation { .. }
        | VeritasError::MalformedModelOutput { .. }
        | VeritasError::IncompleteModelOutput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn verify_claim(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyRequest>,
) -> Response {
    let claim = match req.claim {
        Some(claim) if !claim.trim().is_empty() => claim,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Claim is required".to_string(),
                None,
            )
        }
    };

    let request_id = Uuid::new_v4();
    let span = info_span!("verify_claim", %request_id);

    async move {
        info!("Verifying claim ({} chars)", claim.len());

        match state.verifier.verify_claim(&claim).await {
            Ok(verification) => Json(VerifyResponse {
                verification: verification.result.to_wire(),
                result: verification.result.present(),
                deviations: verification.deviations,
            })
            .into_response(),
            Err(e) => {
                error!(
                    kind = e.kind(),
                    snippet = e.snippet().unwrap_or_default(),
                    "Error verifying claim: {}",
                    e
                );
                error_response(status_for(&e), e.public_message(), Some(e.kind()))
            }
        }
    }
    .instrument(span)
    .await
}

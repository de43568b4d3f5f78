//! vib-frame HTTP server

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use vib_frame::prelude::*;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct ModalRequest {
    model: ModelDefinition,
    #[serde(default)]
    options: Option<AnalysisOptions>,
}

#[derive(Debug, Serialize)]
struct ModalResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<ResultsData>,
}

#[derive(Debug, Serialize)]
struct ResultsData {
    modes: Vec<ModeData>,
    summary: SummaryData,
}

#[derive(Debug, Serialize)]
struct ModeData {
    mode: usize,
    omega: f64,
    frequency_hz: f64,
    /// One entry per node, in node order
    shape: Vec<ModeDisplacement>,
}

#[derive(Debug, Serialize)]
struct SummaryData {
    num_nodes: usize,
    num_elements: usize,
    total_dofs: usize,
    free_dofs: usize,
    num_modes: usize,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn modal(Json(request): Json<ModalRequest>) -> impl IntoResponse {
    match solve_request(request).await {
        Ok(results) => (
            StatusCode::OK,
            Json(ModalResponse {
                success: true,
                error: None,
                results: Some(results),
            }),
        ),
        Err(e) => {
            log::warn!("Modal request failed: {e}");
            (
                StatusCode::BAD_REQUEST,
                Json(ModalResponse {
                    success: false,
                    error: Some(e),
                    results: None,
                }),
            )
        }
    }
}

/// Run the dense eigensolve on the blocking pool
async fn solve_request(request: ModalRequest) -> Result<ResultsData, String> {
    match tokio::task::spawn_blocking(move || run_modal(request)).await {
        Ok(outcome) => outcome.map_err(|e| e.to_string()),
        Err(e) => Err(format!("analysis task failed: {e}")),
    }
}

fn run_modal(request: ModalRequest) -> VibResult<ResultsData> {
    let options = request.options.unwrap_or_default();
    let mut model = FrameModel::from_definition(request.model);
    let num_nodes = model.node_count();
    let num_elements = model.elements().len();
    let total_dofs = model.ndof();

    let result = model.analyze(&options)?;

    let hz = result.frequencies_hz();
    let mut modes = Vec::with_capacity(result.num_modes());
    for (i, mode) in result.mode_numbers().into_iter().enumerate() {
        let shape = (1..=num_nodes)
            .map(|node| result.node_displacement(i, node))
            .collect::<VibResult<Vec<_>>>()?;
        modes.push(ModeData {
            mode,
            omega: result.omega[i],
            frequency_hz: hz[i],
            shape,
        });
    }

    Ok(ResultsData {
        summary: SummaryData {
            num_nodes,
            num_elements,
            total_dofs,
            free_dofs: result.free_dofs,
            num_modes: result.num_modes(),
        },
        modes,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/modal", post(modal))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8086));
    println!("vib-frame server listening on http://{}", addr);
    println!("  Health check: GET  /health");
    println!("  Modal:        POST /api/v1/modal");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

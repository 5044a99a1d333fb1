//! HTTP API server for Kairos.
//!
//! Pure plumbing over the replay engine: dataset discovery and loading,
//! sequence building, progress queries, single-step and drain replay, and
//! autoplay control. No engine logic lives here: every handler locks the
//! session and calls into the engine, which also serializes all engine
//! operations (single-flight by construction).

use crate::config::{self, ReplayConfig};
use crate::replay::autoplay::Autoplay;
use crate::replay::driver::{ReplayDriver, ReplayError, StepOutcome};
use crate::replay::sequencer::SequencerError;
use crate::replay::session::ReplaySession;
use crate::store::StoreError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response listing the replayable datasets
#[derive(Debug, Serialize)]
pub struct DatasetListResponse {
    pub datasets: Vec<String>,
}

/// Response after loading a dataset
#[derive(Debug, Serialize)]
pub struct LoadDatasetResponse {
    pub dataset: String,
    pub quads_loaded: usize,
}

/// Response for the loaded store size
#[derive(Debug, Serialize)]
pub struct StoreSizeResponse {
    pub quads: usize,
}

/// Response for the observation count
#[derive(Debug, Serialize)]
pub struct ObservationCountResponse {
    pub observations: usize,
}

/// Response after building the replay sequence
#[derive(Debug, Serialize)]
pub struct SortResponse {
    pub length: usize,
    pub preview: Vec<String>,
}

/// Response with the sequence preview
#[derive(Debug, Serialize)]
pub struct ObservationsResponse {
    pub observations: Vec<String>,
}

/// Response after a single replay step
#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub position: usize,
    pub exhausted: bool,
}

/// Request to drain the remaining observations
#[derive(Debug, Default, Deserialize)]
pub struct DrainRequest {
    pub batch_size: Option<usize>,
}

/// Response after a drain run
#[derive(Debug, Serialize)]
pub struct DrainResponse {
    pub positions: Vec<usize>,
}

/// Response for the replay progress query
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub position: usize,
    pub length: usize,
}

/// Shared application state
pub struct AppState {
    pub session: Arc<Mutex<ReplaySession>>,
    pub autoplay: Autoplay,
    pub config: ReplayConfig,
}

impl AppState {
    pub fn new(session: ReplaySession, config: ReplayConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            autoplay: Autoplay::new(),
            config,
        }
    }
}

/// Custom error type for API errors
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ReplayError> for ApiError {
    fn from(err: ReplayError) -> Self {
        match err {
            ReplayError::SequenceNotBuilt
            | ReplayError::InvalidBatchSize(_)
            | ReplayError::Cursor(_) => ApiError::BadRequest(err.to_string()),
            _ => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<SequencerError> for ApiError {
    fn from(err: SequencerError) -> Self {
        match err {
            SequencerError::MissingTimestamp { .. } => ApiError::BadRequest(err.to_string()),
            SequencerError::Store(inner) => ApiError::InternalError(inner.to_string()),
        }
    }
}

/// Create the HTTP server with all routes
pub fn create_server(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/datasets", get(list_datasets))
        .route("/api/datasets/:name/load", post(load_dataset))
        .route("/api/store/size", get(store_size))
        .route("/api/observations/count", get(observation_count))
        .route("/api/observations/sort", post(sort_observations))
        .route("/api/observations", get(get_observations))
        .route("/api/replay/advance", post(advance))
        .route("/api/replay/drain", post(drain))
        .route("/api/replay/progress", get(progress))
        .route("/api/replay/autoplay/start", post(start_autoplay))
        .route("/api/replay/autoplay/stop", post(stop_autoplay))
        .route("/health", get(health_check))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(SuccessResponse { message: "Kairos replay API is running".to_string() })
}

/// GET /api/datasets - List the replayable datasets
async fn list_datasets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DatasetListResponse>, ApiError> {
    let datasets = config::list_datasets(&state.config.dataset_folder)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(Json(DatasetListResponse { datasets }))
}

/// POST /api/datasets/:name/load - Load a dataset into the store
async fn load_dataset(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<LoadDatasetResponse>, ApiError> {
    // The name must be a plain file name inside the dataset folder.
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ApiError::BadRequest(format!("invalid dataset name: {}", name)));
    }
    let path = std::path::Path::new(&state.config.dataset_folder).join(&name);
    if !path.is_file() {
        return Err(ApiError::NotFound(format!("dataset '{}' not found", name)));
    }

    let mut session = state.session.lock().await;
    let quads_loaded = session.load_dataset(&path)?;
    Ok(Json(LoadDatasetResponse { dataset: name, quads_loaded }))
}

/// GET /api/store/size - Number of quads currently loaded
async fn store_size(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StoreSizeResponse>, ApiError> {
    let session = state.session.lock().await;
    let quads = session.store().quad_count()?;
    Ok(Json(StoreSizeResponse { quads }))
}

/// GET /api/observations/count - Number of observations in the dataset
async fn observation_count(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ObservationCountResponse>, ApiError> {
    let session = state.session.lock().await;
    let observations = session.observation_count()?;
    Ok(Json(ObservationCountResponse { observations }))
}

/// POST /api/observations/sort - Build the canonical replay sequence
async fn sort_observations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SortResponse>, ApiError> {
    let mut session = state.session.lock().await;
    let length = session.build_sequence()?;
    Ok(Json(SortResponse { length, preview: session.sequence_preview() }))
}

/// GET /api/observations - Preview of the sorted sequence
async fn get_observations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ObservationsResponse>, ApiError> {
    let session = state.session.lock().await;
    if session.sequence().is_none() {
        return Err(ApiError::BadRequest(
            "no replay sequence has been built; sort the observations first".to_string(),
        ));
    }
    Ok(Json(ObservationsResponse { observations: session.sequence_preview() }))
}

/// POST /api/replay/advance - Replay one observation
async fn advance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AdvanceResponse>, ApiError> {
    let mut session = state.session.lock().await;
    let outcome = ReplayDriver::new(&mut session).advance_one().await?;
    let response = match outcome {
        StepOutcome::Advanced(position) => AdvanceResponse { position, exhausted: false },
        StepOutcome::NoMoreObservations => {
            AdvanceResponse { position: session.cursor().position(), exhausted: true }
        }
    };
    Ok(Json(response))
}

/// POST /api/replay/drain - Replay the remaining observations batch-wise
async fn drain(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<DrainRequest>>,
) -> Result<Json<DrainResponse>, ApiError> {
    let batch_size = payload
        .and_then(|Json(request)| request.batch_size)
        .unwrap_or(state.config.batch_size);
    let mut session = state.session.lock().await;
    let positions = ReplayDriver::new(&mut session).drain_to_end(batch_size).await?;
    Ok(Json(DrainResponse { positions }))
}

/// GET /api/replay/progress - Current cursor position and sequence length
async fn progress(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let session = state.session.lock().await;
    let progress = session.progress();
    Ok(Json(ProgressResponse { position: progress.position, length: progress.length }))
}

/// POST /api/replay/autoplay/start - Enable self-paced replay
async fn start_autoplay(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, ApiError> {
    {
        let session = state.session.lock().await;
        if session.sequence().is_none() {
            return Err(ApiError::BadRequest(
                "no replay sequence has been built; sort the observations first".to_string(),
            ));
        }
    }
    let message = if state.autoplay.start(Arc::clone(&state.session)) {
        "Started".to_string()
    } else {
        "Already running".to_string()
    };
    Ok(Json(SuccessResponse { message }))
}

/// POST /api/replay/autoplay/stop - Disable self-paced replay
async fn stop_autoplay(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.autoplay.stop();
    Ok(Json(SuccessResponse { message: "Stopped".to_string() }))
}

/// Start the HTTP server on the specified address
pub async fn start_server(
    addr: &str,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Kairos replay API listening on http://{}", addr);
    info!("  GET    /api/datasets                 - List replayable datasets");
    info!("  POST   /api/datasets/:name/load      - Load a dataset");
    info!("  GET    /api/store/size               - Loaded quad count");
    info!("  GET    /api/observations/count       - Observation count");
    info!("  POST   /api/observations/sort        - Build the replay sequence");
    info!("  GET    /api/observations             - Sequence preview");
    info!("  POST   /api/replay/advance           - Replay one observation");
    info!("  POST   /api/replay/drain             - Replay the remainder batch-wise");
    info!("  GET    /api/replay/progress          - Cursor position and length");
    info!("  POST   /api/replay/autoplay/start    - Start self-paced replay");
    info!("  POST   /api/replay/autoplay/stop     - Stop self-paced replay");
    info!("  GET    /health                       - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}

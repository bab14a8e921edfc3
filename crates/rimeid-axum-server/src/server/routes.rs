use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use rimeid::{Error as IdError, SnowflakeGenerator, SnowflakeId, WallClock};
use serde::Serialize;

use super::config::ServerConfig;

/// Shared per-process state: one generator (clones share its sequence
/// stream) and the epoch needed to resolve decoded timestamps.
#[derive(Clone)]
pub struct AppState {
    generator: SnowflakeGenerator<WallClock>,
    epoch_ms: u64,
}

impl TryFrom<&ServerConfig> for AppState {
    type Error = IdError;

    fn try_from(config: &ServerConfig) -> Result<Self, Self::Error> {
        let clock = WallClock::with_epoch(config.epoch);
        let mut generator = SnowflakeGenerator::new(config.node_id, clock)?;
        if let Some(timeout) = config.wait_timeout {
            generator = generator.with_wait_timeout(timeout);
        }
        Ok(Self {
            generator,
            epoch_ms: config.epoch.as_millis() as u64,
        })
    }
}

/// A freshly minted ID.
///
/// The value is serialized as a decimal string: a raw `u64` does not survive
/// JSON number round-trips in common clients.
#[derive(Debug, Serialize)]
pub struct MintedId {
    pub id: String,
}

/// An ID decomposed into its fields, for operational tooling.
#[derive(Debug, Serialize)]
pub struct DecodedId {
    pub id: String,
    /// Milliseconds since the service epoch.
    pub timestamp_ms: u64,
    /// Minting instant, milliseconds since 1970-01-01 UTC.
    pub unix_ms: u64,
    pub node_id: u64,
    pub sequence: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/id", get(mint))
        .route("/v1/id/{id}", get(decode))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn mint(State(state): State<AppState>) -> Result<Json<MintedId>, (StatusCode, String)> {
    let generator = state.generator.clone();
    // The exhaustion wait can spin for a millisecond; keep it off the async
    // worker threads.
    let id = tokio::task::spawn_blocking(move || generator.next_id())
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?
        .map_err(into_status)?;

    Ok(Json(MintedId { id: id.to_string() }))
}

async fn decode(State(state): State<AppState>, Path(raw): Path<u64>) -> Json<DecodedId> {
    let id = SnowflakeId::from_raw(raw);
    Json(DecodedId {
        id: id.to_string(),
        timestamp_ms: id.timestamp(),
        unix_ms: state.epoch_ms + id.timestamp(),
        node_id: id.node_id(),
        sequence: id.sequence(),
    })
}

fn into_status(err: IdError) -> (StatusCode, String) {
    match err {
        // Retryable: the producer recovers as soon as the clock catches up.
        IdError::ClockRegression { .. } | IdError::SequenceExhaustedTimeout { .. } => {
            tracing::warn!(%err, "id minting failed");
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Serialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::error;

use crate::feed::ChangeBroadcaster;
use crate::models::{ActiveCounts, ClientRecord, ListParams};
use crate::store::{query, RecordStore};

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub feed: ChangeBroadcaster,
    /// Artificial response delay, for exercising loading states.
    pub latency: Option<Duration>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

fn internal_error(err: anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    error!("store error: {err:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal Server Error".to_string(),
        }),
    )
}

async fn simulate_latency(state: &AppState) {
    if let Some(delay) = state.latency {
        tokio::time::sleep(delay).await;
    }
}

/// List client records with json-server-style filtering, sorting and
/// pagination. The filtered match count rides in the `x-total-count`
/// header; the body is the page itself.
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<([(&'static str, String); 1], Json<Vec<ClientRecord>>), (StatusCode, Json<ErrorResponse>)>
{
    simulate_latency(&state).await;
    let records = state.store.load().await.map_err(internal_error)?;
    let outcome = query::evaluate(records, &params);
    Ok((
        [("x-total-count", outcome.total.to_string())],
        Json(outcome.records),
    ))
}

/// Active/inactive totals across the whole filtered set. Pagination
/// parameters are accepted and ignored: totals never depend on the page.
pub async fn active_counts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ActiveCounts>, (StatusCode, Json<ErrorResponse>)> {
    simulate_latency(&state).await;
    let records = state.store.load().await.map_err(internal_error)?;
    let counts =
        query::count_active(records.iter().filter(|r| query::matches_filters(r, &params)));
    Ok(Json(counts))
}

/// Server-sent change feed: one `dataUpdated` event per debounced burst of
/// store mutations.
pub async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.feed.subscribe()).filter_map(|signal| match signal {
        Ok(()) => Some(Ok::<_, Infallible>(
            Event::default().event("dataUpdated").data(""),
        )),
        // a lagged subscriber only misses already-coalesced signals
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}

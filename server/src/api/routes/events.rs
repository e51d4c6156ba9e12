//! Event-centred trace endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::extractors::{AuthCredential, EventPath};
use crate::api::types::ApiError;
use crate::domain::provenance::{NestedEvent, ProvenanceService};

#[derive(Clone)]
pub struct EventsApiState {
    pub provenance: Arc<ProvenanceService>,
}

pub fn routes(provenance: Arc<ProvenanceService>) -> Router<()> {
    let state = EventsApiState { provenance };
    Router::new()
        .route("/{event_id}/graph", get(get_event_graph))
        .with_state(state)
}

/// Nested graph around a single event. Unknown events yield an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/graph",
    tag = "events",
    params(("event_id" = String, Path, description = "Upstream event identifier")),
    responses(
        (status = 200, description = "The event with facilities, payloads and item masters inlined"),
        (status = 401, description = "Missing Authorization header"),
        (status = 502, description = "Upstream failure or inconsistent trace")
    )
)]
pub async fn get_event_graph(
    State(state): State<EventsApiState>,
    path: EventPath,
    AuthCredential(credential): AuthCredential,
) -> Result<Json<Vec<NestedEvent>>, ApiError> {
    let graph = state
        .provenance
        .graph_for_event(&credential, &path.event_id)
        .await?;
    Ok(Json(graph))
}

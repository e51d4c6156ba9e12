//! Item trace endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::extractors::{AuthCredential, ItemPath, LotPath};
use crate::api::types::ApiError;
use crate::domain::provenance::{DataModelUi, NestedEvent, ProvenanceService, RecordSet};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct ItemsApiState {
    pub provenance: Arc<ProvenanceService>,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Narrative of one lot, echoing the requested lot and date
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    #[serde(rename = "Lote")]
    pub lote: String,
    #[serde(rename = "Fecha")]
    pub fecha: String,
    #[serde(rename = "JSON")]
    pub json: DataModelUi,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(provenance: Arc<ProvenanceService>) -> Router<()> {
    let state = ItemsApiState { provenance };
    Router::new()
        .route("/{epc}/graph", get(get_item_graph))
        .route("/{epc}/record-set", get(get_item_record_set))
        .route("/{epc}/{fecha}", get(get_item))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Consumer narrative for a lot
#[utoipa::path(
    get,
    path = "/api/v1/items/{lote}/{fecha}",
    tag = "items",
    params(
        ("lote" = String, Path, description = "Lot or item identifier (EPC)"),
        ("fecha" = String, Path, description = "Date label, echoed back")
    ),
    responses(
        (status = 200, description = "Lifecycle narrative", body = ItemResponse),
        (status = 401, description = "Missing Authorization header"),
        (status = 502, description = "Upstream failure or inconsistent trace")
    )
)]
pub async fn get_item(
    State(state): State<ItemsApiState>,
    path: LotPath,
    AuthCredential(credential): AuthCredential,
) -> Result<Json<ItemResponse>, ApiError> {
    tracing::debug!(lote = %path.lote, fecha = %path.fecha, "Narrative requested");
    let json = state
        .provenance
        .narrative_for_item(&credential, &path.lote)
        .await?;
    Ok(Json(ItemResponse {
        lote: path.lote,
        fecha: path.fecha,
        json,
    }))
}

/// Nested event graph for an item
#[utoipa::path(
    get,
    path = "/api/v1/items/{epc}/graph",
    tag = "items",
    params(("epc" = String, Path, description = "Item identifier (EPC)")),
    responses(
        (status = 200, description = "Events with facilities, payloads and item masters inlined"),
        (status = 401, description = "Missing Authorization header"),
        (status = 502, description = "Upstream failure or inconsistent trace")
    )
)]
pub async fn get_item_graph(
    State(state): State<ItemsApiState>,
    path: ItemPath,
    AuthCredential(credential): AuthCredential,
) -> Result<Json<Vec<NestedEvent>>, ApiError> {
    let graph = state
        .provenance
        .graph_for_item(&credential, &path.epc)
        .await?;
    Ok(Json(graph))
}

/// Raw record set for an item
#[utoipa::path(
    get,
    path = "/api/v1/items/{epc}/record-set",
    tag = "items",
    params(("epc" = String, Path, description = "Item identifier (EPC)")),
    responses(
        (status = 200, description = "Events, facilities, payloads and item masters keyed by id"),
        (status = 401, description = "Missing Authorization header"),
        (status = 502, description = "Upstream failure or inconsistent trace")
    )
)]
pub async fn get_item_record_set(
    State(state): State<ItemsApiState>,
    path: ItemPath,
    AuthCredential(credential): AuthCredential,
) -> Result<Json<RecordSet>, ApiError> {
    let record_set = state
        .provenance
        .record_set_for_item(&credential, &path.epc)
        .await?;
    Ok(Json(record_set))
}

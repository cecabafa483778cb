use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use models::association::{AssociationRecord, AssociationRequest};
use service::errors::ServiceError;
use tracing::info;

use crate::errors::JsonApiError;
use crate::state::ServerState;

/// Link a tracking location name to competencies, creating its id if needed.
#[utoipa::path(
    post,
    path = "/tracking-location-to-competencies",
    tag = "tracking-locations",
    request_body = crate::openapi::AssociationRequestDoc,
    responses(
        (status = 201, description = "Stored", body = crate::openapi::AssociationRecordDoc),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 504, description = "Timed out")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<AssociationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AssociationRecord>), JsonApiError> {
    let Json(input) = payload?;
    let (name, member_ids) = input.into_parts().map_err(ServiceError::from)?;
    let deadline = state.associator.settings().request_timeout;
    let record = state.associator.associate_within(&name, member_ids, deadline).await?;
    info!(id = %record.id, "tracking location associated");
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/tracking-location-to-competencies/{location_id}",
    tag = "tracking-locations",
    params(("location_id" = String, Path, description = "Tracking location id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::AssociationRecordDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    Path(location_id): Path<String>,
) -> Result<Json<AssociationRecord>, JsonApiError> {
    Ok(Json(state.associator.get(&location_id).await?))
}

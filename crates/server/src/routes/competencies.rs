use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use models::competency::Competency;
use serde::Deserialize;
use service::pagination::{Page, PageRequest};

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct CompetencyQuery {
    #[serde(rename = "Limit")]
    pub limit: Option<String>,
    #[serde(rename = "ExclusiveStartKey")]
    pub exclusive_start_key: Option<String>,
}

#[utoipa::path(
    get,
    path = "/competencies/{competency_id}/{domain}",
    tag = "competencies",
    params(
        ("competency_id" = String, Path, description = "Numeric competency id"),
        ("domain" = String, Path, description = "Competency domain"),
        ("Limit" = Option<String>, Query, description = "Page size, positive integer"),
        ("ExclusiveStartKey" = Option<String>, Query, description = "Token from the previous page")
    ),
    responses(
        (status = 200, description = "Page of competencies"),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    Path((competency_id, domain)): Path<(String, String)>,
    Query(q): Query<CompetencyQuery>,
) -> Result<Json<Page<Competency>>, JsonApiError> {
    let page = PageRequest::from_query(q.limit.as_deref(), q.exclusive_start_key.as_deref())?;
    let found = state.competencies.get(&competency_id, &domain, &page).await?;
    Ok(Json(found))
}

#[utoipa::path(
    delete,
    path = "/competencies/{competency_id}/{domain}",
    tag = "competencies",
    params(
        ("competency_id" = String, Path, description = "Numeric competency id"),
        ("domain" = String, Path, description = "Competency domain")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    Path((competency_id, domain)): Path<(String, String)>,
) -> Result<StatusCode, JsonApiError> {
    state.competencies.delete(&competency_id, &domain).await?;
    Ok(StatusCode::NO_CONTENT)
}

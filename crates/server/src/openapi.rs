use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct AssociationRequestDoc {
    pub location_name: String,
    pub competency_ids: Vec<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRecordDoc {
    pub id: String,
    pub name: String,
    pub member_ids: Vec<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::tracking_locations::create,
        crate::routes::tracking_locations::get,
        crate::routes::competencies::get,
        crate::routes::competencies::delete,
    ),
    components(
        schemas(
            HealthResponse,
            AssociationRequestDoc,
            AssociationRecordDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "tracking-locations"),
        (name = "competencies")
    )
)]
pub struct ApiDoc;

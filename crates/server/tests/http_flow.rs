use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use configs::AppConfig;
use models::competency::Competency;
use serde_json::{json, Value};
use service::runtime::Tables;
use service::storage::KeyValueStore;
use tower::ServiceExt;

use server::auth::GROUPS_HEADER;
use server::routes;
use server::state::ServerState;

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

async fn build_app() -> (Router, Tables) {
    let tables = Tables::in_memory();
    for (id, domain) in [("1", "Math"), ("2", "Math"), ("3", "Art")] {
        let c: Competency = serde_json::from_value(json!({"CompetencyId": id, "Domain": domain})).unwrap();
        tables.competencies.put(id.to_string(), c).await.unwrap();
    }
    let state = ServerState::from_tables(tables.clone(), &AppConfig::default());
    (routes::build_router(state, cors()), tables)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, body)
}

fn post_location(body: Value, groups: Option<&str>) -> Request<Body> {
    let mut b = Request::builder()
        .method("POST")
        .uri("/tracking-location-to-competencies")
        .header("content-type", "application/json");
    if let Some(g) = groups {
        b = b.header(GROUPS_HEADER, g);
    }
    b.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str, groups: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("DELETE").uri(uri);
    if let Some(g) = groups {
        b = b.header(GROUPS_HEADER, g);
    }
    b.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = build_app().await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn association_requires_a_valid_role() {
    let (app, tables) = build_app().await;
    let body = json!({"LocationName": "Library", "CompetencyIds": ["101"]});

    let (status, _) = send(&app, post_location(body.clone(), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, post_location(body, Some("Student"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let all = tables.tracking_locations.scan(&|_| true).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn association_create_then_reuse() {
    let (app, tables) = build_app().await;

    let (status, first) = send(
        &app,
        post_location(json!({"LocationName": "Library", "CompetencyIds": ["101", "102"]}), Some("Student, Coach")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = first["id"].as_str().unwrap().to_string();
    let n: u32 = id.parse().unwrap();
    assert!((1..=10_000).contains(&n));
    assert_eq!(first["name"], "Library");
    assert_eq!(first["memberIds"], json!(["101", "102"]));

    let (status, second) = send(
        &app,
        post_location(json!({"LocationName": "Library", "CompetencyIds": ["103"]}), Some("Admin")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["memberIds"], json!(["103"]));

    let (status, fetched) = send(&app, get(&format!("/tracking-location-to-competencies/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, second);

    let library = |r: &models::association::AssociationRecord| r.name == "Library";
    assert_eq!(tables.tracking_locations.scan(&library).await.unwrap().len(), 1);
}

#[tokio::test]
async fn association_rejects_missing_fields() {
    let (app, _) = build_app().await;
    let (status, body) = send(&app, post_location(json!({"LocationName": "Gym"}), Some("Admin"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, _) = send(&app, post_location(json!({"LocationName": "", "CompetencyIds": []}), Some("Admin"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn association_rejects_mistyped_body_as_validation_error() {
    let (app, tables) = build_app().await;
    let (status, body) = send(
        &app,
        post_location(json!({"LocationName": "Gym", "CompetencyIds": "abc"}), Some("Admin")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
    assert!(body["message"].as_str().is_some_and(|m| m.contains("CompetencyIds")));

    let bad_json = Request::builder()
        .method("POST")
        .uri("/tracking-location-to-competencies")
        .header("content-type", "application/json")
        .header(GROUPS_HEADER, "Admin")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, bad_json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    assert!(tables.tracking_locations.scan(&|_| true).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_location_is_404() {
    let (app, _) = build_app().await;
    let (status, body) = send(&app, get("/tracking-location-to-competencies/99999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn competency_get_validates_and_pages() {
    let (app, _) = build_app().await;

    let (status, body) = send(&app, get("/competencies/2/Math")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Items"], json!([{"CompetencyId": "2", "Domain": "Math"}]));
    assert!(body.get("LastEvaluatedKey").is_none());

    let (status, body) = send(&app, get("/competencies/2/Math?Limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Items"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, get("/competencies/2/Math?Limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/competencies/abc/Math")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/competencies/3/Math")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn competency_delete_is_gated_and_idempotent_in_outcome() {
    let (app, tables) = build_app().await;

    let (status, _) = send(&app, delete("/competencies/3/Art", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, delete("/competencies/3/Art", Some("Mentor"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(tables.competencies.get("3").await.unwrap().is_none());

    let (status, _) = send(&app, delete("/competencies/3/Art", Some("Mentor"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_and_openapi_are_served() {
    let (app, _) = build_app().await;
    let (status, _) = send(
        &app,
        post_location(json!({"LocationName": "Pool", "CompetencyIds": []}), Some("Admin")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let res = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(text.contains("competency_tracker_associations_total"));

    let (status, doc) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/tracking-location-to-competencies").is_some());
}

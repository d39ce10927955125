//! End-to-end tests for the queue surface: capacity management, walk-in
//! intake, offline issuance and the status lifecycle, including who may do
//! what.

mod common;

use axum::http::StatusCode;
use medq_db::repositories::ProviderRepo;
use serde_json::json;
use sqlx::PgPool;

use common::{
    body_json, build_test_app, day, get, json_as, seed_capacity, seed_patient, seed_provider,
    send, Actor, ADMIN, FRONTDESK,
};

fn walk_in_body(provider_id: i64) -> serde_json::Value {
    json!({
        "full_name": "Asha Verma",
        "contact_number": "9900112233",
        "age": 34,
        "provider_id": provider_id,
        "for_date": day(),
        "reason": "fever",
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn health_answers_ok(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn protected_routes_require_an_actor(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    let app = build_test_app(pool);

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/v1/tokens/walkin")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(walk_in_body(provider_id).to_string()))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn walk_in_issues_and_reuses_the_patient_identity(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    seed_capacity(&pool, provider_id, 3).await;
    let app = build_test_app(pool);

    let response = json_as(
        &app,
        FRONTDESK,
        "POST",
        "/api/v1/tokens/walkin",
        walk_in_body(provider_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["token"]["queue_position"], 1);
    assert_eq!(body["data"]["token"]["source"], "walkin");
    assert_eq!(body["data"]["token"]["note"], "fever");
    let patient_id = body["data"]["patient"]["id"].as_i64().unwrap();

    // Same name and number: the identity is reused, never duplicated.
    let response = json_as(
        &app,
        FRONTDESK,
        "POST",
        "/api/v1/tokens/walkin",
        walk_in_body(provider_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["token"]["queue_position"], 2);
    assert_eq!(body["data"]["patient"]["id"].as_i64().unwrap(), patient_id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn walk_in_rejects_unrelated_actors_and_bad_input(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    seed_capacity(&pool, provider_id, 3).await;
    let app = build_test_app(pool);

    // No role, no provider binding, no manager assignment.
    let response = json_as(
        &app,
        Actor::plain(55),
        "POST",
        "/api/v1/tokens/walkin",
        walk_in_body(provider_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A provider may register walk-ins for their own queue.
    let response = json_as(
        &app,
        Actor::provider(provider_id),
        "POST",
        "/api/v1/tokens/walkin",
        walk_in_body(provider_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut invalid = walk_in_body(provider_id);
    invalid["full_name"] = json!("");
    let response = json_as(&app, FRONTDESK, "POST", "/api/v1/tokens/walkin", invalid).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn capacity_is_provider_scoped(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    let app = build_test_app(pool);
    let uri = format!("/api/v1/providers/{provider_id}/availability/{}", day());

    // An unrelated actor may not set capacity.
    let response = json_as(
        &app,
        Actor::plain(55),
        "PUT",
        &uri,
        json!({ "total_capacity": 10 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = json_as(
        &app,
        Actor::provider(provider_id),
        "PUT",
        &uri,
        json!({ "total_capacity": 10 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_capacity"], 10);
    assert_eq!(body["data"]["filled_count"], 0);
    assert!(body["data"]["in_progress_position"].is_null());

    // Out-of-range capacity is rejected before touching the row.
    let response = json_as(
        &app,
        Actor::provider(provider_id),
        "PUT",
        &uri,
        json!({ "total_capacity": 100_000 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn day_view_tracks_the_served_position(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    seed_capacity(&pool, provider_id, 3).await;
    let app = build_test_app(pool);

    for _ in 0..2 {
        let response = json_as(
            &app,
            FRONTDESK,
            "POST",
            "/api/v1/tokens/walkin",
            walk_in_body(provider_id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let uri = format!("/api/v1/providers/{provider_id}/tokens/{}", day());
    let response = get(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["tokens"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["in_progress_position"], 1);
    let first_token_id = body["data"]["tokens"][0]["id"].as_i64().unwrap();

    // Completing the first token moves the served position to 2.
    let response = json_as(
        &app,
        Actor::provider(provider_id),
        "PATCH",
        &format!("/api/v1/tokens/{first_token_id}/status"),
        json!({ "status": "completed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status_id"], 2);

    let response = get(&app, &uri).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["in_progress_position"], 2);

    // Repeating the completion is accepted and changes nothing.
    let response = json_as(
        &app,
        Actor::provider(provider_id),
        "PATCH",
        &format!("/api/v1/tokens/{first_token_id}/status"),
        json!({ "status": "completed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, &uri).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["in_progress_position"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn status_updates_allow_managers_and_refuse_strangers(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    seed_capacity(&pool, provider_id, 3).await;
    let app = build_test_app(pool.clone());

    let response = json_as(
        &app,
        FRONTDESK,
        "POST",
        "/api/v1/tokens/walkin",
        walk_in_body(provider_id),
    )
    .await;
    let token_id = body_json(response).await["data"]["token"]["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/v1/tokens/{token_id}/status");

    let response = json_as(
        &app,
        Actor::plain(55),
        "PATCH",
        &uri,
        json!({ "status": "completed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Grant user 55 manager rights; the role cache loads the assignment.
    ProviderRepo::add_manager(&pool, provider_id, 55).await.unwrap();
    let response = json_as(
        &app,
        Actor::plain(55),
        "PATCH",
        &uri,
        json!({ "status": "completed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Changing a terminal status without the correction flag conflicts.
    let response = json_as(
        &app,
        Actor::plain(55),
        "PATCH",
        &uri,
        json!({ "status": "missed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = json_as(
        &app,
        Actor::plain(55),
        "PATCH",
        &uri,
        json!({ "status": "missed", "correction": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status_id"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn offline_issuance_is_admin_only(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    let patient_id = seed_patient(&pool).await;
    seed_capacity(&pool, provider_id, 3).await;
    let app = build_test_app(pool);

    let body = json!({
        "provider_id": provider_id,
        "patient_id": patient_id,
        "for_date": day(),
        "note": "phoned in",
    });

    let response = json_as(&app, FRONTDESK, "POST", "/api/v1/tokens/offline", body.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = json_as(&app, ADMIN, "POST", "/api/v1/tokens/offline", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let data = body_json(response).await;
    assert_eq!(data["data"]["source"], "offline");
    assert_eq!(data["data"]["queue_position"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn capacity_shrink_below_filled_is_a_conflict(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    seed_capacity(&pool, provider_id, 2).await;
    let app = build_test_app(pool);

    for _ in 0..2 {
        json_as(
            &app,
            FRONTDESK,
            "POST",
            "/api/v1/tokens/walkin",
            walk_in_body(provider_id),
        )
        .await;
    }

    let response = json_as(
        &app,
        ADMIN,
        "PUT",
        &format!("/api/v1/providers/{provider_id}/availability/{}", day()),
        json!({ "total_capacity": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

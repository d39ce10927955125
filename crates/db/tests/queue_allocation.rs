//! Integration tests for atomic token issuance and queue-position density.
//!
//! Exercises the repository layer against a real database: dense 1-based
//! positions under sequential and concurrent issuance, flag gating, and
//! all-or-nothing behaviour of the reservation + insert unit.

use assert_matches::assert_matches;
use chrono::NaiveDate;
use medq_core::error::CoreError;
use medq_core::source::{SOURCE_OFFLINE, SOURCE_WALKIN};
use medq_db::models::availability::SetCapacityRequest;
use medq_db::models::patient::UpsertPatient;
use medq_db::models::provider::CreateProvider;
use medq_db::models::token::IssueToken;
use medq_db::repositories::{AvailabilityRepo, PatientRepo, ProviderRepo, TokenRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 14).unwrap()
}

async fn seed_provider(pool: &PgPool) -> i64 {
    ProviderRepo::create(
        pool,
        &CreateProvider {
            name: "Dr. Rao".to_string(),
            specialty: Some("General Medicine".to_string()),
            consultation_fee_cents: 50_000,
            is_billable: Some(true),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_patient(pool: &PgPool, name: &str) -> i64 {
    PatientRepo::upsert(
        pool,
        &UpsertPatient {
            full_name: name.to_string(),
            contact_number: "9900112233".to_string(),
            age: Some(34),
            gender: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn set_capacity(pool: &PgPool, provider_id: i64, capacity: i32) {
    AvailabilityRepo::set_capacity(
        pool,
        provider_id,
        day(),
        &SetCapacityRequest {
            total_capacity: capacity,
            accepting: None,
            paused: None,
            pause_reason: None,
            on_leave: None,
        },
    )
    .await
    .unwrap();
}

fn walk_in(provider_id: i64, patient_id: i64) -> IssueToken {
    IssueToken {
        provider_id,
        patient_id,
        for_date: day(),
        source: SOURCE_WALKIN,
        note: None,
        payment_ref: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn positions_are_dense_and_one_based(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    let patient_id = seed_patient(&pool, "Asha Verma").await;
    set_capacity(&pool, provider_id, 5).await;

    for expected in 1..=5 {
        let token = TokenRepo::issue(&pool, &walk_in(provider_id, patient_id))
            .await
            .unwrap();
        assert_eq!(token.queue_position, expected);
    }

    let tokens = TokenRepo::list_for_date(&pool, provider_id, day())
        .await
        .unwrap();
    let positions: Vec<i32> = tokens.iter().map(|t| t.queue_position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);

    // The sixth issuance finds no slot.
    let err = TokenRepo::issue(&pool, &walk_in(provider_id, patient_id))
        .await
        .unwrap_err();
    assert_matches!(err.as_core(), Some(CoreError::CapacityExhausted));
}

#[sqlx::test]
async fn concurrent_issuers_for_last_slot_get_one_token(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    let patient_id = seed_patient(&pool, "Asha Verma").await;
    set_capacity(&pool, provider_id, 1).await;

    let input = walk_in(provider_id, patient_id);
    let (a, b) = tokio::join!(
        TokenRepo::issue(&pool, &input),
        TokenRepo::issue(&pool, &input),
    );

    let (ok, err) = match (a, b) {
        (Ok(t), Err(e)) => (t, e),
        (Err(e), Ok(t)) => (t, e),
        other => panic!("expected exactly one success, got {other:?}"),
    };
    assert_eq!(ok.queue_position, 1);
    assert_matches!(err.as_core(), Some(CoreError::CapacityExhausted));

    let record = AvailabilityRepo::find(&pool, provider_id, day())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.filled_count, 1);
}

#[sqlx::test]
async fn failed_issuance_persists_nothing(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    set_capacity(&pool, provider_id, 3).await;

    // Unknown patient: the reservation ran inside the same unit, so the
    // counter must not move.
    let err = TokenRepo::issue(&pool, &walk_in(provider_id, 999_999))
        .await
        .unwrap_err();
    assert_matches!(
        err.as_core(),
        Some(CoreError::NotFound { entity: "Patient", .. })
    );

    let record = AvailabilityRepo::find(&pool, provider_id, day())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.filled_count, 0);
    assert!(TokenRepo::list_for_date(&pool, provider_id, day())
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test]
async fn issuance_requires_an_availability_record(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    let patient_id = seed_patient(&pool, "Asha Verma").await;

    let err = TokenRepo::issue(&pool, &walk_in(provider_id, patient_id))
        .await
        .unwrap_err();
    assert_matches!(
        err.as_core(),
        Some(CoreError::NotFound { entity: "Availability", .. })
    );
}

#[sqlx::test]
async fn paused_and_on_leave_days_refuse_issuance(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    let patient_id = seed_patient(&pool, "Asha Verma").await;

    AvailabilityRepo::set_capacity(
        &pool,
        provider_id,
        day(),
        &SetCapacityRequest {
            total_capacity: 5,
            accepting: None,
            paused: Some(true),
            pause_reason: Some("lunch break".to_string()),
            on_leave: None,
        },
    )
    .await
    .unwrap();

    let err = TokenRepo::issue(&pool, &walk_in(provider_id, patient_id))
        .await
        .unwrap_err();
    assert_matches!(
        err.as_core(),
        Some(CoreError::NotAccepting { reason: Some(r) }) if r == "lunch break"
    );

    AvailabilityRepo::set_capacity(
        &pool,
        provider_id,
        day(),
        &SetCapacityRequest {
            total_capacity: 5,
            accepting: None,
            paused: Some(false),
            pause_reason: None,
            on_leave: Some(true),
        },
    )
    .await
    .unwrap();

    let err = TokenRepo::issue(&pool, &walk_in(provider_id, patient_id))
        .await
        .unwrap_err();
    assert_matches!(err.as_core(), Some(CoreError::OnLeave));
}

#[sqlx::test]
async fn sources_share_one_counter(pool: PgPool) {
    let provider_id = seed_provider(&pool).await;
    let patient_id = seed_patient(&pool, "Asha Verma").await;
    set_capacity(&pool, provider_id, 2).await;

    let first = TokenRepo::issue(&pool, &walk_in(provider_id, patient_id))
        .await
        .unwrap();

    let mut offline = walk_in(provider_id, patient_id);
    offline.source = SOURCE_OFFLINE;
    let second = TokenRepo::issue(&pool, &offline).await.unwrap();

    assert_eq!(first.queue_position, 1);
    assert_eq!(second.queue_position, 2);
    assert_eq!(second.source, "offline");
}

#[sqlx::test]
async fn stream_for_date_is_ordered_and_restartable(pool: PgPool) {
    use futures::TryStreamExt;

    let provider_id = seed_provider(&pool).await;
    let patient_id = seed_patient(&pool, "Asha Verma").await;
    set_capacity(&pool, provider_id, 3).await;

    for _ in 0..3 {
        TokenRepo::issue(&pool, &walk_in(provider_id, patient_id))
            .await
            .unwrap();
    }

    let first_pass: Vec<i32> = TokenRepo::stream_for_date(&pool, provider_id, day())
        .map_ok(|t| t.queue_position)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(first_pass, vec![1, 2, 3]);

    // A fresh call restarts from the beginning.
    let second_pass: Vec<i32> = TokenRepo::stream_for_date(&pool, provider_id, day())
        .map_ok(|t| t.queue_position)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(second_pass, first_pass);
}

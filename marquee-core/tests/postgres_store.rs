//! Store contract against PostgreSQL.
//!
//! Requires `--features postgres-tests` and a `DATABASE_URL` the test user
//! may create databases on.
#![cfg(feature = "postgres-tests")]

mod support;

use std::time::Duration as StdDuration;

use anyhow::Result;
use marquee_core::error::StoreError;
use marquee_core::model::{StoredCredential, User};
use marquee_core::{DEFAULT_DEADLINE, Store};
use sqlx::PgPool;
use support::*;

fn store(pool: PgPool) -> Store {
    Store::postgres(pool, DEFAULT_DEADLINE)
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn insert_assigns_identity(pool: PgPool) -> Result<()> {
    contract_insert_assigns_identity(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn update_increments_version(pool: PgPool) -> Result<()> {
    contract_update_increments_version(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn stale_update_conflicts(pool: PgPool) -> Result<()> {
    contract_stale_update_conflicts(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn update_of_missing_row_conflicts(pool: PgPool) -> Result<()> {
    contract_update_of_missing_row_conflicts(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn concurrent_updates_have_one_winner(pool: PgPool) -> Result<()> {
    contract_concurrent_updates_have_one_winner(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn missing_movies(pool: PgPool) -> Result<()> {
    contract_missing_movies(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn list_filters_sorts_and_pages(pool: PgPool) -> Result<()> {
    contract_list_filters_sorts_and_pages(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn users_round_trip(pool: PgPool) -> Result<()> {
    contract_users_round_trip(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn duplicate_email(pool: PgPool) -> Result<()> {
    contract_duplicate_email(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn token_lifecycle(pool: PgPool) -> Result<()> {
    contract_token_lifecycle(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn token_revocation(pool: PgPool) -> Result<()> {
    contract_token_revocation(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn permissions(pool: PgPool) -> Result<()> {
    contract_permissions(&store(pool)).await
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn tokens_only_store_digests(pool: PgPool) -> Result<()> {
    let store = store(pool.clone());
    let mut user = sample_user(&fast_codec(), "Heidi", "heidi@example.com")?;
    store.users().insert_user(&mut user).await?;

    let token = store
        .tokens()
        .new_token(
            user.id,
            chrono::Duration::hours(1),
            marquee_core::model::TokenScope::Authentication,
        )
        .await?;

    let stored: Vec<u8> = sqlx::query_scalar("SELECT hash FROM tokens WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(stored.len(), 32);
    assert_eq!(stored, token.hash.to_vec());
    assert_ne!(stored, token.plaintext.as_bytes().to_vec());
    Ok(())
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn seeds_well_known_permission_codes(pool: PgPool) -> Result<()> {
    let codes: Vec<String> = sqlx::query_scalar("SELECT code FROM permissions ORDER BY code")
        .fetch_all(&pool)
        .await?;
    assert_eq!(codes, marquee_core::model::permission_codes::ALL);
    Ok(())
}

#[sqlx::test(migrator = "marquee_core::MIGRATOR")]
async fn exceeded_deadline_is_a_timeout(pool: PgPool) -> Result<()> {
    let store = Store::postgres(pool, StdDuration::from_nanos(1));
    let mut user = User::new(
        "Ivan",
        "ivan@example.com",
        StoredCredential::from_phc("$argon2id$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$aGFzaA"),
    );
    let err = store.users().insert_user(&mut user).await.unwrap_err();
    assert!(matches!(err, StoreError::Timeout), "{err:?}");
    Ok(())
}

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_model::{StoredCredential, TokenScope, User};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info, warn};

use crate::auth::hash_token;
use crate::database::deadline::within;
use crate::database::ports::UsersRepository;
use crate::database::ports::users::assert_password_set;
use crate::error::{Result, StoreError};

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    created_at: DateTime<Utc>,
    name: String,
    email: String,
    password_hash: String,
    activated: bool,
    version: i32,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            created_at: row.created_at,
            name: row.name,
            email: row.email,
            password: StoredCredential::from_phc(row.password_hash),
            activated: row.activated,
            version: row.version,
        }
    }
}

#[derive(Debug, FromRow)]
struct InsertedRow {
    id: i64,
    created_at: DateTime<Utc>,
    version: i32,
}

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
    deadline: Duration,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn insert_user(&self, user: &mut User) -> Result<()> {
        assert_password_set(user);

        let inserted = within(self.deadline, "insert_user", async {
            sqlx::query_as::<_, InsertedRow>(
                r#"
                INSERT INTO users (name, email, password_hash, activated)
                VALUES ($1, $2, $3, $4)
                RETURNING id, created_at, version
                "#,
            )
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.password.as_phc())
            .bind(user.activated)
            .fetch_one(self.pool())
            .await
            .map_err(StoreError::from)
        })
        .await?;

        user.id = inserted.id;
        user.created_at = inserted.created_at;
        user.version = inserted.version;

        info!("Created user {}", user.id);
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        let row = within(self.deadline, "get_user_by_email", async {
            sqlx::query_as::<_, UserRow>(
                r#"
                SELECT id, created_at, name, email::text AS email,
                       password_hash, activated, version
                FROM users
                WHERE email = $1::citext
                "#,
            )
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(StoreError::from)
        })
        .await?;

        debug!("Looked up user by email: found={}", row.is_some());
        row.map(User::from).ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, user: &mut User) -> Result<()> {
        assert_password_set(user);

        let version = within(self.deadline, "update_user", async {
            sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE users
                SET name = $1, email = $2, password_hash = $3, activated = $4,
                    version = version + 1
                WHERE id = $5 AND version = $6
                RETURNING version
                "#,
            )
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.password.as_phc())
            .bind(user.activated)
            .bind(user.id)
            .bind(user.version)
            .fetch_optional(self.pool())
            .await
            .map_err(StoreError::from)
        })
        .await?;

        match version {
            Some(version) => {
                user.version = version;
                info!("Updated user {} (version {})", user.id, version);
                Ok(())
            }
            None => {
                warn!(
                    "Edit conflict on user {} at version {}",
                    user.id, user.version
                );
                Err(StoreError::EditConflict)
            }
        }
    }

    async fn get_user_by_token(&self, plaintext: &str, scope: TokenScope) -> Result<User> {
        let hash = hash_token(plaintext);

        let row = within(self.deadline, "get_user_by_token", async {
            sqlx::query_as::<_, UserRow>(
                r#"
                SELECT users.id, users.created_at, users.name,
                       users.email::text AS email, users.password_hash,
                       users.activated, users.version
                FROM users
                INNER JOIN tokens ON users.id = tokens.user_id
                WHERE tokens.hash = $1
                  AND tokens.scope = $2
                  AND tokens.expiry > $3
                "#,
            )
            .bind(&hash[..])
            .bind(scope.as_str())
            .bind(Utc::now())
            .fetch_optional(self.pool())
            .await
            .map_err(StoreError::from)
        })
        .await?;

        debug!("Resolved {scope} token: found={}", row.is_some());
        row.map(User::from).ok_or(StoreError::NotFound)
    }
}

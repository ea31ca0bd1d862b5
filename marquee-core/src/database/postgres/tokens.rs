use std::time::Duration;

use async_trait::async_trait;
use marquee_model::{Token, TokenScope};
use sqlx::PgPool;
use tracing::info;

use crate::database::deadline::within;
use crate::database::ports::TokensRepository;
use crate::error::{Result, StoreError};

/// PostgreSQL-backed implementation of the `TokensRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresTokensRepository {
    pool: PgPool,
    deadline: Duration,
}

impl PostgresTokensRepository {
    pub fn new(pool: PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TokensRepository for PostgresTokensRepository {
    async fn insert_token(&self, token: &Token) -> Result<()> {
        within(self.deadline, "insert_token", async {
            sqlx::query(
                r#"
                INSERT INTO tokens (hash, user_id, expiry, scope)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&token.hash[..])
            .bind(token.user_id)
            .bind(token.expiry)
            .bind(token.scope.as_str())
            .execute(self.pool())
            .await
            .map_err(StoreError::from)
        })
        .await?;

        info!(
            "Issued {} token for user {} (expires {})",
            token.scope, token.user_id, token.expiry
        );
        Ok(())
    }

    async fn delete_all_tokens_for_user(&self, user_id: i64, scope: TokenScope) -> Result<()> {
        let result = within(self.deadline, "delete_all_tokens_for_user", async {
            sqlx::query("DELETE FROM tokens WHERE scope = $1 AND user_id = $2")
                .bind(scope.as_str())
                .bind(user_id)
                .execute(self.pool())
                .await
                .map_err(StoreError::from)
        })
        .await?;

        info!(
            "Revoked {} {scope} tokens for user {user_id}",
            result.rows_affected()
        );
        Ok(())
    }
}

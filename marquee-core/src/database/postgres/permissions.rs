use std::time::Duration;

use async_trait::async_trait;
use marquee_model::Permissions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::deadline::within;
use crate::database::ports::PermissionsRepository;
use crate::error::{Result, StoreError};

/// PostgreSQL-backed implementation of the `PermissionsRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresPermissionsRepository {
    pool: PgPool,
    deadline: Duration,
}

impl PostgresPermissionsRepository {
    pub fn new(pool: PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PermissionsRepository for PostgresPermissionsRepository {
    async fn get_permissions_for_user(&self, user_id: i64) -> Result<Permissions> {
        let codes = within(self.deadline, "get_permissions_for_user", async {
            sqlx::query_scalar::<_, String>(
                r#"
                SELECT permissions.code
                FROM permissions
                INNER JOIN users_permissions
                    ON users_permissions.permission_id = permissions.id
                WHERE users_permissions.user_id = $1
                ORDER BY permissions.code
                "#,
            )
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .map_err(StoreError::from)
        })
        .await?;

        debug!("User {user_id} holds {} permissions", codes.len());
        Ok(Permissions::from(codes))
    }

    async fn grant_permissions(&self, user_id: i64, codes: &[&str]) -> Result<()> {
        let codes: Vec<String> = codes.iter().map(|code| code.to_string()).collect();

        let result = within(self.deadline, "grant_permissions", async {
            sqlx::query(
                r#"
                INSERT INTO users_permissions (user_id, permission_id)
                SELECT $1, permissions.id
                FROM permissions
                WHERE permissions.code = ANY($2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(&codes)
            .execute(self.pool())
            .await
            .map_err(StoreError::from)
        })
        .await?;

        info!(
            "Granted {} new permissions to user {user_id}",
            result.rows_affected()
        );
        Ok(())
    }
}

use async_trait::async_trait;
use chrono::Duration;
use marquee_model::{Token, TokenScope};

use crate::auth::generate_token;
use crate::error::Result;

#[async_trait]
pub trait TokensRepository: Send + Sync {
    /// Store the digest, owner, scope and expiry of `token`. The plaintext is
    /// never written.
    async fn insert_token(&self, token: &Token) -> Result<()>;

    /// Mint a token and persist it. The returned value is the only place its
    /// plaintext will ever be available.
    async fn new_token(&self, user_id: i64, ttl: Duration, scope: TokenScope) -> Result<Token> {
        let token = generate_token(user_id, ttl, scope)?;
        self.insert_token(&token).await?;
        Ok(token)
    }

    /// Remove every token of `scope` owned by `user_id`. Succeeds when none
    /// exist.
    async fn delete_all_tokens_for_user(&self, user_id: i64, scope: TokenScope) -> Result<()>;
}

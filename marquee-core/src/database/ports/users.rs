use async_trait::async_trait;
use marquee_model::{TokenScope, User};

use crate::error::Result;

#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Persist a new account. Panics if `user.password` holds no hash.
    async fn insert_user(&self, user: &mut User) -> Result<()>;

    async fn get_user_by_email(&self, email: &str) -> Result<User>;

    /// Same optimistic-concurrency contract as movie updates. Panics if
    /// `user.password` holds no hash.
    async fn update_user(&self, user: &mut User) -> Result<()>;

    /// Resolve the owner of an unexpired token minted for `scope`.
    ///
    /// The plaintext is re-hashed; lookup is by digest and scope only.
    async fn get_user_by_token(&self, plaintext: &str, scope: TokenScope) -> Result<User>;
}

/// Refuse to hand an account without a password hash to any backend.
pub(crate) fn assert_password_set(user: &User) {
    assert!(
        user.password.is_set(),
        "missing password hash for user {}",
        user.id
    );
}

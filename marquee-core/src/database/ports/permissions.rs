use async_trait::async_trait;
use marquee_model::Permissions;

use crate::error::Result;

#[async_trait]
pub trait PermissionsRepository: Send + Sync {
    /// Codes granted to `user_id`, ordered by code.
    async fn get_permissions_for_user(&self, user_id: i64) -> Result<Permissions>;

    /// Grant `codes` to `user_id`. Already granted and unknown codes are
    /// skipped.
    async fn grant_permissions(&self, user_id: i64, codes: &[&str]) -> Result<()>;
}

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{Result, StoreError};

/// Run one store operation under `deadline`.
///
/// The future is dropped when the deadline passes, which cancels the
/// in-flight statement and returns its connection to the pool.
pub(crate) async fn within<T, F>(deadline: Duration, operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, ?deadline, "store operation exceeded deadline");
            Err(StoreError::Timeout)
        }
    }
}

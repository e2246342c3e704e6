use std::future::Future;
use std::time::Duration;

use docpilot_core::{Error, Result};

/// Await `fut` for at most `limit`; expiry is a transport failure of `what`.
pub async fn with_timeout<T, F>(limit: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Transport(format!("{what} timed out after {:.1}s", limit.as_secs_f64()))),
    }
}

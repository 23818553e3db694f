//! Timeout utilities for page operations
//!
//! Every engine interaction goes through one of these wrappers so a hung
//! renderer can never block the serialized engine indefinitely.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Wrap an async page operation with an explicit timeout
///
/// Distinguishes a timeout from the operation's own failure in the error message.
///
/// # Arguments
/// * `operation` - The async Future to execute with a timeout
/// * `timeout` - Maximum time to wait
/// * `operation_name` - Human-readable name for error messages
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {} seconds",
            timeout.as_secs_f32()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slow_operation_reports_timeout() {
        let result: Result<()> = with_page_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            },
            Duration::from_millis(20),
            "navigate",
        )
        .await;

        let message = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(message.starts_with("navigate timeout after"));
    }

    #[tokio::test]
    async fn operation_error_passes_through() {
        let result: Result<()> = with_page_timeout(
            async { Err(anyhow::anyhow!("boom")) },
            Duration::from_secs(5),
            "evaluate",
        )
        .await;
        assert_eq!(result.err().map(|e| e.to_string()), Some("boom".to_string()));
    }
}

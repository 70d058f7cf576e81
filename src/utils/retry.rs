use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// 有界重试策略，只用于幂等的外部调用（模型调用、对象上传）
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 总尝试次数，至少为1
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay_ms: u64) -> Self {
        Self {
            attempts: attempts.max(1),
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// 不重试，仅执行一次
    pub fn once() -> Self {
        Self::new(1, 0)
    }
}

/// 通用重试逻辑，用于处理异步操作的重试机制
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                if attempt >= policy.attempts {
                    return Err(err);
                }
                warn!(
                    "❌ {} 出错，重试中 (第 {} / {}次尝试): {}",
                    label, attempt, policy.attempts, err
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = retry_with_backoff(RetryPolicy::new(3, 1), "op", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 { Err(format!("fail {}", n)) } else { Ok(n) }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_after_bounded_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry_with_backoff(RetryPolicy::new(2, 1), "op", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("down".to_string())
        })
        .await;

        assert_eq!(result, Err("down".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        assert_eq!(RetryPolicy::new(0, 10).attempts, 1);
        assert_eq!(RetryPolicy::once().attempts, 1);
    }
}

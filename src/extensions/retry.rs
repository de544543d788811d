use crate::aspect::{AspectHandler, Next, Outcome};
use crate::context::InvocationContext;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Re-runs the rest of the chain when the woven method itself fails
///
/// `max_attempts` must be at least 1; the analyzer rejects smaller literal
/// values at the usage site.
#[derive(crate::DeriveAspect, Debug, Clone)]
#[aspect(default_order = 1000)]
pub struct Retry {
    pub order: Option<i32>,
    pub max_attempts: i32,
    pub delay_ms: u64,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            order: None,
            max_attempts: 3,
            delay_ms: 100,
        }
    }
}

pub struct RetryHandler;

#[async_trait]
impl AspectHandler<Retry> for RetryHandler {
    async fn intercept<'a>(
        &self,
        attribute: &Retry,
        context: InvocationContext<'a>,
        next: Next<'a>,
    ) -> Result<Outcome> {
        let attempts = attribute.max_attempts.max(1);
        let delay = Duration::from_millis(attribute.delay_ms);
        let blocking = !context.method().is_async();

        let mut attempt = 1;
        loop {
            match next.run(context.clone()).await {
                Err(err) if err.is_target() && attempt < attempts => {
                    tracing::warn!(
                        method = context.method_name(),
                        attempt,
                        max_attempts = attempts,
                        error = %err,
                        "attempt failed, retrying"
                    );
                    attempt += 1;
                    if !delay.is_zero() {
                        pause(delay, blocking).await;
                    }
                }
                result => return result,
            }
        }
    }
}

// Synchronous targets are driven on the caller's thread, outside any runtime.
async fn pause(delay: Duration, blocking: bool) {
    if blocking {
        std::thread::sleep(delay);
    } else {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Aspect;
    use crate::context::{Arguments, MethodHandle};
    use crate::di::Container;
    use crate::error::WeaveError;
    use crate::pipeline::Pipeline;
    use std::sync::atomic::{AtomicI32, Ordering};

    static ASYNC_METHOD: MethodHandle = MethodHandle::new("tests::Gateway", "send", &[], true);
    static SYNC_METHOD: MethodHandle = MethodHandle::new("tests::Gateway", "send_now", &[], false);

    fn provider() -> Container {
        let mut container = Container::new();
        container.register_handler::<Retry, _>(RetryHandler);
        container
    }

    #[test]
    fn test_defaults() {
        let retry = Retry::default();
        assert_eq!(retry.order(), 1000);
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.delay_ms, 100);
    }

    #[tokio::test]
    async fn test_retries_target_failures_until_success() {
        let provider = provider();
        let retry = Retry {
            delay_ms: 1,
            ..Default::default()
        };
        let calls = AtomicI32::new(0);

        let pipeline = Pipeline::new(|_context| {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Box::pin(async move {
                if attempt < 3 {
                    Outcome::from_result::<i32, _>(Err("timeout"))
                } else {
                    Ok(Outcome::new(attempt))
                }
            })
        })
        .wrap(&provider, &retry)
        .unwrap();

        let context = InvocationContext::new(None, &provider, &ASYNC_METHOD, Arguments::empty());
        let result: std::result::Result<i32, &str> = Pipeline::finish_fallible(pipeline.run(context).await);
        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let provider = provider();
        let retry = Retry {
            max_attempts: 2,
            delay_ms: 0,
            ..Default::default()
        };
        let calls = AtomicI32::new(0);

        let pipeline = Pipeline::new(|_context| {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Outcome::from_result::<(), _>(Err("down")) })
        })
        .wrap(&provider, &retry)
        .unwrap();

        let context = InvocationContext::new(None, &provider, &SYNC_METHOD, Arguments::empty());
        let result: std::result::Result<(), &str> = Pipeline::finish_fallible(pipeline.run_blocking(context));
        assert_eq!(result, Err("down"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_does_not_retry_handler_faults() {
        let provider = provider();
        let retry = Retry {
            delay_ms: 0,
            ..Default::default()
        };
        let calls = AtomicI32::new(0);

        let pipeline = Pipeline::new(|_context| {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                Err(WeaveError::Validation {
                    method: "send_now".into(),
                    message: "rejected".into(),
                })
            })
        })
        .wrap(&provider, &retry)
        .unwrap();

        let context = InvocationContext::new(None, &provider, &SYNC_METHOD, Arguments::empty());
        let result = pipeline.run_blocking(context);
        assert!(matches!(result, Err(WeaveError::Validation { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

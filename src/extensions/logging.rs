use crate::aspect::{AspectHandler, Next, Outcome};
use crate::context::InvocationContext;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Instant;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Severity of the events emitted by [`LogExecutionHandler`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Logs entry, exit and failure of the woven method with elapsed time
#[derive(crate::DeriveAspect, Debug, Clone)]
#[aspect(default_order = 100)]
pub struct LogExecution {
    pub order: Option<i32>,
    pub level: LogLevel,
    pub exception_level: LogLevel,
    pub log_arguments: bool,
    pub log_return_value: bool,
}

impl Default for LogExecution {
    fn default() -> Self {
        Self {
            order: None,
            level: LogLevel::Info,
            exception_level: LogLevel::Error,
            log_arguments: false,
            log_return_value: false,
        }
    }
}

macro_rules! event_at {
    ($level:expr, $($rest:tt)+) => {
        match $level {
            LogLevel::Trace => tracing::trace!($($rest)+),
            LogLevel::Debug => tracing::debug!($($rest)+),
            LogLevel::Info => tracing::info!($($rest)+),
            LogLevel::Warn => tracing::warn!($($rest)+),
            LogLevel::Error => tracing::error!($($rest)+),
        }
    };
}

pub struct LogExecutionHandler;

#[async_trait]
impl AspectHandler<LogExecution> for LogExecutionHandler {
    async fn intercept<'a>(
        &self,
        attribute: &LogExecution,
        context: InvocationContext<'a>,
        next: Next<'a>,
    ) -> Result<Outcome> {
        let method = context.method_name();
        let target = context.type_name();

        if attribute.log_arguments {
            event_at!(
                attribute.level,
                target_type = target,
                method,
                arguments = ?context.arguments().describe(),
                "executing method"
            );
        } else {
            event_at!(attribute.level, target_type = target, method, "executing method");
        }

        let started = Instant::now();
        let result = next.run(context).await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(outcome) if attribute.log_return_value => event_at!(
                attribute.level,
                target_type = target,
                method,
                duration_ms,
                result_type = outcome.type_name(),
                "method completed"
            ),
            Ok(_) => event_at!(
                attribute.level,
                target_type = target,
                method,
                duration_ms,
                "method completed"
            ),
            Err(err) => event_at!(
                attribute.exception_level,
                target_type = target,
                method,
                duration_ms,
                error = %err,
                "method failed"
            ),
        }
        result
    }
}

//! Observation middleware presets.

use crate::middleware::Flow;
use courier_core::{Context, ErasedRequest};

/// A pre/post middleware that logs each pass through the chain.
///
/// `label` names the dispatch site in the log line. Emits through `tracing`
/// when the `tracing` feature is enabled and is a no-op otherwise.
///
/// ```rust,ignore
/// mediator
///     .register_command_handler::<CreateUser, _>(CreateUserHandler)
///     .pre("log", observe::log_requests("create-user"));
/// ```
pub fn log_requests(
    label: &'static str,
) -> impl Fn(Context, ErasedRequest) -> (Context, ErasedRequest, Flow) + Send + Sync + 'static {
    move |ctx, request| {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(label, context_values = ctx.len(), "request passing chain");
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = label; // Suppress unused warning
        }
        (ctx, request, Flow::Continue)
    }
}

/// A middleware that marks the context with a value for later middleware.
///
/// Context edits are chain-local: they are visible to later middleware in
/// the same chain but never outlive the dispatch.
pub fn stamp<T>(
    value: T,
) -> impl Fn(Context, ErasedRequest) -> (Context, ErasedRequest, Flow) + Send + Sync + 'static
where
    T: Clone + Send + Sync + 'static,
{
    move |mut ctx, request| {
        ctx.insert(value.clone());
        (ctx, request, Flow::Continue)
    }
}

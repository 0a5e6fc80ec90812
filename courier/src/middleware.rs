//! Per-handler pre/post interception chains.
//!
//! Each command/query handler owns two independent, ordered middleware
//! lists. A middleware receives the current context and erased request and
//! returns possibly modified versions plus a [`Flow`] verdict. `Flow::Halt`
//! stops the *remaining chain only* — the handler itself still runs with the
//! request the halting middleware produced. That policy is deliberate:
//! middleware can trim or rewrite what reaches the handler, it cannot veto
//! the dispatch.
//!
//! Middleware identity is an explicit name supplied at registration; adding
//! a name that already exists in a list is a no-op.

use courier_core::{Context, ErasedRequest, Message};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Verdict returned by a middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Continue with the next middleware in the chain.
    Continue,
    /// Skip the remaining middleware in this chain.
    Halt,
}

/// The uniform middleware signature.
///
/// Receives the current context and erased request, returns both (possibly
/// replaced) together with a [`Flow`] verdict.
pub type MiddlewareFunc =
    Arc<dyn Fn(Context, ErasedRequest) -> (Context, ErasedRequest, Flow) + Send + Sync>;

#[derive(Clone)]
struct MiddlewareEntry {
    name: Arc<str>,
    func: MiddlewareFunc,
}

#[derive(Default)]
struct Chains {
    pre: Vec<MiddlewareEntry>,
    post: Vec<MiddlewareEntry>,
}

/// Per-handler middleware storage, keyed by handler name.
#[derive(Default)]
pub(crate) struct MiddlewareSet {
    chains: RwLock<HashMap<Arc<str>, Chains>>,
}

impl MiddlewareSet {
    fn add(&self, handler: &Arc<str>, name: &str, func: MiddlewareFunc, post: bool) {
        let mut chains = self
            .chains
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let chains = chains.entry(Arc::clone(handler)).or_default();
        let list = if post { &mut chains.post } else { &mut chains.pre };
        if list.iter().any(|entry| &*entry.name == name) {
            return;
        }
        list.push(MiddlewareEntry {
            name: Arc::from(name),
            func,
        });
    }

    // Snapshot one chain so no lock is held while middleware runs.
    fn chain(&self, handler: &str, post: bool) -> Vec<MiddlewareEntry> {
        let chains = self.chains.read().unwrap_or_else(PoisonError::into_inner);
        chains
            .get(handler)
            .map(|c| if post { c.post.clone() } else { c.pre.clone() })
            .unwrap_or_default()
    }

    /// Run the pre-chain, returning the request the handler should receive.
    ///
    /// Context edits made by middleware are visible to later middleware in
    /// the same chain but do not outlive it.
    pub(crate) fn run_pre(
        &self,
        ctx: Context,
        request: ErasedRequest,
        handler: &str,
    ) -> ErasedRequest {
        let mut ctx = ctx;
        let mut request = request;
        for entry in self.chain(handler, false) {
            let (next_ctx, next_request, flow) = (entry.func)(ctx, request);
            ctx = next_ctx;
            request = next_request;
            if flow == Flow::Halt {
                break;
            }
        }
        request
    }

    /// Run the post-chain for its side effects; the output is discarded.
    pub(crate) fn run_post(&self, ctx: Context, request: ErasedRequest, handler: &str) {
        let mut ctx = ctx;
        let mut request = request;
        for entry in self.chain(handler, true) {
            let (next_ctx, next_request, flow) = (entry.func)(ctx, request);
            ctx = next_ctx;
            request = next_request;
            if flow == Flow::Halt {
                return;
            }
        }
    }
}

/// Fluent handle for attaching middleware to a freshly registered handler.
///
/// Returned by the mediator's registration methods:
///
/// ```rust,ignore
/// mediator
///     .register_command_handler::<CreateUser, _>(CreateUserHandler)
///     .pre("validate", validate_input)
///     .post("audit", audit_log);
/// ```
pub struct MiddlewareBuilder<'a> {
    set: &'a MiddlewareSet,
    handler: Arc<str>,
}

impl<'a> MiddlewareBuilder<'a> {
    pub(crate) fn new(set: &'a MiddlewareSet, handler: Arc<str>) -> Self {
        Self { set, handler }
    }

    /// Append a named middleware to the handler's pre-chain.
    ///
    /// Re-adding an existing name is a no-op.
    pub fn pre<F>(self, name: impl AsRef<str>, func: F) -> Self
    where
        F: Fn(Context, ErasedRequest) -> (Context, ErasedRequest, Flow) + Send + Sync + 'static,
    {
        self.set
            .add(&self.handler, name.as_ref(), Arc::new(func), false);
        self
    }

    /// Append a named middleware to the handler's post-chain.
    ///
    /// Post-middleware runs after the handler returns, for side effects
    /// only; it cannot rewrite the response the caller receives.
    pub fn post<F>(self, name: impl AsRef<str>, func: F) -> Self
    where
        F: Fn(Context, ErasedRequest) -> (Context, ErasedRequest, Flow) + Send + Sync + 'static,
    {
        self.set
            .add(&self.handler, name.as_ref(), Arc::new(func), true);
        self
    }

    /// The name of the handler this builder attaches middleware to.
    pub fn handler_name(&self) -> &str {
        &self.handler
    }
}

/// Lift a typed middleware function to the erased signature.
///
/// The returned middleware downcasts the request to `T`, applies `func`,
/// and re-erases the result. Requests of any other type pass through
/// untouched with [`Flow::Continue`].
pub fn typed<T, F>(
    func: F,
) -> impl Fn(Context, ErasedRequest) -> (Context, ErasedRequest, Flow) + Send + Sync + 'static
where
    T: Message + Clone,
    F: Fn(Context, T) -> (Context, T, Flow) + Send + Sync + 'static,
{
    move |ctx, request| match request.downcast_ref::<T>() {
        Some(value) => {
            let (ctx, value, flow) = func(ctx, value.clone());
            (ctx, Arc::new(value) as ErasedRequest, flow)
        }
        None => (ctx, request, Flow::Continue),
    }
}

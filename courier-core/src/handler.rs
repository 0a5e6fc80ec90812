//! Handler traits and the type-erasure boundary.
//!
//! Callers implement the statically typed [`RequestHandler`] and
//! [`EventHandler`] traits. The registry, however, must store heterogeneous
//! handlers in one map, so each handler is wrapped into an object-safe
//! `Dyn*` companion with a uniform erased signature:
//!
//! ```text
//! (Context, ErasedRequest) -> (ErasedResponse, Error)
//! ```
//!
//! Narrowing and widening happen at exactly two points: the wrappers in this
//! module (registration boundary) and the generic dispatch call site, which
//! downcasts the erased response back to the caller's expected type.
//!
//! # Static vs dynamic dispatch
//!
//! The typed traits use native `async fn` futures for zero-cost static
//! dispatch; the `Dyn*` companions box the future for storage in registries.

use crate::context::Context;
use crate::error::{BoxError, DispatchError};
use crate::message::Message;
use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

/// A request or event with its concrete type erased.
///
/// Requests travel through the middleware chain erased and shared, so the
/// post-chain can still observe the value after the handler consumed a copy.
pub type ErasedRequest = Arc<dyn Any + Send + Sync>;

/// A handler response with its concrete type erased.
pub type ErasedResponse = Box<dyn Any + Send>;

/// A handler for a command or query.
///
/// Commands and queries are mechanically identical; the distinction is the
/// caller's intent (write vs. read). One handler serves exactly one request
/// type and declares its response type via the associated type.
///
/// # Example
///
/// ```rust,ignore
/// struct GreetHandler;
///
/// impl RequestHandler<Greet> for GreetHandler {
///     type Response = String;
///
///     async fn handle(&self, _ctx: Context, request: Greet) -> Result<String, BoxError> {
///         Ok(format!("hello, {}", request.name))
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle requests of type `{Req}`",
    label = "missing `RequestHandler<{Req}>` implementation",
    note = "Request handlers must implement `handle` for the request type `{Req}`."
)]
pub trait RequestHandler<Req: Message>: Send + Sync + 'static {
    /// The response produced for this request type.
    type Response: Send + 'static;

    /// Executes the handler logic.
    fn handle(
        &self,
        ctx: Context,
        request: Req,
    ) -> impl Future<Output = Result<Self::Response, BoxError>> + Send;
}

// Blanket impl for closures
impl<F, Req, Resp, Fut> RequestHandler<Req> for F
where
    Req: Message,
    Resp: Send + 'static,
    F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, BoxError>> + Send,
{
    type Response = Resp;

    fn handle(
        &self,
        ctx: Context,
        request: Req,
    ) -> impl Future<Output = Result<Resp, BoxError>> + Send {
        (self)(ctx, request)
    }
}

/// A handler participating in the fan-out for one event type.
///
/// Unlike request handlers, any number of event handlers may be registered
/// for the same event type; each receives its own clone of the event.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle events of type `{E}`",
    label = "missing `EventHandler<{E}>` implementation",
    note = "Event handlers must implement `handle` for the event type `{E}`."
)]
pub trait EventHandler<E: Message>: Send + Sync + 'static {
    /// Reacts to a published event.
    fn handle(&self, ctx: Context, event: E)
    -> impl Future<Output = Result<(), BoxError>> + Send;
}

// Blanket impl for closures
impl<F, E, Fut> EventHandler<E> for F
where
    E: Message,
    F: Fn(Context, E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    fn handle(&self, ctx: Context, event: E) -> impl Future<Output = Result<(), BoxError>> + Send {
        (self)(ctx, event)
    }
}

/// Object-safe, type-erased version of [`RequestHandler`].
///
/// This is the uniform signature stored in the registry. Use
/// [`RequestHandlerWrapper`] to obtain one from a typed handler.
pub trait DynRequestHandler: Send + Sync + 'static {
    /// Invoke the handler with an erased request (dynamic dispatch version).
    fn handle_erased<'a>(
        &'a self,
        ctx: Context,
        request: ErasedRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ErasedResponse, DispatchError>> + Send + 'a>>;
}

/// Object-safe, type-erased version of [`EventHandler`].
pub trait DynEventHandler: Send + Sync + 'static {
    /// Invoke the handler with an erased event (dynamic dispatch version).
    fn handle_erased<'a>(
        &'a self,
        ctx: Context,
        event: ErasedRequest,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;
}

/// Adapter that narrows an erased request back to `Req` and widens the
/// response, turning a typed [`RequestHandler`] into a [`DynRequestHandler`].
pub struct RequestHandlerWrapper<Req, H> {
    handler: H,
    _marker: PhantomData<fn(Req)>,
}

impl<Req, H> RequestHandlerWrapper<Req, H>
where
    Req: Message + Clone,
    H: RequestHandler<Req>,
{
    /// Wrap a typed handler for storage behind the erased signature.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<Req, H> DynRequestHandler for RequestHandlerWrapper<Req, H>
where
    Req: Message + Clone,
    H: RequestHandler<Req>,
{
    fn handle_erased<'a>(
        &'a self,
        ctx: Context,
        request: ErasedRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ErasedResponse, DispatchError>> + Send + 'a>> {
        Box::pin(async move {
            let request = match request.downcast::<Req>() {
                // Skip the clone when the chain kept us as the sole owner.
                Ok(owned) => Arc::try_unwrap(owned).unwrap_or_else(|shared| (*shared).clone()),
                Err(_) => {
                    return Err(DispatchError::RequestTypeMismatch {
                        expected: std::any::type_name::<Req>(),
                    });
                }
            };
            let response = self
                .handler
                .handle(ctx, request)
                .await
                .map_err(DispatchError::Handler)?;
            Ok(Box::new(response) as ErasedResponse)
        })
    }
}

/// Adapter that narrows an erased event back to `E`, turning a typed
/// [`EventHandler`] into a [`DynEventHandler`].
pub struct EventHandlerWrapper<E, H> {
    handler: H,
    _marker: PhantomData<fn(E)>,
}

impl<E, H> EventHandlerWrapper<E, H>
where
    E: Message + Clone,
    H: EventHandler<E>,
{
    /// Wrap a typed event handler for storage behind the erased signature.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<E, H> DynEventHandler for EventHandlerWrapper<E, H>
where
    E: Message + Clone,
    H: EventHandler<E>,
{
    fn handle_erased<'a>(
        &'a self,
        ctx: Context,
        event: ErasedRequest,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(async move {
            let event = match event.downcast_ref::<E>() {
                Some(event) => event.clone(),
                None => {
                    return Err(Box::new(DispatchError::RequestTypeMismatch {
                        expected: std::any::type_name::<E>(),
                    }) as BoxError);
                }
            };
            self.handler.handle(ctx, event).await
        })
    }
}

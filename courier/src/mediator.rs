//! The mediator: registration surface, dispatch engine and event bus.
//!
//! A [`Mediator`] is an explicit object constructed once during application
//! setup and handed to callers by reference or `Arc`; there is no
//! process-wide singleton. Registration and dispatch are both safe to call
//! concurrently, and no internal lock is held across a handler invocation.

use crate::middleware::{MiddlewareBuilder, MiddlewareSet};
use crate::registry::{EventEntry, HandlerRegistry, RequestEntry};
use courier_core::{
    AggregateError, Context, DispatchError, ErasedRequest, EventHandler, EventHandlerWrapper,
    HandlerFailure, Message, PublishError, RegistrationError, RequestHandler,
    RequestHandlerWrapper, TypeKey, key_of,
};
use std::marker::PhantomData;
use std::sync::Arc;

// Middleware chains are keyed by this name, and event entries are
// deduplicated by it, so it must be stable across calls for the same type.
fn handler_name<H>() -> &'static str {
    std::any::type_name::<H>().trim_start_matches('&')
}

/// A typed event handler prepared for registration under event type `E`.
///
/// Carrying the event type in a marker keeps [`Mediator::register_event_handlers`]
/// from accepting a handler for a different event shape.
pub struct EventRegistration<E> {
    pub(crate) entry: EventEntry,
    _marker: PhantomData<fn(E)>,
}

impl<E: Message + Clone> EventRegistration<E> {
    /// Prepare `handler`, named after its concrete type.
    pub fn new<H: EventHandler<E>>(handler: H) -> Self {
        Self::named(handler_name::<H>(), handler)
    }

    /// Prepare `handler` under an explicit name.
    ///
    /// Useful for closures, whose derived names are opaque, and whenever two
    /// instances of the same handler type must be registered side by side.
    pub fn named<H: EventHandler<E>>(name: impl AsRef<str>, handler: H) -> Self {
        Self {
            entry: EventEntry::new(
                Arc::from(name.as_ref()),
                Arc::new(EventHandlerWrapper::new(handler)),
            ),
            _marker: PhantomData,
        }
    }
}

/// In-process mediator for commands, queries and events.
///
/// ```rust,ignore
/// let mediator = Mediator::new();
/// mediator.register_command_handler::<Greet, _>(GreetHandler);
///
/// let ctx = Context::new();
/// let reply: String = mediator.send_command(&ctx, Greet { name: "Ana".into() }).await?;
/// ```
#[derive(Default)]
pub struct Mediator {
    registry: HandlerRegistry,
    middleware: MiddlewareSet,
}

impl Mediator {
    /// Create a mediator with no registrations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the single handler for command type `Req`.
    ///
    /// Registering a second handler for the same request type replaces the
    /// first (last-write-wins). The returned builder attaches middleware to
    /// this handler.
    pub fn register_command_handler<Req, H>(&self, handler: H) -> MiddlewareBuilder<'_>
    where
        Req: Message + Clone,
        H: RequestHandler<Req>,
    {
        self.register_request_handler::<Req, H>(handler)
    }

    /// Register the single handler for query type `Req`.
    ///
    /// Queries and commands share one registry and one dispatch algorithm;
    /// the distinction is caller intent, not mechanics.
    pub fn register_query_handler<Req, H>(&self, handler: H) -> MiddlewareBuilder<'_>
    where
        Req: Message + Clone,
        H: RequestHandler<Req>,
    {
        self.register_request_handler::<Req, H>(handler)
    }

    fn register_request_handler<Req, H>(&self, handler: H) -> MiddlewareBuilder<'_>
    where
        Req: Message + Clone,
        H: RequestHandler<Req>,
    {
        let name: Arc<str> = Arc::from(handler_name::<H>());
        let entry = RequestEntry::new(
            TypeKey::of::<Req>(),
            Arc::clone(&name),
            std::any::type_name::<H::Response>(),
            Arc::new(RequestHandlerWrapper::new(handler)),
        );
        self.registry.register_single(entry);
        MiddlewareBuilder::new(&self.middleware, name)
    }

    /// Merge a batch of handlers into the fan-out set for event type `E`.
    ///
    /// Handlers whose name is already registered for `E` are silently
    /// skipped, so repeated registration is idempotent.
    pub fn register_event_handlers<E>(
        &self,
        handlers: impl IntoIterator<Item = EventRegistration<E>>,
    ) -> Result<(), RegistrationError>
    where
        E: Message + Clone,
    {
        let entries: Vec<EventEntry> = handlers.into_iter().map(|r| r.entry).collect();
        if entries.is_empty() {
            return Err(RegistrationError::Invalid(
                "no event handlers supplied".into(),
            ));
        }
        self.registry.register_many(TypeKey::of::<E>(), entries);
        Ok(())
    }

    /// Convenience for registering a single event handler.
    pub fn register_event_handler<E, H>(&self, handler: H) -> Result<(), RegistrationError>
    where
        E: Message + Clone,
        H: EventHandler<E>,
    {
        self.register_event_handlers([EventRegistration::<E>::new(handler)])
    }

    /// Dispatch a command to its registered handler.
    ///
    /// `Resp` is the response type the caller expects; if the registered
    /// handler produces a different type the call fails with
    /// [`DispatchError::ResponseTypeMismatch`] rather than coercing.
    pub async fn send_command<Resp, C>(&self, ctx: &Context, command: C) -> Result<Resp, DispatchError>
    where
        Resp: Send + 'static,
        C: Message,
    {
        self.send(ctx, command).await
    }

    /// Dispatch a query to its registered handler.
    pub async fn send_query<Resp, Q>(&self, ctx: &Context, query: Q) -> Result<Resp, DispatchError>
    where
        Resp: Send + 'static,
        Q: Message,
    {
        self.send(ctx, query).await
    }

    // The single dispatch algorithm shared by commands and queries.
    async fn send<Resp, R>(&self, ctx: &Context, request: R) -> Result<Resp, DispatchError>
    where
        Resp: Send + 'static,
        R: Message,
    {
        let key = key_of(&request);
        let entry = self
            .registry
            .lookup_single(key)
            .ok_or(DispatchError::HandlerNotFound(key))?;

        let erased: ErasedRequest = Arc::new(request);
        let erased = self.middleware.run_pre(ctx.clone(), erased, entry.name());

        // The registry lock was released inside the lookup; nothing is held
        // across the handler await.
        let result = entry
            .handler()
            .handle_erased(ctx.clone(), Arc::clone(&erased))
            .await;

        // The post-chain runs even when the handler failed, for side
        // effects only.
        self.middleware.run_post(ctx.clone(), erased, entry.name());

        let raw = result?;
        match raw.downcast::<Resp>() {
            Ok(response) => Ok(*response),
            Err(_) => Err(DispatchError::ResponseTypeMismatch {
                expected: std::any::type_name::<Resp>(),
                actual: entry.response_type(),
            }),
        }
    }

    /// Fan an event out to every handler registered for its type.
    ///
    /// Fail-open: a failing handler never prevents the remaining handlers
    /// from running. All failures are collected in encounter order and
    /// returned as one [`AggregateError`]. No middleware applies to events.
    pub async fn publish<E>(&self, ctx: &Context, event: E) -> Result<(), PublishError>
    where
        E: Message,
    {
        let key = key_of(&event);
        let entries = self
            .registry
            .lookup_many(key)
            .ok_or(PublishError::NoHandlers(key))?;

        let erased: ErasedRequest = Arc::new(event);
        let mut failures = Vec::new();
        for entry in &entries {
            if let Err(error) = entry
                .handler()
                .handle_erased(ctx.clone(), Arc::clone(&erased))
                .await
            {
                failures.push(HandlerFailure::new(entry.name(), error));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AggregateError::new(failures).into())
        }
    }

    /// Whether any handler is registered for the type of `value`.
    pub fn is_registered<T: Message>(&self, value: &T) -> bool {
        self.registry.contains(key_of(value))
    }
}

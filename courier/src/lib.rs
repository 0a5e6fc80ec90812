//! # courier - In-Process Mediator
//!
//! `courier` routes **commands** and **queries** to exactly one handler and
//! fans **events** out to any number of handlers, without the caller ever
//! holding a reference to the handler implementation. Routing is by request
//! *shape*: a type-indexed registry stores handlers behind a uniform erased
//! invocation signature, and the caller's expected response type is
//! recovered at the dispatch call site.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::{Context, Mediator, RequestHandler};
//!
//! #[derive(Clone)]
//! struct Greet { name: String }
//! impl courier::Message for Greet {}
//!
//! struct GreetHandler;
//! impl RequestHandler<Greet> for GreetHandler {
//!     type Response = String;
//!     async fn handle(&self, _ctx: Context, req: Greet) -> Result<String, courier::BoxError> {
//!         Ok(format!("hello, {}", req.name))
//!     }
//! }
//!
//! let mediator = Mediator::new();
//! mediator.register_command_handler::<Greet, _>(GreetHandler);
//!
//! let ctx = Context::new();
//! let reply: String = mediator.send_command(&ctx, Greet { name: "Ana".into() }).await?;
//! ```
//!
//! ## Guarantees
//!
//! - Dispatch is strictly sequential per call: pre-middleware, handler,
//!   post-middleware, response downcast.
//! - Event fan-out is fail-open and aggregates failures in encounter order.
//! - Registration and dispatch are concurrency-safe; no internal lock is
//!   held across a handler invocation.
//! - Every failure is an error value; the engine never aborts the process.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod mediator;
pub mod middleware;
pub mod observe;
mod registry;
pub mod testing;

pub use courier_core::{
    // Errors
    AggregateError,
    BoxError,
    // Context
    Context,
    DispatchError,
    // Erasure boundary
    DynEventHandler,
    DynRequestHandler,
    ErasedRequest,
    ErasedResponse,
    // Handler traits
    EventHandler,
    EventHandlerWrapper,
    HandlerFailure,
    // Message
    Message,
    PublishError,
    RegistrationError,
    RequestHandler,
    RequestHandlerWrapper,
    // Type identity
    TypeKey,
    key_of,
};

pub use mediator::{EventRegistration, Mediator};
pub use middleware::{Flow, MiddlewareBuilder, MiddlewareFunc};
pub use registry::{EventEntry, HandlerRegistry, RequestEntry};

/// Prelude module - common imports for Courier.
///
/// # Usage
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Context, DispatchError, EventHandler, EventRegistration, Flow, Mediator,
        Message, PublishError, RequestHandler, TypeKey, key_of,
    };
}

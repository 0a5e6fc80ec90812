//! # courier-core
//!
//! Core traits for the Courier in-process mediator.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! extensions that don't need the full `courier` implementation.
//!
//! # Architecture
//!
//! Courier routes three kinds of messages without the caller holding a
//! reference to the handler implementation:
//!
//! - **Commands** — state-changing intents, routed to exactly one handler
//! - **Queries** — read-only intents, mechanically identical to commands
//! - **Events** — notifications fanned out to zero-to-many handlers
//!
//! The pieces defined here are the seams of that design:
//!
//! ## Identity ([`TypeKey`])
//!
//! A stable identifier derived from a request/event's concrete type. The
//! registry is indexed by it, so routing is "by shape", never by handler
//! reference.
//!
//! ## Typed handlers ([`RequestHandler`], [`EventHandler`])
//!
//! What users implement. Native `async fn` futures, statically typed
//! request and response.
//!
//! ## Erasure boundary ([`DynRequestHandler`], [`DynEventHandler`])
//!
//! Object-safe companions with a uniform `(Context, ErasedRequest)`
//! signature, letting one runtime registry store heterogeneous handlers.
//! The generic wrappers in [`handler`] are the only narrowing points.
//!
//! ## Context ([`Context`])
//!
//! A caller-provided typed value bag, threaded through middleware and
//! handlers unchanged. The engine never inspects it.
//!
//! # Error Types
//!
//! - [`DispatchError`] - Command/query dispatch failures
//! - [`PublishError`] - Event fan-out failures
//! - [`AggregateError`] - Collected fan-out handler failures
//! - [`RegistrationError`] - Malformed registrations

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod error;
pub mod handler;
mod key;
mod message;

// Re-exports
pub use context::Context;
pub use error::{
    AggregateError, BoxError, DispatchError, HandlerFailure, PublishError, RegistrationError,
};
pub use handler::{
    DynEventHandler, DynRequestHandler, ErasedRequest, ErasedResponse, EventHandler,
    EventHandlerWrapper, RequestHandler, RequestHandlerWrapper,
};
pub use key::{TypeKey, key_of};
pub use message::Message;

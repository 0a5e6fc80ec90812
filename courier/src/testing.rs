//! Testing utilities for Courier.
//!
//! This module provides ready-made handlers for asserting on dispatch and
//! fan-out behavior without writing bespoke fixtures.
//!
//! - [`RecordingEventHandler`]: records every event it receives
//! - [`CountingEventHandler`]: counts invocations across any event type
//! - [`FailingEventHandler`]: always fails with a fixed message
//! - [`EchoHandler`]: request handler that returns the request unchanged

use courier_core::{BoxError, Context, EventHandler, Message, RequestHandler};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// An event handler that records all events it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingEventHandler::<UserCreated>::new();
/// mediator.register_event_handler(recorder.clone())?;
///
/// mediator.publish(&ctx, UserCreated { id: 1 }).await?;
/// assert_eq!(recorder.count(), 1);
/// ```
pub struct RecordingEventHandler<E: Clone> {
    events: Arc<Mutex<Vec<E>>>,
    fail_with: Option<String>,
}

impl<E: Clone> RecordingEventHandler<E> {
    /// Create a recording handler that always succeeds.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// Create a recording handler that records, then fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(message.into()),
        }
    }

    /// Get a clone of the recorded events.
    pub fn events(&self) -> Vec<E> {
        self.events.lock().unwrap().clone()
    }

    /// Get the number of recorded events.
    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl<E: Clone> Default for RecordingEventHandler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Clone for RecordingEventHandler<E> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            fail_with: self.fail_with.clone(),
        }
    }
}

impl<E: Message + Clone> EventHandler<E> for RecordingEventHandler<E> {
    async fn handle(&self, _ctx: Context, event: E) -> Result<(), BoxError> {
        self.events.lock().unwrap().push(event);
        match &self.fail_with {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }
}

/// An event handler that counts invocations.
pub struct CountingEventHandler {
    count: Arc<AtomicUsize>,
}

impl CountingEventHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Default for CountingEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CountingEventHandler {
    fn clone(&self) -> Self {
        Self {
            count: self.count.clone(),
        }
    }
}

impl<E: Message> EventHandler<E> for CountingEventHandler {
    async fn handle(&self, _ctx: Context, _event: E) -> Result<(), BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// An event handler that always fails with a fixed message.
#[derive(Clone)]
pub struct FailingEventHandler {
    message: String,
}

impl FailingEventHandler {
    /// Create a handler failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<E: Message> EventHandler<E> for FailingEventHandler {
    async fn handle(&self, _ctx: Context, _event: E) -> Result<(), BoxError> {
        Err(self.message.clone().into())
    }
}

/// A request handler that echoes the request back as the response.
#[derive(Clone, Copy, Default)]
pub struct EchoHandler;

impl<Req: Message + Clone> RequestHandler<Req> for EchoHandler {
    type Response = Req;

    async fn handle(&self, _ctx: Context, request: Req) -> Result<Req, BoxError> {
        Ok(request)
    }
}

//! Message trait for request and event types.

/// A marker trait for commands, queries and events moved through the mediator.
///
/// Messages must be `Send + Sync + 'static` so they can be stored behind the
/// registry's type-erased entries and dispatched from any thread.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct CreateUser { name: String }
///
/// impl Message for CreateUser {}
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "All requests and events in Courier must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

// Common Message implementations
impl Message for () {}
impl Message for String {}
impl Message for &'static str {}
impl Message for bool {}
impl Message for i32 {}
impl Message for i64 {}
impl Message for u32 {}
impl Message for u64 {}
impl<T: Message> Message for Box<T> {}
impl<T: Message> Message for std::sync::Arc<T> {}
impl<T: Message> Message for Vec<T> {}
impl<T: Message> Message for Option<T> {}
impl<T: Message, E: Message> Message for Result<T, E> {}

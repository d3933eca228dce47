//! CalendarBackend trait definition.
//!
//! Every calendar integration the scheduler talks to implements
//! [`CalendarBackend`] so rooms can be served by any of them interchangeably.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::event::Event;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error returned across the backend boundary.
///
/// Backends box their own error type so callers can still `downcast_ref` to
/// it for inspection.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A calendar holding the events of a single room.
///
/// Implementations must abort in-flight work when `cancel` fires and report
/// that as an error rather than hanging.
pub trait CalendarBackend: Send + Sync {
    /// Short identifier of the backend kind (e.g. "teamup").
    fn name(&self) -> &str;

    /// Returns the events currently scheduled in the room.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the remote calendar cannot be read.
    fn get_events<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<Event>, BackendError>>;

    /// Schedules a new event in the room.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the event could not be created.
    fn create_event<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        event: Event,
    ) -> BoxFuture<'a, Result<(), BackendError>>;
}

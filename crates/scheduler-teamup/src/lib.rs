//! Teamup backend for the room scheduler.
//!
//! Maps the scheduler's [`Event`](scheduler_core::Event) onto the Teamup
//! calendar API. A room is a Teamup sub-calendar looked up by name on every
//! call; nothing is cached between calls.

pub mod client;
pub mod error;
pub mod types;

pub use client::{Identity, TeamupCalendar};
pub use error::TeamupError;
pub use types::{EventDraft, EventListResponse, RemoteEvent, Subcalendar, SubcalendarListResponse};

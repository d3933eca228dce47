//! Calendar-agnostic event model shared by every backend.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// An event on a room's calendar.
///
/// Times carry the offset the backend reported; no timezone conversion is
/// applied when moving events between the platform and a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        start_time: DateTime<FixedOffset>,
        end_time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            title: title.into(),
            start_time,
            end_time,
        }
    }

    /// Length of the event. Negative when the end precedes the start.
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

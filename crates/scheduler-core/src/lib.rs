//! Shared building blocks for the room scheduler.
//!
//! Holds the calendar-agnostic [`Event`] model, the [`CalendarBackend`] trait
//! every calendar integration implements, and configuration loading.

pub mod backend;
pub mod config;
pub mod event;

pub use backend::{BackendError, BoxFuture, CalendarBackend};
pub use config::{Config, ConfigValidationError, TeamupConfig, ValidationResult};
pub use event::Event;

use anyhow::Result;

/// Initialize logging for the scheduler binaries.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!("Scheduler core initialized");
    Ok(())
}

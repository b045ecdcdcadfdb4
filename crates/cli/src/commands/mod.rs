//! Command implementations.
//!
//! Every command renders into a `Write` so output can be asserted in tests.

pub mod cart;
pub mod categories;
pub mod products;

use std::io;

use shopfront_storefront::AppError;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Storefront operation failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// A store reported a failed load; details were logged when it failed.
    #[error("{0}")]
    Load(String),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] io::Error),
}

impl CommandError {
    /// Log the error, sending internal faults to Sentry.
    pub fn capture(&self) {
        match self {
            Self::App(e) => e.capture(),
            Self::Load(message) => tracing::error!(error = %message, "Command failed"),
            Self::Output(e) => tracing::warn!(error = %e, "Failed to write output"),
        }
    }
}

/// Result type for commands.
pub type Result<T> = std::result::Result<T, CommandError>;

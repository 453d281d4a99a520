//! Shared user interface components.

pub mod error;

pub use error::ErrorScreen;

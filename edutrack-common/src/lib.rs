//! # edutrack Common Library
//!
//! Shared code for the edutrack tracking crates:
//! - Event taxonomy (TrackedEvent, EventName, UserData, CustomData)
//! - Event builders with marketing defaults
//! - Route tracking descriptors
//! - Configuration loading
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
pub use events::{CustomData, EventName, TrackedEvent, UserData};

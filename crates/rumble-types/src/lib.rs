//! Shared domain types for the Rift Rumble project.

pub mod champions;
pub mod commentary;
pub mod config;
pub mod events;
pub mod moves;
pub mod tally;

mod errors;

pub use errors::{Result, RumbleError};

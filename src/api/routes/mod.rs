//! API route modules.

pub mod recording;
pub mod transcript;

//! Escalates recorded calls to a TaskRouter training queue when their
//! Conversational Intelligence analysis matches the "System Crash" model.
//!
//! The pipeline has two independently triggered stages:
//! - [`recording`]: gates recording status callbacks and requests a
//!   diarized transcript for eligible recordings.
//! - [`transcript`]: evaluates the finished analysis and creates the
//!   escalation task on a match.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod global;
pub mod intelligence;
pub mod recording;
pub mod remote;
pub mod taskrouter;
pub mod transcript;

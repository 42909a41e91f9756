//! Roster CLI - operator front end
//!
//! This crate provides the `roster` binary, the context wiring config,
//! store, engine and bus together, and plain-text rendering of replies.

pub mod commands;
pub mod context;
pub mod render;

pub use context::AppContext;

//! Shared types for the conversationbot crates: the error type, structured
//! trace events, and the TOML configuration model.

pub mod config;
pub mod error;
pub mod trace;

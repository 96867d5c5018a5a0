//! Core types for the scam honeypot
//!
//! This crate provides the conversation types shared by the engine,
//! report and server crates.

pub mod conversation;

pub use conversation::{Turn, TurnRole};

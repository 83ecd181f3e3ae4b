//! Cinescope - server-rendered TMDb browser with Trakt watch history
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod history;
pub mod render;
pub mod server;

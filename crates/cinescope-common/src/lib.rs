//! Shared types for cinescope.
//!
//! Holds the unified [`Error`] type that the API client crates and the server
//! funnel their failures into, and [`MediaKind`], the movie/show split used by
//! nearly every TMDb endpoint.

pub mod error;
pub mod kind;

pub use error::{Error, Result};
pub use kind::MediaKind;

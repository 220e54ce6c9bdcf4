//! The core of the glab OpenGL sandbox. This crate contains the CPU-side geometry types,
//! the GPU resource wrappers and the drawables the demos are built from.
//!
//! Nothing here creates a window: every wrapper talks to a [`abs::Driver`], which is either
//! a real `glow` context supplied by the client or a [`abs::RecordingDriver`] in tests.

pub mod abs;
pub mod config;
pub mod drawable;
pub mod error;
pub mod mesh;
pub mod render_state;
pub mod vertex;

pub use error::{Error, Result};

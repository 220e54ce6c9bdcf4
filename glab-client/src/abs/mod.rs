//! This module contains the platform layer of the client: the SDL2 window and the
//! OpenGL context the demos render into.

pub mod app;

pub use app::*;

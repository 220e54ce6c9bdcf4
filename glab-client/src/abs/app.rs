//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use glab_core::config::{GraphicsConfig, WindowConfig};
use sdl2::video::{FullscreenType, GLProfile, SwapInterval, WindowBuildError};
use thiserror::Error;

/// Failures while bringing up the window and its OpenGL context.
#[derive(Error, Debug)]
pub enum WindowInitError {
    #[error("failed to initialise SDL: {0}")]
    Sdl(String),
    #[error("failed to initialise the video subsystem: {0}")]
    Video(String),
    #[error("failed to create the window: {0}")]
    Window(#[from] WindowBuildError),
    #[error("failed to switch fullscreen mode: {0}")]
    Fullscreen(String),
    #[error("failed to create the OpenGL context: {0}")]
    Context(String),
    #[error("failed to create the event pump: {0}")]
    EventPump(String),
}

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Opens the window described by `window` with a core-profile context of the version
    /// requested in `graphics`. The size is ignored in fullscreen mode.
    pub fn new(window: &WindowConfig, graphics: &GraphicsConfig) -> Result<Self, WindowInitError> {
        let sdl = sdl2::init().map_err(WindowInitError::Sdl)?;
        let video_subsystem = sdl.video().map_err(WindowInitError::Video)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        gl_attr.set_context_version(graphics.gl_major, graphics.gl_minor);

        let (width, height) = if window.fullscreen {
            let display_mode = video_subsystem
                .current_display_mode(0)
                .map_err(WindowInitError::Video)?;
            (display_mode.w as u32, display_mode.h as u32)
        } else {
            (window.width, window.height)
        };

        let mut sdl_window = video_subsystem
            .window(&window.title, width, height)
            .opengl()
            .resizable()
            .position_centered()
            .build()?;
        if window.fullscreen {
            sdl_window
                .set_fullscreen(FullscreenType::Desktop)
                .map_err(WindowInitError::Fullscreen)?;
        }

        let gl_context = sdl_window
            .gl_create_context()
            .map_err(WindowInitError::Context)?;
        sdl_window
            .gl_make_current(&gl_context)
            .map_err(WindowInitError::Context)?;
        let interval = if window.vsync {
            SwapInterval::VSync
        } else {
            SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("Could not set swap interval: {e}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(WindowInitError::EventPump)?;

        log::info!(
            "Opened {}x{} window with an OpenGL {}.{} core context",
            width,
            height,
            graphics.gl_major,
            graphics.gl_minor
        );

        Ok(Self {
            sdl,
            video_subsystem,
            window: sdl_window,
            gl_context,
            gl: Arc::new(gl),
            event_pump,
        })
    }

    /// Drawable size in pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }
}

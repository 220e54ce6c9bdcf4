use std::sync::Arc;

use glab_core::{
    abs::{DriverRef, GlowDriver},
    config::GlabConfig,
    error::ConfigError,
    render_state::RenderState,
};
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
};
use thiserror::Error;

use crate::{
    abs::{App, WindowInitError},
    demos::{DemoContext, DemoMenu},
    gui::{EngineGui, GuiError},
};

mod abs;
mod demos;
mod gui;
mod logging;
mod other;

const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Error, Debug)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Window(#[from] WindowInitError),
    #[error(transparent)]
    Gui(#[from] GuiError),
}

fn main() {
    let loaded = GlabConfig::load();
    let level = loaded
        .as_ref()
        .map_or(log::LevelFilter::Info, |(config, _)| config.level_filter());
    if let Err(e) = logging::init(level) {
        eprintln!("failed to install logger: {e}");
        std::process::exit(-1);
    }

    let result = loaded.map_err(StartupError::from).and_then(|(config, path)| {
        match &path {
            Some(path) => log::info!("Loaded config from {}", path.display()),
            None => log::info!("No config file found, using defaults"),
        }
        run(&config)
    });

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(-1);
    }
}

fn run(config: &GlabConfig) -> Result<(), StartupError> {
    let mut app = App::new(&config.window, &config.graphics)?;
    let driver: DriverRef = Arc::new(GlowDriver::new(&app.gl));

    let mut window_size = app.drawable_size();
    let mut render_state = RenderState::new(&driver, &config.graphics);
    render_state.set_viewport(window_size.0, window_size.1);

    let mut gui = EngineGui::new(&app.gl, config.graphics.framework)?;
    let mut menu = DemoMenu::with_builtin_demos(DemoContext::new(&driver, config));

    let mut keyboard_state = other::KeyboardState::default();
    let mut mouse_state = other::MouseState::default();
    let mut last_frame_time = std::time::Instant::now();

    'running: loop {
        let now = std::time::Instant::now();
        let delta_time = now.duration_since(last_frame_time).as_secs_f32();
        last_frame_time = now;

        keyboard_state.begin_frame();
        mouse_state.begin_frame();

        for event in app.event_pump.poll_iter() {
            gui.handle_event(&event);
            match event {
                Event::Quit { .. } => break 'running,
                Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } if !gui.wants_keyboard() => break 'running,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => {
                    window_size = app.window.drawable_size();
                    render_state.set_viewport(window_size.0, window_size.1);
                }
                _ => {
                    if !gui.wants_pointer() {
                        mouse_state.handle_event(&event);
                    }
                    if !gui.wants_keyboard() {
                        keyboard_state.handle_event(&event);
                    }
                }
            }
        }

        let update_ctx =
            other::UpdateContext::new(&keyboard_state, &mouse_state, delta_time, window_size);
        menu.on_update(&update_ctx);

        // The GUI painter leaves depth testing and culling off.
        render_state.apply();
        render_state.set_clear_color(BACKGROUND);
        render_state.clear();
        menu.on_render(&mut render_state);

        gui.run(window_size, |ctx| {
            egui::Window::new("Demos")
                .default_pos([16.0, 16.0])
                .show(ctx, |ui| menu.on_gui_render(ui));
        });

        app.window.gl_swap_window();
    }

    log::info!("Shutting down");
    Ok(())
}

use std::collections::HashSet;

use glam::Vec2;
use sdl2::{event::Event, keyboard::Keycode, mouse::MouseButton};

/// The current state of the keyboard.
#[derive(Default)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
    pub pressed: HashSet<Keycode>,
    pub released: HashSet<Keycode>,
}

impl KeyboardState {
    /// Forgets the keys pressed and released during the previous frame.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    pub fn handle_event(&mut self, event: &Event) {
        match *event {
            Event::KeyDown {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => {
                self.down.insert(keycode);
                self.pressed.insert(keycode);
            }
            Event::KeyUp {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => {
                self.down.remove(&keycode);
                self.released.insert(keycode);
            }
            _ => {}
        }
    }
}

/// The current state of the mouse.
#[derive(Default)]
pub struct MouseState {
    pub position: Vec2,
    pub delta: Vec2,
    pub down: HashSet<MouseButton>,
    pub pressed: HashSet<MouseButton>,
    pub released: HashSet<MouseButton>,
    pub scroll_delta: Vec2,
}

impl MouseState {
    pub fn begin_frame(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
        self.pressed.clear();
        self.released.clear();
    }

    pub fn handle_event(&mut self, event: &Event) {
        match *event {
            Event::MouseMotion {
                x, y, xrel, yrel, ..
            } => {
                self.position = Vec2::new(x as f32, y as f32);
                self.delta += Vec2::new(xrel as f32, yrel as f32);
            }
            Event::MouseWheel { x, y, .. } => {
                self.scroll_delta += Vec2::new(x as f32, y as f32);
            }
            Event::MouseButtonDown { mouse_btn, .. } => {
                self.down.insert(mouse_btn);
                self.pressed.insert(mouse_btn);
            }
            Event::MouseButtonUp { mouse_btn, .. } => {
                self.down.remove(&mouse_btn);
                self.released.insert(mouse_btn);
            }
            _ => {}
        }
    }
}

/// Context handed to demos during the update phase.
pub struct UpdateContext<'a> {
    pub keyboard: &'a KeyboardState,
    pub mouse: &'a MouseState,
    pub delta_time: f32,
    /// Drawable size in pixels.
    pub window_size: (u32, u32),
}

impl<'a> UpdateContext<'a> {
    pub fn new(
        keyboard: &'a KeyboardState,
        mouse: &'a MouseState,
        delta_time: f32,
        window_size: (u32, u32),
    ) -> Self {
        Self {
            keyboard,
            mouse,
            delta_time,
            window_size,
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.window_size.0 as f32 / self.window_size.1.max(1) as f32
    }
}

//! The immediate-mode GUI harness.
//!
//! [`EngineGui`] feeds SDL2 events into an `egui` context and paints its output with the
//! painter of the configured graphics framework.

use std::{sync::Arc, time::Instant};

use egui::{Event, Modifiers, PointerButton, Pos2, RawInput, Rect, Vec2};
use glab_core::config::GraphicsFramework;
use sdl2::{event::Event as SdlEvent, keyboard::Keycode, keyboard::Mod, mouse::MouseButton};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuiError {
    #[error("failed to create the {framework:?} GUI painter: {reason}")]
    Painter {
        framework: GraphicsFramework,
        reason: String,
    },
}

pub struct EngineGui {
    ctx: egui::Context,
    painter: egui_glow::Painter,
    framework: GraphicsFramework,
    events: Vec<Event>,
    modifiers: Modifiers,
    pointer: Pos2,
    start: Instant,
}

impl EngineGui {
    pub fn new(gl: &Arc<glow::Context>, framework: GraphicsFramework) -> Result<Self, GuiError> {
        let painter = match framework {
            GraphicsFramework::OpenGl => egui_glow::Painter::new(Arc::clone(gl), "", None, false)
                .map_err(|e| GuiError::Painter {
                    framework,
                    reason: e.to_string(),
                })?,
        };
        log::debug!("GUI painter ready for {:?}", framework);

        Ok(Self {
            ctx: egui::Context::default(),
            painter,
            framework,
            events: Vec::new(),
            modifiers: Modifiers::default(),
            pointer: Pos2::ZERO,
            start: Instant::now(),
        })
    }

    pub fn framework(&self) -> GraphicsFramework {
        self.framework
    }

    /// Whether the last frame's GUI wants the mouse for itself.
    pub fn wants_pointer(&self) -> bool {
        self.ctx.wants_pointer_input()
    }

    pub fn wants_keyboard(&self) -> bool {
        self.ctx.wants_keyboard_input()
    }

    /// Queues an SDL event for the next GUI frame.
    pub fn handle_event(&mut self, event: &SdlEvent) {
        if let Some(event) = translate_event(event, &mut self.modifiers, &mut self.pointer) {
            self.events.push(event);
        }
    }

    /// Runs one GUI frame and paints it over the current framebuffer.
    pub fn run(&mut self, size: (u32, u32), build: impl FnMut(&egui::Context)) {
        let input = RawInput {
            screen_rect: Some(Rect::from_min_size(
                Pos2::ZERO,
                Vec2::new(size.0 as f32, size.1 as f32),
            )),
            time: Some(self.start.elapsed().as_secs_f64()),
            modifiers: self.modifiers,
            events: std::mem::take(&mut self.events),
            ..Default::default()
        };

        let output = self.ctx.run(input, build);
        let primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        self.painter.paint_and_update_textures(
            [size.0, size.1],
            output.pixels_per_point,
            &primitives,
            &output.textures_delta,
        );
    }
}

impl Drop for EngineGui {
    fn drop(&mut self) {
        self.painter.destroy();
    }
}

fn translate_modifiers(keymod: Mod) -> Modifiers {
    let ctrl = keymod.intersects(Mod::LCTRLMOD | Mod::RCTRLMOD);
    Modifiers {
        alt: keymod.intersects(Mod::LALTMOD | Mod::RALTMOD),
        ctrl,
        shift: keymod.intersects(Mod::LSHIFTMOD | Mod::RSHIFTMOD),
        mac_cmd: false,
        command: ctrl,
    }
}

fn translate_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

fn translate_key(keycode: Keycode) -> Option<egui::Key> {
    use egui::Key;

    Some(match keycode {
        Keycode::Backspace => Key::Backspace,
        Keycode::Delete => Key::Delete,
        Keycode::Return | Keycode::KpEnter => Key::Enter,
        Keycode::Tab => Key::Tab,
        Keycode::Escape => Key::Escape,
        Keycode::Left => Key::ArrowLeft,
        Keycode::Right => Key::ArrowRight,
        Keycode::Up => Key::ArrowUp,
        Keycode::Down => Key::ArrowDown,
        Keycode::Home => Key::Home,
        Keycode::End => Key::End,
        Keycode::A => Key::A,
        Keycode::C => Key::C,
        Keycode::V => Key::V,
        Keycode::X => Key::X,
        _ => return None,
    })
}

fn translate_event(event: &SdlEvent, modifiers: &mut Modifiers, pointer: &mut Pos2) -> Option<Event> {
    match *event {
        SdlEvent::MouseMotion { x, y, .. } => {
            *pointer = Pos2::new(x as f32, y as f32);
            Some(Event::PointerMoved(*pointer))
        }
        SdlEvent::MouseButtonDown { mouse_btn, x, y, .. }
        | SdlEvent::MouseButtonUp { mouse_btn, x, y, .. } => {
            *pointer = Pos2::new(x as f32, y as f32);
            Some(Event::PointerButton {
                pos: *pointer,
                button: translate_button(mouse_btn)?,
                pressed: matches!(event, SdlEvent::MouseButtonDown { .. }),
                modifiers: *modifiers,
            })
        }
        SdlEvent::MouseWheel { x, y, .. } => Some(Event::MouseWheel {
            unit: egui::MouseWheelUnit::Line,
            delta: Vec2::new(x as f32, y as f32),
            modifiers: *modifiers,
        }),
        SdlEvent::TextInput { ref text, .. } => Some(Event::Text(text.clone())),
        SdlEvent::KeyDown {
            keycode: Some(keycode),
            keymod,
            repeat,
            ..
        }
        | SdlEvent::KeyUp {
            keycode: Some(keycode),
            keymod,
            repeat,
            ..
        } => {
            *modifiers = translate_modifiers(keymod);
            Some(Event::Key {
                key: translate_key(keycode)?,
                physical_key: None,
                pressed: matches!(event, SdlEvent::KeyDown { .. }),
                repeat,
                modifiers: *modifiers,
            })
        }
        SdlEvent::Window {
            win_event: sdl2::event::WindowEvent::Leave,
            ..
        } => Some(Event::PointerGone),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_events_track_pointer() {
        let mut modifiers = Modifiers::default();
        let mut pointer = Pos2::ZERO;

        let moved = SdlEvent::MouseMotion {
            timestamp: 0,
            window_id: 0,
            which: 0,
            mousestate: sdl2::mouse::MouseState::from_sdl_state(0),
            x: 10,
            y: 20,
            xrel: 1,
            yrel: 1,
        };
        assert_eq!(
            translate_event(&moved, &mut modifiers, &mut pointer),
            Some(Event::PointerMoved(Pos2::new(10.0, 20.0)))
        );

        let click = SdlEvent::MouseButtonDown {
            timestamp: 0,
            window_id: 0,
            which: 0,
            mouse_btn: MouseButton::Left,
            clicks: 1,
            x: 30,
            y: 40,
        };
        assert_eq!(
            translate_event(&click, &mut modifiers, &mut pointer),
            Some(Event::PointerButton {
                pos: Pos2::new(30.0, 40.0),
                button: PointerButton::Primary,
                pressed: true,
                modifiers: Modifiers::default(),
            })
        );
        assert_eq!(pointer, Pos2::new(30.0, 40.0));
    }

    #[test]
    fn test_keys_carry_modifiers() {
        let mut modifiers = Modifiers::default();
        let mut pointer = Pos2::ZERO;
        let key = SdlEvent::KeyDown {
            timestamp: 0,
            window_id: 0,
            keycode: Some(Keycode::C),
            scancode: None,
            keymod: Mod::LCTRLMOD,
            repeat: false,
        };
        let Some(Event::Key {
            key, modifiers: m, ..
        }) = translate_event(&key, &mut modifiers, &mut pointer)
        else {
            panic!("expected a key event");
        };
        assert_eq!(key, egui::Key::C);
        assert!(m.ctrl && m.command);

        let unknown = SdlEvent::KeyDown {
            timestamp: 0,
            window_id: 0,
            keycode: Some(Keycode::F7),
            scancode: None,
            keymod: Mod::NOMOD,
            repeat: false,
        };
        assert_eq!(translate_event(&unknown, &mut modifiers, &mut pointer), None);
    }
}

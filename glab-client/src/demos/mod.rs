//! Module providing the [`Demo`] trait, the [`DemoMenu`] and all demo implementations.
//!
//! Exactly one demo is active at a time. The menu lists every registered demo; picking one
//! builds it from its factory, and the back button drops it again.

use std::path::PathBuf;

use glab_core::{abs::DriverRef, config::GlabConfig, render_state::RenderState};

use crate::other::UpdateContext;

pub mod clear_color;
pub mod color_quad;
pub mod phong;
pub mod texture2d;

/// Everything a demo factory needs to build a demo.
#[derive(Clone)]
pub struct DemoContext {
    pub driver: DriverRef,
    pub config: GlabConfig,
}

impl DemoContext {
    pub fn new(driver: &DriverRef, config: &GlabConfig) -> Self {
        Self {
            driver: DriverRef::clone(driver),
            config: config.clone(),
        }
    }

    /// Resolves a path below the configured assets directory.
    pub fn asset(&self, relative: &str) -> PathBuf {
        self.config.asset(relative)
    }

    /// Vertex and fragment shader paths of `assets/shaders/<name>/`.
    pub fn shader_paths(&self, name: &str) -> (PathBuf, PathBuf) {
        let dir = self.config.asset("shaders").join(name);
        (dir.join("vert.glsl"), dir.join("frag.glsl"))
    }
}

/// A self-contained example driven by the frame loop.
pub trait Demo {
    /// Advances the demo's state.
    fn on_update(&mut self, _ctx: &UpdateContext) {}

    /// Draws the demo. The framebuffer has already been cleared.
    fn on_render(&mut self, _render_state: &mut RenderState) {}

    /// Draws the demo's controls.
    fn on_gui_render(&mut self, _ui: &mut egui::Ui) {}
}

pub type DemoFactory = Box<dyn Fn(&DemoContext) -> glab_core::Result<Box<dyn Demo>>>;

struct Entry {
    name: String,
    factory: DemoFactory,
}

struct ActiveDemo {
    name: String,
    demo: Box<dyn Demo>,
}

/// Lists the registered demos and runs the selected one.
pub struct DemoMenu {
    context: DemoContext,
    entries: Vec<Entry>,
    active: Option<ActiveDemo>,
    last_error: Option<String>,
}

impl DemoMenu {
    pub fn new(context: DemoContext) -> Self {
        Self {
            context,
            entries: Vec::new(),
            active: None,
            last_error: None,
        }
    }

    /// A menu with every demo of the sandbox registered.
    pub fn with_builtin_demos(context: DemoContext) -> Self {
        let mut menu = Self::new(context);
        menu.register("Clear Color", |_| Ok(Box::new(clear_color::ClearColor::default())));
        menu.register("Color Quad", |ctx| Ok(Box::new(color_quad::ColorQuad::new(ctx)?)));
        menu.register("Texture 2D", |ctx| Ok(Box::new(texture2d::Texture2D::new(ctx)?)));
        menu.register("Phong Lighting", |ctx| {
            Ok(Box::new(phong::PhongLighting::new(ctx)?))
        });
        menu
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&DemoContext) -> glab_core::Result<Box<dyn Demo>> + 'static,
    ) {
        let name = name.into();
        log::debug!("Registering demo {name}");
        self.entries.push(Entry {
            name,
            factory: Box::new(factory),
        });
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Name of the running demo, `None` while the menu is shown.
    pub fn active(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.name.as_str())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Builds and activates the demo registered as `name`.
    ///
    /// When construction fails the error is logged and kept for display, and the menu
    /// stays active.
    pub fn open(&mut self, name: &str) -> bool {
        let Some(entry) = self.entries.iter().find(|entry| entry.name == name) else {
            log::warn!("No demo named {name}");
            return false;
        };

        // The previous demo releases its GPU resources before the next one allocates.
        self.active = None;
        match (entry.factory)(&self.context) {
            Ok(demo) => {
                log::info!("Opened demo {name}");
                self.active = Some(ActiveDemo {
                    name: entry.name.clone(),
                    demo,
                });
                self.last_error = None;
                true
            }
            Err(e) => {
                log::error!("Failed to open demo {name}: {e}");
                self.last_error = Some(format!("{name}: {e}"));
                false
            }
        }
    }

    /// Drops the running demo and returns to the menu.
    pub fn back(&mut self) {
        if let Some(active) = self.active.take() {
            log::info!("Closed demo {}", active.name);
        }
    }

    pub fn on_update(&mut self, ctx: &UpdateContext) {
        if let Some(active) = &mut self.active {
            active.demo.on_update(ctx);
        }
    }

    pub fn on_render(&mut self, render_state: &mut RenderState) {
        if let Some(active) = &mut self.active {
            active.demo.on_render(render_state);
        }
    }

    pub fn on_gui_render(&mut self, ui: &mut egui::Ui) {
        if let Some(active) = &mut self.active {
            let back = ui.button("<- Back").clicked();
            ui.separator();
            active.demo.on_gui_render(ui);
            if back {
                self.back();
            }
            return;
        }

        let mut selected = None;
        for entry in &self.entries {
            if ui.button(&entry.name).clicked() {
                selected = Some(entry.name.clone());
            }
        }
        if let Some(error) = &self.last_error {
            ui.colored_label(egui::Color32::LIGHT_RED, error);
        }
        if let Some(name) = selected {
            self.open(&name);
        }
    }
}

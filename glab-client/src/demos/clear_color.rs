//! Fills the framebuffer with an editable color.

use glab_core::render_state::RenderState;

use super::Demo;

pub struct ClearColor {
    color: [f32; 4],
}

impl Default for ClearColor {
    fn default() -> Self {
        Self {
            color: [0.2, 0.3, 0.8, 1.0],
        }
    }
}

impl ClearColor {
    pub fn color(&self) -> [f32; 4] {
        self.color
    }
}

impl Demo for ClearColor {
    fn on_render(&mut self, render_state: &mut RenderState) {
        render_state.set_clear_color(self.color);
        render_state.clear();
    }

    fn on_gui_render(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Clear Color");
            ui.color_edit_button_rgba_unmultiplied(&mut self.color);
        });
    }
}

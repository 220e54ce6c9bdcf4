//! A textured cube with adjustable field of view, translation and rotation.

use glab_core::{
    drawable::{Cube, CubeLayout},
    render_state::RenderState,
};
use glam::{Mat4, Vec3};

use super::{Demo, DemoContext};

pub struct Texture2D {
    cube: Cube,
    fov: f32,
    translation: Vec3,
    rotation: f32,
    aspect_ratio: f32,
}

impl Texture2D {
    pub fn new(ctx: &DemoContext) -> glab_core::Result<Self> {
        let mut cube = Cube::new(&ctx.driver, CubeLayout::PositionTex)?;
        let (vert, frag) = ctx.shader_paths("texture2d");
        cube.set_shaders(vert, frag)?;
        cube.set_texture(ctx.asset("images/container.ppm"))?;

        Ok(Self {
            cube,
            fov: 45.0,
            translation: Vec3::ZERO,
            rotation: 0.0,
            aspect_ratio: ctx.config.window.aspect_ratio(),
        })
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_translation(self.translation) * Mat4::from_rotation_y(self.rotation.to_radians())
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0))
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect_ratio, 0.1, 100.0)
    }
}

impl Demo for Texture2D {
    fn on_update(&mut self, ctx: &crate::other::UpdateContext) {
        self.aspect_ratio = ctx.aspect_ratio();
    }

    fn on_render(&mut self, _render_state: &mut RenderState) {
        self.cube.bind_texture(0);
        if let Err(e) = self.cube.use_shader() {
            log::error!("{e}");
            return;
        }
        if let Some(shader) = self.cube.shader() {
            shader.set_uniform("texture1", 0);
            shader.set_uniform("model", self.model());
            shader.set_uniform("view", self.view());
            shader.set_uniform("projection", self.projection());
        }
        self.cube.draw();
    }

    fn on_gui_render(&mut self, ui: &mut egui::Ui) {
        ui.add(egui::Slider::new(&mut self.fov, 1.0..=179.0).text("FOV"));
        ui.label("Cube Translation");
        ui.horizontal(|ui| {
            for value in [
                &mut self.translation.x,
                &mut self.translation.y,
                &mut self.translation.z,
            ] {
                ui.add(egui::DragValue::new(value).speed(0.01).range(-1.0..=1.0));
            }
        });
        ui.add(egui::Slider::new(&mut self.rotation, 0.0..=360.0).text("Cube Rotation Y-axis"));
    }
}

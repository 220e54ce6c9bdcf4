//! A Phong-lit cube next to a small unlit cube marking the light.

use glab_core::{
    drawable::{Cube, CubeLayout},
    render_state::RenderState,
};
use glam::{Mat4, Vec2, Vec3};
use sdl2::{keyboard::Keycode, mouse::MouseButton};

use super::{Demo, DemoContext};
use crate::other::UpdateContext;

/// Radians per pixel of mouse drag.
const DRAG_SENSITIVITY: f32 = 0.01;
/// World units per scroll line.
const ZOOM_STEP: f32 = 0.25;
/// World units per second while a light key is held.
const LIGHT_SPEED: f32 = 1.5;

/// Keys moving the light, with the direction each one moves it in.
const LIGHT_KEYS: [(Keycode, Vec3); 6] = [
    (Keycode::Left, Vec3::NEG_X),
    (Keycode::Right, Vec3::X),
    (Keycode::Up, Vec3::NEG_Z),
    (Keycode::Down, Vec3::Z),
    (Keycode::PageUp, Vec3::Y),
    (Keycode::PageDown, Vec3::NEG_Y),
];

/// A camera circling the origin at a fixed height, always looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub radius: f32,
    pub height: f32,
    /// Angle around the Y axis in radians. Zero puts the camera on +Z.
    pub angle: f32,
    /// Radians per second.
    pub speed: f32,
    pub fov: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: 3.0,
            height: 0.5,
            angle: 0.0,
            speed: 0.5,
            fov: 45.0,
        }
    }
}

impl OrbitCamera {
    pub fn advance(&mut self, delta_time: f32) {
        self.angle = (self.angle + self.speed * delta_time).rem_euclid(std::f32::consts::TAU);
    }

    /// Turns the camera around the target and moves it up or down, following a mouse drag.
    pub fn drag(&mut self, delta: Vec2) {
        self.angle = (self.angle - delta.x * DRAG_SENSITIVITY).rem_euclid(std::f32::consts::TAU);
        self.height = (self.height + delta.y * DRAG_SENSITIVITY * self.radius).clamp(-5.0, 5.0);
    }

    pub fn zoom(&mut self, lines: f32) {
        self.radius = (self.radius - lines * ZOOM_STEP).clamp(1.5, 10.0);
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.radius * self.angle.sin(),
            self.height,
            self.radius * self.angle.cos(),
        )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect_ratio, 0.1, 100.0)
    }
}

pub struct PhongLighting {
    object: Cube,
    lamp: Cube,
    camera: OrbitCamera,
    orbit: bool,
    aspect_ratio: f32,
    object_color: [f32; 3],
    light_color: [f32; 3],
    light_position: Vec3,
    ambient_strength: f32,
    specular_strength: f32,
    shininess: f32,
}

impl PhongLighting {
    pub fn new(ctx: &DemoContext) -> glab_core::Result<Self> {
        let mut object = Cube::new(&ctx.driver, CubeLayout::PositionNormal)?;
        let (vert, frag) = ctx.shader_paths("phong");
        object.set_shaders(vert, frag)?;

        let mut lamp = Cube::new(&ctx.driver, CubeLayout::PositionOnly)?;
        let (vert, frag) = ctx.shader_paths("lamp");
        lamp.set_shaders(vert, frag)?;

        Ok(Self {
            object,
            lamp,
            camera: OrbitCamera::default(),
            orbit: true,
            aspect_ratio: ctx.config.window.aspect_ratio(),
            object_color: [1.0, 0.5, 0.31],
            light_color: [1.0, 1.0, 1.0],
            light_position: Vec3::new(1.2, 1.0, 2.0),
            ambient_strength: 0.1,
            specular_strength: 0.5,
            shininess: 32.0,
        })
    }

    fn lamp_model(&self) -> Mat4 {
        Mat4::from_translation(self.light_position) * Mat4::from_scale(Vec3::splat(0.2))
    }
}

impl Demo for PhongLighting {
    fn on_update(&mut self, ctx: &UpdateContext) {
        self.aspect_ratio = ctx.aspect_ratio();

        if ctx.keyboard.pressed.contains(&Keycode::Space) {
            self.orbit = !self.orbit;
        }
        let direction: Vec3 = LIGHT_KEYS
            .iter()
            .filter(|(key, _)| ctx.keyboard.down.contains(key))
            .map(|(_, direction)| *direction)
            .sum();
        self.light_position += direction * LIGHT_SPEED * ctx.delta_time;

        if ctx.mouse.down.contains(&MouseButton::Left) {
            self.camera.drag(ctx.mouse.delta);
        } else if self.orbit {
            self.camera.advance(ctx.delta_time);
        }
        self.camera.zoom(ctx.mouse.scroll_delta.y);
    }

    fn on_render(&mut self, _render_state: &mut RenderState) {
        let view = self.camera.view();
        let projection = self.camera.projection(self.aspect_ratio);
        let light_color = Vec3::from_array(self.light_color);

        if let Err(e) = self.object.use_shader() {
            log::error!("{e}");
            return;
        }
        if let Some(shader) = self.object.shader() {
            shader.set_uniform("model", Mat4::IDENTITY);
            shader.set_uniform("view", view);
            shader.set_uniform("projection", projection);
            shader.set_uniform("objectColor", Vec3::from_array(self.object_color));
            shader.set_uniform("lightColor", light_color);
            shader.set_uniform("lightPos", self.light_position);
            shader.set_uniform("viewPos", self.camera.position());
            shader.set_uniform("ambientStrength", self.ambient_strength);
            shader.set_uniform("specularStrength", self.specular_strength);
            shader.set_uniform("shininess", self.shininess);
        }
        self.object.draw();

        if let Err(e) = self.lamp.use_shader() {
            log::error!("{e}");
            return;
        }
        if let Some(shader) = self.lamp.shader() {
            shader.set_uniform("model", self.lamp_model());
            shader.set_uniform("view", view);
            shader.set_uniform("projection", projection);
            shader.set_uniform("lightColor", light_color);
        }
        self.lamp.draw();
    }

    fn on_gui_render(&mut self, ui: &mut egui::Ui) {
        ui.add(egui::Slider::new(&mut self.ambient_strength, 0.0..=1.0).text("Ambient strength"));
        ui.add(egui::Slider::new(&mut self.specular_strength, 0.0..=1.0).text("Specular strength"));
        ui.add(
            egui::Slider::new(&mut self.shininess, 2.0..=256.0)
                .logarithmic(true)
                .text("Shininess"),
        );
        ui.horizontal(|ui| {
            ui.label("Object color");
            ui.color_edit_button_rgb(&mut self.object_color);
        });
        ui.horizontal(|ui| {
            ui.label("Light color");
            ui.color_edit_button_rgb(&mut self.light_color);
        });
        ui.label("Light position");
        ui.horizontal(|ui| {
            for value in [
                &mut self.light_position.x,
                &mut self.light_position.y,
                &mut self.light_position.z,
            ] {
                ui.add(egui::DragValue::new(value).speed(0.05));
            }
        });
        ui.separator();
        ui.checkbox(&mut self.orbit, "Orbit camera");
        ui.add(egui::Slider::new(&mut self.camera.speed, -2.0..=2.0).text("Orbit speed"));
        ui.add(egui::Slider::new(&mut self.camera.radius, 1.5..=10.0).text("Orbit radius"));
        ui.add(egui::Slider::new(&mut self.camera.fov, 1.0..=179.0).text("FOV"));
        ui.label("Drag to turn the camera, scroll to zoom.");
        ui.label("Arrows and Page Up/Down move the light, Space toggles orbiting.");
    }
}

#[cfg(test)]
mod tests {
    use glab_core::{
        abs::{Call, DrawMode},
        config::GraphicsConfig,
    };

    use super::*;
    use crate::{
        demos::tests::test_context,
        other::{KeyboardState, MouseState},
    };

    #[test]
    fn test_camera_orbits_at_fixed_distance() {
        let mut camera = OrbitCamera::default();
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.5, 3.0), 1e-6));

        camera.speed = std::f32::consts::FRAC_PI_2;
        camera.advance(1.0);
        assert!(camera.position().abs_diff_eq(Vec3::new(3.0, 0.5, 0.0), 1e-5));

        camera.advance(4.0);
        assert!(camera.angle < std::f32::consts::TAU);
    }

    #[test]
    fn test_update_advances_only_while_orbiting() {
        let (_recording, context) = test_context();
        let mut demo = PhongLighting::new(&context).unwrap();
        let keyboard = KeyboardState::default();
        let mouse = MouseState::default();
        let ctx = UpdateContext::new(&keyboard, &mouse, 1.0, (800, 600));

        demo.on_update(&ctx);
        assert!(demo.camera.angle > 0.0);

        let angle = demo.camera.angle;
        demo.orbit = false;
        demo.on_update(&ctx);
        assert_eq!(demo.camera.angle, angle);
        assert!((demo.aspect_ratio - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_mouse_drags_and_zooms_camera() {
        let (_recording, context) = test_context();
        let mut demo = PhongLighting::new(&context).unwrap();
        let keyboard = KeyboardState::default();
        let mut mouse = MouseState::default();
        mouse.down.insert(MouseButton::Left);
        mouse.delta = Vec2::new(-100.0, 0.0);
        mouse.scroll_delta = Vec2::new(0.0, 2.0);

        demo.on_update(&UpdateContext::new(&keyboard, &mouse, 1.0, (800, 600)));
        assert!((demo.camera.angle - 1.0).abs() < 1e-5);
        assert!((demo.camera.radius - 2.5).abs() < 1e-6);

        mouse.scroll_delta = Vec2::new(0.0, 100.0);
        demo.on_update(&UpdateContext::new(&keyboard, &mouse, 0.0, (800, 600)));
        assert_eq!(demo.camera.radius, 1.5);
    }

    #[test]
    fn test_keys_move_light_and_toggle_orbit() {
        let (_recording, context) = test_context();
        let mut demo = PhongLighting::new(&context).unwrap();
        let start = demo.light_position;
        let mut keyboard = KeyboardState::default();
        keyboard.down.insert(Keycode::Right);
        keyboard.down.insert(Keycode::PageUp);
        keyboard.down.insert(Keycode::Space);
        keyboard.pressed.insert(Keycode::Space);
        let mouse = MouseState::default();

        demo.on_update(&UpdateContext::new(&keyboard, &mouse, 0.5, (800, 600)));
        assert!(!demo.orbit);
        assert_eq!(demo.camera.angle, 0.0);
        assert!(demo.light_position.abs_diff_eq(start + Vec3::new(0.75, 0.75, 0.0), 1e-5));
    }

    #[test]
    fn test_render_draws_object_and_lamp() {
        let (recording, context) = test_context();
        let mut demo = PhongLighting::new(&context).unwrap();
        let mut render_state = RenderState::new(&context.driver, &GraphicsConfig::default());
        recording.clear_calls();

        demo.on_render(&mut render_state);
        assert_eq!(
            recording.count(|c| *c == Call::DrawArrays(DrawMode::Triangles, 0, 36)),
            2
        );
        assert_eq!(recording.count(|c| matches!(c, Call::SetUniform(..))), 14);
    }
}

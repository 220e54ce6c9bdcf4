//! An indexed quad with one color per corner.

use glab_core::{
    abs::ShaderProgram,
    drawable::GpuMesh,
    error::MeshError,
    mesh::Mesh,
    render_state::RenderState,
    vertex::Vertex,
};
use glam::{Vec3, vec3};

use super::{Demo, DemoContext};

pub struct ColorQuad {
    shader: ShaderProgram,
    quad: GpuMesh,
    tint: [f32; 3],
}

/// Two triangles sharing the diagonal from corner 1 to corner 3.
pub fn quad_mesh() -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new(vec![
        Vertex::pos_color(vec3(0.5, 0.5, 0.0), vec3(1.0, 0.0, 0.0)),
        Vertex::pos_color(vec3(0.5, -0.5, 0.0), vec3(0.0, 1.0, 0.0)),
        Vertex::pos_color(vec3(-0.5, -0.5, 0.0), vec3(0.0, 0.0, 1.0)),
        Vertex::pos_color(vec3(-0.5, 0.5, 0.0), vec3(1.0, 1.0, 0.0)),
    ])?;
    mesh.add_indices([0, 1, 3, 1, 2, 3]);
    Ok(mesh)
}

impl ColorQuad {
    pub fn new(ctx: &DemoContext) -> glab_core::Result<Self> {
        let (vert, frag) = ctx.shader_paths("quad");
        let shader = ShaderProgram::from_files(&ctx.driver, vert, frag)?;
        let quad = GpuMesh::from_mesh(&ctx.driver, &quad_mesh()?)?;
        Ok(Self {
            shader,
            quad,
            tint: [1.0, 1.0, 1.0],
        })
    }
}

impl Demo for ColorQuad {
    fn on_render(&mut self, _render_state: &mut RenderState) {
        if let Err(e) = self.shader.use_program() {
            log::error!("{e}");
            return;
        }
        self.shader.set_uniform("tint", Vec3::from_array(self.tint));
        self.quad.draw();
    }

    fn on_gui_render(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Tint");
            ui.color_edit_button_rgb(&mut self.tint);
        });
    }
}

#[cfg(test)]
mod tests {
    use glab_core::{
        abs::{Call, DrawMode},
        config::GraphicsConfig,
    };

    use super::*;
    use crate::demos::tests::test_context;

    #[test]
    fn test_quad_is_drawn_indexed() {
        let (recording, context) = test_context();
        let mut demo = ColorQuad::new(&context).unwrap();
        let mut render_state = RenderState::new(&context.driver, &GraphicsConfig::default());
        recording.clear_calls();

        demo.on_render(&mut render_state);
        let calls = recording.calls();
        assert!(calls.contains(&Call::DrawElements(DrawMode::Triangles, 6)));
        assert_eq!(recording.count(|c| matches!(c, Call::SetUniform(..))), 1);
    }
}

//! A unit cube centred on the origin.
//!
//! The 36 vertices are generated from the six face normals, two counter-clockwise
//! triangles per face, so the cube survives back-face culling.

use std::path::Path;

use glam::{Vec2, Vec3};

use crate::{
    abs::{
        Buffer, BufferDescriptor, BufferUsage, DrawMode, DriverRef, ShaderProgram,
        Texture, VertexArray, VertexAttribute,
    },
    error::{MeshError, ShaderError, TextureError},
    mesh::Mesh,
    vertex::{Vertex, VertexFormat},
};

/// Number of vertices drawn for one cube.
pub const CUBE_VERTEX_COUNT: i32 = 36;

/// Outward normal and first in-plane axis of each face.
const FACES: [(Vec3, Vec3); 6] = [
    (Vec3::NEG_Z, Vec3::NEG_X),
    (Vec3::Z, Vec3::X),
    (Vec3::NEG_X, Vec3::Z),
    (Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X),
    (Vec3::Y, Vec3::X),
];

/// Corner order of the two triangles of a face, in face-local (u, v) coordinates.
const FACE_CORNERS: [Vec2; 6] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, 0.0),
];

/// Which attributes the cube's vertices carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CubeLayout {
    #[default]
    PositionOnly,
    PositionTex,
    PositionNormal,
}

impl CubeLayout {
    pub fn format(self) -> VertexFormat {
        match self {
            CubeLayout::PositionOnly => VertexFormat::POSITION,
            CubeLayout::PositionTex => VertexFormat::POSITION | VertexFormat::TEX,
            CubeLayout::PositionNormal => VertexFormat::POSITION | VertexFormat::NORMAL,
        }
    }

    /// Builds the CPU-side vertices for this layout.
    pub fn mesh(self) -> Result<Mesh, MeshError> {
        let mut mesh = Mesh::default();
        for (normal, u) in FACES {
            let v = normal.cross(u);
            for corner in FACE_CORNERS {
                let position = 0.5 * (normal + (corner.x * 2.0 - 1.0) * u + (corner.y * 2.0 - 1.0) * v);
                mesh.add_vertex(match self {
                    CubeLayout::PositionOnly => Vertex::pos(position),
                    CubeLayout::PositionTex => Vertex::pos_tex(position, corner),
                    CubeLayout::PositionNormal => Vertex::pos_normal(position, normal),
                })?;
            }
        }
        Ok(mesh)
    }
}

/// A cube with its own vertex buffer and layout, plus an optional shader and texture.
pub struct Cube {
    driver: DriverRef,
    layout: CubeLayout,
    vertex_array: VertexArray,
    _vertex_buffer: Buffer,
    shader: Option<ShaderProgram>,
    texture: Option<Texture>,
}

impl Cube {
    /// Uploads the cube's vertices and links its attribute table. The CPU-side vertices
    /// are not kept.
    pub fn new(driver: &DriverRef, layout: CubeLayout) -> crate::Result<Self> {
        let mesh = layout.mesh()?;
        let data = mesh.data();

        let mut vertex_array = VertexArray::new(driver)?;
        vertex_array.bind();
        let vertex_buffer =
            Buffer::with_data(driver, &BufferDescriptor::vertices(&data, BufferUsage::Static))?;
        vertex_array.create_pointers(&VertexAttribute::table(layout.format()));
        vertex_array.unbind();

        log::debug!(
            "Created {:?} cube: vertex array {}, {} bytes",
            layout,
            vertex_array.id().get(),
            vertex_buffer.byte_len()
        );

        Ok(Self {
            driver: DriverRef::clone(driver),
            layout,
            vertex_array,
            _vertex_buffer: vertex_buffer,
            shader: None,
            texture: None,
        })
    }

    /// Builds the cube's shader program from two files, replacing the current one.
    pub fn set_shaders(
        &mut self,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<(), ShaderError> {
        self.shader = Some(ShaderProgram::from_files(
            &self.driver,
            vertex_path,
            fragment_path,
        )?);
        Ok(())
    }

    pub fn set_shader(&mut self, shader: ShaderProgram) {
        self.shader = Some(shader);
    }

    /// Loads the cube's texture, replacing the current one.
    pub fn set_texture(&mut self, path: impl AsRef<Path>) -> Result<(), TextureError> {
        self.texture = Some(Texture::load(&self.driver, path)?);
        Ok(())
    }

    /// Makes the cube's shader current.
    pub fn use_shader(&self) -> Result<(), ShaderError> {
        self.shader
            .as_ref()
            .ok_or(ShaderError::NotLinked)?
            .use_program()
    }

    /// Binds the cube's texture to unit `slot`, if it has one.
    pub fn bind_texture(&self, slot: u32) {
        if let Some(texture) = &self.texture {
            texture.bind(slot);
        }
    }

    pub fn shader(&self) -> Option<&ShaderProgram> {
        self.shader.as_ref()
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn vertex_array(&self) -> &VertexArray {
        &self.vertex_array
    }

    pub fn layout(&self) -> CubeLayout {
        self.layout
    }

    pub fn draw(&self) {
        self.vertex_array.bind();
        self.driver
            .draw_arrays(DrawMode::Triangles, 0, CUBE_VERTEX_COUNT);
        self.vertex_array.unbind();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::abs::{Call, RecordingDriver};

    fn setup() -> (Arc<RecordingDriver>, DriverRef) {
        let recording = Arc::new(RecordingDriver::new());
        let driver: DriverRef = recording.clone();
        (recording, driver)
    }

    #[test]
    fn test_pos_tex_layout() {
        let (recording, driver) = setup();
        let cube = Cube::new(&driver, CubeLayout::PositionTex).unwrap();

        let attributes = cube.vertex_array().attributes();
        assert_eq!(attributes.len(), 2);
        assert!(attributes.iter().all(|a| a.stride == 5 * 4));
        assert_eq!(attributes[0].offset, 0);
        assert_eq!(attributes[1].offset, 12);
        assert_eq!((attributes[0].size, attributes[1].size), (3, 2));

        assert!(recording.calls().contains(&Call::BufferData {
            target: crate::abs::BufferTarget::Array,
            len: 36 * 5 * 4,
            usage: BufferUsage::Static
        }));
    }

    #[test]
    fn test_position_only_stride() {
        let (_recording, driver) = setup();
        let cube = Cube::new(&driver, CubeLayout::PositionOnly).unwrap();
        assert_eq!(
            cube.vertex_array().attributes(),
            &[VertexAttribute::float(0, 3, 12, 0)]
        );
    }

    #[test]
    fn test_faces_wind_outward() {
        let mesh = CubeLayout::PositionNormal.mesh().unwrap();
        assert_eq!(mesh.vertex_count(), CUBE_VERTEX_COUNT as usize);
        assert!(mesh.validate().is_ok());

        for triangle in mesh.vertices().chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| triangle[i].position().unwrap());
            let normal = triangle[0].normal().unwrap();
            let winding = (b - a).cross(c - a).normalize();
            assert!(winding.abs_diff_eq(normal, 1e-6), "{winding} != {normal}");
            assert!(a.abs().max_element() == 0.5);
        }
    }

    #[test]
    fn test_draw_issues_36_vertices() {
        let (recording, driver) = setup();
        let cube = Cube::new(&driver, CubeLayout::PositionNormal).unwrap();
        recording.clear_calls();
        cube.draw();
        assert_eq!(
            recording.calls(),
            vec![
                Call::BindVertexArray(Some(cube.vertex_array().id())),
                Call::DrawArrays(DrawMode::Triangles, 0, 36),
                Call::BindVertexArray(None),
            ]
        );
    }

    #[test]
    fn test_use_shader_without_program() {
        let (_recording, driver) = setup();
        let cube = Cube::new(&driver, CubeLayout::PositionOnly).unwrap();
        assert_eq!(cube.use_shader(), Err(ShaderError::NotLinked));
        cube.bind_texture(0);
    }

    #[test]
    fn test_missing_texture_keeps_cube_usable() {
        let (recording, driver) = setup();
        let mut cube = Cube::new(&driver, CubeLayout::PositionTex).unwrap();
        let result = cube.set_texture("/nonexistent/glab/texture.png");
        assert!(matches!(result, Err(TextureError::Load { .. })));
        assert!(cube.texture().is_none());
        assert_eq!(recording.count(|c| matches!(c, Call::CreateTexture(_))), 0);
    }

    #[test]
    fn test_drop_releases_everything() {
        let (recording, driver) = setup();
        let cube = Cube::new(&driver, CubeLayout::PositionTex).unwrap();
        drop(cube);
        assert_eq!(recording.live_objects(), 0);
    }
}

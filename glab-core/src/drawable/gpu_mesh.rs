//! GPU-resident copy of a [`Mesh`].

use crate::{
    abs::{
        Buffer, BufferDescriptor, BufferUsage, DrawMode, DriverRef, VertexArray,
        VertexAttribute,
    },
    error::Result,
    mesh::Mesh,
    vertex::VertexFormat,
};

/// A mesh uploaded to a vertex buffer and, when it has indices, an element buffer.
pub struct GpuMesh {
    driver: DriverRef,
    vertex_array: VertexArray,
    _vertex_buffer: Buffer,
    index_buffer: Option<Buffer>,
    vertex_count: i32,
    index_count: i32,
    mode: DrawMode,
}

impl GpuMesh {
    /// Validates and uploads `mesh`, linking `attributes` against its vertex buffer.
    pub fn new(driver: &DriverRef, mesh: &Mesh, attributes: &[VertexAttribute]) -> Result<Self> {
        mesh.validate()?;

        let mut vertex_array = VertexArray::new(driver)?;
        vertex_array.bind();
        let data = mesh.data();
        let vertex_buffer =
            Buffer::with_data(driver, &BufferDescriptor::vertices(&data, BufferUsage::Static))?;
        let index_buffer = if mesh.is_indexed() {
            Some(Buffer::with_data(
                driver,
                &BufferDescriptor::indices(mesh.indices(), BufferUsage::Static),
            )?)
        } else {
            None
        };
        vertex_array.create_pointers(attributes);
        vertex_array.unbind();

        Ok(Self {
            driver: DriverRef::clone(driver),
            vertex_array,
            _vertex_buffer: vertex_buffer,
            index_buffer,
            vertex_count: mesh.vertex_count() as i32,
            index_count: mesh.index_count() as i32,
            mode: DrawMode::Triangles,
        })
    }

    /// Uploads `mesh` with the attribute table derived from its vertex format.
    pub fn from_mesh(driver: &DriverRef, mesh: &Mesh) -> Result<Self> {
        let format = mesh.format().unwrap_or(VertexFormat::empty());
        Self::new(driver, mesh, &VertexAttribute::table(format))
    }

    pub fn with_mode(mut self, mode: DrawMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    pub fn vertex_array(&self) -> &VertexArray {
        &self.vertex_array
    }

    pub fn draw(&self) {
        self.vertex_array.bind();
        if self.is_indexed() {
            self.driver.draw_elements(self.mode, self.index_count);
        } else {
            self.driver.draw_arrays(self.mode, 0, self.vertex_count);
        }
        self.vertex_array.unbind();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::{Vec3, vec3};

    use super::*;
    use crate::{
        abs::{BufferTarget, Call, RecordingDriver},
        error::{Error, MeshError},
        vertex::Vertex,
    };

    fn quad() -> Mesh {
        Mesh::with_indices(
            vec![
                Vertex::pos_color(vec3(0.5, 0.5, 0.0), Vec3::X),
                Vertex::pos_color(vec3(0.5, -0.5, 0.0), Vec3::Y),
                Vertex::pos_color(vec3(-0.5, -0.5, 0.0), Vec3::Z),
                Vertex::pos_color(vec3(-0.5, 0.5, 0.0), Vec3::ONE),
            ],
            vec![0, 1, 3, 1, 2, 3],
        )
        .unwrap()
    }

    #[test]
    fn test_indexed_quad_draws_elements() {
        let recording = Arc::new(RecordingDriver::new());
        let driver: DriverRef = recording.clone();
        let mesh = GpuMesh::from_mesh(&driver, &quad()).unwrap();
        assert!(mesh.is_indexed());
        assert_eq!(mesh.vertex_array().attributes().len(), 2);

        let calls = recording.calls();
        assert!(calls.contains(&Call::BufferData {
            target: BufferTarget::Element,
            len: 24,
            usage: BufferUsage::Static
        }));
        assert!(calls.contains(&Call::BufferData {
            target: BufferTarget::Array,
            len: 96,
            usage: BufferUsage::Static
        }));

        recording.clear_calls();
        mesh.draw();
        assert!(recording
            .calls()
            .contains(&Call::DrawElements(DrawMode::Triangles, 6)));
    }

    #[test]
    fn test_plain_mesh_draws_arrays() {
        let recording = Arc::new(RecordingDriver::new());
        let driver: DriverRef = recording.clone();
        let triangle = Mesh::new(quad().vertices()[..3].to_vec()).unwrap();

        let mesh = GpuMesh::from_mesh(&driver, &triangle).unwrap();
        mesh.draw();
        assert!(!mesh.is_indexed());
        assert!(recording
            .calls()
            .contains(&Call::DrawArrays(DrawMode::Triangles, 0, 3)));
    }

    #[test]
    fn test_invalid_mesh_is_rejected_before_upload() {
        let recording = Arc::new(RecordingDriver::new());
        let driver: DriverRef = recording.clone();
        let mut mesh = quad();
        mesh.add_indices([9]);

        let result = GpuMesh::from_mesh(&driver, &mesh);
        assert!(matches!(
            result,
            Err(Error::Mesh(MeshError::IndexOutOfRange { index: 9, .. }))
        ));
        assert!(recording.calls().is_empty());
    }
}

//! CPU-side mesh data.
//!
//! A [`Mesh`] only manages vertices and, optionally, indices. Uploading it is the job of
//! [`crate::drawable::GpuMesh`].

use crate::{
    error::MeshError,
    vertex::{Vertex, VertexFormat},
};

/// Vertices plus an optional index list.
///
/// Every vertex of a mesh shares one [`VertexFormat`]; vertices of another format are
/// refused on insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>) -> Result<Self, MeshError> {
        Self::with_indices(vertices, Vec::new())
    }

    pub fn with_indices(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self, MeshError> {
        check_formats(&vertices)?;
        Ok(Self { vertices, indices })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Format shared by all vertices, `None` while the mesh is empty.
    pub fn format(&self) -> Option<VertexFormat> {
        self.vertices.first().map(Vertex::format)
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Replaces all vertices. The mesh is left untouched when the new vertices mix formats.
    pub fn set_vertices(&mut self, vertices: Vec<Vertex>) -> Result<(), MeshError> {
        check_formats(&vertices)?;
        self.vertices = vertices;
        Ok(())
    }

    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<(), MeshError> {
        if let Some(first) = self.vertices.first() {
            check_format(first, self.vertices.len(), &vertex)?;
        }
        self.vertices.push(vertex);
        Ok(())
    }

    /// Replaces the vertex at `index` with one of the same format.
    pub fn set_vertex(&mut self, index: usize, vertex: Vertex) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len();
        let Some(slot) = self.vertices.get_mut(index) else {
            return Err(MeshError::IndexOutOfRange {
                index: index as u32,
                vertex_count,
            });
        };
        check_format(slot, index, &vertex)?;
        *slot = vertex;
        Ok(())
    }

    /// Appends indices. They are not checked against the vertex count; see [`Mesh::validate`].
    pub fn add_indices(&mut self, indices: impl IntoIterator<Item = u32>) {
        self.indices.extend(indices);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Floats per vertex. Zero for an empty mesh.
    pub fn per_vertex_count(&self) -> usize {
        self.vertices.first().map_or(0, Vertex::len)
    }

    /// Total number of floats in [`Mesh::data`].
    pub fn size(&self) -> usize {
        self.vertex_count() * self.per_vertex_count()
    }

    pub fn vertex_byte_count(&self) -> usize {
        self.size() * size_of::<f32>()
    }

    pub fn index_byte_count(&self) -> usize {
        self.index_count() * size_of::<u32>()
    }

    /// Flattens every vertex into one contiguous float list.
    ///
    /// A new list is built on every call.
    pub fn data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.size());
        for vertex in &self.vertices {
            data.extend_from_slice(vertex.as_slice());
        }
        data
    }

    /// Checks that the mesh is non-empty and every index refers to an existing vertex.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.vertices.is_empty() {
            return Err(MeshError::EmptyMesh);
        }

        let vertex_count = self.vertex_count();
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&index| index as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        Ok(())
    }
}

fn check_format(expected: &Vertex, position: usize, vertex: &Vertex) -> Result<(), MeshError> {
    if vertex.format() == expected.format() {
        return Ok(());
    }
    Err(MeshError::InconsistentVertexFormat {
        position,
        expected: expected.len(),
        found: vertex.len(),
    })
}

fn check_formats(vertices: &[Vertex]) -> Result<(), MeshError> {
    let Some(first) = vertices.first() else {
        return Ok(());
    };
    vertices
        .iter()
        .enumerate()
        .try_for_each(|(position, vertex)| check_format(first, position, vertex))
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, vec3};

    use super::*;

    fn quad() -> Mesh {
        let white = Vec3::ONE;
        Mesh::new(vec![
            Vertex::pos_color(vec3(0.5, 0.5, 0.0), white),
            Vertex::pos_color(vec3(0.5, -0.5, 0.0), white),
            Vertex::pos_color(vec3(-0.5, -0.5, 0.0), white),
            Vertex::pos_color(vec3(-0.5, 0.5, 0.0), white),
        ])
        .unwrap()
    }

    #[test]
    fn test_quad_scenario() {
        let mut mesh = quad();
        mesh.add_indices([0, 1, 3, 1, 2, 3]);

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.per_vertex_count(), 6);
        assert_eq!(mesh.data().len(), 4 * mesh.per_vertex_count());
        assert_eq!(mesh.vertex_byte_count(), 4 * 6 * 4);
        assert_eq!(mesh.index_byte_count(), 24);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_data_is_idempotent() {
        let mesh = quad();
        let first = mesh.data();
        let second = mesh.data();
        assert_eq!(first, second);
        assert_eq!(mesh, quad());
        assert_eq!(&first[..6], &[0.5, 0.5, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_add_indices_appends_in_order() {
        let mut mesh = quad();
        mesh.add_indices([0, 1]);
        mesh.add_indices(vec![2, 3, 0]);
        mesh.add_indices(std::iter::empty());
        assert_eq!(mesh.indices(), &[0, 1, 2, 3, 0]);
        assert_eq!(mesh.index_count(), 5);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::default();
        assert_eq!(mesh.per_vertex_count(), 0);
        assert!(mesh.data().is_empty());
        assert_eq!(mesh.validate(), Err(MeshError::EmptyMesh));
    }

    #[test]
    fn test_validate_rejects_bad_index() {
        let mut mesh = quad();
        mesh.add_indices([0, 4]);
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                index: 4,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn test_mixed_vertex_is_refused() {
        let mut mesh = Mesh::default();
        mesh.add_vertex(Vertex::pos(Vec3::ZERO)).unwrap();
        assert_eq!(
            mesh.add_vertex(Vertex::pos_color(Vec3::X, Vec3::ONE)),
            Err(MeshError::InconsistentVertexFormat {
                position: 1,
                expected: 3,
                found: 6
            })
        );
        mesh.add_vertex(Vertex::pos(Vec3::Y)).unwrap();

        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.format(), Some(VertexFormat::POSITION));
        assert_eq!(mesh.data().len(), mesh.vertex_count() * mesh.per_vertex_count());
    }

    #[test]
    fn test_bulk_setters_keep_one_format() {
        let mixed = vec![Vertex::pos_color(Vec3::ZERO, Vec3::ONE), Vertex::pos(Vec3::ZERO)];
        assert!(matches!(
            Mesh::new(mixed.clone()),
            Err(MeshError::InconsistentVertexFormat { position: 1, .. })
        ));

        let mut mesh = quad();
        assert!(mesh.set_vertices(mixed).is_err());
        assert_eq!(mesh, quad());

        assert!(mesh.set_vertex(0, Vertex::pos(Vec3::ZERO)).is_err());
        assert!(mesh.set_vertex(9, Vertex::pos_color(Vec3::ZERO, Vec3::ONE)).is_err());
        mesh.set_vertex(0, Vertex::pos_color(Vec3::ZERO, Vec3::X)).unwrap();
        assert_eq!(mesh.vertices()[0].color(), Some(Vec3::X));

        mesh.set_vertices(vec![Vertex::pos(Vec3::ZERO)]).unwrap();
        assert_eq!(mesh.per_vertex_count(), 3);
        assert_eq!(mesh.size(), mesh.data().len());
    }
}

//! Per-vertex records.
//!
//! A [`Vertex`] is a flat list of floats split into up to four partitions, always in the
//! order position (3), color (3), texture coordinates (2), normal (3). Which partitions are
//! present is described by its [`VertexFormat`].

use bitflags::bitflags;
use glam::{Vec2, Vec3};

use crate::error::MeshError;

bitflags! {
    /// The attribute partitions present in a vertex.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertexFormat: u8 {
        const POSITION = 1 << 0;
        const COLOR = 1 << 1;
        const TEX = 1 << 2;
        const NORMAL = 1 << 3;
    }
}

/// Largest number of floats a vertex can hold.
pub const MAX_VERTEX_FLOATS: usize = 11;

impl VertexFormat {
    /// Partitions in storage order with their component counts.
    pub const PARTITIONS: [(VertexFormat, usize); 4] = [
        (VertexFormat::POSITION, 3),
        (VertexFormat::COLOR, 3),
        (VertexFormat::TEX, 2),
        (VertexFormat::NORMAL, 3),
    ];

    /// Number of floats per vertex.
    pub fn float_count(self) -> usize {
        Self::PARTITIONS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, count)| count)
            .sum()
    }

    /// Distance between consecutive vertices in bytes.
    pub fn stride(self) -> usize {
        self.float_count() * size_of::<f32>()
    }

    /// Float offset of a partition, if present.
    pub fn float_offset(self, partition: VertexFormat) -> Option<usize> {
        if !self.contains(partition) {
            return None;
        }
        Some(
            Self::PARTITIONS
                .iter()
                .take_while(|(flag, _)| *flag != partition)
                .filter(|(flag, _)| self.contains(*flag))
                .map(|(_, count)| count)
                .sum(),
        )
    }

    /// Byte offset of a partition, if present.
    pub fn byte_offset(self, partition: VertexFormat) -> Option<usize> {
        self.float_offset(partition)
            .map(|offset| offset * size_of::<f32>())
    }

    /// Component count of a single partition flag.
    pub fn components(partition: VertexFormat) -> usize {
        Self::PARTITIONS
            .iter()
            .find(|(flag, _)| *flag == partition)
            .map_or(0, |(_, count)| *count)
    }
}

/// A single vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    format: VertexFormat,
    data: [f32; MAX_VERTEX_FLOATS],
}

impl Vertex {
    /// Builds a vertex from optional parts. The position is always present.
    pub fn from_parts(
        position: Vec3,
        color: Option<Vec3>,
        tex: Option<Vec2>,
        normal: Option<Vec3>,
    ) -> Self {
        let mut format = VertexFormat::POSITION;
        let mut data = [0.0; MAX_VERTEX_FLOATS];
        let mut len = 0;
        let mut push = |values: &[f32]| {
            data[len..len + values.len()].copy_from_slice(values);
            len += values.len();
        };

        push(&position.to_array());
        if let Some(color) = color {
            format |= VertexFormat::COLOR;
            push(&color.to_array());
        }
        if let Some(tex) = tex {
            format |= VertexFormat::TEX;
            push(&tex.to_array());
        }
        if let Some(normal) = normal {
            format |= VertexFormat::NORMAL;
            push(&normal.to_array());
        }

        Self { format, data }
    }

    pub fn pos(position: Vec3) -> Self {
        Self::from_parts(position, None, None, None)
    }

    pub fn pos_color(position: Vec3, color: Vec3) -> Self {
        Self::from_parts(position, Some(color), None, None)
    }

    pub fn pos_tex(position: Vec3, tex: Vec2) -> Self {
        Self::from_parts(position, None, Some(tex), None)
    }

    pub fn pos_normal(position: Vec3, normal: Vec3) -> Self {
        Self::from_parts(position, None, None, Some(normal))
    }

    pub fn pos_color_tex(position: Vec3, color: Vec3, tex: Vec2) -> Self {
        Self::from_parts(position, Some(color), Some(tex), None)
    }

    pub fn pos_color_tex_normal(position: Vec3, color: Vec3, tex: Vec2, normal: Vec3) -> Self {
        Self::from_parts(position, Some(color), Some(tex), Some(normal))
    }

    pub fn format(&self) -> VertexFormat {
        self.format
    }

    /// Number of floats in this vertex.
    pub fn len(&self) -> usize {
        self.format.float_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The populated floats, in storage order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data[..self.len()]
    }

    fn read(&self, partition: VertexFormat) -> Option<&[f32]> {
        let offset = self.format.float_offset(partition)?;
        Some(&self.data[offset..offset + VertexFormat::components(partition)])
    }

    fn write(
        &mut self,
        partition: VertexFormat,
        name: &'static str,
        values: &[f32],
    ) -> Result<(), MeshError> {
        let offset = self
            .format
            .float_offset(partition)
            .ok_or(MeshError::MissingAttribute(name))?;
        self.data[offset..offset + values.len()].copy_from_slice(values);
        Ok(())
    }

    pub fn position(&self) -> Option<Vec3> {
        self.read(VertexFormat::POSITION).map(Vec3::from_slice)
    }

    pub fn color(&self) -> Option<Vec3> {
        self.read(VertexFormat::COLOR).map(Vec3::from_slice)
    }

    pub fn tex(&self) -> Option<Vec2> {
        self.read(VertexFormat::TEX).map(Vec2::from_slice)
    }

    pub fn normal(&self) -> Option<Vec3> {
        self.read(VertexFormat::NORMAL).map(Vec3::from_slice)
    }

    pub fn set_position(&mut self, position: Vec3) -> Result<(), MeshError> {
        self.write(VertexFormat::POSITION, "position", &position.to_array())
    }

    pub fn set_color(&mut self, color: Vec3) -> Result<(), MeshError> {
        self.write(VertexFormat::COLOR, "color", &color.to_array())
    }

    pub fn set_tex(&mut self, tex: Vec2) -> Result<(), MeshError> {
        self.write(VertexFormat::TEX, "texture coordinate", &tex.to_array())
    }

    pub fn set_normal(&mut self, normal: Vec3) -> Result<(), MeshError> {
        self.write(VertexFormat::NORMAL, "normal", &normal.to_array())
    }
}

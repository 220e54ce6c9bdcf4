//! Vertex array objects.
//!
//! A [`VertexArray`] records how the bytes of bound buffers map onto shader attribute
//! slots. Attributes are linked against whatever array buffer is bound at the time, so the
//! order is: bind the vertex array, bind the buffer, link, unbind the vertex array.

use super::{
    buffer::Buffer,
    driver::{ComponentType, DriverRef, VertexArrayId},
};
use crate::{error::BufferError, vertex::VertexFormat};

/// One attribute binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader attribute slot.
    pub index: u32,
    /// Number of components.
    pub size: i32,
    pub ty: ComponentType,
    pub normalized: bool,
    /// Bytes between consecutive vertices.
    pub stride: i32,
    /// Byte offset of the first component.
    pub offset: i32,
}

impl VertexAttribute {
    /// A non-normalized float attribute.
    pub fn float(index: u32, size: i32, stride: i32, offset: i32) -> Self {
        Self {
            index,
            size,
            ty: ComponentType::Float,
            normalized: false,
            stride,
            offset,
        }
    }

    /// Builds the binding table for interleaved float vertices of `format`.
    ///
    /// Slots are numbered in storage order, starting at 0.
    pub fn table(format: VertexFormat) -> Vec<Self> {
        let stride = format.stride() as i32;
        VertexFormat::PARTITIONS
            .iter()
            .filter_map(|(partition, size)| {
                format
                    .byte_offset(*partition)
                    .map(|offset| (*size as i32, offset as i32))
            })
            .enumerate()
            .map(|(index, (size, offset))| Self::float(index as u32, size, stride, offset))
            .collect()
    }
}

/// Represents a vertex array object stored on the GPU side.
pub struct VertexArray {
    driver: DriverRef,
    id: VertexArrayId,
    attributes: Vec<VertexAttribute>,
}

impl VertexArray {
    pub fn new(driver: &DriverRef) -> Result<Self, BufferError> {
        let id = driver.create_vertex_array().map_err(BufferError::Driver)?;
        Ok(Self {
            driver: DriverRef::clone(driver),
            id,
            attributes: Vec::new(),
        })
    }

    pub fn bind(&self) {
        self.driver.bind_vertex_array(Some(self.id));
    }

    pub fn unbind(&self) {
        self.driver.bind_vertex_array(None);
    }

    /// Binds `buffer`, then links `attribute` against it.
    ///
    /// The vertex array must be bound.
    pub fn link_attrib(&mut self, buffer: &Buffer, attribute: VertexAttribute) {
        buffer.bind();
        self.link_attrib_fast(attribute);
    }

    /// Links `attribute` against the currently bound array buffer.
    ///
    /// Both the vertex array and the buffer must be bound.
    pub fn link_attrib_fast(&mut self, attribute: VertexAttribute) {
        self.driver.vertex_attrib_pointer(
            attribute.index,
            attribute.size,
            attribute.ty,
            attribute.normalized,
            attribute.stride,
            attribute.offset,
        );
        self.driver.enable_vertex_attrib_array(attribute.index);
        self.attributes.push(attribute);
    }

    /// Links a whole attribute table against the currently bound array buffer.
    pub fn create_pointers(&mut self, attributes: &[VertexAttribute]) {
        for attribute in attributes {
            self.link_attrib_fast(*attribute);
        }
    }

    /// Linked attributes, in the order they were linked.
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn id(&self) -> VertexArrayId {
        self.id
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.driver.delete_vertex_array(self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::abs::{BufferDescriptor, BufferUsage, Call, RecordingDriver};

    #[test]
    fn test_table_round_trip() {
        let format = VertexFormat::POSITION | VertexFormat::COLOR | VertexFormat::TEX;
        let table = VertexAttribute::table(format);
        assert_eq!(
            table,
            vec![
                VertexAttribute::float(0, 3, 32, 0),
                VertexAttribute::float(1, 3, 32, 12),
                VertexAttribute::float(2, 2, 32, 24),
            ]
        );

        let recording = Arc::new(RecordingDriver::new());
        let driver: DriverRef = recording.clone();
        let mut vao = VertexArray::new(&driver).unwrap();
        vao.bind();
        vao.create_pointers(&table);
        vao.unbind();
        assert_eq!(vao.attributes(), table.as_slice());

        let pointers: Vec<VertexAttribute> = recording
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::VertexAttribPointer {
                    index,
                    size,
                    ty,
                    normalized,
                    stride,
                    offset,
                } => Some(VertexAttribute {
                    index,
                    size,
                    ty,
                    normalized,
                    stride,
                    offset,
                }),
                _ => None,
            })
            .collect();
        assert_eq!(pointers, table);
    }

    #[test]
    fn test_link_attrib_binds_buffer_first() {
        let recording = Arc::new(RecordingDriver::new());
        let driver: DriverRef = recording.clone();
        let data = [0.0f32; 6];
        let buffer =
            Buffer::with_data(&driver, &BufferDescriptor::vertices(&data, BufferUsage::Static))
                .unwrap();
        let mut vao = VertexArray::new(&driver).unwrap();
        recording.clear_calls();

        vao.bind();
        vao.link_attrib(&buffer, VertexAttribute::float(0, 3, 12, 0));
        vao.unbind();

        let calls = recording.calls();
        assert_eq!(calls[0], Call::BindVertexArray(Some(vao.id())));
        assert!(matches!(calls[1], Call::BindBuffer(_, Some(id)) if id == buffer.id()));
        assert!(matches!(calls[2], Call::VertexAttribPointer { index: 0, .. }));
        assert_eq!(calls[3], Call::EnableVertexAttribArray(0));
        assert_eq!(calls[4], Call::BindVertexArray(None));
    }
}

//! GPU buffer objects.
//!
//! A [`Buffer`] owns one driver buffer. Uploads always replace the whole data store.

use super::driver::{BufferId, BufferTarget, BufferUsage, DriverRef};
use crate::error::BufferError;

/// Everything needed for one upload.
#[derive(Debug, Clone, Copy)]
pub struct BufferDescriptor<'a> {
    pub target: BufferTarget,
    pub data: &'a [u8],
    pub usage: BufferUsage,
}

impl<'a> BufferDescriptor<'a> {
    /// Vertex data for the array target.
    pub fn vertices(data: &'a [f32], usage: BufferUsage) -> Self {
        Self {
            target: BufferTarget::Array,
            data: bytemuck::cast_slice(data),
            usage,
        }
    }

    /// Index data for the element target.
    pub fn indices(data: &'a [u32], usage: BufferUsage) -> Self {
        Self {
            target: BufferTarget::Element,
            data: bytemuck::cast_slice(data),
            usage,
        }
    }
}

/// Represents a buffer stored on the GPU side.
pub struct Buffer {
    driver: DriverRef,
    id: BufferId,
    target: BufferTarget,
    usage: BufferUsage,
    byte_len: usize,
}

impl Buffer {
    /// Allocates an empty buffer for `target`.
    pub fn new(driver: &DriverRef, target: BufferTarget) -> Result<Self, BufferError> {
        let id = driver.create_buffer().map_err(BufferError::Driver)?;
        Ok(Self {
            driver: DriverRef::clone(driver),
            id,
            target,
            usage: BufferUsage::default(),
            byte_len: 0,
        })
    }

    /// Allocates a buffer and uploads `descriptor` into it. The buffer stays bound.
    pub fn with_data(driver: &DriverRef, descriptor: &BufferDescriptor) -> Result<Self, BufferError> {
        let mut buffer = Self::new(driver, descriptor.target)?;
        buffer.upload(descriptor);
        Ok(buffer)
    }

    /// Replaces the entire data store. The buffer is left bound to the descriptor's target.
    pub fn upload(&mut self, descriptor: &BufferDescriptor) {
        self.target = descriptor.target;
        self.usage = descriptor.usage;
        self.byte_len = descriptor.data.len();
        self.bind();
        self.driver
            .buffer_data(descriptor.target, descriptor.data, descriptor.usage);
    }

    pub fn bind(&self) {
        self.driver.bind_buffer(self.target, Some(self.id));
    }

    pub fn unbind(&self) {
        self.driver.bind_buffer(self.target, None);
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Size of the last upload in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.driver.delete_buffer(self.id);
    }
}

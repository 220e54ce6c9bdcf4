//! This module contains the GPU resource wrappers of the sandbox: buffers, vertex arrays,
//! shader programs and textures, together with the driver they issue their calls to.

pub mod buffer;
pub mod driver;
pub mod glow_driver;
pub mod recording;
pub mod shader;
pub mod texture;
pub mod vertex_array;

pub use buffer::*;
pub use driver::*;
pub use glow_driver::*;
pub use recording::*;
pub use shader::*;
pub use texture::*;
pub use vertex_array::*;

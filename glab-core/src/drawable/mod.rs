//! Objects that own their GPU resources and issue their own draw calls.

pub mod cube;
pub mod gpu_mesh;

pub use cube::*;
pub use gpu_mesh::*;

//! The graphics driver seam.
//!
//! Every GPU wrapper in [`crate::abs`] talks to the driver through the [`Driver`] trait
//! instead of calling OpenGL directly. [`super::GlowDriver`] forwards to a real
//! `glow::Context`, and [`super::RecordingDriver`] records calls for tests.
//!
//! Implementations assume the context is current on the calling thread.

use std::{fmt, num::NonZeroU32, sync::Arc};

use bitflags::bitflags;
use glam::{IVec3, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

/// Shared reference to the driver, cloned into every wrapper.
pub type DriverRef = Arc<dyn Driver>;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub NonZeroU32);

        impl $name {
            /// Returns the raw driver name of the object.
            pub fn get(self) -> u32 {
                self.0.get()
            }
        }
    };
}

handle!(
    /// Driver name of a buffer object.
    BufferId
);
handle!(
    /// Driver name of a vertex array object.
    VertexArrayId
);
handle!(
    /// Driver name of a shader object.
    ShaderId
);
handle!(
    /// Driver name of a program object.
    ProgramId
);
handle!(
    /// Driver name of a texture object.
    TextureId
);

/// Location of an active uniform inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// An active uniform of a linked program. Arrays are reported once, as `name[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveUniform {
    pub name: String,
    /// Element count; 1 for non-arrays.
    pub size: i32,
}

/// Binding point of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data (VBO).
    Array,
    /// Index data (EBO).
    Element,
}

/// Usage hint passed along with a buffer upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    #[default]
    Static,
    Dynamic,
    Stream,
}

/// Component type of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Float,
    Int,
    UnsignedInt,
    UnsignedByte,
}

impl ComponentType {
    /// Size of one component in bytes.
    pub fn size_in_bytes(self) -> usize {
        match self {
            ComponentType::Float | ComponentType::Int | ComponentType::UnsignedInt => 4,
            ComponentType::UnsignedByte => 1,
        }
    }

    /// Whether the attribute is read as an integer by the shader.
    pub fn is_integer(self) -> bool {
        matches!(self, ComponentType::Int | ComponentType::UnsignedInt)
    }
}

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Primitive assembly mode for draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    Triangles,
    TriangleStrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapLinear,
}

/// A sampling parameter of the currently bound 2D texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureParameter {
    WrapS(TextureWrap),
    WrapT(TextureWrap),
    MinFilter(TextureFilter),
    MagFilter(TextureFilter),
}

/// Layout of uploaded pixel data, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Red,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Picks the format for a channel count.
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(PixelFormat::Red),
            3 => Some(PixelFormat::Rgb),
            4 => Some(PixelFormat::Rgba),
            _ => None,
        }
    }

    pub fn channels(self) -> u8 {
        match self {
            PixelFormat::Red => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Fixed-function state that can be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DepthTest,
    CullFace,
    Blend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    Front,
    #[default]
    Back,
    FrontAndBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthFunc {
    #[default]
    Less,
    LessEqual,
    Always,
}

bitflags! {
    /// Buffers cleared by [`Driver::clear`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Informational strings exposed by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverString {
    Vendor,
    Renderer,
    Version,
    ShadingLanguageVersion,
}

/// A value written to a uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    IVec3(IVec3),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
    Vec3Array(Vec<Vec3>),
}

/// The vocabulary of driver operations used by the wrappers.
///
/// Object creation is fallible and reports the driver's message. Everything else mirrors
/// the corresponding OpenGL call.
pub trait Driver {
    // Buffers
    fn create_buffer(&self) -> Result<BufferId, String>;
    fn delete_buffer(&self, buffer: BufferId);
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    // Vertex arrays
    fn create_vertex_array(&self) -> Result<VertexArrayId, String>;
    fn delete_vertex_array(&self, vertex_array: VertexArrayId);
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>);
    #[allow(clippy::too_many_arguments)]
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        ty: ComponentType,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn enable_vertex_attrib_array(&self, index: u32);

    // Shaders and programs
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String>;
    fn shader_source(&self, shader: ShaderId, source: &str);
    fn compile_shader(&self, shader: ShaderId);
    fn shader_compile_status(&self, shader: ShaderId) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;
    fn delete_shader(&self, shader: ShaderId);
    fn create_program(&self) -> Result<ProgramId, String>;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn detach_shader(&self, program: ProgramId, shader: ShaderId);
    fn link_program(&self, program: ProgramId);
    fn program_link_status(&self, program: ProgramId) -> bool;
    fn validate_program(&self, program: ProgramId);
    fn program_validate_status(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn delete_program(&self, program: ProgramId);
    fn use_program(&self, program: Option<ProgramId>);
    /// Active uniforms of a linked program.
    fn active_uniforms(&self, program: ProgramId) -> Vec<ActiveUniform>;
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    /// Writes a uniform of the currently used program.
    fn set_uniform(&self, location: UniformLocation, value: &UniformValue);

    // Textures
    fn create_texture(&self) -> Result<TextureId, String>;
    fn delete_texture(&self, texture: TextureId);
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, texture: Option<TextureId>);
    fn tex_parameter(&self, parameter: TextureParameter);
    fn tex_image_2d(&self, width: u32, height: u32, format: PixelFormat, pixels: &[u8]);
    fn generate_mipmap(&self);

    // Drawing and global state
    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32);
    fn draw_elements(&self, mode: DrawMode, count: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&self, mask: ClearMask);
    fn enable(&self, capability: Capability);
    fn disable(&self, capability: Capability);
    fn cull_face(&self, face: Face);
    fn depth_func(&self, func: DepthFunc);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn driver_string(&self, which: DriverString) -> String;
}

//! [`Driver`] implementation backed by a `glow` OpenGL context.

use std::sync::Arc;

use glow::HasContext;

use super::driver::*;

/// Forwards every driver call to a shared `glow::Context`.
pub struct GlowDriver {
    gl: Arc<glow::Context>,
}

impl GlowDriver {
    /// Wraps an existing context. The context must stay current on this thread.
    pub fn new(gl: &Arc<glow::Context>) -> Self {
        Self { gl: Arc::clone(gl) }
    }

    /// Returns the underlying context, e.g. for the GUI painter.
    pub fn context(&self) -> &Arc<glow::Context> {
        &self.gl
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::Element => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn buffer_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::Static => glow::STATIC_DRAW,
        BufferUsage::Dynamic => glow::DYNAMIC_DRAW,
        BufferUsage::Stream => glow::STREAM_DRAW,
    }
}

fn component_type(ty: ComponentType) -> u32 {
    match ty {
        ComponentType::Float => glow::FLOAT,
        ComponentType::Int => glow::INT,
        ComponentType::UnsignedInt => glow::UNSIGNED_INT,
        ComponentType::UnsignedByte => glow::UNSIGNED_BYTE,
    }
}

fn draw_mode(mode: DrawMode) -> u32 {
    match mode {
        DrawMode::Points => glow::POINTS,
        DrawMode::Lines => glow::LINES,
        DrawMode::Triangles => glow::TRIANGLES,
        DrawMode::TriangleStrip => glow::TRIANGLE_STRIP,
    }
}

fn wrap(mode: TextureWrap) -> i32 {
    (match mode {
        TextureWrap::Repeat => glow::REPEAT,
        TextureWrap::MirroredRepeat => glow::MIRRORED_REPEAT,
        TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
    }) as i32
}

fn filter(mode: TextureFilter) -> i32 {
    (match mode {
        TextureFilter::Nearest => glow::NEAREST,
        TextureFilter::Linear => glow::LINEAR,
        TextureFilter::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        TextureFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

fn capability(capability: Capability) -> u32 {
    match capability {
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::CullFace => glow::CULL_FACE,
        Capability::Blend => glow::BLEND,
    }
}

fn native_location(location: UniformLocation) -> glow::NativeUniformLocation {
    glow::NativeUniformLocation(location.0)
}

impl Driver for GlowDriver {
    fn create_buffer(&self) -> Result<BufferId, String> {
        unsafe { self.gl.create_buffer().map(|b| BufferId(b.0)) }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer.0)) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        unsafe {
            self.gl
                .bind_buffer(buffer_target(target), buffer.map(|b| glow::NativeBuffer(b.0)))
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(buffer_target(target), data, buffer_usage(usage))
        }
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        unsafe { self.gl.create_vertex_array().map(|v| VertexArrayId(v.0)) }
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        unsafe {
            self.gl
                .delete_vertex_array(glow::NativeVertexArray(vertex_array.0))
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        unsafe {
            self.gl
                .bind_vertex_array(vertex_array.map(|v| glow::NativeVertexArray(v.0)))
        }
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        ty: ComponentType,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            if ty.is_integer() {
                self.gl
                    .vertex_attrib_pointer_i32(index, size, component_type(ty), stride, offset);
            } else {
                self.gl.vertex_attrib_pointer_f32(
                    index,
                    size,
                    component_type(ty),
                    normalized,
                    stride,
                    offset,
                );
            }
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { self.gl.create_shader(shader_type).map(|s| ShaderId(s.0)) }
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        unsafe { self.gl.shader_source(glow::NativeShader(shader.0), source) }
    }

    fn compile_shader(&self, shader: ShaderId) {
        unsafe { self.gl.compile_shader(glow::NativeShader(shader.0)) }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        unsafe { self.gl.get_shader_compile_status(glow::NativeShader(shader.0)) }
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        unsafe { self.gl.get_shader_info_log(glow::NativeShader(shader.0)) }
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { self.gl.delete_shader(glow::NativeShader(shader.0)) }
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        unsafe { self.gl.create_program().map(|p| ProgramId(p.0)) }
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe {
            self.gl
                .attach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe {
            self.gl
                .detach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn link_program(&self, program: ProgramId) {
        unsafe { self.gl.link_program(glow::NativeProgram(program.0)) }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        unsafe { self.gl.get_program_link_status(glow::NativeProgram(program.0)) }
    }

    fn validate_program(&self, program: ProgramId) {
        unsafe { self.gl.validate_program(glow::NativeProgram(program.0)) }
    }

    fn program_validate_status(&self, program: ProgramId) -> bool {
        unsafe { self.gl.get_program_validate_status(glow::NativeProgram(program.0)) }
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        unsafe { self.gl.get_program_info_log(glow::NativeProgram(program.0)) }
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { self.gl.delete_program(glow::NativeProgram(program.0)) }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe { self.gl.use_program(program.map(|p| glow::NativeProgram(p.0))) }
    }

    fn active_uniforms(&self, program: ProgramId) -> Vec<ActiveUniform> {
        let program = glow::NativeProgram(program.0);
        unsafe {
            let count = self.gl.get_active_uniforms(program);
            (0..count)
                .filter_map(|index| self.gl.get_active_uniform(program, index))
                .map(|uniform| ActiveUniform {
                    name: uniform.name,
                    size: uniform.size,
                })
                .collect()
        }
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        unsafe {
            self.gl
                .get_uniform_location(glow::NativeProgram(program.0), name)
                .map(|location| UniformLocation(location.0))
        }
    }

    fn set_uniform(&self, location: UniformLocation, value: &UniformValue) {
        let loc = native_location(location);
        let loc = Some(&loc);
        unsafe {
            match value {
                UniformValue::Bool(v) => self.gl.uniform_1_i32(loc, *v as i32),
                UniformValue::Int(v) => self.gl.uniform_1_i32(loc, *v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(loc, *v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32(loc, v.x, v.y),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(loc, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32(loc, v.x, v.y, v.z, v.w),
                UniformValue::IVec3(v) => self.gl.uniform_3_i32(loc, v.x, v.y, v.z),
                UniformValue::Mat2(m) => {
                    self.gl
                        .uniform_matrix_2_f32_slice(loc, false, &m.to_cols_array())
                }
                UniformValue::Mat3(m) => {
                    self.gl
                        .uniform_matrix_3_f32_slice(loc, false, &m.to_cols_array())
                }
                UniformValue::Mat4(m) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(loc, false, &m.to_cols_array())
                }
                UniformValue::Vec3Array(values) => {
                    let data: Vec<f32> = values.iter().flat_map(|v| v.to_array()).collect();
                    self.gl.uniform_3_f32_slice(loc, &data);
                }
            }
        }
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        unsafe { self.gl.create_texture().map(|t| TextureId(t.0)) }
    }

    fn delete_texture(&self, texture: TextureId) {
        unsafe { self.gl.delete_texture(glow::NativeTexture(texture.0)) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn bind_texture(&self, texture: Option<TextureId>) {
        unsafe {
            self.gl
                .bind_texture(glow::TEXTURE_2D, texture.map(|t| glow::NativeTexture(t.0)))
        }
    }

    fn tex_parameter(&self, parameter: TextureParameter) {
        let (name, value) = match parameter {
            TextureParameter::WrapS(mode) => (glow::TEXTURE_WRAP_S, wrap(mode)),
            TextureParameter::WrapT(mode) => (glow::TEXTURE_WRAP_T, wrap(mode)),
            TextureParameter::MinFilter(mode) => (glow::TEXTURE_MIN_FILTER, filter(mode)),
            TextureParameter::MagFilter(mode) => (glow::TEXTURE_MAG_FILTER, filter(mode)),
        };
        unsafe { self.gl.tex_parameter_i32(glow::TEXTURE_2D, name, value) }
    }

    fn tex_image_2d(&self, width: u32, height: u32, format: PixelFormat, pixels: &[u8]) {
        let format = match format {
            PixelFormat::Red => glow::RED,
            PixelFormat::Rgb => glow::RGB,
            PixelFormat::Rgba => glow::RGBA,
        };
        unsafe {
            // Rows of RGB data are not 4-byte aligned for most widths.
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                format as i32,
                width as i32,
                height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
        }
    }

    fn generate_mipmap(&self) {
        unsafe { self.gl.generate_mipmap(glow::TEXTURE_2D) }
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(draw_mode(mode), first, count) }
    }

    fn draw_elements(&self, mode: DrawMode, count: i32) {
        unsafe {
            self.gl
                .draw_elements(draw_mode(mode), count, glow::UNSIGNED_INT, 0)
        }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear(&self, mask: ClearMask) {
        let mut bits = 0;
        if mask.contains(ClearMask::COLOR) {
            bits |= glow::COLOR_BUFFER_BIT;
        }
        if mask.contains(ClearMask::DEPTH) {
            bits |= glow::DEPTH_BUFFER_BIT;
        }
        if mask.contains(ClearMask::STENCIL) {
            bits |= glow::STENCIL_BUFFER_BIT;
        }
        unsafe { self.gl.clear(bits) }
    }

    fn enable(&self, cap: Capability) {
        unsafe { self.gl.enable(capability(cap)) }
    }

    fn disable(&self, cap: Capability) {
        unsafe { self.gl.disable(capability(cap)) }
    }

    fn cull_face(&self, face: Face) {
        let face = match face {
            Face::Front => glow::FRONT,
            Face::Back => glow::BACK,
            Face::FrontAndBack => glow::FRONT_AND_BACK,
        };
        unsafe { self.gl.cull_face(face) }
    }

    fn depth_func(&self, func: DepthFunc) {
        let func = match func {
            DepthFunc::Less => glow::LESS,
            DepthFunc::LessEqual => glow::LEQUAL,
            DepthFunc::Always => glow::ALWAYS,
        };
        unsafe { self.gl.depth_func(func) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn driver_string(&self, which: DriverString) -> String {
        let parameter = match which {
            DriverString::Vendor => glow::VENDOR,
            DriverString::Renderer => glow::RENDERER,
            DriverString::Version => glow::VERSION,
            DriverString::ShadingLanguageVersion => glow::SHADING_LANGUAGE_VERSION,
        };
        unsafe { self.gl.get_parameter_string(parameter) }
    }
}

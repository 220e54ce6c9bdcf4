//! An in-memory [`Driver`] that records every call.
//!
//! [`RecordingDriver`] hands out increasing object names, keeps just enough state to
//! answer queries (compile status, active uniforms) and appends each call to a log that
//! tests can inspect. Compile, link and validation failures can be injected.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    num::NonZeroU32,
};

use super::driver::*;

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateBuffer(BufferId),
    DeleteBuffer(BufferId),
    BindBuffer(BufferTarget, Option<BufferId>),
    BufferData {
        target: BufferTarget,
        len: usize,
        usage: BufferUsage,
    },
    CreateVertexArray(VertexArrayId),
    DeleteVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    VertexAttribPointer {
        index: u32,
        size: i32,
        ty: ComponentType,
        normalized: bool,
        stride: i32,
        offset: i32,
    },
    EnableVertexAttribArray(u32),
    CreateShader(ShaderStage, ShaderId),
    ShaderSource(ShaderId),
    CompileShader(ShaderId),
    DeleteShader(ShaderId),
    CreateProgram(ProgramId),
    AttachShader(ProgramId, ShaderId),
    DetachShader(ProgramId, ShaderId),
    LinkProgram(ProgramId),
    ValidateProgram(ProgramId),
    DeleteProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    UniformLocation(ProgramId, String),
    SetUniform(UniformLocation, UniformValue),
    CreateTexture(TextureId),
    DeleteTexture(TextureId),
    ActiveTexture(u32),
    BindTexture(Option<TextureId>),
    TexParameter(TextureParameter),
    TexImage2d {
        width: u32,
        height: u32,
        format: PixelFormat,
        len: usize,
    },
    GenerateMipmap,
    DrawArrays(DrawMode, i32, i32),
    DrawElements(DrawMode, i32),
    ClearColor([f32; 4]),
    Clear(ClearMask),
    Enable(Capability),
    Disable(Capability),
    CullFace(Face),
    DepthFunc(DepthFunc),
    Viewport(i32, i32, i32, i32),
}

#[derive(Default)]
struct State {
    next_name: u32,
    calls: Vec<Call>,
    live: HashSet<u32>,
    shader_stages: HashMap<ShaderId, ShaderStage>,
    shader_sources: HashMap<ShaderId, String>,
    compiled: HashMap<ShaderId, bool>,
    attached: HashMap<ProgramId, Vec<ShaderId>>,
    linked: HashMap<ProgramId, Vec<ActiveUniform>>,
    validated: HashMap<ProgramId, bool>,
    failing_stages: HashSet<ShaderStage>,
    fail_link: bool,
    fail_validation: bool,
}

/// Test double for [`Driver`].
#[derive(Default)]
pub struct RecordingDriver {
    state: RefCell<State>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every compile of the given stage fail.
    pub fn fail_compile(self, stage: ShaderStage) -> Self {
        self.state.borrow_mut().failing_stages.insert(stage);
        self
    }

    /// Makes every link fail.
    pub fn fail_link(self) -> Self {
        self.state.borrow_mut().fail_link = true;
        self
    }

    /// Makes every program validation fail.
    pub fn fail_validation(self) -> Self {
        self.state.borrow_mut().fail_validation = true;
        self
    }

    /// Returns a copy of the call log.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Counts recorded calls matching a predicate.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Number of objects created and not yet deleted.
    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn allocate(&self) -> NonZeroU32 {
        let mut state = self.state.borrow_mut();
        state.next_name += 1;
        let name = state.next_name;
        state.live.insert(name);
        NonZeroU32::new(name).unwrap_or(NonZeroU32::MIN)
    }

    fn release(&self, name: NonZeroU32) {
        self.state.borrow_mut().live.remove(&name.get());
    }
}

/// Extracts uniforms from `uniform <type> <name>;` declarations, reporting arrays the way a
/// driver does: as `name[0]` with their element count.
fn declared_uniforms(source: &str) -> Vec<ActiveUniform> {
    source
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("uniform "))
        .filter_map(|rest| {
            let declaration = rest.split(';').next()?;
            let name = declaration.split_whitespace().last()?;
            Some(match split_subscript(name) {
                Some((base, size)) => ActiveUniform {
                    name: format!("{base}[0]"),
                    size: size as i32,
                },
                None => ActiveUniform {
                    name: name.to_string(),
                    size: 1,
                },
            })
        })
        .collect()
}

/// Splits `name[n]` into `("name", n)`.
fn split_subscript(name: &str) -> Option<(&str, u32)> {
    let (base, index) = name.strip_suffix(']')?.split_once('[')?;
    Some((base, index.parse().ok()?))
}

impl Driver for RecordingDriver {
    fn create_buffer(&self) -> Result<BufferId, String> {
        let id = BufferId(self.allocate());
        self.record(Call::CreateBuffer(id));
        Ok(id)
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.release(buffer.0);
        self.record(Call::DeleteBuffer(buffer));
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        self.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record(Call::BufferData {
            target,
            len: data.len(),
            usage,
        });
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        let id = VertexArrayId(self.allocate());
        self.record(Call::CreateVertexArray(id));
        Ok(id)
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        self.release(vertex_array.0);
        self.record(Call::DeleteVertexArray(vertex_array));
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        self.record(Call::BindVertexArray(vertex_array));
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
        self.record(Call::VertexAttribPointer {
            index,
            size,
            ty,
            normalized,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String> {
        let id = ShaderId(self.allocate());
        self.state.borrow_mut().shader_stages.insert(id, stage);
        self.record(Call::CreateShader(stage, id));
        Ok(id)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        self.state
            .borrow_mut()
            .shader_sources
            .insert(shader, source.to_string());
        self.record(Call::ShaderSource(shader));
    }

    fn compile_shader(&self, shader: ShaderId) {
        {
            let mut state = self.state.borrow_mut();
            let ok = state
                .shader_stages
                .get(&shader)
                .is_some_and(|stage| !state.failing_stages.contains(stage));
            state.compiled.insert(shader, ok);
        }
        self.record(Call::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        self.state
            .borrow()
            .compiled
            .get(&shader)
            .copied()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            format!("0:1(1): error: shader {} failed to compile", shader.get())
        }
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.release(shader.0);
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        let id = ProgramId(self.allocate());
        self.record(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.state
            .borrow_mut()
            .attached
            .entry(program)
            .or_default()
            .push(shader);
        self.record(Call::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let Some(shaders) = self.state.borrow_mut().attached.get_mut(&program) {
            shaders.retain(|s| *s != shader);
        }
        self.record(Call::DetachShader(program, shader));
    }

    fn link_program(&self, program: ProgramId) {
        {
            let mut state = self.state.borrow_mut();
            if !state.fail_link {
                let uniforms = state
                    .attached
                    .get(&program)
                    .into_iter()
                    .flatten()
                    .filter_map(|shader| state.shader_sources.get(shader))
                    .flat_map(|source| declared_uniforms(source))
                    .fold(Vec::<ActiveUniform>::new(), |mut acc, uniform| {
                        if !acc.iter().any(|u| u.name == uniform.name) {
                            acc.push(uniform);
                        }
                        acc
                    });
                state.linked.insert(program, uniforms);
            }
        }
        self.record(Call::LinkProgram(program));
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        self.state.borrow().linked.contains_key(&program)
    }

    fn validate_program(&self, program: ProgramId) {
        {
            let mut state = self.state.borrow_mut();
            let ok = !state.fail_validation && state.linked.contains_key(&program);
            state.validated.insert(program, ok);
        }
        self.record(Call::ValidateProgram(program));
    }

    fn program_validate_status(&self, program: ProgramId) -> bool {
        self.state
            .borrow()
            .validated
            .get(&program)
            .copied()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        let state = self.state.borrow();
        if !state.linked.contains_key(&program) {
            "error: linking failed".to_string()
        } else if state.validated.get(&program) == Some(&false) {
            "validation: no vertex array bound".to_string()
        } else {
            String::new()
        }
    }

    fn delete_program(&self, program: ProgramId) {
        self.release(program.0);
        self.record(Call::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.record(Call::UseProgram(program));
    }

    fn active_uniforms(&self, program: ProgramId) -> Vec<ActiveUniform> {
        self.state
            .borrow()
            .linked
            .get(&program)
            .cloned()
            .unwrap_or_default()
    }

    /// Locations are handed out in declaration order, one per array element.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.record(Call::UniformLocation(program, name.to_string()));
        let (base, element) = match split_subscript(name) {
            Some((base, element)) => (base, Some(element)),
            None => (name, None),
        };

        let state = self.state.borrow();
        let mut next = 0;
        for uniform in state.linked.get(&program)? {
            let array_base = uniform.name.strip_suffix("[0]");
            let found = match (array_base, element) {
                (Some(array_base), Some(element)) => {
                    array_base == base && (element as i32) < uniform.size
                }
                (Some(array_base), None) => array_base == base,
                (None, None) => uniform.name == base,
                (None, Some(_)) => false,
            };
            if found {
                return Some(UniformLocation(next + element.unwrap_or(0)));
            }
            next += uniform.size.max(1) as u32;
        }
        None
    }

    fn set_uniform(&self, location: UniformLocation, value: &UniformValue) {
        self.record(Call::SetUniform(location, value.clone()));
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        let id = TextureId(self.allocate());
        self.record(Call::CreateTexture(id));
        Ok(id)
    }

    fn delete_texture(&self, texture: TextureId) {
        self.release(texture.0);
        self.record(Call::DeleteTexture(texture));
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, texture: Option<TextureId>) {
        self.record(Call::BindTexture(texture));
    }

    fn tex_parameter(&self, parameter: TextureParameter) {
        self.record(Call::TexParameter(parameter));
    }

    fn tex_image_2d(&self, width: u32, height: u32, format: PixelFormat, pixels: &[u8]) {
        self.record(Call::TexImage2d {
            width,
            height,
            format,
            len: pixels.len(),
        });
    }

    fn generate_mipmap(&self) {
        self.record(Call::GenerateMipmap);
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        self.record(Call::DrawArrays(mode, first, count));
    }

    fn draw_elements(&self, mode: DrawMode, count: i32) {
        self.record(Call::DrawElements(mode, count));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(Call::ClearColor([r, g, b, a]));
    }

    fn clear(&self, mask: ClearMask) {
        self.record(Call::Clear(mask));
    }

    fn enable(&self, capability: Capability) {
        self.record(Call::Enable(capability));
    }

    fn disable(&self, capability: Capability) {
        self.record(Call::Disable(capability));
    }

    fn cull_face(&self, face: Face) {
        self.record(Call::CullFace(face));
    }

    fn depth_func(&self, func: DepthFunc) {
        self.record(Call::DepthFunc(func));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn driver_string(&self, which: DriverString) -> String {
        match which {
            DriverString::Vendor => "glab".to_string(),
            DriverString::Renderer => "recording driver".to_string(),
            DriverString::Version => "3.3 (recorded)".to_string(),
            DriverString::ShadingLanguageVersion => "3.30".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_uniforms() {
        let source = "#version 330 core\nuniform mat4 model;\n  uniform vec3 lights[4];\nin vec3 pos;";
        assert_eq!(
            declared_uniforms(source),
            vec![
                ActiveUniform {
                    name: "model".to_string(),
                    size: 1
                },
                ActiveUniform {
                    name: "lights[0]".to_string(),
                    size: 4
                },
            ]
        );
    }

    #[test]
    fn test_array_elements_have_own_locations() {
        let driver = RecordingDriver::new();
        let program = driver.create_program().unwrap();
        let shader = driver.create_shader(ShaderStage::Vertex).unwrap();
        driver.shader_source(
            shader,
            "uniform vec3 lights[4];\nuniform float exposure;\nuniform mat4 bones[2];",
        );
        driver.attach_shader(program, shader);
        driver.link_program(program);

        let location = |name| driver.uniform_location(program, name);
        assert_eq!(location("lights"), Some(UniformLocation(0)));
        assert_eq!(location("lights[0]"), Some(UniformLocation(0)));
        assert_eq!(location("lights[3]"), Some(UniformLocation(3)));
        assert_eq!(location("lights[4]"), None);
        assert_eq!(location("exposure"), Some(UniformLocation(4)));
        assert_eq!(location("exposure[0]"), None);
        assert_eq!(location("bones[1]"), Some(UniformLocation(6)));
    }

    #[test]
    fn test_live_objects_tracking() {
        let driver = RecordingDriver::new();
        let buffer = driver.create_buffer().unwrap();
        let texture = driver.create_texture().unwrap();
        assert_eq!(driver.live_objects(), 2);
        driver.delete_buffer(buffer);
        driver.delete_texture(texture);
        assert_eq!(driver.live_objects(), 0);
    }
}

//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing shader
//! objects, and the [`Uniform`] trait for setting uniform variables in shader programs.
//!
//! A program is built from a [`ShaderSource`]: the vertex stage is compiled first, then the
//! fragment stage, and linking only happens when both compiled. Uniform locations are
//! looked up once after linking and cached by name.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use bitflags::bitflags;
use glam::{IVec3, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use super::driver::{DriverRef, ProgramId, ShaderId, ShaderStage, UniformLocation, UniformValue};
use crate::error::{ProgramValidationWarning, ShaderError};

bitflags! {
    /// Progress of a program through compile, link and validation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderStatus: u8 {
        const VERTEX_COMPILED = 1 << 0;
        const FRAGMENT_COMPILED = 1 << 1;
        const LINKED = 1 << 2;
        const VALIDATED = 1 << 3;
    }
}

impl ShaderStatus {
    fn compiled(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => ShaderStatus::VERTEX_COMPILED,
            ShaderStage::Fragment => ShaderStatus::FRAGMENT_COMPILED,
        }
    }
}

/// Driver messages collected while building a program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderDiagnostics {
    pub vertex_log: String,
    pub fragment_log: String,
    pub link_log: String,
    pub validation: Option<ProgramValidationWarning>,
}

/// Source text for both stages of a program.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    /// Wraps sources that are already in memory.
    pub fn from_strings(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Reads both stages from disk. Missing, unreadable and empty files are errors.
    pub fn from_files(
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        Ok(Self {
            vertex: read_stage(ShaderStage::Vertex, vertex_path.as_ref())?,
            fragment: read_stage(ShaderStage::Fragment, fragment_path.as_ref())?,
        })
    }
}

fn read_stage(stage: ShaderStage, path: &Path) -> Result<String, ShaderError> {
    let source_error = |reason: String| ShaderError::Source {
        stage,
        path: PathBuf::from(path),
        reason,
    };
    let source = std::fs::read_to_string(path).map_err(|e| source_error(e.to_string()))?;
    if source.trim().is_empty() {
        return Err(source_error("file is empty".to_string()));
    }
    Ok(source)
}

/// Represents an individual compiled shader stage.
pub struct Shader {
    driver: DriverRef,
    id: ShaderId,
    stage: ShaderStage,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    pub fn new(driver: &DriverRef, stage: ShaderStage, source: &str) -> Result<Self, ShaderError> {
        let id = driver.create_shader(stage).map_err(ShaderError::Driver)?;
        driver.shader_source(id, source);
        driver.compile_shader(id);

        if !driver.shader_compile_status(id) {
            let log = driver.shader_info_log(id);
            driver.delete_shader(id);
            return Err(ShaderError::Compile { stage, log });
        }

        Ok(Self {
            driver: DriverRef::clone(driver),
            id,
            stage,
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Driver diagnostics for a successful compile, usually empty.
    fn info_log(&self) -> String {
        self.driver.shader_info_log(self.id)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.driver.delete_shader(self.id);
    }
}

/// Represents a value that can be written to a uniform variable.
pub trait Uniform {
    fn to_uniform(&self) -> UniformValue;
}

macro_rules! uniform {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Uniform for $ty {
                fn to_uniform(&self) -> UniformValue {
                    UniformValue::$variant(*self)
                }
            }
        )*
    };
}

uniform!(
    bool => Bool,
    i32 => Int,
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    IVec3 => IVec3,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
);

impl<const N: usize> Uniform for [Vec3; N] {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Vec3Array(self.to_vec())
    }
}

impl<T: Uniform> Uniform for &T {
    fn to_uniform(&self) -> UniformValue {
        (*self).to_uniform()
    }
}

/// Represents a linked shader program.
pub struct ShaderProgram {
    driver: DriverRef,
    id: ProgramId,
    status: ShaderStatus,
    diagnostics: ShaderDiagnostics,
    uniforms: HashMap<String, UniformLocation>,
}

impl ShaderProgram {
    /// Compiles both stages of `source` and links them.
    ///
    /// Linking is skipped when either stage fails to compile.
    pub fn new(driver: &DriverRef, source: &ShaderSource) -> Result<Self, ShaderError> {
        let vertex = Shader::new(driver, ShaderStage::Vertex, &source.vertex)?;
        let fragment = Shader::new(driver, ShaderStage::Fragment, &source.fragment)?;
        Self::link(driver, &[&vertex, &fragment])
    }

    /// Reads the stage sources from disk, then behaves like [`ShaderProgram::new`].
    pub fn from_files(
        driver: &DriverRef,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let source = ShaderSource::from_files(vertex_path, fragment_path)?;
        Self::new(driver, &source)
    }

    /// Links a new shader program from already compiled shaders.
    pub fn link(driver: &DriverRef, shaders: &[&Shader]) -> Result<Self, ShaderError> {
        let program = driver.create_program().map_err(ShaderError::Driver)?;

        let mut status = ShaderStatus::empty();
        let mut diagnostics = ShaderDiagnostics::default();
        for shader in shaders {
            status |= ShaderStatus::compiled(shader.stage());
            match shader.stage() {
                ShaderStage::Vertex => diagnostics.vertex_log = shader.info_log(),
                ShaderStage::Fragment => diagnostics.fragment_log = shader.info_log(),
            }
            driver.attach_shader(program, shader.id);
        }

        driver.link_program(program);

        for shader in shaders {
            driver.detach_shader(program, shader.id);
        }

        if !driver.program_link_status(program) {
            let log = driver.program_info_log(program);
            driver.delete_program(program);
            return Err(ShaderError::Link { log });
        }
        status |= ShaderStatus::LINKED;
        diagnostics.link_log = driver.program_info_log(program);

        driver.validate_program(program);
        if driver.program_validate_status(program) {
            status |= ShaderStatus::VALIDATED;
        } else {
            let warning = ProgramValidationWarning {
                log: driver.program_info_log(program),
            };
            log::warn!("{warning}");
            diagnostics.validation = Some(warning);
        }

        let uniforms = cache_uniforms(driver, program);
        log::debug!(
            "Linked shader program {} with {} active uniforms",
            program.get(),
            uniforms.len()
        );

        Ok(Self {
            driver: DriverRef::clone(driver),
            id: program,
            status,
            diagnostics,
            uniforms,
        })
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) -> Result<(), ShaderError> {
        if !self.is_linked() {
            return Err(ShaderError::NotLinked);
        }
        self.driver.use_program(Some(self.id));
        Ok(())
    }

    /// Sets a uniform variable in the shader program.
    ///
    /// The program should be the one in use. Names that are not active uniforms of the
    /// program are ignored.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        if let Some(location) = self.uniforms.get(name) {
            self.driver.set_uniform(*location, &value.to_uniform());
        }
    }

    /// Returns the cached location of an active uniform.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn status(&self) -> ShaderStatus {
        self.status
    }

    pub fn is_linked(&self) -> bool {
        self.status.contains(ShaderStatus::LINKED)
    }

    pub fn diagnostics(&self) -> &ShaderDiagnostics {
        &self.diagnostics
    }
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("uniforms", &self.uniforms)
            .finish()
    }
}

fn cache_uniforms(driver: &DriverRef, program: ProgramId) -> HashMap<String, UniformLocation> {
    let mut uniforms = HashMap::new();
    for uniform in driver.active_uniforms(program) {
        let Some(location) = driver.uniform_location(program, &uniform.name) else {
            continue;
        };
        // Arrays are reported as `name[0]`, but are usually addressed by their bare name.
        // Every other element has a location of its own.
        if let Some(base) = uniform.name.strip_suffix("[0]") {
            uniforms.insert(base.to_string(), location);
            for element in 1..uniform.size {
                let name = format!("{base}[{element}]");
                if let Some(location) = driver.uniform_location(program, &name) {
                    uniforms.insert(name, location);
                }
            }
        }
        uniforms.insert(uniform.name, location);
    }
    uniforms
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.driver.delete_program(self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::abs::{Call, RecordingDriver};

    const VERT: &str = "#version 330 core\nuniform mat4 model;\nuniform mat4 view;\nvoid main() {}\n";
    const FRAG: &str = "#version 330 core\nuniform vec3 lightColor;\nvoid main() {}\n";

    fn setup(driver: RecordingDriver) -> (Arc<RecordingDriver>, DriverRef) {
        let recording = Arc::new(driver);
        let driver: DriverRef = recording.clone();
        (recording, driver)
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("glab-shader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_source_makes_no_driver_calls() {
        let (recording, driver) = setup(RecordingDriver::new());
        let vert = temp_file("present.vert", VERT);
        let result = ShaderProgram::from_files(&driver, &vert, "/nonexistent/shader.frag");

        match result {
            Err(ShaderError::Source { stage, path, .. }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(path, PathBuf::from("/nonexistent/shader.frag"));
            }
            other => panic!("unexpected result: {:?}", other.map(|p| p.id())),
        }
        assert!(recording.calls().is_empty());
    }

    #[test]
    fn test_empty_source_is_an_error() {
        let vert = temp_file("empty.vert", "  \n");
        let frag = temp_file("ok.frag", FRAG);
        let err = ShaderSource::from_files(&vert, &frag).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Source {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
    }

    #[test]
    fn test_compile_failure_skips_link() {
        let (recording, driver) = setup(RecordingDriver::new().fail_compile(ShaderStage::Vertex));
        let source = ShaderSource::from_strings(VERT, FRAG);
        let err = ShaderProgram::new(&driver, &source).unwrap_err();

        assert!(matches!(
            err,
            ShaderError::Compile {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
        assert_eq!(recording.count(|c| matches!(c, Call::LinkProgram(_))), 0);
        assert_eq!(recording.count(|c| matches!(c, Call::CreateProgram(_))), 0);
        assert_eq!(recording.live_objects(), 0);
    }

    #[test]
    fn test_fragment_failure_releases_vertex_stage() {
        let (recording, driver) = setup(RecordingDriver::new().fail_compile(ShaderStage::Fragment));
        let source = ShaderSource::from_strings(VERT, FRAG);
        let err = ShaderProgram::new(&driver, &source).unwrap_err();

        assert!(matches!(
            err,
            ShaderError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(recording.count(|c| matches!(c, Call::LinkProgram(_))), 0);
        assert_eq!(recording.live_objects(), 0);
    }

    #[test]
    fn test_link_failure() {
        let (recording, driver) = setup(RecordingDriver::new().fail_link());
        let source = ShaderSource::from_strings(VERT, FRAG);
        let err = ShaderProgram::new(&driver, &source).unwrap_err();

        assert!(matches!(err, ShaderError::Link { .. }));
        assert_eq!(recording.live_objects(), 0);
    }

    #[test]
    fn test_validation_failure_is_a_warning() {
        let (_recording, driver) = setup(RecordingDriver::new().fail_validation());
        let source = ShaderSource::from_strings(VERT, FRAG);
        let program = ShaderProgram::new(&driver, &source).unwrap();

        assert!(program.is_linked());
        assert!(!program.status().contains(ShaderStatus::VALIDATED));
        assert!(program.diagnostics().validation.is_some());
        assert!(program.use_program().is_ok());
    }

    #[test]
    fn test_status_flags_combine_bitwise() {
        let (_recording, driver) = setup(RecordingDriver::new());
        let program = ShaderProgram::new(&driver, &ShaderSource::from_strings(VERT, FRAG)).unwrap();
        assert_eq!(program.status(), ShaderStatus::all());
        assert_ne!(ShaderStatus::VERTEX_COMPILED | ShaderStatus::LINKED, ShaderStatus::VERTEX_COMPILED);
    }

    #[test]
    fn test_uniforms_are_cached_at_link() {
        let (recording, driver) = setup(RecordingDriver::new());
        let program = ShaderProgram::new(&driver, &ShaderSource::from_strings(VERT, FRAG)).unwrap();
        let lookups = recording.count(|c| matches!(c, Call::UniformLocation(..)));
        assert_eq!(lookups, 3);

        program.use_program().unwrap();
        for _ in 0..10 {
            program.set_uniform("model", Mat4::IDENTITY);
        }
        program.set_uniform("lightColor", &Vec3::ONE);

        assert_eq!(recording.count(|c| matches!(c, Call::UniformLocation(..))), lookups);
        assert_eq!(recording.count(|c| matches!(c, Call::SetUniform(..))), 11);
        assert!(recording.calls().contains(&Call::SetUniform(
            program.uniform_location("lightColor").unwrap(),
            UniformValue::Vec3(Vec3::ONE)
        )));
    }

    #[test]
    fn test_array_uniform_elements_are_settable() {
        let (recording, driver) = setup(RecordingDriver::new());
        let frag = "#version 330 core\nuniform vec3 lights[4];\nvoid main() {}\n";
        let program = ShaderProgram::new(&driver, &ShaderSource::from_strings(VERT, frag)).unwrap();
        let lookups = recording.count(|c| matches!(c, Call::UniformLocation(..)));

        let base = program.uniform_location("lights").unwrap();
        assert_eq!(program.uniform_location("lights[0]"), Some(base));
        assert_eq!(program.uniform_location("lights[3]"), Some(UniformLocation(base.0 + 3)));
        assert_eq!(program.uniform_location("lights[4]"), None);

        program.use_program().unwrap();
        program.set_uniform("lights", Vec3::X);
        program.set_uniform("lights[1]", Vec3::ONE);
        program.set_uniform("lights[3]", Vec3::Z);

        let calls = recording.calls();
        assert!(calls.contains(&Call::SetUniform(base, UniformValue::Vec3(Vec3::X))));
        assert!(calls.contains(&Call::SetUniform(
            UniformLocation(base.0 + 1),
            UniformValue::Vec3(Vec3::ONE)
        )));
        assert_eq!(recording.count(|c| matches!(c, Call::SetUniform(..))), 3);
        assert_eq!(recording.count(|c| matches!(c, Call::UniformLocation(..))), lookups);
    }

    #[test]
    fn test_unknown_uniform_is_ignored() {
        let (recording, driver) = setup(RecordingDriver::new());
        let program = ShaderProgram::new(&driver, &ShaderSource::from_strings(VERT, FRAG)).unwrap();
        program.set_uniform("doesNotExist", 1.0f32);
        assert_eq!(recording.count(|c| matches!(c, Call::SetUniform(..))), 0);
    }

    #[test]
    fn test_program_dropped_once() {
        let (recording, driver) = setup(RecordingDriver::new());
        let program = ShaderProgram::new(&driver, &ShaderSource::from_strings(VERT, FRAG)).unwrap();
        let id = program.id();
        drop(program);
        assert_eq!(recording.count(|c| *c == Call::DeleteProgram(id)), 1);
        assert_eq!(recording.live_objects(), 0);
    }
}

//! Error types for every fallible resource in the crate.
//!
//! Each GPU wrapper has its own error enum so callers can match on the failure that
//! concerns them; [`Error`] wraps all of them for code that only wants to propagate.

use std::path::PathBuf;

use thiserror::Error;

use crate::abs::ShaderStage;

/// Errors raised while reading, compiling or linking a shader program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShaderError {
    #[error("failed to read {stage} shader source {path:?}: {reason}")]
    Source {
        stage: ShaderStage,
        path: PathBuf,
        reason: String,
    },
    #[error("failed to compile {stage} shader:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("failed to link shader program:\n{log}")]
    Link { log: String },
    #[error("shader program is not linked")]
    NotLinked,
    #[error("driver error: {0}")]
    Driver(String),
}

/// Post-link validation diagnostic. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramValidationWarning {
    pub log: String,
}

impl std::fmt::Display for ProgramValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shader program failed validation: {}", self.log)
    }
}

/// Errors raised while decoding or uploading a texture.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextureError {
    #[error("failed to load texture {path:?}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("texture data has {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("unsupported channel count {0}")]
    UnsupportedChannels(u8),
    #[error("driver error: {0}")]
    Driver(String),
}

/// Errors raised while allocating buffers or vertex arrays.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BufferError {
    #[error("driver error: {0}")]
    Driver(String),
}

/// Errors raised by CPU-side geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("vertex {position} has {found} floats, expected {expected}")]
    InconsistentVertexFormat {
        position: usize,
        expected: usize,
        found: usize,
    },
    #[error("mesh has no vertices")]
    EmptyMesh,
    #[error("vertex has no {0} attribute")]
    MissingAttribute(&'static str),
}

/// Errors raised while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Any error produced by this crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

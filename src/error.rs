//! Typed errors returned from translation and interpolation patching (§7, §10.2).

use thiserror::Error;

use crate::ir::{ImageFormat, Opcode, RegisterFile};

/// Failure modes of [`crate::convert`].
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("instruction {index} ({opcode:?}) expects {expected} destination register(s), found {found}")]
    DstArityMismatch {
        index: usize,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    #[error("instruction {index} ({opcode:?}) expects {expected} source register(s), found {found}")]
    SrcArityMismatch {
        index: usize,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    #[error("references undeclared {file:?}[{index_in_file}]")]
    UndeclaredRegister {
        file: RegisterFile,
        index_in_file: u32,
    },

    #[error("texture opcode at instruction {index} is missing its texture-target payload")]
    MissingTexPayload { index: usize },

    #[error("no format-table entry for image format {0:?}")]
    UnknownFormat(ImageFormat),

    #[error("control-flow nesting unbalanced: {0}")]
    UnbalancedControlFlow(&'static str),

    #[error("geometry stage is missing a required property: {0}")]
    MissingGeometryProperty(&'static str),

    #[error("compute stage is missing its local work-group size property")]
    MissingComputeBlockSize,

    #[error("stream-output binding references undeclared output register {0}")]
    InvalidStreamOutputBinding(u32),

    #[error("requested GLSL version {0} cannot express a feature required by this module: {1}")]
    VersionTooLow(u16, &'static str),
}

/// Failure modes of [`crate::interp::patch_vertex_interpolants`].
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("fragment-stage interpolation qualifiers are empty; nothing to patch")]
    EmptyQualifierSet,

    #[error("vertex shader source has no matching `out` declaration for fragment input `{0}`")]
    UnmatchedVarying(String),

    #[error("vertex shader source is not valid UTF-8 at byte {0}")]
    InvalidUtf8(usize),
}

//! Context & Tables: small closed lookup tables the rest of the crate consults.
//!
//! Grounded on `conv.rs`'s exhaustive `match`-based conversion functions
//! (`format_to_gl_format`, `wrap_to_gl`) for the general shape: a `match` over a closed
//! enum rather than a runtime map, since every key here is a finite enum already known
//! at compile time. The one genuinely open-ended table — image/buffer format to GLSL
//! layout qualifier — is kept pluggable behind the [`FormatTable`] trait, matching the
//! original C's format-descriptor table which this design treats as an external
//! interface (§1, §6) rather than code worth hand-copying wholesale.

use crate::error::ConvertError;
use crate::ir::{ImageFormat, Opcode, ReturnType, TextureKind};

/// Per-opcode operand type tag, used to choose constructor-function wrapping
/// (`floatBitsToInt`, `uintBitsToFloat`, …) around destination/source registers that
/// are declared as a different base type than the register file's default float.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandType {
    Float,
    Int,
    Uint,
}

/// Returns the `(dst, src)` type pair an opcode operates over. Opcodes not covering
/// bitwise/comparison semantics default to `(Float, Float)`.
pub fn operand_types(op: Opcode) -> (OperandType, OperandType) {
    use OperandType::*;
    match op {
        Opcode::And | Opcode::Or | Opcode::Xor | Opcode::Not | Opcode::Shl => (Int, Int),
        Opcode::Shr => (Int, Int),
        Opcode::Useq | Opcode::Usne | Opcode::Usge | Opcode::Uslt => (Uint, Uint),
        Opcode::Fseq | Opcode::Fsne | Opcode::Fsge | Opcode::Fslt => (Uint, Float),
        Opcode::Uarl => (Int, Uint),
        Opcode::Arl => (Int, Float),
        Opcode::AtomUMin | Opcode::AtomUMax => (Uint, Uint),
        Opcode::AtomIMin | Opcode::AtomIMax | Opcode::AtomAdd | Opcode::AtomAnd
        | Opcode::AtomOr | Opcode::AtomXor | Opcode::AtomXchg | Opcode::AtomCas => (Int, Int),
        _ => (Float, Float),
    }
}

/// GLSL sampler-type suffix plus shadow-ness for a texture resource kind, grounded on
/// `vrend_shader_samplertypeconv` in `vrend_shader.c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerTypeInfo {
    /// e.g. `"2D"`, `"CubeArray"`, `"2DMS"`.
    pub suffix: &'static str,
    pub is_shadow: bool,
    pub is_array: bool,
    pub is_multisample: bool,
}

pub fn sampler_type_info(kind: TextureKind) -> SamplerTypeInfo {
    use TextureKind::*;
    match kind {
        Buffer => SamplerTypeInfo { suffix: "Buffer", is_shadow: false, is_array: false, is_multisample: false },
        D1 => SamplerTypeInfo { suffix: "1D", is_shadow: false, is_array: false, is_multisample: false },
        D2 => SamplerTypeInfo { suffix: "2D", is_shadow: false, is_array: false, is_multisample: false },
        D3 => SamplerTypeInfo { suffix: "3D", is_shadow: false, is_array: false, is_multisample: false },
        Cube => SamplerTypeInfo { suffix: "Cube", is_shadow: false, is_array: false, is_multisample: false },
        Rect => SamplerTypeInfo { suffix: "2DRect", is_shadow: false, is_array: false, is_multisample: false },
        Shadow1D => SamplerTypeInfo { suffix: "1DShadow", is_shadow: true, is_array: false, is_multisample: false },
        Shadow2D => SamplerTypeInfo { suffix: "2DShadow", is_shadow: true, is_array: false, is_multisample: false },
        ShadowRect => SamplerTypeInfo { suffix: "2DRectShadow", is_shadow: true, is_array: false, is_multisample: false },
        Array1D => SamplerTypeInfo { suffix: "1DArray", is_shadow: false, is_array: true, is_multisample: false },
        Array2D => SamplerTypeInfo { suffix: "2DArray", is_shadow: false, is_array: true, is_multisample: false },
        ShadowArray1D => SamplerTypeInfo { suffix: "1DArrayShadow", is_shadow: true, is_array: true, is_multisample: false },
        ShadowArray2D => SamplerTypeInfo { suffix: "2DArrayShadow", is_shadow: true, is_array: true, is_multisample: false },
        ShadowCube => SamplerTypeInfo { suffix: "CubeShadow", is_shadow: true, is_array: false, is_multisample: false },
        CubeArray => SamplerTypeInfo { suffix: "CubeArray", is_shadow: false, is_array: true, is_multisample: false },
        ShadowCubeArray => SamplerTypeInfo { suffix: "CubeArrayShadow", is_shadow: true, is_array: true, is_multisample: false },
        Ms2D => SamplerTypeInfo { suffix: "2DMS", is_shadow: false, is_array: false, is_multisample: true },
        MsArray2D => SamplerTypeInfo { suffix: "2DMSArray", is_shadow: false, is_array: true, is_multisample: true },
    }
}

/// Number of coordinate components a texture fetch against `kind` consumes, not
/// counting the trailing shadow-compare or projective-divide lane.
pub fn coord_components(kind: TextureKind) -> u32 {
    use TextureKind::*;
    match kind {
        D1 | Buffer => 1,
        Shadow1D | Array1D => 2,
        D2 | Rect | ShadowRect | Ms2D => 2,
        Shadow2D => 3,
        Array2D | ShadowArray1D => 3,
        D3 | Cube | MsArray2D => 3,
        ShadowArray2D | CubeArray | ShadowCube => 4,
        ShadowCubeArray => 4,
    }
}

/// Resolves an image/buffer format to its GLSL `layout(...)` qualifier string and the
/// return-type tag used for the `{i,u,}image2D` prefix. Deliberately left pluggable:
/// the full format enumeration is an external, host-specific concern (§1).
pub trait FormatTable {
    fn layout_qualifier(&self, format: ImageFormat) -> Result<(&'static str, ReturnType), ConvertError>;
}

/// A representative default covering a handful of common formats, sufficient for
/// hosts that don't need the complete pipe-format enumeration wired through.
pub struct BuiltinFormatTable;

impl FormatTable for BuiltinFormatTable {
    fn layout_qualifier(&self, format: ImageFormat) -> Result<(&'static str, ReturnType), ConvertError> {
        match format.0 {
            0 => Ok(("", ReturnType::Float)), // PIPE_FORMAT_NONE: no layout qualifier needed
            1 => Ok(("rgba32f", ReturnType::Float)),
            2 => Ok(("rgba16f", ReturnType::Float)),
            3 => Ok(("rg32f", ReturnType::Float)),
            4 => Ok(("rg16f", ReturnType::Float)),
            5 => Ok(("r32f", ReturnType::Float)),
            6 => Ok(("r16f", ReturnType::Float)),
            7 => Ok(("rgba8", ReturnType::Float)),
            8 => Ok(("r8", ReturnType::Float)),
            9 => Ok(("rgba32i", ReturnType::Sint)),
            10 => Ok(("rgba32ui", ReturnType::Uint)),
            11 => Ok(("r32i", ReturnType::Sint)),
            12 => Ok(("r32ui", ReturnType::Uint)),
            other => {
                let err = ConvertError::UnknownFormat(ImageFormat(other));
                log::error!("{}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_format_has_no_layout_qualifier() {
        let (q, _) = BuiltinFormatTable.layout_qualifier(ImageFormat::NONE).unwrap();
        assert_eq!(q, "");
    }

    #[test]
    fn unknown_format_is_an_error() {
        assert!(BuiltinFormatTable.layout_qualifier(ImageFormat(999)).is_err());
    }

    #[test]
    fn sampler_suffix_matches_shadow_cube_array() {
        let info = sampler_type_info(TextureKind::ShadowCubeArray);
        assert_eq!(info.suffix, "CubeArrayShadow");
        assert!(info.is_shadow && info.is_array);
    }
}

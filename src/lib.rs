//! Translates register-file IR shader instructions into GLSL source text targeted at
//! a caller-chosen GLSL version/profile, for a host that forwards guest shader
//! programs to a native OpenGL driver.
//!
//! The single entry point is [`convert`]; [`interp::patch_vertex_interpolants`] is a
//! second, independent entry point used once a fragment stage's interpolation
//! requirements are known.

pub mod buffer;
pub mod config;
pub mod decl;
pub mod epilogue;
pub mod error;
pub mod header;
pub mod instr;
pub mod interp;
pub mod ir;
pub mod state;
pub mod tables;

use config::Cfg;
use error::ConvertError;
use ir::{Module, ShaderKey, Stage, StreamOutputInfo};
use state::{DumpState, ShaderInfo};
use tables::FormatTable;

/// Translates one shader stage's IR [`Module`] into GLSL source plus its
/// [`ShaderInfo`] record.
///
/// `convert` is synchronous and owns its [`DumpState`] exclusively for the duration of
/// the call (§5): either a complete source string and info record are returned, or no
/// output escapes and a typed [`ConvertError`] is surfaced.
pub fn convert(
    cfg: Cfg,
    key: &ShaderKey,
    module: &Module,
    stream_output: &StreamOutputInfo,
    format_table: &dyn FormatTable,
) -> Result<(String, ShaderInfo), ConvertError> {
    let stage = module.stage();
    log::debug!("converting {:?} stage module at glsl {:?}", stage, cfg.glsl_version);

    let analysis = decl::analyse(module)?;
    let declared = analysis.declared;
    let properties = analysis.properties;

    let num_clip = properties.num_clip_distances.unwrap_or(0);
    let num_cull = properties.num_cull_distances.unwrap_or(0);

    let mut state = DumpState::new(cfg, key, stage);
    state.info.num_temps = declared.highest_temp_index();
    state.info.num_clip_distances_written = num_clip;
    state.info.num_cull_distances_written = num_cull;
    if num_cull > 0 {
        state.features.insert(state::Features::WRITES_CULL_DISTANCE);
    }
    if num_clip > 0 {
        state.features.insert(state::Features::WRITES_CLIP_DISTANCE);
    }
    if !declared.constants.iter().all(|c| c.ubo.is_none()) {
        state.features.insert(state::Features::USES_UBO);
    }
    if !declared.buffers.is_empty() {
        state.features.insert(state::Features::USES_SSBO);
    }
    if !declared.images.is_empty() {
        state.features.insert(state::Features::USES_IMAGE_LOAD_STORE);
    }
    if declared.sampler_arrays.iter().any(|r| r.last - r.first > 1) {
        state.features.insert(state::Features::USES_SAMPLER_ARRAYS);
    }

    let num_color_outputs = declared.outputs.len() as u32;

    state.body.line("void main(void) {");
    state.body.indent();
    if stage.is_fragment() {
        epilogue::emit_color_selection_prologue(&mut state, num_color_outputs);
    }

    for (index, instr) in module.instructions.iter().enumerate() {
        if instr.opcode.is_texture() {
            mark_texture_features(&mut state, instr);
        }
        if instr.opcode.is_image_atomic() || matches!(instr.opcode, ir::Opcode::Load | ir::Opcode::Store) {
            state.features.insert(state::Features::USES_IMAGE_LOAD_STORE);
        }
        instr::translate_instruction(&mut state, &declared, &module.immediates, index, instr)?;
    }

    if state.control_flow_depth != 0 {
        let err = ConvertError::UnbalancedControlFlow("module ends with an unclosed IF/UIF/BGNLOOP block");
        log::error!("{}", err);
        return Err(err);
    }

    match stage {
        Stage::Vertex => epilogue::emit_vertex_epilogue(&mut state, &declared, stream_output)?,
        Stage::Fragment => {
            epilogue::emit_fragment_epilogue(&mut state, properties.write_all_cbufs, num_color_outputs)
        }
        _ => {}
    }

    state.body.dedent();
    state.body.line("}");

    let header = header::emit_header(
        &cfg,
        key,
        stage,
        &declared,
        &properties,
        state.features,
        &state.info,
        format_table,
        stream_output,
    )?;

    let mut source = header.into_string();
    source.push('\n');
    source.push_str(state.body.as_str());

    Ok((source, state.info))
}

fn mark_texture_features(state: &mut DumpState, instr: &ir::Instruction) {
    match instr.opcode {
        ir::Opcode::Tg4 => {
            state.features.insert(state::Features::USES_TEXTURE_GATHER);
            state.features.insert(state::Features::USES_GPU_SHADER5);
        }
        ir::Opcode::Txq | ir::Opcode::Lodq => {
            state.features.insert(state::Features::USES_BIT_ENCODING);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlslVersion;
    use crate::ir::{
        Declaration, DstOperand, Instruction, InputDecl, Interpolate, OutputDecl, Opcode,
        RegRange, RegisterFile, Semantic, SrcOperand, WriteMask,
    };
    use crate::tables::BuiltinFormatTable;

    fn passthrough_vertex_module() -> Module {
        let mut module = Module::new(Stage::Vertex);
        module.declarations.push(Declaration::Input(InputDecl {
            range: RegRange { first: 0, last: 1 },
            semantic: Semantic::Position,
            semantic_index: 0,
            interpolate: Interpolate::Perspective,
            centroid: false,
        }));
        module.declarations.push(Declaration::Output(OutputDecl {
            range: RegRange { first: 0, last: 1 },
            semantic: Semantic::Position,
            semantic_index: 0,
            stream: 0,
        }));
        let mut mov = Instruction::new(Opcode::Mov);
        mov.dst.push(DstOperand {
            file: RegisterFile::Output,
            index: 0,
            indirect: None,
            writemask: WriteMask::XYZW,
        });
        mov.src.push(SrcOperand::plain(RegisterFile::Input, 0));
        module.instructions.push(mov);
        module.instructions.push(Instruction::new(Opcode::End));
        module
    }

    #[test]
    fn passthrough_vertex_contains_position_assignment_and_yflip() {
        let cfg = Cfg {
            glsl_version: GlslVersion::V130,
            ..Cfg::default()
        };
        let key = ShaderKey::default();
        let module = passthrough_vertex_module();
        let so = StreamOutputInfo::default();
        let (source, _info) = convert(cfg, &key, &module, &so, &BuiltinFormatTable).unwrap();
        assert!(source.contains("#version 130"));
        assert!(source.contains("gl_Position = in_0;"));
        assert!(source.contains("gl_Position.y = gl_Position.y * winsys_adjust_y;"));
    }

    #[test]
    fn arity_violation_surfaces_as_convert_error() {
        let cfg = Cfg::default();
        let key = ShaderKey::default();
        let mut module = Module::new(Stage::Vertex);
        module.declarations.push(Declaration::Output(OutputDecl {
            range: RegRange { first: 0, last: 1 },
            semantic: Semantic::Position,
            semantic_index: 0,
            stream: 0,
        }));
        let mut bad_add = Instruction::new(Opcode::Add);
        bad_add.dst.push(DstOperand {
            file: RegisterFile::Output,
            index: 0,
            indirect: None,
            writemask: WriteMask::XYZW,
        });
        bad_add.src.push(SrcOperand::plain(RegisterFile::Temporary, 0));
        module.instructions.push(bad_add);
        let so = StreamOutputInfo::default();
        let err = convert(cfg, &key, &module, &so, &BuiltinFormatTable).unwrap_err();
        assert!(matches!(err, ConvertError::SrcArityMismatch { .. }));
    }
}

//! Stage Epilogues (§4.4): the fixed sequence of statements appended right before a
//! vertex or fragment shader's `main` closes or returns.
//!
//! Grounded on `vrend_shader.c`'s `handle_vertex_proc_exit`/`handle_fragment_proc_exit`/
//! `emit_alpha_test`; the alpha-test comparator table and the clip/cull interleaving
//! order are taken verbatim from `atests[]` and `emit_clip_dist_movs()` respectively
//! (SPEC_FULL.md §10.5).

use crate::decl::frag_color_name;
use crate::error::ConvertError;
use crate::ir::{AlphaFunc, StreamOutputInfo};
use crate::state::{Declared, DumpState};

/// Indexed exactly like the original's `atests[]`: `Never` at 0 through `Always` at 7.
const ALPHA_TEST_OPS: [&str; 8] = ["false", "<", "==", "<=", ">", "!=", ">=", "true"];

fn alpha_test_condition(func: AlphaFunc, ref_val: f32) -> String {
    let op = ALPHA_TEST_OPS[func as usize];
    match func {
        AlphaFunc::Never => "false".to_string(),
        AlphaFunc::Always => "true".to_string(),
        _ => format!("fsout_c0.w {} {:?}", op, ref_val),
    }
}

/// Emits SO copies (if no downstream geometry stage consumes them), clip-distance
/// packing, and the viewport Y-flip prescale, in that fixed order.
pub fn emit_vertex_epilogue(
    state: &mut DumpState,
    declared: &Declared,
    so: &StreamOutputInfo,
) -> Result<(), ConvertError> {
    if !so.outputs.is_empty() && !state.key.gs_present {
        emit_stream_output_copies(state, declared, so)?;
    }
    emit_clip_cull_distance_packing(state);
    state
        .body
        .line("gl_Position.y = gl_Position.y * winsys_adjust_y;");
    Ok(())
}

fn emit_stream_output_copies(
    state: &mut DumpState,
    declared: &Declared,
    so: &StreamOutputInfo,
) -> Result<(), ConvertError> {
    for (i, entry) in so.outputs.iter().enumerate() {
        let is_temp = declared
            .temps
            .iter()
            .any(|t| entry.register_index >= t.range.first && entry.register_index < t.range.last);
        let source = if is_temp {
            crate::decl::temp_name(entry.register_index)
        } else {
            match crate::instr::resolve_output_name(declared, state.stage, entry.register_index) {
                Ok(name) => name,
                Err(_) => {
                    let err = ConvertError::InvalidStreamOutputBinding(entry.register_index);
                    log::error!("{}", err);
                    return Err(err);
                }
            }
        };
        let mask = component_range_mask(entry.start_component, entry.num_components);
        state.body.line(&format!(
            "tfout{0}.{1} = {2}.{1};",
            i, mask, source
        ));
    }
    Ok(())
}

/// Synthesises a writemask string for a component range, clamping the trailing index
/// at `w` once `start + count` would otherwise run past 3 lanes.
fn component_range_mask(start: u32, count: u32) -> String {
    const LETTERS: [char; 4] = ['x', 'y', 'z', 'w'];
    (0..count)
        .map(|i| LETTERS[((start + i).min(3)) as usize])
        .collect()
}

fn emit_clip_cull_distance_packing(state: &mut DumpState) {
    let num_clip = state.info.num_clip_distances_written;
    let num_cull = state.info.num_cull_distances_written;
    if num_clip == 0 && num_cull == 0 {
        return;
    }
    for i in 0..num_clip {
        state.body.line(&format!(
            "gl_ClipDistance[{0}] = clip_dist_temp[{1}][{2}];",
            i,
            i / 4,
            i % 4
        ));
    }
    for i in 0..num_cull {
        state.body.line(&format!(
            "gl_CullDistance[{0}] = clip_dist_temp[{1}][{2}];",
            i,
            (num_clip + i) / 4,
            (num_clip + i) % 4
        ));
    }
}

/// Polygon-stipple discard, A8-bitmask swizzle, alpha test, and color-buffer broadcast,
/// in that fixed order.
pub fn emit_fragment_epilogue(state: &mut DumpState, write_all_cbufs: bool, num_color_outputs: u32) {
    if state.key.pstipple_tex {
        state.body.line(
            "if (texture(pstipple_sampler, vec2(gl_FragCoord.x / 32.0, gl_FragCoord.y / 32.0)).x == 0.0) { discard; }",
        );
    }

    for i in 0..num_color_outputs {
        if state.key.cbufs_are_a8_bitmask & (1 << i) != 0 {
            state
                .body
                .line(&format!("{0}.x = {0}.w;", frag_color_name(i)));
        }
    }

    if state.key.add_alpha_test {
        let cond = alpha_test_condition(state.key.alpha_test, state.key.alpha_ref_val);
        if cond != "true" {
            state.body.line(&format!("if (!({})) {{ discard; }}", cond));
        }
    }

    if write_all_cbufs {
        for i in 1..num_color_outputs {
            state.body.line(&format!(
                "{} = {};",
                frag_color_name(i),
                frag_color_name(0)
            ));
        }
    }
}

/// For two-sided color: at the top of `main`, select front/back-facing color per bound
/// index before any other statement executes.
pub fn emit_color_selection_prologue(state: &mut DumpState, num_colors: u32) {
    if !state.key.color_two_side {
        return;
    }
    for i in 0..num_colors {
        state.body.line(&format!(
            "vec4 realcolor{0} = gl_FrontFacing ? ex_c{0} : ex_bc{0};",
            i
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cfg;
    use crate::ir::{ShaderKey, Stage};

    #[test]
    fn never_and_always_alpha_test_use_literal_bools() {
        assert_eq!(alpha_test_condition(AlphaFunc::Never, 0.5), "false");
        assert_eq!(alpha_test_condition(AlphaFunc::Always, 0.5), "true");
    }

    #[test]
    fn greater_alpha_test_formats_reference_value() {
        let cond = alpha_test_condition(AlphaFunc::Greater, 0.5);
        assert_eq!(cond, "fsout_c0.w > 0.5");
    }

    #[test]
    fn y_flip_is_always_emitted_in_vertex_epilogue() {
        let key = ShaderKey::default();
        let mut state = DumpState::new(Cfg::default(), &key, Stage::Vertex);
        let declared = Declared::default();
        let so = crate::ir::StreamOutputInfo::default();
        emit_vertex_epilogue(&mut state, &declared, &so).unwrap();
        assert!(state
            .body
            .as_str()
            .contains("gl_Position.y = gl_Position.y * winsys_adjust_y;"));
    }

    #[test]
    fn stream_output_to_undeclared_register_is_rejected() {
        let key = ShaderKey::default();
        let mut state = DumpState::new(Cfg::default(), &key, Stage::Vertex);
        let declared = Declared::default();
        let mut so = crate::ir::StreamOutputInfo::default();
        so.outputs.push(crate::ir::StreamOutputEntry {
            register_index: 0,
            start_component: 0,
            num_components: 4,
            stream: 0,
        });
        let err = emit_vertex_epilogue(&mut state, &declared, &so).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidStreamOutputBinding(0)));
    }

    #[test]
    fn stream_output_from_a_declared_output_copies_by_its_varying_name() {
        let key = ShaderKey::default();
        let mut state = DumpState::new(Cfg::default(), &key, Stage::Vertex);
        let mut declared = Declared::default();
        declared.outputs.push(crate::ir::OutputDecl {
            range: crate::ir::RegRange { first: 0, last: 1 },
            semantic: crate::ir::Semantic::Generic,
            semantic_index: 0,
            stream: 0,
        });
        let mut so = crate::ir::StreamOutputInfo::default();
        so.outputs.push(crate::ir::StreamOutputEntry {
            register_index: 0,
            start_component: 0,
            num_components: 2,
            stream: 0,
        });
        emit_vertex_epilogue(&mut state, &declared, &so).unwrap();
        assert!(state.body.as_str().contains("tfout0.xy = vso_g0.xy;"));
    }

    #[test]
    fn stream_output_from_a_temporary_copies_by_its_temp_name() {
        let key = ShaderKey::default();
        let mut state = DumpState::new(Cfg::default(), &key, Stage::Vertex);
        let mut declared = Declared::default();
        declared.temps.push(crate::ir::TempRangeDecl {
            range: crate::ir::RegRange { first: 0, last: 1 },
            array_id: 0,
        });
        let mut so = crate::ir::StreamOutputInfo::default();
        so.outputs.push(crate::ir::StreamOutputEntry {
            register_index: 0,
            start_component: 0,
            num_components: 4,
            stream: 0,
        });
        emit_vertex_epilogue(&mut state, &declared, &so).unwrap();
        assert!(state.body.as_str().contains("tfout0.xyzw = temp0.xyzw;"));
    }
}

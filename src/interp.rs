//! Interpolation Patcher (§4.6): a separate entry point that rewrites a
//! previously-produced vertex-stage source string once the matching fragment-stage
//! interpolation descriptor is known.
//!
//! Grounded on `vrend_shader.c::replace_interp`/`vrend_patch_vertex_shader_interpolants`.
//! The vertex emitter (`header::emit_inputs`/`emit_outputs`) always reserves exactly
//! `INTERP_PREFIX` bytes of leading whitespace before `out vec4 <name>`; this module's
//! only job is to overwrite that reserved span in place.

use crate::error::PatchError;
use crate::ir::Interpolate;

/// Exactly 15 ASCII spaces, taken from the original's `#define INTERP_PREFIX`.
pub const INTERP_PREFIX_WIDTH: usize = 15;

/// One fragment-stage interpolant descriptor: which varying it reads and the
/// interpolation mode the fragment shader requires for it. `varying_name` must be the
/// exact name the vertex-stage `out vec4` declaration used (`decl::varying_name`,
/// keyed by the fragment stage's own prefix and semantic tag), since geometry presence
/// and semantic (COLOR/BCOLOR always `ex_*`, others stage-prefixed) both affect it.
#[derive(Clone, Debug)]
pub struct Interpolant {
    pub varying_name: String,
    pub mode: Interpolate,
    pub centroid: bool,
}

fn qualifier_for(mode: Interpolate, flatshade: bool, centroid: bool) -> &'static str {
    if flatshade || mode == Interpolate::Constant {
        return "flat ";
    }
    match (mode, centroid) {
        (Interpolate::Linear, true) => "noperspective centroid ",
        (Interpolate::Linear, false) => "noperspective ",
        (Interpolate::Perspective, true) => "centroid ",
        (Interpolate::Perspective, false) => "smooth ",
        (Interpolate::Color, true) => "centroid ",
        (Interpolate::Color, false) => "smooth ",
        (Interpolate::Constant, _) => "flat ",
    }
}

pub(crate) fn pad_to_prefix_width(qualifier: &str) -> String {
    let mut s = qualifier.to_string();
    while s.len() < INTERP_PREFIX_WIDTH {
        s.push(' ');
    }
    s.truncate(INTERP_PREFIX_WIDTH);
    s
}

/// Rewrites `program` in place, replacing the reserved `INTERP_PREFIX`-width span
/// before each interpolant's `out vec4 <name>` declaration with its resolved
/// qualifier. Returns an error (leaving prior substitutions visible) the first time a
/// named interpolant cannot be located.
pub fn patch_vertex_interpolants(
    program: &mut String,
    interpolants: &[Interpolant],
    flatshade: bool,
) -> Result<(), PatchError> {
    if interpolants.is_empty() {
        log::error!("{}", PatchError::EmptyQualifierSet);
        return Err(PatchError::EmptyQualifierSet);
    }
    for interp in interpolants {
        let needle = format!("out vec4 {};", interp.varying_name);
        let pos = program.find(&needle).ok_or_else(|| {
            let err = PatchError::UnmatchedVarying(interp.varying_name.clone());
            log::error!("{}", err);
            err
        })?;
        if pos < INTERP_PREFIX_WIDTH {
            let err = PatchError::UnmatchedVarying(interp.varying_name.clone());
            log::error!("{}", err);
            return Err(err);
        }
        let qualifier = pad_to_prefix_width(qualifier_for(interp.mode, flatshade, interp.centroid));
        let start = pos - INTERP_PREFIX_WIDTH;
        program.replace_range(start..pos, &qualifier);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserved_line(name: &str) -> String {
        format!("{}out vec4 {};\n", " ".repeat(INTERP_PREFIX_WIDTH), name)
    }

    #[test]
    fn flat_qualifier_overwrites_reserved_span() {
        let mut program = reserved_line("vso_g0");
        let interpolants = [Interpolant {
            varying_name: "vso_g0".to_string(),
            mode: Interpolate::Constant,
            centroid: false,
        }];
        patch_vertex_interpolants(&mut program, &interpolants, false).unwrap();
        let expected = format!("{}out vec4 vso_g0;", pad_to_prefix_width("flat "));
        assert!(program.starts_with(&expected));
    }

    #[test]
    fn flatshade_overrides_perspective_mode() {
        let mut program = reserved_line("vso_g0");
        let interpolants = [Interpolant {
            varying_name: "vso_g0".to_string(),
            mode: Interpolate::Perspective,
            centroid: false,
        }];
        patch_vertex_interpolants(&mut program, &interpolants, true).unwrap();
        let expected = format!("{}out vec4 vso_g0;", pad_to_prefix_width("flat "));
        assert!(program.starts_with(&expected));
    }

    #[test]
    fn running_twice_is_idempotent() {
        let mut program = reserved_line("vso_g0");
        let interpolants = [Interpolant {
            varying_name: "vso_g0".to_string(),
            mode: Interpolate::Perspective,
            centroid: true,
        }];
        patch_vertex_interpolants(&mut program, &interpolants, false).unwrap();
        let after_first = program.clone();
        patch_vertex_interpolants(&mut program, &interpolants, false).unwrap();
        assert_eq!(program, after_first);
    }

    #[test]
    fn unmatched_varying_is_an_error() {
        let mut program = reserved_line("vso_g0");
        let interpolants = [Interpolant {
            varying_name: "vso_g1".to_string(),
            mode: Interpolate::Perspective,
            centroid: false,
        }];
        let err = patch_vertex_interpolants(&mut program, &interpolants, false).unwrap_err();
        assert!(matches!(err, PatchError::UnmatchedVarying(_)));
    }

    #[test]
    fn geometry_varying_uses_the_gso_prefix() {
        let mut program = reserved_line("gso_g0");
        let interpolants = [Interpolant {
            varying_name: crate::decl::varying_name(
                crate::decl::input_prefix(crate::ir::Stage::Fragment, true),
                crate::ir::Semantic::Generic,
                0,
                0,
            ),
            mode: Interpolate::Perspective,
            centroid: false,
        }];
        patch_vertex_interpolants(&mut program, &interpolants, false).unwrap();
        let expected = format!("{}out vec4 gso_g0;", pad_to_prefix_width("smooth "));
        assert!(program.starts_with(&expected));
    }
}

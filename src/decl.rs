//! Declaration / Property / Immediate Analyser (§4.1, §4.2).
//!
//! Walks a [`Module`]'s declaration and property records once, validating register
//! ranges and producing the [`Declared`] bookkeeping table the Instruction Translator
//! and Stage Epilogues consult. Also owns GLSL identifier synthesis for every register
//! file, grounded on `vrend_shader.c`'s declaration-handling switch (the `sinfo`/`glsl_*`
//! naming helpers around its `handle_instruction`/`emit_ios` calls): names are derived
//! from semantic + index so a later stage's matching varying declaration is
//! name-identical, which is what makes the Interpolation Patcher's text matching
//! (§4.6) work at all.

use smallvec::SmallVec;

use crate::error::ConvertError;
use crate::ir::{
    CoordOrigin, Declaration, Module, PixelCenter, Primitive, Property, RegRange, ReturnType,
    SamplerViewDecl, Semantic, Stage, SystemValueDecl, TextureKind,
};
use crate::state::Declared;

/// Accumulated property values; each variant may be set at most once per module, per
/// the "mutated one at a time" rule in §4.2.
#[derive(Clone, Debug, Default)]
pub struct PropertyState {
    pub write_all_cbufs: bool,
    pub fs_coord_origin: Option<CoordOrigin>,
    pub fs_coord_pixel_center: Option<PixelCenter>,
    pub gs_input_primitive: Option<Primitive>,
    pub gs_output_primitive: Option<Primitive>,
    pub gs_max_vertices: Option<u32>,
    pub gs_invocations: Option<u32>,
    pub num_clip_distances: Option<u32>,
    pub num_cull_distances: Option<u32>,
    pub early_depth_stencil: bool,
    pub compute_block_size: Option<(u32, u32, u32)>,
}

fn apply_property(state: &mut PropertyState, p: Property) {
    match p {
        Property::WriteAllCbufs(v) => state.write_all_cbufs = v,
        Property::FsCoordOrigin(v) => state.fs_coord_origin = Some(v),
        Property::FsCoordPixelCenter(v) => state.fs_coord_pixel_center = Some(v),
        Property::GsInputPrimitive(v) => state.gs_input_primitive = Some(v),
        Property::GsOutputPrimitive(v) => state.gs_output_primitive = Some(v),
        Property::GsMaxVertices(v) => state.gs_max_vertices = Some(v),
        Property::GsInvocations(v) => state.gs_invocations = Some(v),
        Property::NumClipDistances(v) => state.num_clip_distances = Some(v),
        Property::NumCullDistances(v) => state.num_cull_distances = Some(v),
        Property::EarlyDepthStencil(v) => state.early_depth_stencil = v,
        Property::ComputeBlockSize(x, y, z) => state.compute_block_size = Some((x, y, z)),
    }
}

/// Result of a full declaration/property/immediate pass.
pub struct Analysis {
    pub declared: Declared,
    pub properties: PropertyState,
}

/// Walks every declaration and property of `module` in order, validating and indexing
/// them. Does not consult instructions — that's the Instruction Translator's job.
pub fn analyse(module: &Module) -> Result<Analysis, ConvertError> {
    let mut declared = Declared::default();
    let mut properties = PropertyState::default();

    for decl in &module.declarations {
        match *decl {
            Declaration::Input(d) => declared.inputs.push(d),
            Declaration::Output(d) => declared.outputs.push(d),
            Declaration::Temporary(d) => declared.temps.push(d),
            Declaration::Sampler(d) => declared.samplers.push(d),
            Declaration::SamplerView(d) => declared.sampler_views.push(d),
            Declaration::Image(d) => declared.images.push(d),
            Declaration::Buffer(d) => declared.buffers.push(d),
            Declaration::Constant(d) => declared.constants.push(d),
            Declaration::Address(d) => declared.addresses = Some(d),
            Declaration::SystemValue(d) => declared.system_values.push(d),
        }
    }

    for prop in &module.properties {
        apply_property(&mut properties, *prop);
    }

    declared.sampler_arrays = group_sampler_arrays(&declared.sampler_views);
    log::debug!("grouped {} sampler view(s) into {} array(s)", declared.sampler_views.len(), declared.sampler_arrays.len());

    Ok(Analysis { declared, properties })
}

/// Groups consecutive, same-(kind, return-type) sampler views into half-open ranges,
/// lazily built the way `vrend_shader.c`'s `decl_sampler_view` extends the previous
/// array when the next view matches; a mismatched kind/rtype or a gap starts a new run.
/// `last` is exclusive, one past the highest index folded into the run.
fn group_sampler_arrays(views: &[SamplerViewDecl]) -> SmallVec<[RegRange; 8]> {
    let mut arrays: SmallVec<[RegRange; 8]> = SmallVec::new();
    let mut run: Option<(RegRange, TextureKind, ReturnType)> = None;
    for view in views {
        match &mut run {
            Some((range, kind, rtype))
                if *kind == view.kind && *rtype == view.return_type && range.last == view.index =>
            {
                range.last = view.index + 1;
            }
            _ => {
                if let Some((range, _, _)) = run.take() {
                    arrays.push(range);
                }
                run = Some((
                    RegRange { first: view.index, last: view.index + 1 },
                    view.kind,
                    view.return_type,
                ));
            }
        }
    }
    if let Some((range, _, _)) = run {
        arrays.push(range);
    }
    arrays
}

/// Lower-cases and strips the enum name down to a short identifier fragment, used only
/// for the handful of semantics that have no short tag (see [`semantic_tag`]) and for
/// system-value fallback names.
fn semantic_fragment(sem: Semantic, index: u32) -> String {
    match sem {
        Semantic::Generic => format!("Generic{}", index),
        Semantic::Color => format!("Color{}", index),
        Semantic::BColor => format!("BColor{}", index),
        Semantic::ClipDist => format!("ClipDist{}", index),
        Semantic::TessCoord => "TessCoord".to_string(),
        Semantic::Position => "Position".to_string(),
        Semantic::Fog => "Fog".to_string(),
        Semantic::PSize => "PSize".to_string(),
        Semantic::ClipVertex => "ClipVertex".to_string(),
        Semantic::Layer => "Layer".to_string(),
        Semantic::ViewportIndex => "ViewportIndex".to_string(),
        Semantic::PrimId => "PrimId".to_string(),
        Semantic::Face => "Face".to_string(),
        Semantic::Stencil => "Stencil".to_string(),
        Semantic::SampleMask => "SampleMask".to_string(),
        Semantic::ThreadId => "ThreadId".to_string(),
        Semantic::BlockId => "BlockId".to_string(),
        Semantic::GridSize => "GridSize".to_string(),
        Semantic::VertexId => "VertexId".to_string(),
        Semantic::InstanceId => "InstanceId".to_string(),
        Semantic::InvocationId => "InvocationId".to_string(),
        Semantic::SampleId => "SampleId".to_string(),
        Semantic::SamplePos => "SamplePos".to_string(),
        Semantic::PatchVerticesIn => "PatchVerticesIn".to_string(),
        Semantic::FragCoord => "FragCoord".to_string(),
    }
}

/// Prefix for a user-declared varying on its *consuming* side: the true stage-entry
/// attribute for vertex, otherwise the name of the immediately preceding stage's output
/// prefix (geometry sits between vertex and fragment, so a fragment shader's prefix
/// depends on whether a geometry stage is actually present in the pipeline).
pub fn input_prefix(stage: Stage, gs_present: bool) -> &'static str {
    match stage {
        Stage::Vertex => "in",
        Stage::Fragment => {
            if gs_present {
                "gso"
            } else {
                "vso"
            }
        }
        _ => "vso",
    }
}

/// Prefix for a user-declared varying on its *producing* side.
pub fn output_prefix(stage: Stage) -> &'static str {
    match stage {
        Stage::Geometry => "gso",
        _ => "vso",
    }
}

/// Semantic tag appended after the stage prefix. Semantics with a dedicated patcher
/// hook (Fog/Color/BColor/Generic) get a short tag plus semantic index; everything else
/// falls back to the declaration's first register number.
fn semantic_tag(sem: Semantic, semantic_index: u32, first_register: u32) -> String {
    match sem {
        Semantic::Fog => format!("_f{}", semantic_index),
        Semantic::Color => format!("_c{}", semantic_index),
        Semantic::BColor => format!("_bc{}", semantic_index),
        Semantic::Generic => format!("_g{}", semantic_index),
        _ => format!("_{}", first_register),
    }
}

/// Varying name shared between a stage's `out` declaration and the following stage's
/// matching `in` declaration — this identity is load-bearing for the interpolation
/// patcher's textual match. COLOR/BCOLOR always use the fixed `ex` prefix regardless of
/// `prefix`, since the two-sided color selection prologue and the patcher both look for
/// `ex_c<i>`/`ex_bc<i>` independent of stage or geometry presence.
pub fn varying_name(prefix: &str, sem: Semantic, semantic_index: u32, first_register: u32) -> String {
    let prefix = match sem {
        Semantic::Color | Semantic::BColor => "ex",
        _ => prefix,
    };
    format!("{}{}", prefix, semantic_tag(sem, semantic_index, first_register))
}

pub fn temp_name(index: u32) -> String {
    format!("temp{}", index)
}

pub fn temp_array_name(array_id: u32) -> String {
    format!("temp_arr{}", array_id)
}

pub fn addr_name(index: u32) -> String {
    format!("addr{}", index)
}

pub fn sampler_name(index: u32) -> String {
    format!("samp{}", index)
}

pub fn image_name(index: u32) -> String {
    format!("image{}", index)
}

pub fn buffer_name(index: u32) -> String {
    format!("buffer{}", index)
}

/// Stage-scoped prefix for the flat (non-UBO) constant array, so a linked program never
/// collides two stages' `const0` uniforms.
pub fn const_array_prefix(stage: Stage) -> &'static str {
    match stage {
        Stage::Vertex => "vs",
        Stage::Fragment => "fs",
        Stage::Geometry => "gs",
        Stage::TessControl => "tcs",
        Stage::TessEval => "tes",
        Stage::Compute => "cs",
    }
}

/// Textual form a body reference to constant `index` must use, matching whichever
/// declaration shape `header::emit_uniforms` chose for it: a UBO member when the
/// constant is UBO-backed, otherwise an element of the flat `<stage>const0` array.
pub fn const_name(stage: Stage, ubo: Option<(u32, u32)>, index: u32) -> String {
    match ubo {
        Some((ubo_index, _size)) => format!("cb{}.values[{}]", ubo_index, index),
        None => format!("{}const0[{}]", const_array_prefix(stage), index),
    }
}

/// Fragment-stage color output name (`gl_FragData` is unavailable in core profile, so
/// color outputs are always user-declared).
pub fn frag_color_name(index: u32) -> String {
    format!("fsout_c{}", index)
}

/// Name (and whether it's a GLSL built-in needing no declaration) for a system value.
pub fn system_value_name(decl: &SystemValueDecl) -> (String, bool) {
    match decl.semantic {
        Semantic::VertexId => ("gl_VertexID".to_string(), true),
        Semantic::InstanceId => ("gl_InstanceID".to_string(), true),
        Semantic::InvocationId => ("gl_InvocationID".to_string(), true),
        Semantic::PrimId => ("gl_PrimitiveIDIn".to_string(), true),
        Semantic::Layer => ("gl_Layer".to_string(), true),
        Semantic::Face => ("gl_FrontFacing".to_string(), true),
        Semantic::FragCoord => ("gl_FragCoord".to_string(), true),
        Semantic::SampleId => ("gl_SampleID".to_string(), true),
        Semantic::SamplePos => ("gl_SamplePosition".to_string(), true),
        Semantic::ThreadId => ("gl_LocalInvocationID".to_string(), true),
        Semantic::BlockId => ("gl_WorkGroupID".to_string(), true),
        Semantic::GridSize => ("gl_NumWorkGroups".to_string(), true),
        Semantic::TessCoord => ("gl_TessCoord".to_string(), true),
        Semantic::PatchVerticesIn => ("gl_PatchVerticesIn".to_string(), true),
        other => (format!("sysval_{}", semantic_fragment(other, decl.index)), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_varying_names_match_across_stage_boundary_without_geometry() {
        let vs_out = varying_name(output_prefix(Stage::Vertex), Semantic::Generic, 0, 0);
        let fs_in = varying_name(input_prefix(Stage::Fragment, false), Semantic::Generic, 0, 0);
        assert_eq!(vs_out, fs_in);
        assert_eq!(vs_out, "vso_g0");
    }

    #[test]
    fn generic_varying_names_match_across_stage_boundary_with_geometry() {
        let gs_out = varying_name(output_prefix(Stage::Geometry), Semantic::Generic, 0, 0);
        let fs_in = varying_name(input_prefix(Stage::Fragment, true), Semantic::Generic, 0, 0);
        assert_eq!(gs_out, fs_in);
        assert_eq!(gs_out, "gso_g0");
    }

    #[test]
    fn color_and_bcolor_always_use_the_ex_prefix() {
        assert_eq!(varying_name(output_prefix(Stage::Vertex), Semantic::Color, 0, 0), "ex_c0");
        assert_eq!(varying_name(input_prefix(Stage::Fragment, false), Semantic::BColor, 0, 0), "ex_bc0");
    }

    #[test]
    fn other_semantics_fall_back_to_first_register_number() {
        assert_eq!(varying_name(input_prefix(Stage::Vertex, false), Semantic::Position, 0, 0), "in_0");
    }

    #[test]
    fn analysing_empty_module_succeeds() {
        let module = Module::new(Stage::Vertex);
        let analysis = analyse(&module).unwrap();
        assert!(analysis.declared.inputs.is_empty());
        assert!(analysis.properties.compute_block_size.is_none());
    }

    #[test]
    fn properties_are_applied_in_order() {
        let mut module = Module::new(Stage::Fragment);
        module.properties.push(Property::FsCoordOrigin(CoordOrigin::UpperLeft));
        module.properties.push(Property::FsCoordOrigin(CoordOrigin::LowerLeft));
        let analysis = analyse(&module).unwrap();
        assert_eq!(analysis.properties.fs_coord_origin, Some(CoordOrigin::LowerLeft));
    }

    #[test]
    fn consecutive_matching_sampler_views_form_one_array() {
        let mut module = Module::new(Stage::Fragment);
        for i in 0..3 {
            module.declarations.push(Declaration::SamplerView(SamplerViewDecl {
                index: i,
                kind: TextureKind::D2,
                return_type: ReturnType::Float,
            }));
        }
        let analysis = analyse(&module).unwrap();
        assert_eq!(analysis.declared.sampler_arrays.as_slice(), &[RegRange { first: 0, last: 3 }]);
    }

    #[test]
    fn mismatched_kind_starts_a_new_array() {
        let mut module = Module::new(Stage::Fragment);
        module.declarations.push(Declaration::SamplerView(SamplerViewDecl {
            index: 0,
            kind: TextureKind::D2,
            return_type: ReturnType::Float,
        }));
        module.declarations.push(Declaration::SamplerView(SamplerViewDecl {
            index: 1,
            kind: TextureKind::Cube,
            return_type: ReturnType::Float,
        }));
        let analysis = analyse(&module).unwrap();
        assert_eq!(
            analysis.declared.sampler_arrays.as_slice(),
            &[RegRange { first: 0, last: 1 }, RegRange { first: 1, last: 2 }]
        );
    }
}

//! Header/IO Emitter (§4.5): builds the GLSL preamble once the instruction pass has
//! fully populated `DumpState`'s feature flags and declaration tables.
//!
//! Grounded on `device.rs::translate_spirv`'s version-selection `match` for the
//! general shape (pick a version enum, then branch on it) and on
//! `vrend_shader.c::emit_header`/`emit_ios` for the fixed extension and declaration
//! ordering, reproduced verbatim from SPEC_FULL.md §4.5/§10.5 so the emitted output is
//! byte-stable for identical inputs.

use crate::buffer::GlslBuffer;
use crate::config::Cfg;
use crate::decl::{
    addr_name, buffer_name, const_array_prefix, frag_color_name, image_name, input_prefix,
    output_prefix, sampler_name, system_value_name, temp_array_name, temp_name, varying_name,
};
use crate::decl::PropertyState;
use crate::error::ConvertError;
use crate::ir::{Semantic, ShaderKey, Stage, StreamOutputInfo};
use crate::state::{Declared, Features, ShaderInfo};
use crate::tables::{self, FormatTable};

/// Output semantics that redirect to a built-in or a packing temporary (§4.1) instead of
/// an ordinary declared varying — these never get a plain `out vec4` declaration here.
fn is_redirected_output(sem: Semantic) -> bool {
    matches!(
        sem,
        Semantic::Position | Semantic::ClipDist | Semantic::ClipVertex | Semantic::SampleMask | Semantic::Stencil
    )
}

/// Fixed extension-name + feature-flag pairs, in the exact order `emit_header()`
/// historically emitted them (SPEC_FULL.md §4.5 point 2).
const EXTENSION_ORDER: &[(Features, &str)] = &[
    (Features::USES_BIT_ENCODING, "GL_ARB_shader_bit_encoding"),
    (Features::USES_TEXTURE_GATHER, "GL_ARB_texture_gather"),
    (Features::USES_UBO, "GL_ARB_uniform_buffer_object"),
    (Features::USES_SSBO, "GL_ARB_shader_storage_buffer_object"),
    (Features::USES_IMAGE_LOAD_STORE, "GL_ARB_shader_image_load_store"),
    (Features::USES_SAMPLER_ARRAYS, "GL_EXT_texture_array"),
    (Features::WRITES_CULL_DISTANCE, "GL_ARB_cull_distance"),
    (Features::WRITES_FRAGDEPTH, "GL_ARB_conservative_depth"),
    (Features::USES_GPU_SHADER5, "GL_ARB_gpu_shader5"),
];

fn version_line(cfg: &Cfg, stage: Stage) -> String {
    let v = cfg.glsl_version;
    if v.es {
        format!("#version {} es", v.number)
    } else if stage.is_compute() {
        format!("#version {}", v.number.max(330))
    } else if stage.is_geometry() {
        format!("#version {}", v.number.max(150))
    } else {
        format!("#version {}", v.number)
    }
}

fn emit_extensions(buf: &mut GlslBuffer, cfg: &Cfg, features: Features, stage: Stage) {
    if stage.is_vertex() && cfg.use_explicit_locations {
        buf.raw_line("#extension GL_ARB_explicit_attrib_location : require");
    }
    for (flag, name) in EXTENSION_ORDER {
        if features.contains(*flag) {
            buf.raw_line(&format!("#extension {} : require", name));
        }
    }
}

fn layout_qualifier(cfg: &Cfg, index: u32) -> String {
    if cfg.use_explicit_locations {
        format!("layout(location = {}) ", index)
    } else {
        String::new()
    }
}

fn emit_inputs(buf: &mut GlslBuffer, cfg: &Cfg, stage: Stage, gs_present: bool, declared: &Declared) {
    let prefix = input_prefix(stage, gs_present);
    for (i, d) in declared.inputs.iter().enumerate() {
        let name = varying_name(prefix, d.semantic, d.semantic_index, d.range.first);
        if stage.is_vertex() {
            buf.line(&format!("{}in vec4 {};", layout_qualifier(cfg, i as u32), name));
            continue;
        }
        let qualifier = interpolation_qualifier_placeholder();
        buf.line(&format!(
            "{}{}in vec4 {};",
            layout_qualifier(cfg, i as u32),
            qualifier,
            name
        ));
    }
}

/// Reserves `INTERP_PREFIX`-width space (SPEC_FULL.md §4.6/§10.5) immediately before
/// `in`/`out vec4 <name>` so the Interpolation Patcher can overwrite it in place.
fn interpolation_qualifier_placeholder() -> &'static str {
    "               " // 15 spaces
}

fn emit_outputs(buf: &mut GlslBuffer, cfg: &Cfg, stage: Stage, declared: &Declared) {
    if stage.is_fragment() {
        for (i, d) in declared.outputs.iter().enumerate() {
            if is_redirected_output(d.semantic) {
                continue;
            }
            buf.line(&format!(
                "{}out vec4 {};",
                layout_qualifier(cfg, i as u32),
                frag_color_name(i as u32)
            ));
        }
        return;
    }
    let prefix = output_prefix(stage);
    for (i, d) in declared.outputs.iter().enumerate() {
        if is_redirected_output(d.semantic) {
            continue;
        }
        let name = varying_name(prefix, d.semantic, d.semantic_index, d.range.first);
        let stream_layout = if d.stream != 0 {
            format!("layout(stream = {}) ", d.stream)
        } else {
            String::new()
        };
        buf.line(&format!(
            "{}{}{}out vec4 {};",
            stream_layout,
            layout_qualifier(cfg, i as u32),
            interpolation_qualifier_placeholder(),
            name
        ));
    }
}

fn emit_uniforms(
    buf: &mut GlslBuffer,
    cfg: &Cfg,
    stage: Stage,
    declared: &Declared,
    features: Features,
    format_table: &dyn FormatTable,
) -> Result<(), ConvertError> {
    buf.blank_line();
    buf.line("uniform float winsys_adjust_y;");

    let flat_count = declared.constants.iter().filter(|c| c.ubo.is_none()).count();
    if flat_count > 0 {
        buf.line(&format!(
            "uniform uvec4 {}const0[{}];",
            const_array_prefix(stage),
            flat_count
        ));
    }

    let mut ubo_indices: Vec<(u32, u32)> = declared
        .constants
        .iter()
        .filter_map(|c| c.ubo)
        .collect();
    ubo_indices.sort_by_key(|(idx, _)| *idx);
    ubo_indices.dedup_by_key(|(idx, _)| *idx);
    for (ubo_index, size) in ubo_indices {
        buf.line(&format!(
            "uniform cb{0}_block {{ uvec4 values[{1}]; }} cb{0};",
            ubo_index, size
        ));
    }

    let mut i = 0;
    while i < declared.sampler_views.len() {
        let view = &declared.sampler_views[i];
        let info = tables::sampler_type_info(view.kind);
        let is_1d = matches!(view.kind, crate::ir::TextureKind::D1 | crate::ir::TextureKind::Shadow1D);
        let suffix_text = if cfg.glsl_version.es && is_1d {
            info.suffix.replacen('1', "2", 1)
        } else {
            info.suffix.to_string()
        };
        let array = declared
            .sampler_arrays
            .iter()
            .find(|r| r.first == view.index && r.last - r.first > 1);
        let count = array.map(|r| r.last - r.first).unwrap_or(1);
        let suffix = if count > 1 {
            format!("[{}]", count)
        } else {
            String::new()
        };
        buf.line(&format!(
            "uniform {}sampler{} {}{};",
            view.return_type.prefix_char().to_string().trim(),
            suffix_text,
            sampler_name(view.index),
            suffix
        ));
        if info.is_shadow {
            buf.line(&format!("uniform float shadmask{};", view.index));
            buf.line(&format!("uniform float shadadd{};", view.index));
        }
        i += count as usize;
    }

    for img in &declared.images {
        let (layout, rtype) = format_table.layout_qualifier(img.format)?;
        let info = tables::sampler_type_info(img.kind);
        let layout_str = if layout.is_empty() {
            String::new()
        } else {
            format!("layout({}) ", layout)
        };
        let writeonly = if layout.is_empty() { "writeonly " } else { "" };
        let volatile = if img.volatile { "volatile " } else { "" };
        buf.line(&format!(
            "{}{}{}uniform {}image{} {};",
            layout_str,
            volatile,
            writeonly,
            rtype.prefix_char().to_string().trim(),
            info.suffix,
            image_name(img.index)
        ));
    }

    for buffer_decl in &declared.buffers {
        buf.line(&format!(
            "buffer {0}_block {{ uvec4 values[]; }} {0};",
            buffer_name(buffer_decl.index)
        ));
    }

    let _ = features;
    Ok(())
}

fn emit_temporaries(buf: &mut GlslBuffer, declared: &Declared, info: &ShaderInfo) {
    buf.blank_line();
    for t in &declared.temps {
        if t.array_id != 0 {
            buf.line(&format!(
                "vec4 {}[{}];",
                temp_array_name(t.array_id),
                t.range.last - t.range.first
            ));
        } else {
            for i in t.range.first..t.range.last {
                buf.line(&format!("vec4 {};", temp_name(i)));
            }
        }
    }
    if let Some(addr) = declared.addresses {
        for i in 0..addr.count {
            buf.line(&format!("int {};", addr_name(i)));
        }
    }

    let clip_cull_total = info.num_clip_distances_written + info.num_cull_distances_written;
    if clip_cull_total > 0 {
        let vecs = ((clip_cull_total - 1) / 4) + 1;
        buf.line(&format!("vec4 clip_dist_temp[{}];", vecs));
    }
    if declared.outputs.iter().any(|d| d.semantic == Semantic::ClipVertex) {
        buf.line("vec4 clipv_tmp;");
    }
}

fn emit_system_values(buf: &mut GlslBuffer, declared: &Declared) {
    for sv in &declared.system_values {
        let (_, is_builtin) = system_value_name(sv);
        if !is_builtin {
            buf.line(&format!("in int sysval_{};", sv.index));
        }
    }
}

/// Produces the full header buffer for one stage.
pub fn emit_header(
    cfg: &Cfg,
    key: &ShaderKey,
    stage: Stage,
    declared: &Declared,
    properties: &PropertyState,
    features: Features,
    info: &ShaderInfo,
    format_table: &dyn FormatTable,
    stream_output: &StreamOutputInfo,
) -> Result<GlslBuffer, ConvertError> {
    let mut buf = GlslBuffer::new();
    buf.raw_line(&version_line(cfg, stage));
    emit_extensions(&mut buf, cfg, features, stage);

    if stage.is_fragment() {
        let needs_origin = properties.fs_coord_origin == Some(crate::ir::CoordOrigin::UpperLeft);
        let needs_pixel_center = properties.fs_coord_pixel_center == Some(crate::ir::PixelCenter::Integer);
        if needs_origin || needs_pixel_center {
            let mut qualifiers = Vec::new();
            if needs_origin {
                qualifiers.push("origin_upper_left");
            }
            if needs_pixel_center {
                qualifiers.push("pixel_center_integer");
            }
            buf.line(&format!("layout({}) in vec4 gl_FragCoord;", qualifiers.join(", ")));
        }
        if properties.early_depth_stencil {
            buf.line("layout(early_fragment_tests) in;");
        }
    }
    if stage.is_compute() {
        let (x, y, z) = properties.compute_block_size.ok_or_else(|| {
            let err = ConvertError::MissingComputeBlockSize;
            log::error!("{}", err);
            err
        })?;
        buf.line(&format!("layout(local_size_x = {}, local_size_y = {}, local_size_z = {}) in;", x, y, z));
    }
    if stage.is_geometry() {
        if let (Some(inp), Some(outp)) = (properties.gs_input_primitive, properties.gs_output_primitive) {
            let in_layout = primitive_layout_name(inp);
            let invocations = properties
                .gs_invocations
                .filter(|v| *v > 1)
                .map(|v| format!(", invocations = {}", v))
                .unwrap_or_default();
            buf.line(&format!("layout({}{}) in;", in_layout, invocations));
            let max_vertices = properties.gs_max_vertices.ok_or_else(|| {
                let err = ConvertError::MissingGeometryProperty("max_vertices");
                log::error!("{}", err);
                err
            })?;
            buf.line(&format!(
                "layout({}, max_vertices = {}) out;",
                primitive_layout_name(outp),
                max_vertices
            ));
        } else {
            let err = ConvertError::MissingGeometryProperty("input/output primitive");
            log::error!("{}", err);
            return Err(err);
        }
    }

    buf.blank_line();
    emit_inputs(&mut buf, cfg, stage, key.gs_present, declared);
    emit_system_values(&mut buf, declared);
    emit_outputs(&mut buf, cfg, stage, declared);

    let emits_so_here = !stream_output.outputs.is_empty()
        && ((stage.is_vertex() && !key.gs_present) || stage.is_geometry());
    if emits_so_here {
        for i in 0..stream_output.outputs.len() as u32 {
            buf.line(&format!("out vec4 tfout{};", i));
        }
    }

    if key.clip_plane_enable != 0 {
        buf.line("uniform vec4 clipp[8];");
    }
    if info.num_clip_distances_written > 0 || info.num_cull_distances_written > 0 || (stage.is_vertex() && key.gs_present) {
        buf.line("out gl_PerVertex {");
        buf.indent();
        buf.line("vec4 gl_Position;");
        buf.line("float gl_PointSize;");
        if info.num_clip_distances_written > 0 {
            buf.line(&format!("float gl_ClipDistance[{}];", info.num_clip_distances_written));
        }
        if info.num_cull_distances_written > 0 {
            buf.line(&format!("float gl_CullDistance[{}];", info.num_cull_distances_written));
        }
        buf.dedent();
        buf.line("};");
    }

    emit_uniforms(&mut buf, cfg, stage, declared, features, format_table)?;
    emit_temporaries(&mut buf, declared, info);

    Ok(buf)
}

fn primitive_layout_name(p: crate::ir::Primitive) -> &'static str {
    use crate::ir::Primitive::*;
    match p {
        Points => "points",
        Lines => "lines",
        LinesAdjacency => "lines_adjacency",
        Triangles => "triangles",
        TrianglesAdjacency => "triangles_adjacency",
        LineStrip => "line_strip",
        TriangleStrip => "triangle_strip",
    }
}

//! Black-box scenarios for `tgsi_glsl::convert`: each builds an `ir::Module` and a
//! `ShaderKey` by hand and asserts on substrings of the generated GLSL, the way
//! `vrend_shader.c`'s own test shaders exercise one feature combination at a time.

use tgsi_glsl::config::{Cfg, GlslVersion};
use tgsi_glsl::ir::{
    AddrRef, AddressDecl, Declaration, DstOperand, Immediate, InputDecl, Instruction,
    Interpolate, Module, OutputDecl, Opcode, Primitive, Property, RegRange, RegisterFile,
    Semantic, ShaderKey, SrcOperand, Stage, StreamOutputInfo, TexPayload, TextureKind, WriteMask,
};
use tgsi_glsl::tables::BuiltinFormatTable;

fn convert(module: &Module, key: &ShaderKey, cfg: Cfg) -> (String, tgsi_glsl::state::ShaderInfo) {
    let so = StreamOutputInfo::default();
    tgsi_glsl::convert(cfg, key, module, &so, &BuiltinFormatTable).expect("conversion should succeed")
}

fn dst(file: RegisterFile, index: u32, mask: WriteMask) -> DstOperand {
    DstOperand {
        file,
        index,
        indirect: None,
        writemask: mask,
    }
}

/// Scenario 1: a passthrough vertex shader moves its position input straight to
/// `gl_Position` and must carry the fixed viewport Y-flip.
#[test]
fn passthrough_vertex_shader() {
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
    mov.dst.push(dst(RegisterFile::Output, 0, WriteMask::XYZW));
    mov.src.push(SrcOperand::plain(RegisterFile::Input, 0));
    module.instructions.push(mov);
    module.instructions.push(Instruction::new(Opcode::End));

    let cfg = Cfg {
        glsl_version: GlslVersion::V130,
        ..Cfg::default()
    };
    let (source, _info) = convert(&module, &ShaderKey::default(), cfg);

    assert!(source.contains("#version 130"));
    assert!(source.contains("in vec4 in_0;"));
    assert!(source.contains("gl_Position = in_0;"));
    assert!(source.contains("gl_Position.y = gl_Position.y * winsys_adjust_y;"));
}

/// Scenario 2: a fragment shader with `GREATER 0.5` alpha test and write-all-cbufs
/// must discard below threshold and broadcast `fsout_c0` to every bound color output.
#[test]
fn fragment_alpha_test_and_write_all_cbufs() {
    let mut module = Module::new(Stage::Fragment);
    module.declarations.push(Declaration::Temporary(
        tgsi_glsl::ir::TempRangeDecl {
            range: RegRange { first: 0, last: 1 },
            array_id: 0,
        },
    ));
    module.declarations.push(Declaration::Output(OutputDecl {
        range: RegRange { first: 0, last: 1 },
        semantic: Semantic::Color,
        semantic_index: 0,
        stream: 0,
    }));
    module.declarations.push(Declaration::Output(OutputDecl {
        range: RegRange { first: 1, last: 2 },
        semantic: Semantic::Color,
        semantic_index: 1,
        stream: 0,
    }));
    module.properties.push(Property::WriteAllCbufs(true));

    let mut mov = Instruction::new(Opcode::Mov);
    mov.dst.push(dst(RegisterFile::Output, 0, WriteMask::XYZW));
    mov.src.push(SrcOperand::plain(RegisterFile::Temporary, 0));
    module.instructions.push(mov);
    module.instructions.push(Instruction::new(Opcode::End));

    let key = ShaderKey {
        add_alpha_test: true,
        alpha_test: tgsi_glsl::ir::AlphaFunc::Greater,
        alpha_ref_val: 0.5,
        ..ShaderKey::default()
    };
    let (source, _info) = convert(&module, &key, Cfg::default());

    assert!(source.contains("out vec4 fsout_c0;"));
    assert!(source.contains("out vec4 fsout_c1;"));
    assert!(source.contains("fsout_c0 = temp0;"));
    assert!(source.contains("if (!(fsout_c0.w > 0.5)) { discard; }"));
    assert!(source.contains("fsout_c1 = fsout_c0;"));
}

/// Scenario 3: two-sided color selects `ex_c0`/`ex_bc0` by `gl_FrontFacing`
/// before any other fragment-shader statement runs.
#[test]
fn two_sided_color_selection() {
    let mut module = Module::new(Stage::Fragment);
    module.declarations.push(Declaration::Input(InputDecl {
        range: RegRange { first: 0, last: 1 },
        semantic: Semantic::Color,
        semantic_index: 0,
        interpolate: Interpolate::Color,
        centroid: false,
    }));
    module.declarations.push(Declaration::Input(InputDecl {
        range: RegRange { first: 1, last: 2 },
        semantic: Semantic::BColor,
        semantic_index: 0,
        interpolate: Interpolate::Color,
        centroid: false,
    }));
    module.declarations.push(Declaration::Output(OutputDecl {
        range: RegRange { first: 0, last: 1 },
        semantic: Semantic::Color,
        semantic_index: 0,
        stream: 0,
    }));
    let mut mov = Instruction::new(Opcode::Mov);
    mov.dst.push(dst(RegisterFile::Output, 0, WriteMask::XYZW));
    mov.src.push(SrcOperand::plain(RegisterFile::Input, 0));
    module.instructions.push(mov);
    module.instructions.push(Instruction::new(Opcode::End));

    let key = ShaderKey {
        color_two_side: true,
        ..ShaderKey::default()
    };
    let (source, _info) = convert(&module, &key, Cfg::default());

    let body_start = source.find("void main(void) {").unwrap();
    let prologue_pos = source.find("vec4 realcolor0 = gl_FrontFacing ? ex_c0 : ex_bc0;").unwrap();
    assert!(prologue_pos > body_start);
}

/// Scenario 4: `TG4` with an explicit gather component requires `GL_ARB_gpu_shader5`
/// and `GL_ARB_texture_gather`, in that order, and threads the component through.
#[test]
fn texture_gather_with_component() {
    let mut module = Module::new(Stage::Fragment);
    module.declarations.push(Declaration::Input(InputDecl {
        range: RegRange { first: 0, last: 1 },
        semantic: Semantic::Generic,
        semantic_index: 0,
        interpolate: Interpolate::Perspective,
        centroid: false,
    }));
    module.declarations.push(Declaration::SamplerView(
        tgsi_glsl::ir::SamplerViewDecl {
            index: 0,
            kind: TextureKind::D2,
            return_type: tgsi_glsl::ir::ReturnType::Float,
        },
    ));
    module.declarations.push(Declaration::Output(OutputDecl {
        range: RegRange { first: 0, last: 1 },
        semantic: Semantic::Color,
        semantic_index: 0,
        stream: 0,
    }));

    let mut tg4 = Instruction::new(Opcode::Tg4);
    tg4.dst.push(dst(RegisterFile::Output, 0, WriteMask::XYZW));
    tg4.src.push(SrcOperand::plain(RegisterFile::Input, 0));
    tg4.src.push(SrcOperand::plain(RegisterFile::SamplerView, 0));
    tg4.src.push(SrcOperand::plain(RegisterFile::Immediate, 0));
    tg4.tex = Some(TexPayload {
        target: TextureKind::D2,
        gather_component: Some(2),
    });
    module.immediates.push(Immediate::from_i32([2, 2, 2, 2]));
    module.instructions.push(tg4);
    module.instructions.push(Instruction::new(Opcode::End));

    let (source, _info) = convert(&module, &ShaderKey::default(), Cfg::default());

    let shader5_pos = source.find("#extension GL_ARB_gpu_shader5 : require").unwrap();
    let gather_pos = source.find("#extension GL_ARB_texture_gather : require").unwrap();
    assert!(gather_pos < shader5_pos);
    assert!(source.contains("textureGather(samp0, vso_g0, 2)"));
}

/// Scenario 5: indirectly-addressed sampler views index into the declared sampler
/// array through the bound address register.
#[test]
fn indirect_sampler_indexing() {
    let mut module = Module::new(Stage::Fragment);
    module.declarations.push(Declaration::Address(AddressDecl { count: 1 }));
    module.declarations.push(Declaration::Input(InputDecl {
        range: RegRange { first: 0, last: 1 },
        semantic: Semantic::Generic,
        semantic_index: 0,
        interpolate: Interpolate::Perspective,
        centroid: false,
    }));
    for i in 0..4 {
        module.declarations.push(Declaration::SamplerView(
            tgsi_glsl::ir::SamplerViewDecl {
                index: i,
                kind: TextureKind::D2,
                return_type: tgsi_glsl::ir::ReturnType::Float,
            },
        ));
    }
    module.declarations.push(Declaration::Output(OutputDecl {
        range: RegRange { first: 0, last: 1 },
        semantic: Semantic::Color,
        semantic_index: 0,
        stream: 0,
    }));

    let mut tex = Instruction::new(Opcode::Tex);
    tex.dst.push(dst(RegisterFile::Output, 0, WriteMask::XYZW));
    tex.src.push(SrcOperand::plain(RegisterFile::Input, 0));
    let mut sampler_src = SrcOperand::plain(RegisterFile::SamplerView, 0);
    sampler_src.indirect = Some(AddrRef {
        address_reg: 0,
        offset: 0,
    });
    tex.src.push(sampler_src);
    tex.tex = Some(TexPayload {
        target: TextureKind::D2,
        gather_component: None,
    });
    module.instructions.push(tex);
    module.instructions.push(Instruction::new(Opcode::End));

    let (source, _info) = convert(&module, &ShaderKey::default(), Cfg::default());

    assert!(source.contains("uniform sampler2D samp0[4];"));
    assert!(source.contains("texture(samp0[int(addr0)], vso_g0)"));
}

/// Scenario 6: a geometry shader emitting into stream 1 requires `GL_ARB_gpu_shader5`
/// and the input/output primitive layout lines.
#[test]
fn geometry_stream_emit() {
    let mut module = Module::new(Stage::Geometry);
    module.properties.push(Property::GsInputPrimitive(Primitive::Triangles));
    module.properties.push(Property::GsOutputPrimitive(Primitive::TriangleStrip));
    module.properties.push(Property::GsMaxVertices(3));
    module.declarations.push(Declaration::Output(OutputDecl {
        range: RegRange { first: 0, last: 1 },
        semantic: Semantic::Position,
        semantic_index: 0,
        stream: 1,
    }));

    let mut emit = Instruction::new(Opcode::Emit);
    emit.stream = 1;
    emit.src.push(SrcOperand::plain(RegisterFile::Immediate, 0));
    module.immediates.push(Immediate::from_i32([1, 1, 1, 1]));
    module.instructions.push(emit);

    let mut endprim = Instruction::new(Opcode::EndPrim);
    endprim.stream = 1;
    endprim.src.push(SrcOperand::plain(RegisterFile::Immediate, 0));
    module.instructions.push(endprim);
    module.instructions.push(Instruction::new(Opcode::End));

    let key = ShaderKey {
        gs_present: true,
        ..ShaderKey::default()
    };
    let (source, _info) = convert(&module, &key, Cfg::default());

    assert!(source.contains("#extension GL_ARB_gpu_shader5 : require"));
    assert!(source.contains("layout(triangles) in;"));
    assert!(source.contains("layout(triangle_strip, max_vertices = 3) out;"));
    assert!(source.contains("EmitStreamVertex(1);"));
    assert!(source.contains("EndStreamPrimitive(1);"));
}

//! Types describing the external intermediate representation this crate translates.
//!
//! The IR tokenizer/iterator that actually produces a stream of these records from a
//! guest program is out of scope (SPEC_FULL.md §1, §6): in the real host it walks an
//! opcode stream and invokes declaration/immediate/property/instruction callbacks in
//! order. Here we model its output directly as an already-assembled [`Module`], since
//! Rust's ownership model makes consuming an owned, pre-order sequence more natural
//! than registering callbacks with a push-based iterator (see DESIGN.md).

use arrayvec::ArrayVec;

/// The shader stage a [`Module`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    TessControl,
    TessEval,
    Geometry,
    Fragment,
    Compute,
}

impl Stage {
    pub fn is_fragment(self) -> bool {
        self == Stage::Fragment
    }

    pub fn is_vertex(self) -> bool {
        self == Stage::Vertex
    }

    pub fn is_geometry(self) -> bool {
        self == Stage::Geometry
    }

    pub fn is_compute(self) -> bool {
        self == Stage::Compute
    }
}

/// One of the closed set of register files an operand can reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegisterFile {
    Input,
    Output,
    Temporary,
    Constant,
    Address,
    Sampler,
    SamplerView,
    Image,
    Buffer,
    Immediate,
    SystemValue,
}

/// Closed enumeration of IOSlot semantic kinds (SPEC_FULL.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Semantic {
    Position,
    Color,
    BColor,
    Generic,
    Fog,
    PSize,
    ClipDist,
    ClipVertex,
    Layer,
    ViewportIndex,
    PrimId,
    Face,
    Stencil,
    SampleMask,
    TessCoord,
    ThreadId,
    BlockId,
    GridSize,
    VertexId,
    InstanceId,
    InvocationId,
    SampleId,
    SamplePos,
    PatchVerticesIn,
    FragCoord,
}

/// Per-lane component selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lane {
    X,
    Y,
    Z,
    W,
}

impl Lane {
    pub fn as_char(self) -> char {
        match self {
            Lane::X => 'x',
            Lane::Y => 'y',
            Lane::Z => 'z',
            Lane::W => 'w',
        }
    }
}

/// A per-source swizzle: one lane selector per destination-facing component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Swizzle(pub [Lane; 4]);

impl Swizzle {
    pub const IDENTITY: Swizzle = Swizzle([Lane::X, Lane::Y, Lane::Z, Lane::W]);

    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }
}

bitflags::bitflags! {
    /// The subset of xyzw lanes written by a destination operand.
    pub struct WriteMask: u8 {
        const X = 0x1;
        const Y = 0x2;
        const Z = 0x4;
        const W = 0x8;
        const XYZW = Self::X.bits | Self::Y.bits | Self::Z.bits | Self::W.bits;
    }
}

impl WriteMask {
    /// Number of lanes set.
    pub fn count(self) -> u32 {
        self.bits().count_ones()
    }
}

/// Indirect or dimensioned addressing through an address register, `addr<k> + offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AddrRef {
    pub address_reg: u32,
    pub offset: i32,
}

/// A destination operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DstOperand {
    pub file: RegisterFile,
    pub index: u32,
    pub indirect: Option<AddrRef>,
    pub writemask: WriteMask,
}

/// A source operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SrcOperand {
    pub file: RegisterFile,
    pub index: u32,
    pub indirect: Option<AddrRef>,
    pub dimension: Option<AddrRef>,
    pub swizzle: Swizzle,
    pub negate: bool,
    pub abs: bool,
}

impl SrcOperand {
    pub fn plain(file: RegisterFile, index: u32) -> Self {
        SrcOperand {
            file,
            index,
            indirect: None,
            dimension: None,
            swizzle: Swizzle::IDENTITY,
            negate: false,
            abs: false,
        }
    }
}

/// Closed enumeration of texture/image resource kinds (sampler-kind, SPEC_FULL.md §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Buffer,
    D1,
    D2,
    D3,
    Cube,
    Rect,
    Shadow1D,
    Shadow2D,
    ShadowRect,
    Array1D,
    Array2D,
    ShadowArray1D,
    ShadowArray2D,
    ShadowCube,
    CubeArray,
    ShadowCubeArray,
    Ms2D,
    MsArray2D,
}

/// Sampler / image return-type tag, used as the GLSL return-type prefix `{' ', 'i', 'u'}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Float,
    Sint,
    Uint,
}

impl ReturnType {
    pub fn prefix_char(self) -> char {
        match self {
            ReturnType::Float => ' ',
            ReturnType::Sint => 'i',
            ReturnType::Uint => 'u',
        }
    }
}

/// Opaque image/buffer format identifier, resolved by an external [`crate::tables::FormatTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageFormat(pub u32);

impl ImageFormat {
    /// The sentinel "no format" value (`PIPE_FORMAT_NONE` in the original IR).
    pub const NONE: ImageFormat = ImageFormat(0);
}

/// Opcode-level classification used to pick an operand-type table entry and a
/// translation routine. Grouped the way SPEC_FULL.md §4.3 groups opcode families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Arithmetic / logical
    Mov,
    Add,
    Sub,
    Mul,
    Mad,
    Dp2,
    Dp3,
    Dp4,
    Min,
    Max,
    Abs,
    Frc,
    Flr,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    // Scalar/vector built-in templates
    Rcp,
    Rsq,
    Pow,
    Ex2,
    Lg2,
    Exp,
    Log,
    Scs,
    Lit,
    Dst,
    // Comparisons (signed float, produce -1.0/0.0)
    Seq,
    Sne,
    Sge,
    Slt,
    Sgt,
    Sle,
    // Comparisons (unsigned bit-pattern result)
    Useq,
    Usne,
    Usge,
    Uslt,
    // Comparisons (raw float-bits)
    Fseq,
    Fsne,
    Fsge,
    Fslt,
    // Address register
    Arl,
    Uarl,
    // Texture family
    Tex,
    Txb,
    Txl,
    Txd,
    Txf,
    Txp,
    Tg4,
    Txq,
    Lodq,
    // Image / buffer resources
    Load,
    Store,
    AtomAdd,
    AtomXchg,
    AtomCas,
    AtomAnd,
    AtomOr,
    AtomXor,
    AtomUMin,
    AtomUMax,
    AtomIMin,
    AtomIMax,
    // Geometry stage
    Emit,
    EndPrim,
    // Interpolation intrinsics
    InterpCentroid,
    InterpSample,
    InterpOffset,
    // Control flow
    If,
    Uif,
    Else,
    EndIf,
    BgnLoop,
    EndLoop,
    Brk,
    End,
    Ret,
}

impl Opcode {
    /// Number of destination registers the instruction record must carry.
    pub fn num_dst_regs(self) -> usize {
        use Opcode::*;
        match self {
            EndPrim | Emit | If | Uif | Else | EndIf | BgnLoop | EndLoop | Brk | End | Ret
            | Store => 0,
            Scs => 1, // sine/cosine pair packed into one dst's xy
            _ => 1,
        }
    }

    /// Number of source registers the instruction record must carry.
    pub fn num_src_regs(self) -> usize {
        use Opcode::*;
        match self {
            Mov | Abs | Frc | Flr | Not | Rcp | Rsq | Ex2 | Lg2 | Exp | Log | Scs | Lit | Arl
            | Uarl | InterpCentroid => 1,
            Add | Sub | Mul | Min | Max | And | Or | Xor | Shl | Shr | Seq | Sne | Sge | Slt
            | Sgt | Sle | Useq | Usne | Usge | Uslt | Fseq | Fsne | Fsge | Fslt | Dp2 | Dp3
            | Dp4 | Pow | Dst | InterpSample | InterpOffset => 2,
            Mad => 3,
            Tex | Txb | Txl | Txf | Txp | Lodq => 2,
            Txd => 4,
            Tg4 => 3,
            Txq => 1,
            Load => 2,
            AtomAdd | AtomXchg | AtomCas | AtomAnd | AtomOr | AtomXor | AtomUMin | AtomUMax
            | AtomIMin | AtomIMax => 3,
            Store => 2,
            Emit | EndPrim => 1, // stream index, carried as an immediate-valued source
            If | Uif => 1,
            Else | EndIf | BgnLoop | EndLoop | Brk | End | Ret => 0,
        }
    }

    /// True for the unsigned-bit-pattern comparison family (`USEQ`/`FSEQ`/…).
    pub fn is_unsigned_compare(self) -> bool {
        matches!(
            self,
            Opcode::Useq | Opcode::Usne | Opcode::Usge | Opcode::Uslt
        ) || self.is_float_bits_compare()
    }

    pub fn is_float_bits_compare(self) -> bool {
        matches!(self, Opcode::Fseq | Opcode::Fsne | Opcode::Fsge | Opcode::Fslt)
    }

    pub fn is_signed_compare(self) -> bool {
        matches!(
            self,
            Opcode::Seq | Opcode::Sne | Opcode::Sge | Opcode::Slt | Opcode::Sgt | Opcode::Sle
        )
    }

    pub fn is_texture(self) -> bool {
        matches!(
            self,
            Opcode::Tex
                | Opcode::Txb
                | Opcode::Txl
                | Opcode::Txd
                | Opcode::Txf
                | Opcode::Txp
                | Opcode::Tg4
                | Opcode::Txq
                | Opcode::Lodq
        )
    }

    pub fn is_image_atomic(self) -> bool {
        matches!(
            self,
            Opcode::AtomAdd
                | Opcode::AtomXchg
                | Opcode::AtomCas
                | Opcode::AtomAnd
                | Opcode::AtomOr
                | Opcode::AtomXor
                | Opcode::AtomUMin
                | Opcode::AtomUMax
                | Opcode::AtomIMin
                | Opcode::AtomIMax
        )
    }
}

/// Texture-instruction-specific payload (sampler target, offsets, gather component).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TexPayload {
    pub target: TextureKind,
    /// Index into the `TG4` gather component immediate, when present.
    pub gather_component: Option<u32>,
}

/// One decoded instruction record.
#[derive(Clone, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub saturate: bool,
    pub dst: ArrayVec<[DstOperand; 1]>,
    pub src: ArrayVec<[SrcOperand; 4]>,
    pub tex: Option<TexPayload>,
    /// `EMIT`/`ENDPRIM` stream index; 0 when absent.
    pub stream: u32,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Instruction {
            opcode,
            saturate: false,
            dst: ArrayVec::new(),
            src: ArrayVec::new(),
            tex: None,
            stream: 0,
        }
    }
}

/// 4-lane literal. All four lanes share one type tag; non-finite floats are carried as
/// the bit pattern of their unsigned form (SPEC_FULL.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImmKind {
    Float32,
    Int32,
    Uint32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Immediate {
    pub kind: ImmKind,
    pub bits: [u32; 4],
}

impl Immediate {
    pub fn from_f32(v: [f32; 4]) -> Self {
        Immediate {
            kind: ImmKind::Float32,
            bits: [
                v[0].to_bits(),
                v[1].to_bits(),
                v[2].to_bits(),
                v[3].to_bits(),
            ],
        }
    }

    pub fn from_i32(v: [i32; 4]) -> Self {
        Immediate {
            kind: ImmKind::Int32,
            bits: [v[0] as u32, v[1] as u32, v[2] as u32, v[3] as u32],
        }
    }

    pub fn from_u32(v: [u32; 4]) -> Self {
        Immediate {
            kind: ImmKind::Uint32,
            bits: v,
        }
    }

    pub fn as_f32(&self, lane: usize) -> f32 {
        f32::from_bits(self.bits[lane])
    }

    pub fn as_i32(&self, lane: usize) -> i32 {
        self.bits[lane] as i32
    }

    pub fn as_u32(&self, lane: usize) -> u32 {
        self.bits[lane]
    }

    pub fn is_integral(&self) -> bool {
        self.kind != ImmKind::Float32
    }
}

/// Half-open `[first, last)` register range used for temporaries and sampler arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegRange {
    pub first: u32,
    pub last: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputDecl {
    pub range: RegRange,
    pub semantic: Semantic,
    pub semantic_index: u32,
    pub interpolate: Interpolate,
    pub centroid: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputDecl {
    pub range: RegRange,
    pub semantic: Semantic,
    pub semantic_index: u32,
    pub stream: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TempRangeDecl {
    pub range: RegRange,
    pub array_id: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerDecl {
    pub index: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerViewDecl {
    pub index: u32,
    pub kind: TextureKind,
    pub return_type: ReturnType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageDecl {
    pub index: u32,
    pub kind: TextureKind,
    pub format: ImageFormat,
    pub writable: bool,
    pub volatile: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferDecl {
    pub index: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstantDecl {
    /// `Some((ubo_index, size_in_vec4))` for a dimensioned (UBO) declaration.
    pub ubo: Option<(u32, u32)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressDecl {
    pub count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemValueDecl {
    pub index: u32,
    pub semantic: Semantic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Declaration {
    Input(InputDecl),
    Output(OutputDecl),
    Temporary(TempRangeDecl),
    Sampler(SamplerDecl),
    SamplerView(SamplerViewDecl),
    Image(ImageDecl),
    Buffer(BufferDecl),
    Constant(ConstantDecl),
    Address(AddressDecl),
    SystemValue(SystemValueDecl),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolate {
    Constant,
    Linear,
    Perspective,
    Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Points,
    Lines,
    LinesAdjacency,
    Triangles,
    TrianglesAdjacency,
    LineStrip,
    TriangleStrip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordOrigin {
    UpperLeft,
    LowerLeft,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelCenter {
    Half,
    Integer,
}

/// Scalar properties mutated one at a time (SPEC_FULL.md §4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Property {
    WriteAllCbufs(bool),
    FsCoordOrigin(CoordOrigin),
    FsCoordPixelCenter(PixelCenter),
    GsInputPrimitive(Primitive),
    GsOutputPrimitive(Primitive),
    GsMaxVertices(u32),
    GsInvocations(u32),
    NumClipDistances(u32),
    NumCullDistances(u32),
    EarlyDepthStencil(bool),
    ComputeBlockSize(u32, u32, u32),
}

/// A fully-assembled translation unit: the in-order record of everything the external
/// iterator would otherwise have delivered through callbacks.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub stage: StageSlot,
    pub declarations: Vec<Declaration>,
    pub properties: Vec<Property>,
    pub immediates: Vec<Immediate>,
    pub instructions: Vec<Instruction>,
}

/// `Stage` has no meaningful default; this indirection lets `Module` derive `Default`
/// for test-construction convenience while still requiring an explicit stage choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageSlot(pub Stage);

impl Default for StageSlot {
    fn default() -> Self {
        StageSlot(Stage::Vertex)
    }
}

impl Module {
    pub fn new(stage: Stage) -> Self {
        Module {
            stage: StageSlot(stage),
            ..Default::default()
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage.0
    }
}

/// External transform-feedback binding table (SPEC_FULL.md §3 "StreamOutput binding").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamOutputEntry {
    pub register_index: u32,
    pub start_component: u32,
    pub num_components: u32,
    pub stream: u32,
}

#[derive(Clone, Debug, Default)]
pub struct StreamOutputInfo {
    pub outputs: Vec<StreamOutputEntry>,
}

/// Alpha-test comparison function, ordered to match `atests[]` in the original source
/// (`PIPE_FUNC_*`): `Never` is index 0, `Always` is index 7.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaFunc {
    Never,
    Less,
    Equal,
    LEqual,
    Greater,
    NotEqual,
    GEqual,
    Always,
}

/// Caller-supplied per-translation configuration (SPEC_FULL.md §6 "Shader key").
#[derive(Clone, Debug)]
pub struct ShaderKey {
    pub invert_fs_origin: bool,
    pub pstipple_tex: bool,
    pub add_alpha_test: bool,
    pub alpha_test: AlphaFunc,
    pub alpha_ref_val: f32,
    pub color_two_side: bool,
    pub clip_plane_enable: u8,
    pub gs_present: bool,
    pub flatshade: bool,
    pub prev_stage_pervertex_out: bool,
    pub prev_stage_num_clip_out: u8,
    pub prev_stage_num_cull_out: u8,
    /// Bitmask over generic semantic indices: coordinate-replace (point sprite) inputs.
    pub coord_replace: u32,
    /// Bitmask over color-buffer indices treated as A8.
    pub cbufs_are_a8_bitmask: u32,
}

impl Default for ShaderKey {
    fn default() -> Self {
        ShaderKey {
            invert_fs_origin: false,
            pstipple_tex: false,
            add_alpha_test: false,
            alpha_test: AlphaFunc::Always,
            alpha_ref_val: 0.0,
            color_two_side: false,
            clip_plane_enable: 0,
            gs_present: false,
            flatshade: false,
            prev_stage_pervertex_out: false,
            prev_stage_num_clip_out: 0,
            prev_stage_num_cull_out: 0,
            coord_replace: 0,
            cbufs_are_a8_bitmask: 0,
        }
    }
}

//! `DumpState`: the single mutable accumulator a `convert()` call owns start-to-finish.
//!
//! Grounded on `gfx-backend-gl`'s `state.rs`/`command.rs`, which each keep one
//! exclusively-owned struct alive for the duration of a command-buffer recording pass
//! and mutate it in place rather than threading many small return values through each
//! helper call. Here that struct accumulates declaration bookkeeping, the growing GLSL
//! body, and the output [`ShaderInfo`] record across the Declaration Analyser,
//! Instruction Translator, and Stage Epilogue passes (§3, §5: owned exclusively per
//! `convert()` call, no concurrency, no re-entrancy).

use smallvec::SmallVec;

use crate::buffer::GlslBuffer;
use crate::config::Cfg;
use crate::ir::{
    AddressDecl, BufferDecl, ConstantDecl, ImageDecl, InputDecl, OutputDecl, RegRange, SamplerDecl,
    SamplerViewDecl, ShaderKey, Stage, SystemValueDecl, TempRangeDecl,
};

bitflags::bitflags! {
    /// Feature usage discovered while walking declarations and instructions, consulted
    /// by the Header/IO Emitter to decide which `#extension` lines are required.
    pub struct Features: u32 {
        const INDIRECT_ADDRESSING = 0x1;
        const WRITES_CLIP_DISTANCE = 0x2;
        const WRITES_CULL_DISTANCE = 0x4;
        const USES_SAMPLER_ARRAYS = 0x8;
        const USES_UBO = 0x10;
        const USES_SSBO = 0x20;
        const USES_IMAGE_LOAD_STORE = 0x40;
        const USES_TEXTURE_GATHER = 0x80;
        const WRITES_FRAGDEPTH = 0x100;
        const WRITES_SAMPLE_MASK = 0x200;
        const USES_STREAM_OUTPUT = 0x400;
        const USES_GPU_SHADER5 = 0x800;
        const USES_BIT_ENCODING = 0x1000;
    }
}

/// The accumulated, caller-facing summary of a completed translation (§3 "Shader Info
/// Record").
#[derive(Clone, Debug, Default)]
pub struct ShaderInfo {
    pub num_temps: u32,
    pub num_clip_distances_written: u32,
    pub num_cull_distances_written: u32,
    pub writes_position: bool,
    pub writes_fragdepth: bool,
    pub writes_sample_mask: bool,
    pub invocations: u32,
    pub samplers_used_mask: u64,
    pub images_used_mask: u64,
    pub ubo_used_mask: u32,
}

/// Owned, per-declared-register bookkeeping the Declaration Analyser populates and the
/// Instruction Translator / epilogues consult to validate operand references (§4.1).
#[derive(Clone, Debug, Default)]
pub struct Declared {
    pub inputs: SmallVec<[InputDecl; 35]>,
    pub outputs: SmallVec<[OutputDecl; 35]>,
    pub temps: SmallVec<[TempRangeDecl; 4]>,
    pub samplers: SmallVec<[SamplerDecl; 32]>,
    pub sampler_views: SmallVec<[SamplerViewDecl; 32]>,
    /// Runs of contiguous same-(kind, return-type) entries in `sampler_views`, built by
    /// the Declaration Analyser (§3 "SamplerArray").
    pub sampler_arrays: SmallVec<[RegRange; 8]>,
    pub images: SmallVec<[ImageDecl; 8]>,
    pub buffers: SmallVec<[BufferDecl; 8]>,
    pub constants: Vec<ConstantDecl>,
    pub addresses: Option<AddressDecl>,
    pub system_values: Vec<SystemValueDecl>,
}

impl Declared {
    pub fn highest_temp_index(&self) -> u32 {
        self.temps.iter().map(|t| t.range.last).max().unwrap_or(0)
    }
}

/// The exclusively-owned, per-call translation state.
pub struct DumpState<'a> {
    pub cfg: Cfg,
    pub key: &'a ShaderKey,
    pub stage: Stage,
    pub body: GlslBuffer,
    pub declared: Declared,
    pub features: Features,
    pub info: ShaderInfo,
    /// Running counter for synthesized temporary names (`TEMP_N`) not present in the
    /// source IR but needed as translator scratch space (e.g. `TXQ` double statements).
    next_scratch_temp: u32,
    /// Nesting depth of open `IF`/`UIF`/`BGNLOOP` blocks, tracked independently of the
    /// body buffer's indent so a stray `ELSE`/`ENDIF`/`ENDLOOP` can be rejected instead
    /// of silently producing mismatched braces.
    pub control_flow_depth: u32,
}

impl<'a> DumpState<'a> {
    pub fn new(cfg: Cfg, key: &'a ShaderKey, stage: Stage) -> Self {
        DumpState {
            cfg,
            key,
            stage,
            body: GlslBuffer::new(),
            declared: Declared::default(),
            features: Features::empty(),
            info: ShaderInfo::default(),
            next_scratch_temp: 0,
            control_flow_depth: 0,
        }
    }

    /// Allocates a fresh scratch temporary name, used by instruction translation
    /// sequences that need an intermediate GLSL local the IR never named.
    pub fn fresh_scratch_name(&mut self) -> String {
        let n = self.next_scratch_temp;
        self.next_scratch_temp += 1;
        format!("scratch{}", n)
    }
}

//! Caller-supplied, immutable per-translation configuration (§4, §6).
//!
//! `GlslVersion`'s comparison idiom mirrors `gfx-backend-gl`'s old `info::Version`
//! (manual but total `Ord` over a small numeric triple); here the GLSL version space
//! is already a single monotonic integer per profile, same as the version-selection
//! table in `device.rs::translate_spirv`.

/// A resolved GLSL version plus profile, analogous to the enum `device.rs::translate_spirv`
/// maps SPIR-V targets onto (`V1_10`..`V4_60`, `V3_00Es`, …) but expressed as plain data
/// so callers can supply any version the host driver actually reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlslVersion {
    /// e.g. 130, 140, 150, 330, or 300/100 for ES.
    pub number: u16,
    pub es: bool,
}

impl GlslVersion {
    pub const V130: GlslVersion = GlslVersion { number: 130, es: false };
    pub const V140: GlslVersion = GlslVersion { number: 140, es: false };
    pub const V150: GlslVersion = GlslVersion { number: 150, es: false };
    pub const V330: GlslVersion = GlslVersion { number: 330, es: false };
    pub const V100_ES: GlslVersion = GlslVersion { number: 100, es: true };
    pub const V300_ES: GlslVersion = GlslVersion { number: 300, es: true };
    pub const V310_ES: GlslVersion = GlslVersion { number: 310, es: true };

    pub fn at_least(self, other: GlslVersion) -> bool {
        self.es == other.es && self.number >= other.number
    }

    pub fn supports_explicit_layout_qualifiers(self) -> bool {
        if self.es {
            self.number >= 300
        } else {
            self.number >= 140
        }
    }

    pub fn supports_interpolation_qualifiers(self) -> bool {
        if self.es {
            self.number >= 300
        } else {
            self.number >= 130
        }
    }

    pub fn supports_arrays_of_arrays(self) -> bool {
        !self.es && self.number >= 430
    }
}

/// Toggles that do not vary per-shader but depend only on the host GL implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cfg {
    pub glsl_version: GlslVersion,
    pub use_core_profile: bool,
    /// Emit `layout(location = N)` on every input/output instead of relying on
    /// implicit matching order (requires `GL_ARB_separate_shader_objects` pre-4.1).
    pub use_explicit_locations: bool,
    /// Host lacks `GL_ARB_shader_bit_encoding` / GLSL 3.30's native `floatBitsToUint`
    /// family; fall back to the epilogue-friendly approximations.
    pub has_bit_encoding: bool,
    /// Host supports `GL_ARB_gpu_shader5` / `EXT_gpu_shader5` (bitfield and texture
    /// gather extras used by `TG4`).
    pub has_gpu_shader5: bool,
    /// Host supports `GL_ARB_shader_stencil_export`.
    pub has_stencil_export: bool,
    /// Host supports `GL_ARB_shader_storage_buffer_object`.
    pub has_ssbo: bool,
    /// Host supports `GL_ARB_shader_image_load_store`.
    pub has_image_load_store: bool,
}

impl Default for Cfg {
    fn default() -> Self {
        Cfg {
            glsl_version: GlslVersion::V140,
            use_core_profile: false,
            use_explicit_locations: false,
            has_bit_encoding: true,
            has_gpu_shader5: false,
            has_stencil_export: false,
            has_ssbo: false,
            has_image_load_store: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering_is_monotonic_within_a_profile() {
        assert!(GlslVersion::V150 > GlslVersion::V140);
        assert!(GlslVersion::V140 > GlslVersion::V130);
        assert!(GlslVersion::V310_ES > GlslVersion::V300_ES);
    }

    #[test]
    fn explicit_layout_support_matches_known_thresholds() {
        assert!(!GlslVersion::V130.supports_explicit_layout_qualifiers());
        assert!(GlslVersion::V140.supports_explicit_layout_qualifiers());
        assert!(!GlslVersion::V100_ES.supports_explicit_layout_qualifiers());
        assert!(GlslVersion::V300_ES.supports_explicit_layout_qualifiers());
    }
}

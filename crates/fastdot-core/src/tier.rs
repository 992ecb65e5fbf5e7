//! Implementation tiers, requested policies and call families

use crate::capability::CpuFeatures;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A concrete kernel implementation level, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// Plain loop, one product at a time
    Scalar,
    /// 128-bit vectors (SSE2)
    Sse,
    /// 256-bit vectors (AVX), separate multiply and add
    Avx,
    /// 256-bit vectors with fused multiply-add
    AvxFma,
    /// 512-bit vectors (AVX-512F), separate multiply and add
    Avx512,
    /// 512-bit vectors with fused multiply-add
    Avx512Fma,
}

impl Tier {
    /// Every tier, weakest first
    pub const ALL: [Tier; 6] = [
        Tier::Scalar,
        Tier::Sse,
        Tier::Avx,
        Tier::AvxFma,
        Tier::Avx512,
        Tier::Avx512Fma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tier::Scalar => "scalar",
            Tier::Sse => "sse",
            Tier::Avx => "avx",
            Tier::AvxFma => "avx-fma",
            Tier::Avx512 => "avx512",
            Tier::Avx512Fma => "avx512-fma",
        }
    }

    /// Whether the kernels for this tier were built into this binary
    ///
    /// Controlled by the `sse`, `avx`, `fma` and `avx512` cargo features.
    /// Always `false` for SIMD tiers outside the x86 family.
    pub const fn is_compiled(self) -> bool {
        const X86: bool = cfg!(any(target_arch = "x86", target_arch = "x86_64"));
        match self {
            Tier::Scalar => true,
            Tier::Sse => X86 && cfg!(feature = "sse"),
            Tier::Avx => X86 && cfg!(feature = "avx"),
            Tier::AvxFma => X86 && cfg!(feature = "avx") && cfg!(feature = "fma"),
            Tier::Avx512 => X86 && cfg!(feature = "avx512"),
            Tier::Avx512Fma => X86 && cfg!(feature = "avx512") && cfg!(feature = "fma"),
        }
    }

    /// Whether `cpu` has every extension this tier's kernels execute
    pub const fn hardware_supported(self, cpu: &CpuFeatures) -> bool {
        match self {
            Tier::Scalar => true,
            Tier::Sse => cpu.sse2 && (cpu.sse3 || !cfg!(feature = "hadd")),
            Tier::Avx => cpu.avx,
            Tier::AvxFma => cpu.avx && cpu.fma,
            Tier::Avx512 => cpu.avx512,
            Tier::Avx512Fma => cpu.avx512 && cpu.fma,
        }
    }

    /// Compiled in and runnable on `cpu`
    pub const fn is_usable(self, cpu: &CpuFeatures) -> bool {
        self.is_compiled() && self.hardware_supported(cpu)
    }

    /// Whether products are accumulated with fused multiply-add
    pub fn uses_fma(self) -> bool {
        matches!(self, Tier::AvxFma | Tier::Avx512Fma)
    }

    /// Elements consumed per vector iteration for `family`
    ///
    /// The scalar tier reports 1. Everything past the last multiple of this
    /// width goes through the scalar tail loop.
    pub fn width(self, family: Family) -> usize {
        match (self, family) {
            (Tier::Scalar, _) => 1,
            (Tier::Sse, Family::Single) => 4,
            (Tier::Sse, Family::Double) => 2,
            (Tier::Sse, Family::Mixed) => 4,
            (Tier::Avx | Tier::AvxFma, Family::Single) => 8,
            (Tier::Avx | Tier::AvxFma, Family::Double) => 4,
            (Tier::Avx | Tier::AvxFma, Family::Mixed) => 4,
            (Tier::Avx512 | Tier::Avx512Fma, Family::Single) => 16,
            (Tier::Avx512 | Tier::Avx512Fma, Family::Double) => 8,
            (Tier::Avx512 | Tier::Avx512Fma, Family::Mixed) => 8,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The implementation a caller asks for
///
/// `Auto` resolves to the strongest usable tier. A named tier is an upper
/// bound: if it is not usable the request degrades to the next weaker tier
/// that is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    #[default]
    Auto,
    Scalar,
    Sse,
    Avx,
    AvxFma,
    Avx512,
    Avx512Fma,
}

impl Policy {
    /// Map an integer policy code to a policy
    ///
    /// Codes: 0 auto, 1 scalar, 2 sse, 3 avx, 4 avx-fma, 5 avx512,
    /// 6 avx512-fma. Any other value means `Auto`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Policy::Scalar,
            2 => Policy::Sse,
            3 => Policy::Avx,
            4 => Policy::AvxFma,
            5 => Policy::Avx512,
            6 => Policy::Avx512Fma,
            _ => Policy::Auto,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Policy::Auto => 0,
            Policy::Scalar => 1,
            Policy::Sse => 2,
            Policy::Avx => 3,
            Policy::AvxFma => 4,
            Policy::Avx512 => 5,
            Policy::Avx512Fma => 6,
        }
    }

    /// Parse a policy name, treating anything unrecognized as `Auto`
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or(Policy::Auto)
    }

    /// Strongest tier this policy allows, `None` for `Auto`
    pub fn ceiling(self) -> Option<Tier> {
        match self {
            Policy::Auto => None,
            Policy::Scalar => Some(Tier::Scalar),
            Policy::Sse => Some(Tier::Sse),
            Policy::Avx => Some(Tier::Avx),
            Policy::AvxFma => Some(Tier::AvxFma),
            Policy::Avx512 => Some(Tier::Avx512),
            Policy::Avx512Fma => Some(Tier::Avx512Fma),
        }
    }

    pub fn name(self) -> &'static str {
        match self.ceiling() {
            None => "auto",
            Some(tier) => tier.name(),
        }
    }
}

impl From<Tier> for Policy {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Scalar => Policy::Scalar,
            Tier::Sse => Policy::Sse,
            Tier::Avx => Policy::Avx,
            Tier::AvxFma => Policy::AvxFma,
            Tier::Avx512 => Policy::Avx512,
            Tier::Avx512Fma => Policy::Avx512Fma,
        }
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let policy = match normalized.as_str() {
            "auto" | "best" => Policy::Auto,
            "scalar" | "naive" => Policy::Scalar,
            "sse" | "sse2" => Policy::Sse,
            "avx" => Policy::Avx,
            "avx-fma" | "avxfma" | "fma" => Policy::AvxFma,
            "avx512" | "avx512f" => Policy::Avx512,
            "avx512-fma" | "avx512fma" => Policy::Avx512Fma,
            _ => return Err(Error::invalid_policy(s)),
        };
        Ok(policy)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element and accumulator precision of a dot product entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// `f32` inputs, `f32` accumulation
    Single,
    /// `f64` inputs, `f64` accumulation
    Double,
    /// `f32` inputs, `f64` accumulation
    Mixed,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Single, Family::Double, Family::Mixed];

    pub fn name(self) -> &'static str {
        match self {
            Family::Single => "single",
            Family::Double => "double",
            Family::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered_weakest_first() {
        for pair in Tier::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} should be weaker than {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn scalar_is_always_usable() {
        assert!(Tier::Scalar.is_compiled());
        assert!(Tier::Scalar.is_usable(&CpuFeatures::none()));
    }

    #[test]
    fn hardware_requirements() {
        let avx_only = CpuFeatures {
            sse2: true,
            sse3: true,
            avx: true,
            ..CpuFeatures::none()
        };
        assert!(Tier::Avx.hardware_supported(&avx_only));
        assert!(!Tier::AvxFma.hardware_supported(&avx_only));
        assert!(!Tier::Avx512.hardware_supported(&avx_only));

        let no_fma = CpuFeatures {
            fma: false,
            ..CpuFeatures::all()
        };
        assert!(Tier::Avx512.hardware_supported(&no_fma));
        assert!(!Tier::Avx512Fma.hardware_supported(&no_fma));
        assert!(Tier::ALL
            .iter()
            .all(|tier| tier.hardware_supported(&CpuFeatures::all())));
    }

    #[test]
    fn sse_tier_needs_sse3_only_with_hadd() {
        let sse2_only = CpuFeatures {
            sse2: true,
            ..CpuFeatures::none()
        };
        assert_eq!(
            Tier::Sse.hardware_supported(&sse2_only),
            !cfg!(feature = "hadd")
        );
    }

    #[test]
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn only_scalar_compiled_off_x86() {
        for tier in Tier::ALL {
            assert_eq!(tier.is_compiled(), tier == Tier::Scalar);
        }
    }

    #[test]
    fn widths_divide_evenly() {
        for tier in Tier::ALL {
            for family in Family::ALL {
                let width = tier.width(family);
                assert!(width.is_power_of_two(), "{tier}/{family}: {width}");
            }
        }
        assert_eq!(Tier::Avx512Fma.width(Family::Single), 16);
        assert_eq!(Tier::Sse.width(Family::Double), 2);
    }

    #[test]
    fn policy_codes_round_trip_and_unknown_is_auto() {
        for code in 0..=6 {
            assert_eq!(Policy::from_code(code).code(), code);
        }
        assert_eq!(Policy::from_code(-1), Policy::Auto);
        assert_eq!(Policy::from_code(7), Policy::Auto);
        assert_eq!(Policy::from_code(i32::MAX), Policy::Auto);
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("auto".parse::<Policy>().unwrap(), Policy::Auto);
        assert_eq!("NAIVE".parse::<Policy>().unwrap(), Policy::Scalar);
        assert_eq!(" sse2 ".parse::<Policy>().unwrap(), Policy::Sse);
        assert_eq!("avx_fma".parse::<Policy>().unwrap(), Policy::AvxFma);
        assert_eq!("AVX512F".parse::<Policy>().unwrap(), Policy::Avx512);
        assert_eq!("avx512-fma".parse::<Policy>().unwrap(), Policy::Avx512Fma);

        assert!(matches!(
            "neon".parse::<Policy>(),
            Err(Error::InvalidPolicy(_))
        ));
        assert_eq!(Policy::parse_lenient("neon"), Policy::Auto);
        assert_eq!(Policy::parse_lenient("avx"), Policy::Avx);
    }

    #[test]
    fn display_matches_parse() {
        for tier in Tier::ALL {
            let policy = Policy::from(tier);
            assert_eq!(policy.to_string(), tier.to_string());
            assert_eq!(policy.to_string().parse::<Policy>().unwrap(), policy);
            assert_eq!(policy.ceiling(), Some(tier));
        }
        assert_eq!(Policy::Auto.ceiling(), None);
    }

    #[test]
    fn serde_names_match_display() {
        let json = serde_json::to_string(&Policy::Avx512Fma).unwrap();
        assert_eq!(json, "\"avx512-fma\"");
        let back: Policy = serde_json::from_str("\"avx-fma\"").unwrap();
        assert_eq!(back, Policy::AvxFma);
        let tier: Tier = serde_json::from_str("\"sse\"").unwrap();
        assert_eq!(tier, Tier::Sse);
    }
}

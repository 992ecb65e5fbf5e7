//! Dispatch configuration
//!
//! The only runtime knob is the policy. It can come from code, from a
//! serialized config (via serde) or from the `FASTDOT_IMPL` environment
//! variable. Build-time tier exclusions are cargo features; see
//! [`compiled_tiers`].

use crate::dispatch;
use crate::error::{Error, Result};
use crate::tier::{Policy, Tier};
use serde::{Deserialize, Serialize};

/// Environment variable read by [`DispatchConfig::from_env`]
pub const POLICY_ENV_VAR: &str = "FASTDOT_IMPL";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub policy: Policy,
}

impl DispatchConfig {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// Read the policy from `FASTDOT_IMPL`
    ///
    /// An unset or empty variable means `Auto`. A value that is not a policy
    /// name is an error.
    pub fn from_env() -> Result<Self> {
        Self::parse_env_value(std::env::var(POLICY_ENV_VAR).ok().as_deref())
    }

    /// Like [`from_env`](Self::from_env), but a malformed value is logged and
    /// treated as `Auto`
    pub fn from_env_lossy() -> Self {
        Self::from_env().unwrap_or_else(|err| {
            log::warn!("{err}; falling back to automatic kernel selection");
            Self::default()
        })
    }

    fn parse_env_value(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(raw) => raw
                .parse()
                .map(Self::new)
                .map_err(|_| Error::invalid_env(POLICY_ENV_VAR, raw)),
        }
    }

    /// Install this configuration on the process-wide dispatcher
    pub fn apply(&self) -> Tier {
        dispatch::select(self.policy)
    }
}

/// Tiers built into this binary on this target, weakest first
pub fn compiled_tiers() -> impl Iterator<Item = Tier> {
    Tier::ALL.into_iter().filter(|tier| tier.is_compiled())
}

#[cfg(all(feature = "hadd", not(feature = "sse")))]
compile_error!("the `hadd` feature selects the reduction of the 128-bit tier; enable `sse` too");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_or_blank_env_is_auto() {
        assert_eq!(DispatchConfig::parse_env_value(None).unwrap().policy, Policy::Auto);
        assert_eq!(DispatchConfig::parse_env_value(Some("  ")).unwrap().policy, Policy::Auto);
    }

    #[test]
    fn env_value_parses_policy() {
        let config = DispatchConfig::parse_env_value(Some("avx-fma")).unwrap();
        assert_eq!(config.policy, Policy::AvxFma);
        let config = DispatchConfig::parse_env_value(Some(" Scalar\n")).unwrap();
        assert_eq!(config.policy, Policy::Scalar);
    }

    #[test]
    fn malformed_env_value_is_an_error() {
        let err = DispatchConfig::parse_env_value(Some("sve2")).unwrap_err();
        assert_eq!(err, Error::invalid_env(POLICY_ENV_VAR, "sve2"));
    }

    #[test]
    fn serde_round_trip_and_defaults() {
        let config = DispatchConfig::new(Policy::Avx512);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"policy":"avx512"}"#);
        assert_eq!(serde_json::from_str::<DispatchConfig>(&json).unwrap(), config);

        let empty: DispatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.policy, Policy::Auto);
    }

    #[test]
    fn compiled_tiers_start_with_scalar() {
        let tiers: Vec<_> = compiled_tiers().collect();
        assert_eq!(tiers.first(), Some(&Tier::Scalar));
        assert!(tiers.windows(2).all(|w| w[0] < w[1]));
        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
        assert_eq!(tiers, vec![Tier::Scalar]);
    }
}

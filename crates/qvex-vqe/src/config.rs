//! Cost-function configuration.
//!
//! Configuration can come from:
//! 1. Builder methods on [`CostFunctionConfig`]
//! 2. A YAML file ([`CostFunctionConfig::from_file`])
//! 3. Environment variables (`QVEX_NSHOTS`, `QVEX_SEED`)
//!
//! Environment variables override file and builder values when applied with
//! [`CostFunctionConfig::apply_env_overrides`].
//!
//! ```yaml
//! scalar_cost_function: false
//! base_numshots: 200
//! noisy: true
//! seed: 42
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::cost::CostValue;
use crate::error::{VqeError, VqeResult};
use crate::estimate::Estimate;

/// Shot count used when the deprecated `return_standard_deviation` is set.
pub const DEPRECATED_FALLBACK_SHOTS: u32 = 1000;

/// How a cost function obtains its shot count and what it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Return only the mean, using this shot count unless the call gives one.
    ScalarShots(u32),
    /// Return mean and stderr; every call must give a shot count.
    VariableShots,
}

impl ExecutionMode {
    /// Shot count for a call: the call-time value if given, else the mode's.
    pub fn resolve_shots(&self, nshots: Option<u32>) -> VqeResult<u32> {
        match (nshots, self) {
            (Some(0), _) => Err(VqeError::Configuration(
                "nshots must be positive".into(),
            )),
            (Some(n), _) => Ok(n),
            (None, ExecutionMode::ScalarShots(n)) => Ok(*n),
            (None, ExecutionMode::VariableShots) => Err(VqeError::Configuration(
                "nshots must be given on every call when the cost function is not scalar".into(),
            )),
        }
    }

    /// What a call returns for `estimate` in this mode.
    pub fn present(&self, estimate: Estimate) -> CostValue {
        match self {
            ExecutionMode::ScalarShots(_) => CostValue::Scalar(estimate.mean),
            ExecutionMode::VariableShots => CostValue::Estimate(estimate),
        }
    }

    /// True for [`ExecutionMode::ScalarShots`].
    pub fn is_scalar(&self) -> bool {
        matches!(self, ExecutionMode::ScalarShots(_))
    }
}

/// Construction-time settings shared by both cost functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostFunctionConfig {
    /// Return only the mean (`true`) or mean and stderr (`false`).
    pub scalar_cost_function: bool,

    /// Default shot count. Required when `scalar_cost_function` is set.
    pub nshots: Option<u32>,

    /// Trials compiled into each sampling executable. The call-time shot
    /// count multiplies this.
    pub base_numshots: u32,

    /// Add simulated shot noise to exact estimates.
    pub noisy: bool,

    /// Seed for the noise generator. Entropy-seeded if unset.
    pub seed: Option<u64>,

    /// Deprecated. Any value forces scalar mode with 1000 shots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_standard_deviation: Option<bool>,
}

impl Default for CostFunctionConfig {
    fn default() -> Self {
        Self {
            scalar_cost_function: true,
            nshots: None,
            base_numshots: 100,
            noisy: false,
            seed: None,
            return_standard_deviation: None,
        }
    }
}

impl CostFunctionConfig {
    /// Scalar mode with a default shot count.
    pub fn scalar(nshots: u32) -> Self {
        Self {
            scalar_cost_function: true,
            nshots: Some(nshots),
            ..Self::default()
        }
    }

    /// Variable-shot mode: every call supplies its shot count.
    pub fn variable() -> Self {
        Self {
            scalar_cost_function: false,
            ..Self::default()
        }
    }

    /// Set the trials compiled into each sampling executable.
    pub fn with_base_numshots(mut self, base_numshots: u32) -> Self {
        self.base_numshots = base_numshots;
        self
    }

    /// Enable or disable simulated noise on exact estimates.
    pub fn with_noise(mut self, noisy: bool) -> Self {
        self.noisy = noisy;
        self
    }

    /// Seed the noise generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse from YAML. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> VqeResult<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| VqeError::Configuration(format!("invalid configuration: {e}")))
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> VqeResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VqeError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Override fields from `QVEX_NSHOTS` and `QVEX_SEED`.
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    fn apply_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("QVEX_NSHOTS") {
            match raw.parse() {
                Ok(n) => self.nshots = Some(n),
                Err(_) => warn!(value = %raw, "ignoring unparsable QVEX_NSHOTS"),
            }
        }
        if let Some(raw) = lookup("QVEX_SEED") {
            match raw.parse() {
                Ok(seed) => self.seed = Some(seed),
                Err(_) => warn!(value = %raw, "ignoring unparsable QVEX_SEED"),
            }
        }
        self
    }

    /// Decide the execution mode.
    ///
    /// The deprecated `return_standard_deviation` takes precedence: it logs a
    /// warning and yields `ScalarShots(1000)`. Otherwise scalar mode needs a
    /// positive `nshots`.
    pub fn resolve_mode(&self) -> VqeResult<ExecutionMode> {
        if self.return_standard_deviation.is_some() {
            warn!(
                "`return_standard_deviation` is deprecated in favor of \
                 `scalar_cost_function`; proceeding with scalar_cost_function = true \
                 and nshots = {DEPRECATED_FALLBACK_SHOTS}"
            );
            return Ok(ExecutionMode::ScalarShots(DEPRECATED_FALLBACK_SHOTS));
        }
        if !self.scalar_cost_function {
            return Ok(ExecutionMode::VariableShots);
        }
        match self.nshots {
            Some(0) => Err(VqeError::Configuration("nshots must be positive".into())),
            Some(n) => Ok(ExecutionMode::ScalarShots(n)),
            None => Err(VqeError::Configuration(
                "nshots must be specified when scalar_cost_function is set".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_requires_nshots() {
        let err = CostFunctionConfig::default().resolve_mode().unwrap_err();
        assert!(matches!(err, VqeError::Configuration(_)));
    }

    #[test]
    fn test_modes() {
        assert_eq!(
            CostFunctionConfig::scalar(500).resolve_mode().unwrap(),
            ExecutionMode::ScalarShots(500)
        );
        assert_eq!(
            CostFunctionConfig::variable().resolve_mode().unwrap(),
            ExecutionMode::VariableShots
        );
        assert!(CostFunctionConfig::scalar(0).resolve_mode().is_err());
        assert!(ExecutionMode::ScalarShots(5).is_scalar());
        assert!(!ExecutionMode::VariableShots.is_scalar());
    }

    #[test]
    fn test_deprecated_flag_falls_back() {
        let config = CostFunctionConfig {
            return_standard_deviation: Some(true),
            ..CostFunctionConfig::variable()
        };
        assert_eq!(
            config.resolve_mode().unwrap(),
            ExecutionMode::ScalarShots(DEPRECATED_FALLBACK_SHOTS)
        );
    }

    #[test]
    fn test_resolve_shots() {
        let scalar = ExecutionMode::ScalarShots(100);
        assert_eq!(scalar.resolve_shots(None).unwrap(), 100);
        assert_eq!(scalar.resolve_shots(Some(7)).unwrap(), 7);
        assert!(scalar.resolve_shots(Some(0)).is_err());
        assert!(ExecutionMode::VariableShots.resolve_shots(None).is_err());
        assert_eq!(ExecutionMode::VariableShots.resolve_shots(Some(3)).unwrap(), 3);
    }

    #[test]
    fn test_present() {
        let est = Estimate::new(-1.0, 0.25);
        assert_eq!(ExecutionMode::ScalarShots(1).present(est), CostValue::Scalar(-1.0));
        assert_eq!(ExecutionMode::VariableShots.present(est), CostValue::Estimate(est));
    }

    #[test]
    fn test_yaml_defaults() {
        let config = CostFunctionConfig::from_yaml_str("nshots: 250\nnoisy: true\n").unwrap();
        assert!(config.scalar_cost_function);
        assert_eq!(config.nshots, Some(250));
        assert_eq!(config.base_numshots, 100);
        assert!(config.noisy);
        assert!(CostFunctionConfig::from_yaml_str("nshots: [1, 2]").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = CostFunctionConfig::default().apply_overrides_from(|key| match key {
            "QVEX_NSHOTS" => Some("64".to_string()),
            "QVEX_SEED" => Some("not-a-number".to_string()),
            _ => None,
        });
        assert_eq!(config.nshots, Some(64));
        assert_eq!(config.seed, None);
    }
}

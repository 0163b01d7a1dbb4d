//! Run configuration.

use serde::{Deserialize, Serialize};

use crate::dispatching::PolicyKind;
use crate::error::{Result, ScheduleError};

/// Parameters of one scheduling invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleConfig {
    /// Dispatching policy.
    #[serde(alias = "algorithm")]
    pub policy: PolicyKind,
    /// Orders per batch (`batch` policy only).
    #[serde(alias = "batch_size")]
    pub batch_size: usize,
    /// Multiplier applied to every operation's tardiness.
    #[serde(alias = "tardiness_weight")]
    pub tardiness_weight: f64,
    /// Switch time when no explicit changeover entry exists (hours).
    #[serde(alias = "default_changeover_hours", alias = "switchDefault")]
    pub default_changeover_hours: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Edd,
            batch_size: 50,
            tardiness_weight: 1.0,
            default_changeover_hours: 1.0,
        }
    }
}

impl ScheduleConfig {
    /// Default parameters for `policy`.
    pub fn new(policy: PolicyKind) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Sets the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the tardiness weight.
    pub fn with_tardiness_weight(mut self, weight: f64) -> Self {
        self.tardiness_weight = weight;
        self
    }

    /// Sets the default changeover time.
    pub fn with_default_changeover(mut self, hours: f64) -> Self {
        self.default_changeover_hours = hours;
        self
    }

    /// Rejects parameters the selected policy cannot run with.
    ///
    /// `batch_size` is only checked for [`PolicyKind::Batch`].
    pub fn validate(&self) -> Result<()> {
        if self.policy == PolicyKind::Batch && self.batch_size == 0 {
            return Err(ScheduleError::InvalidConfig(
                "batch size must be at least 1".into(),
            ));
        }
        if !self.tardiness_weight.is_finite() || self.tardiness_weight < 0.0 {
            return Err(ScheduleError::InvalidConfig(format!(
                "tardiness weight must be a non-negative number, got {}",
                self.tardiness_weight
            )));
        }
        if !self.default_changeover_hours.is_finite() || self.default_changeover_hours < 0.0 {
            return Err(ScheduleError::InvalidConfig(format!(
                "default changeover must be a non-negative number of hours, got {}",
                self.default_changeover_hours
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ScheduleConfig::default();
        assert_eq!(c.policy, PolicyKind::Edd);
        assert_eq!(c.batch_size, 50);
        assert_eq!(c.tardiness_weight, 1.0);
        assert_eq!(c.default_changeover_hours, 1.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let c: ScheduleConfig =
            serde_json::from_str(r#"{"algorithm": "batch", "batchSize": 20}"#).unwrap();
        assert_eq!(c.policy, PolicyKind::Batch);
        assert_eq!(c.batch_size, 20);
        assert_eq!(c.tardiness_weight, 1.0);
    }

    #[test]
    fn test_deserialize_unknown_policy_fails() {
        let r: std::result::Result<ScheduleConfig, _> =
            serde_json::from_str(r#"{"policy": "fifo"}"#);
        assert!(r.is_err());
    }

    #[test]
    fn test_batch_size_ignored_outside_batch_policy() {
        for policy in [PolicyKind::Edd, PolicyKind::Greedy] {
            assert!(ScheduleConfig::new(policy)
                .with_batch_size(0)
                .validate()
                .is_ok());
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ScheduleConfig::new(PolicyKind::Batch)
            .with_batch_size(0)
            .validate()
            .is_err());
        assert!(ScheduleConfig::default()
            .with_tardiness_weight(-1.0)
            .validate()
            .is_err());
        assert!(ScheduleConfig::default()
            .with_tardiness_weight(f64::NAN)
            .validate()
            .is_err());
        assert!(ScheduleConfig::default()
            .with_default_changeover(-0.5)
            .validate()
            .is_err());
        assert!(ScheduleConfig::new(PolicyKind::Greedy)
            .with_tardiness_weight(0.0)
            .with_default_changeover(0.0)
            .validate()
            .is_ok());
    }
}

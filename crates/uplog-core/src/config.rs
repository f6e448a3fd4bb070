//! Config - policy の設定（serde で JSON から読める形）
//!
//! ```json
//! {
//!   "kind": "any_of",
//!   "policies": [
//!     { "kind": "periodic", "interval": { "value": 2, "unit": "seconds" } },
//!     { "kind": "count_threshold", "threshold": 50 }
//!   ]
//! }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::domain::PolicyError;
use crate::policy::{
    AnyOfPolicy, ArmingRule, CountThresholdPolicy, PeriodicPolicy, VolumeThresholdPolicy,
};
use crate::ports::{EventSink, UploadDecisionPolicy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Milliseconds,
    #[default]
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    fn millis_per_unit(self) -> u64 {
        match self {
            TimeUnit::Milliseconds => 1,
            TimeUnit::Seconds => 1_000,
            TimeUnit::Minutes => 60_000,
            TimeUnit::Hours => 3_600_000,
        }
    }
}

/// Interval as a magnitude plus a unit. The unit defaults to seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub value: u64,
    #[serde(default)]
    pub unit: TimeUnit,
}

impl Interval {
    pub fn new(value: u64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    pub fn seconds(value: u64) -> Self {
        Self::new(value, TimeUnit::Seconds)
    }

    /// Zero and values that overflow a millisecond count are rejected.
    pub fn to_duration(&self) -> Result<Duration, PolicyError> {
        if self.value == 0 {
            return Err(PolicyError::invalid("interval must be greater than zero"));
        }
        let millis = self
            .value
            .checked_mul(self.unit.millis_per_unit())
            .ok_or_else(|| PolicyError::invalid(format!("interval {self:?} is too large")))?;
        Ok(Duration::from_millis(millis))
    }
}

/// Config-level arming choice for periodic policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arming {
    #[default]
    OnFirstEvaluate,
    Manual,
    /// Armed at the `now` passed to `PolicyConfig::build`.
    OnConstruction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    Periodic {
        interval: Interval,
        #[serde(default)]
        arming: Arming,
    },
    CountThreshold {
        threshold: u64,
    },
    VolumeThreshold {
        threshold_bytes: u64,
    },
    AnyOf {
        policies: Vec<PolicyConfig>,
    },
}

impl PolicyConfig {
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        serde_json::from_str(json)
            .map_err(|e| PolicyError::invalid(format!("policy config: {e}")))
    }

    /// Build the policy tree. Every node shares `sink`.
    pub fn build(
        &self,
        sink: Arc<dyn EventSink>,
        now: Instant,
    ) -> Result<Arc<dyn UploadDecisionPolicy>, PolicyError> {
        let policy: Arc<dyn UploadDecisionPolicy> = match self {
            PolicyConfig::Periodic { interval, arming } => {
                let interval = interval.to_duration()?;
                match arming {
                    Arming::OnFirstEvaluate => Arc::new(PeriodicPolicy::with_arming(
                        interval,
                        ArmingRule::OnFirstEvaluate,
                        sink,
                    )?),
                    Arming::Manual => Arc::new(PeriodicPolicy::with_arming(
                        interval,
                        ArmingRule::Manual,
                        sink,
                    )?),
                    Arming::OnConstruction => {
                        Arc::new(PeriodicPolicy::armed_at(interval, now, sink)?)
                    }
                }
            }
            PolicyConfig::CountThreshold { threshold } => {
                Arc::new(CountThresholdPolicy::new(*threshold, sink)?)
            }
            PolicyConfig::VolumeThreshold { threshold_bytes } => {
                Arc::new(VolumeThresholdPolicy::new(*threshold_bytes, sink)?)
            }
            PolicyConfig::AnyOf { policies } => {
                let children = policies
                    .iter()
                    .map(|child| child.build(Arc::clone(&sink), now))
                    .collect::<Result<Vec<_>, _>>()?;
                Arc::new(AnyOfPolicy::new(children)?)
            }
        };
        Ok(policy)
    }
}

impl Default for PolicyConfig {
    /// Every 2 seconds, or sooner once 50 records are buffered.
    fn default() -> Self {
        PolicyConfig::AnyOf {
            policies: vec![
                PolicyConfig::Periodic {
                    interval: Interval::seconds(2),
                    arming: Arming::default(),
                },
                PolicyConfig::CountThreshold { threshold: 50 },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decision, StorageStatus};
    use crate::impls::NoopEventSink;
    use rstest::rstest;

    #[rstest]
    #[case(Interval::new(250, TimeUnit::Milliseconds), Duration::from_millis(250))]
    #[case(Interval::seconds(10), Duration::from_secs(10))]
    #[case(Interval::new(2, TimeUnit::Minutes), Duration::from_secs(120))]
    #[case(Interval::new(1, TimeUnit::Hours), Duration::from_secs(3600))]
    fn interval_converts(#[case] interval: Interval, #[case] expected: Duration) {
        assert_eq!(interval.to_duration().unwrap(), expected);
    }

    #[rstest]
    #[case(Interval::seconds(0))]
    #[case(Interval::new(u64::MAX, TimeUnit::Hours))]
    fn interval_rejects_invalid(#[case] interval: Interval) {
        assert!(matches!(
            interval.to_duration(),
            Err(PolicyError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn unit_defaults_to_seconds() {
        let interval: Interval = serde_json::from_str(r#"{ "value": 5 }"#).unwrap();
        assert_eq!(interval, Interval::seconds(5));
    }

    #[test]
    fn nested_config_parses_and_builds() {
        let json = r#"
        {
          "kind": "any_of",
          "policies": [
            { "kind": "periodic", "interval": { "value": 10, "unit": "seconds" }, "arming": "on_construction" },
            { "kind": "volume_threshold", "threshold_bytes": 1024 }
          ]
        }"#;
        let config = PolicyConfig::from_json(json).unwrap();

        let t0 = Instant::now();
        let policy = config.build(Arc::new(NoopEventSink), t0).unwrap();
        assert_eq!(policy.name(), "any_of");

        let small = StorageStatus::new(1, 10);
        assert_eq!(policy.evaluate(&small, t0 + Duration::from_secs(9)), Decision::Noop);
        assert_eq!(policy.evaluate(&small, t0 + Duration::from_secs(10)), Decision::Upload);
        assert_eq!(
            policy.evaluate(&StorageStatus::new(1, 2048), t0 + Duration::from_secs(11)),
            Decision::Upload
        );
    }

    #[test]
    fn invalid_child_fails_the_whole_build() {
        let config = PolicyConfig::AnyOf {
            policies: vec![
                PolicyConfig::CountThreshold { threshold: 10 },
                PolicyConfig::CountThreshold { threshold: 0 },
            ],
        };
        let result = config.build(Arc::new(NoopEventSink), Instant::now());
        assert!(matches!(result, Err(PolicyError::InvalidConfiguration(_))));
    }

    #[test]
    fn malformed_json_is_invalid_configuration() {
        let err = PolicyConfig::from_json(r#"{ "kind": "hourly" }"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid configuration"));
    }

    #[test]
    fn default_config_builds() {
        let policy = PolicyConfig::default()
            .build(Arc::new(NoopEventSink), Instant::now())
            .unwrap();
        assert_eq!(policy.name(), "any_of");
    }
}

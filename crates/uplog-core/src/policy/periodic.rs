//! Periodic policy: upload once per interval.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::domain::{Decision, PolicyError, StorageStatus, UploadEvent};
use crate::ports::{EventSink, UploadDecisionPolicy};

const NAME: &str = "periodic";

/// How an unarmed periodic policy gets its first timer baseline.
///
/// Until a baseline exists the policy never uploads, so something has to set
/// it. Arming on construction is `PeriodicPolicy::armed_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmingRule {
    /// The first `evaluate` sets the baseline to its `now` and returns `Noop`.
    #[default]
    OnFirstEvaluate,

    /// `evaluate` never arms. Only `arm()` (or a constructor that arms) does.
    Manual,
}

#[derive(Debug)]
struct PeriodicState {
    interval: Duration,
    /// `None` until armed.
    last_upload: Option<Instant>,
}

/// Uploads when at least `interval` has passed since the last upload.
///
/// State machine:
/// - Unarmed -> Armed: `arm`, `armed_at`, or first `evaluate` under
///   `ArmingRule::OnFirstEvaluate`
/// - Armed -> Armed: every `Upload` moves the baseline to that call's `now`
/// - Armed -> Unarmed: `reset`
///
/// The baseline never moves backward. A `now` earlier than the baseline counts
/// as zero elapsed time.
pub struct PeriodicPolicy {
    state: Mutex<PeriodicState>,
    arming: ArmingRule,
    sink: Arc<dyn EventSink>,
}

impl PeriodicPolicy {
    /// Unarmed policy using `ArmingRule::OnFirstEvaluate`.
    pub fn new(interval: Duration, sink: Arc<dyn EventSink>) -> Result<Self, PolicyError> {
        Self::with_arming(interval, ArmingRule::default(), sink)
    }

    pub fn with_arming(
        interval: Duration,
        arming: ArmingRule,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, PolicyError> {
        validate_interval(interval)?;
        Ok(Self {
            state: Mutex::new(PeriodicState {
                interval,
                last_upload: None,
            }),
            arming,
            sink,
        })
    }

    /// Policy armed at `now`; the first upload fires one interval later.
    ///
    /// After a `reset` it behaves like `ArmingRule::OnFirstEvaluate`.
    pub fn armed_at(
        interval: Duration,
        now: Instant,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, PolicyError> {
        let policy = Self::new(interval, sink)?;
        policy.arm(now);
        Ok(policy)
    }

    /// Change the interval. A rejected value leaves the old one in place.
    ///
    /// The baseline is kept, so a shorter interval may fire on the next check.
    pub fn configure(&self, interval: Duration) -> Result<(), PolicyError> {
        validate_interval(interval)?;
        self.lock().interval = interval;
        self.sink.emit(UploadEvent::Reconfigured {
            policy: NAME,
            interval,
        });
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        self.lock().interval
    }

    /// Set the baseline to `now` if the policy is unarmed.
    ///
    /// Returns `false` (and changes nothing) when already armed.
    pub fn arm(&self, now: Instant) -> bool {
        let armed = {
            let mut state = self.lock();
            if state.last_upload.is_some() {
                false
            } else {
                state.last_upload = Some(now);
                true
            }
        };
        if armed {
            self.sink.emit(UploadEvent::Armed { policy: NAME });
        }
        armed
    }

    pub fn is_armed(&self) -> bool {
        self.lock().last_upload.is_some()
    }

    /// Baseline of the interval timer.
    pub fn last_upload(&self) -> Option<Instant> {
        self.lock().last_upload
    }

    fn lock(&self) -> MutexGuard<'_, PeriodicState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UploadDecisionPolicy for PeriodicPolicy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn evaluate(&self, status: &StorageStatus, now: Instant) -> Decision {
        let event = {
            let mut state = self.lock();
            match state.last_upload {
                None => match self.arming {
                    ArmingRule::OnFirstEvaluate => {
                        state.last_upload = Some(now);
                        Some(UploadEvent::Armed { policy: NAME })
                    }
                    ArmingRule::Manual => None,
                },
                Some(last) => {
                    let elapsed = now.saturating_duration_since(last);
                    if elapsed >= state.interval {
                        state.last_upload = Some(now);
                        Some(UploadEvent::UploadTriggered {
                            policy: NAME,
                            status: *status,
                            elapsed: Some(elapsed),
                        })
                    } else {
                        None
                    }
                }
            }
        };

        match event {
            Some(event @ UploadEvent::UploadTriggered { .. }) => {
                self.sink.emit(event);
                Decision::Upload
            }
            Some(event) => {
                self.sink.emit(event);
                Decision::Noop
            }
            None => Decision::Noop,
        }
    }

    fn reset(&self) {
        self.lock().last_upload = None;
        self.sink.emit(UploadEvent::Reset { policy: NAME });
    }
}

fn validate_interval(interval: Duration) -> Result<(), PolicyError> {
    if interval.is_zero() {
        return Err(PolicyError::invalid("interval must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{MemoryEventSink, NoopEventSink};
    use rstest::rstest;

    const TEN_SECONDS: Duration = Duration::from_secs(10);

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    fn status() -> StorageStatus {
        StorageStatus::new(7, 512)
    }

    fn manual(interval: Duration) -> PeriodicPolicy {
        PeriodicPolicy::with_arming(interval, ArmingRule::Manual, Arc::new(NoopEventSink)).unwrap()
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = PeriodicPolicy::new(Duration::ZERO, Arc::new(NoopEventSink));
        assert!(matches!(result, Err(PolicyError::InvalidConfiguration(_))));
    }

    #[test]
    fn rejected_configure_keeps_previous_interval() {
        let policy = manual(TEN_SECONDS);
        let err = policy.configure(Duration::ZERO).unwrap_err();
        assert!(err.to_string().contains("interval"));
        assert_eq!(policy.interval(), TEN_SECONDS);

        policy.configure(Duration::from_secs(3)).unwrap();
        assert_eq!(policy.interval(), Duration::from_secs(3));
    }

    #[test]
    fn configure_while_armed_keeps_baseline() {
        let t0 = Instant::now();
        let policy = manual(TEN_SECONDS);
        policy.arm(t0);

        policy.configure(Duration::from_secs(3)).unwrap();
        assert_eq!(policy.last_upload(), Some(t0));
        assert_eq!(policy.evaluate(&status(), at(t0, 2_999)), Decision::Noop);
        assert_eq!(policy.evaluate(&status(), at(t0, 3_000)), Decision::Upload);
        assert_eq!(policy.last_upload(), Some(at(t0, 3_000)));
    }

    #[test]
    fn manual_policy_stays_unarmed_without_external_arm() {
        let t0 = Instant::now();
        let policy = manual(TEN_SECONDS);

        assert_eq!(policy.evaluate(&status(), t0), Decision::Noop);
        assert_eq!(policy.evaluate(&status(), at(t0, 3_600_000)), Decision::Noop);
        assert!(!policy.is_armed());
        assert_eq!(policy.last_upload(), None);
    }

    #[test]
    fn manual_policy_fires_on_interval_boundary_after_arm() {
        let t0 = Instant::now();
        let policy = manual(TEN_SECONDS);

        assert_eq!(policy.evaluate(&status(), t0), Decision::Noop);
        assert!(policy.arm(t0));

        assert_eq!(policy.evaluate(&status(), at(t0, 9_999)), Decision::Noop);
        assert_eq!(policy.evaluate(&status(), at(t0, 10_000)), Decision::Upload);
        assert_eq!(policy.evaluate(&status(), at(t0, 10_001)), Decision::Noop);
        assert_eq!(policy.last_upload(), Some(at(t0, 10_000)));
    }

    #[test]
    fn reset_after_upload_unarms() {
        let t0 = Instant::now();
        let policy = manual(TEN_SECONDS);
        policy.arm(t0);
        assert_eq!(policy.evaluate(&status(), at(t0, 10_000)), Decision::Upload);

        policy.reset();

        assert_eq!(policy.evaluate(&status(), at(t0, 10_500)), Decision::Noop);
        assert_eq!(policy.evaluate(&status(), at(t0, 60_000)), Decision::Noop);
        assert!(!policy.is_armed());
    }

    #[test]
    fn first_evaluate_arms_by_default() {
        let t0 = Instant::now();
        let sink = Arc::new(MemoryEventSink::new());
        let policy = PeriodicPolicy::new(TEN_SECONDS, sink.clone()).unwrap();

        assert_eq!(policy.evaluate(&status(), t0), Decision::Noop);
        assert_eq!(policy.last_upload(), Some(t0));
        assert_eq!(policy.evaluate(&status(), at(t0, 9_999)), Decision::Noop);
        assert_eq!(policy.evaluate(&status(), at(t0, 10_000)), Decision::Upload);

        assert_eq!(sink.names(), vec!["armed", "upload_triggered"]);
    }

    #[test]
    fn reset_then_first_evaluate_rearms() {
        let t0 = Instant::now();
        let policy = PeriodicPolicy::new(TEN_SECONDS, Arc::new(NoopEventSink)).unwrap();
        policy.evaluate(&status(), t0);
        assert_eq!(policy.evaluate(&status(), at(t0, 10_000)), Decision::Upload);

        policy.reset();
        assert_eq!(policy.evaluate(&status(), at(t0, 10_500)), Decision::Noop);
        assert_eq!(policy.last_upload(), Some(at(t0, 10_500)));
        assert_eq!(policy.evaluate(&status(), at(t0, 20_499)), Decision::Noop);
        assert_eq!(policy.evaluate(&status(), at(t0, 20_500)), Decision::Upload);
    }

    #[test]
    fn armed_at_counts_from_construction() {
        let t0 = Instant::now();
        let policy = PeriodicPolicy::armed_at(TEN_SECONDS, t0, Arc::new(NoopEventSink)).unwrap();
        assert!(policy.is_armed());
        assert_eq!(policy.evaluate(&status(), at(t0, 10_000)), Decision::Upload);
    }

    #[test]
    fn arm_does_not_move_existing_baseline() {
        let t0 = Instant::now();
        let policy = manual(TEN_SECONDS);
        assert!(policy.arm(t0));
        assert!(!policy.arm(at(t0, 5_000)));
        assert_eq!(policy.last_upload(), Some(t0));
    }

    #[rstest]
    #[case(1, Decision::Noop)]
    #[case(9_999, Decision::Noop)]
    #[case(10_000, Decision::Upload)]
    #[case(10_001, Decision::Upload)]
    #[case(86_400_000, Decision::Upload)]
    fn decision_at_elapsed(#[case] elapsed_ms: u64, #[case] expected: Decision) {
        let t0 = Instant::now();
        let policy = manual(TEN_SECONDS);
        policy.arm(t0);
        assert_eq!(policy.evaluate(&status(), at(t0, elapsed_ms)), expected);
    }

    #[rstest]
    #[case(Duration::from_millis(1))]
    #[case(Duration::from_secs(10))]
    #[case(Duration::from_secs(3600))]
    fn steps_shorter_than_interval_never_upload(#[case] interval: Duration) {
        let t0 = Instant::now();
        let policy = manual(interval);
        policy.arm(t0);

        let step = interval / 3;
        let mut now = t0;
        for _ in 0..2 {
            now += step;
            assert_eq!(policy.evaluate(&status(), now), Decision::Noop);
        }
    }

    #[test]
    fn identical_inputs_give_identical_noop() {
        let t0 = Instant::now();
        let policy = manual(TEN_SECONDS);
        policy.arm(t0);

        let now = at(t0, 4_000);
        let first = policy.evaluate(&status(), now);
        let second = policy.evaluate(&status(), now);
        assert_eq!(first, second);
    }

    #[test]
    fn time_going_backward_never_moves_baseline() {
        let t0 = Instant::now();
        let policy = manual(TEN_SECONDS);
        policy.arm(at(t0, 20_000));

        assert_eq!(policy.evaluate(&status(), t0), Decision::Noop);
        assert_eq!(policy.last_upload(), Some(at(t0, 20_000)));

        let mut previous = policy.last_upload();
        for ms in [25_000, 5_000, 30_000, 29_000, 45_000, 40_000] {
            policy.evaluate(&status(), at(t0, ms));
            let current = policy.last_upload();
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn concurrent_callers_get_a_single_upload_per_window() {
        let t0 = Instant::now();
        let policy = Arc::new(manual(TEN_SECONDS));
        policy.arm(t0);
        let now = at(t0, 10_000);

        let uploads = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let policy = Arc::clone(&policy);
                    scope.spawn(move || policy.evaluate(&status(), now))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|d| d.is_upload())
                .count()
        });

        assert_eq!(uploads, 1);
    }

    #[test]
    fn events_carry_status_and_elapsed() {
        let t0 = Instant::now();
        let sink = Arc::new(MemoryEventSink::new());
        let policy =
            PeriodicPolicy::with_arming(TEN_SECONDS, ArmingRule::Manual, sink.clone()).unwrap();
        policy.arm(t0);
        policy.evaluate(&status(), at(t0, 12_000));
        policy.configure(Duration::from_secs(5)).unwrap();
        policy.reset();

        let events = sink.events();
        assert_eq!(
            events[1],
            UploadEvent::UploadTriggered {
                policy: "periodic",
                status: status(),
                elapsed: Some(Duration::from_millis(12_000)),
            }
        );
        assert_eq!(sink.names(), vec!["armed", "upload_triggered", "reconfigured", "reset"]);
    }
}

//! Multi-signal fatigue arbitration
//!
//! Rules are applied in a fixed order and the last one that matches decides the reason:
//! eye closure, then yawn, then the head-pose chain. Head pose therefore always beats
//! eye and mouth signals, and a yawn always beats eye closure.

use crate::analysis::{FatigueReason, HeadPoseStatus, UiClass, UiClasses, Verdict};
use crate::config::ThresholdConfig;
use crate::metrics::FrameMetrics;
use crate::state::TemporalSignals;

/// EAR this close above the threshold is shown as a warning
pub const EAR_WARNING_MARGIN: f32 = 0.05;

struct RuleInput<'a> {
    signals: &'a TemporalSignals,
    config: &'a ThresholdConfig,
    head_pose: HeadPoseStatus,
}

type Rule = fn(&RuleInput<'_>) -> Option<FatigueReason>;

/// Lowest precedence first
const RULES: [Rule; 3] = [eye_closure_rule, yawn_rule, head_pose_rule];

fn eye_closure_rule(input: &RuleInput<'_>) -> Option<FatigueReason> {
    let signals = input.signals;
    (signals.eye_closed && signals.closure_duration_sec >= input.config.closure_duration_sec)
        .then_some(FatigueReason::EyeClosure)
}

fn yawn_rule(input: &RuleInput<'_>) -> Option<FatigueReason> {
    input.signals.yawn.then_some(FatigueReason::Yawn)
}

fn head_pose_rule(input: &RuleInput<'_>) -> Option<FatigueReason> {
    input.head_pose.reason()
}

/// Phone > Nodding > LookingAway > Normal
pub fn head_pose_status(signals: &TemporalSignals) -> HeadPoseStatus {
    if signals.phone_usage {
        HeadPoseStatus::Phone
    } else if signals.head_nodding {
        HeadPoseStatus::Nodding
    } else if signals.looking_away {
        HeadPoseStatus::Distracted
    } else {
        HeadPoseStatus::Normal
    }
}

pub fn ear_class(ear: f32, config: &ThresholdConfig) -> UiClass {
    if ear < config.ear_threshold {
        UiClass::Danger
    } else if ear < config.ear_threshold + EAR_WARNING_MARGIN {
        UiClass::Warning
    } else {
        UiClass::Normal
    }
}

pub fn mar_class(mar: f32, config: &ThresholdConfig) -> UiClass {
    if mar > config.mar_threshold {
        UiClass::Danger
    } else {
        UiClass::Normal
    }
}

/// Decide this frame's verdict from its metrics and temporal signals
pub fn evaluate(
    metrics: &FrameMetrics,
    signals: &TemporalSignals,
    config: &ThresholdConfig,
) -> Verdict {
    let input = RuleInput {
        signals,
        config,
        head_pose: head_pose_status(signals),
    };

    let reason = RULES.iter().rev().find_map(|rule| rule(&input));

    Verdict {
        reason,
        head_pose: input.head_pose,
        ui: UiClasses {
            ear: ear_class(metrics.ear, config),
            mar: mar_class(metrics.mar, config),
            head_pose: input.head_pose.ui_class(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn metrics(ear: f32, mar: f32) -> FrameMetrics {
        FrameMetrics {
            ear,
            mar,
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            timestamp: Instant::now(),
        }
    }

    fn closed_for(seconds: f32) -> TemporalSignals {
        TemporalSignals {
            eye_closed: true,
            closure_duration_sec: seconds,
            ..Default::default()
        }
    }

    #[test]
    fn test_nothing_detected() {
        let verdict = evaluate(
            &metrics(0.35, 0.2),
            &TemporalSignals::default(),
            &ThresholdConfig::default(),
        );
        assert!(!verdict.detected());
        assert_eq!(verdict.head_pose, HeadPoseStatus::Normal);
        assert_eq!(verdict.head_pose.label(), "Normal");
        assert_eq!(verdict.ui, UiClasses::default());
    }

    #[test]
    fn test_closure_boundary_is_inclusive() {
        let config = ThresholdConfig::default();
        let m = metrics(0.1, 0.2);

        let short = evaluate(&m, &closed_for(1.499), &config);
        assert_eq!(short.reason, None);
        assert_eq!(short.ui.ear, UiClass::Danger);

        let exact = evaluate(&m, &closed_for(1.5), &config);
        assert_eq!(exact.reason, Some(FatigueReason::EyeClosure));
    }

    #[test]
    fn test_yawn_beats_eye_closure() {
        let signals = TemporalSignals {
            yawn: true,
            mouth_open: true,
            ..closed_for(2.0)
        };
        let verdict = evaluate(&metrics(0.1, 0.9), &signals, &ThresholdConfig::default());
        assert_eq!(verdict.reason, Some(FatigueReason::Yawn));
        assert_eq!(verdict.ui.mar, UiClass::Danger);
    }

    #[test]
    fn test_head_pose_beats_everything() {
        let signals = TemporalSignals {
            yawn: true,
            phone_usage: true,
            looking_away: true,
            ..closed_for(2.0)
        };
        let verdict = evaluate(&metrics(0.1, 0.9), &signals, &ThresholdConfig::default());
        assert_eq!(verdict.reason, Some(FatigueReason::Phone));
        assert_eq!(verdict.head_pose, HeadPoseStatus::Phone);
        assert_eq!(verdict.ui.head_pose, UiClass::Danger);
    }

    #[test]
    fn test_head_pose_chain_order() {
        let nodding_and_away = TemporalSignals {
            head_nodding: true,
            looking_away: true,
            ..Default::default()
        };
        assert_eq!(head_pose_status(&nodding_and_away), HeadPoseStatus::Nodding);

        let away = TemporalSignals {
            looking_away: true,
            ..Default::default()
        };
        assert_eq!(head_pose_status(&away), HeadPoseStatus::Distracted);
        assert_eq!(
            evaluate(&metrics(0.3, 0.2), &away, &ThresholdConfig::default()).reason,
            Some(FatigueReason::LookingAway)
        );
    }

    #[test]
    fn test_ear_warning_band() {
        let config = ThresholdConfig::default();
        assert_eq!(ear_class(0.24, &config), UiClass::Danger);
        assert_eq!(ear_class(0.27, &config), UiClass::Warning);
        assert_eq!(ear_class(0.31, &config), UiClass::Normal);
    }
}

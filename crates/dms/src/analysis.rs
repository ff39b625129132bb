//! Fatigue analysis results

use crate::metrics::FrameMetrics;
use crate::state::TemporalSignals;
use crate::DmsError;
use alerting::{AlertEvent, AlertTimerEvent};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Why fatigue was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueReason {
    /// Eyes closed longer than the configured duration
    EyeClosure,

    /// Debounce-accepted yawn
    Yawn,

    /// Looking down long enough to suggest phone use
    Phone,

    /// Repeated rapid pitch changes
    Nodding,

    /// Head turned away from the road
    LookingAway,
}

impl FatigueReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EyeClosure => "eye_closure",
            Self::Yawn => "yawn",
            Self::Phone => "phone",
            Self::Nodding => "nodding",
            Self::LookingAway => "looking_away",
        }
    }

    /// Human-readable alert text
    pub fn message(&self) -> &'static str {
        match self {
            Self::EyeClosure => "Prolonged eye closure detected",
            Self::Yawn => "Yawning detected",
            Self::Phone => "PHONE DETECTED - Keep eyes on road!",
            Self::Nodding => "HEAD NODDING - Pull over to rest!",
            Self::LookingAway => "LOOKING AWAY - Focus on the road!",
        }
    }
}

/// Display severity for one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiClass {
    #[default]
    Normal,
    Warning,
    Danger,
}

impl UiClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// Head pose display state, exactly one per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeadPoseStatus {
    #[default]
    Normal,
    Phone,
    Nodding,
    Distracted,
}

impl HeadPoseStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Phone => "Phone",
            Self::Nodding => "Nodding",
            Self::Distracted => "Distracted",
        }
    }

    pub fn ui_class(&self) -> UiClass {
        match self {
            Self::Normal => UiClass::Normal,
            _ => UiClass::Danger,
        }
    }

    /// Fatigue reason carried by this pose, if any
    pub fn reason(&self) -> Option<FatigueReason> {
        match self {
            Self::Normal => None,
            Self::Phone => Some(FatigueReason::Phone),
            Self::Nodding => Some(FatigueReason::Nodding),
            Self::Distracted => Some(FatigueReason::LookingAway),
        }
    }

    /// Counts toward the distraction counter
    pub fn is_distraction(&self) -> bool {
        matches!(self, Self::Phone | Self::Distracted)
    }
}

/// Per-metric display classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiClasses {
    pub ear: UiClass,
    pub mar: UiClass,
    pub head_pose: UiClass,
}

/// Detection verdict for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Verdict {
    /// Winning reason; `None` means nothing detected
    pub reason: Option<FatigueReason>,
    pub head_pose: HeadPoseStatus,
    pub ui: UiClasses,
}

impl Verdict {
    pub fn detected(&self) -> bool {
        self.reason.is_some()
    }
}

/// System status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SystemStatus {
    #[default]
    Ready,
    MonitoringActive,
    FatigueDetected,
    NoFace,
    Stopped,
}

impl SystemStatus {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Ready => "Ready to start",
            Self::MonitoringActive => "Monitoring Active",
            Self::FatigueDetected => "FATIGUE DETECTED!",
            Self::NoFace => "No face detected",
            Self::Stopped => "Monitoring Stopped",
        }
    }

    pub fn ui_class(&self) -> UiClass {
        match self {
            Self::Ready | Self::MonitoringActive => UiClass::Normal,
            Self::NoFace | Self::Stopped => UiClass::Warning,
            Self::FatigueDetected => UiClass::Danger,
        }
    }
}

/// Display-ready statistics, emitted once per evaluated frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub ear: f32,
    pub mar: f32,
    pub avg_ear: f32,
    pub blink_count: u32,
    pub yawn_count: u32,
    pub distraction_count: u32,
    pub head_nod_count: u32,
    pub alert_count: u32,
    pub head_pose: HeadPoseStatus,
    pub ui: UiClasses,
}

impl StatsSnapshot {
    pub fn head_pose_label(&self) -> &'static str {
        self.head_pose.label()
    }
}

/// Everything produced by one evaluated frame
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub metrics: FrameMetrics,
    pub signals: TemporalSignals,
    pub verdict: Verdict,
    /// Raised alert; `None` when nothing was detected or the alert was suppressed
    pub alert: Option<AlertEvent<FatigueReason>>,
    pub snapshot: StatsSnapshot,
    pub status: SystemStatus,
}

/// Result of offering a frame to the monitor
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    /// Monitoring is stopped; the frame was ignored
    Inactive,

    /// No usable face this frame. `rejection` is set when landmarks were present but unusable.
    NoSignal { rejection: Option<DmsError> },

    /// Frame was evaluated
    Evaluated(Box<FrameReport>),
}

impl FrameOutcome {
    pub fn report(&self) -> Option<&FrameReport> {
        match self {
            Self::Evaluated(report) => Some(report),
            _ => None,
        }
    }

    pub fn alert(&self) -> Option<&AlertEvent<FatigueReason>> {
        self.report().and_then(|r| r.alert.as_ref())
    }
}

/// Session lifecycle signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Started { session_id: Uuid, at: Instant },
    Stopped { session_id: Uuid, duration: Duration },
}

/// Outcome of a fired timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Alert(AlertTimerEvent),
    /// Display tick with time since session start
    SessionTick { elapsed: Duration },
}

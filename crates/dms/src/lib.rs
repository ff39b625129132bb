//! Driver Monitoring System (DMS)
//!
//! Real-time fatigue and distraction analysis over face mesh landmarks:
//! - Eye aspect ratio (prolonged eye closure, blinks)
//! - Mouth aspect ratio (yawning)
//! - Head pose (phone usage, looking away, head nodding)
//! - Cooldown-arbitrated alerts and running session statistics

pub mod analysis;
pub mod clock;
pub mod config;
pub mod evaluator;
pub mod landmarks;
pub mod metrics;
pub mod state;
pub mod stats;

pub use analysis::{
    FatigueReason, FrameOutcome, FrameReport, HeadPoseStatus, SessionEvent, StatsSnapshot,
    SystemStatus, TimerEvent, UiClass, UiClasses, Verdict,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::ThresholdConfig;
pub use landmarks::{FaceGeometry, LandmarkPoint};
pub use crate::metrics::{FrameMetrics, HeadPose};
pub use state::{TemporalSignals, TemporalState, TemporalStateTracker};
pub use stats::{SessionStats, SessionStatsAggregator};

use alerting::{AlertArbiter, AlertChannels, AlertConfig, TaskHandle, TaskQueue};
use data_validator::{ValidationError, Validator};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Session display tick period
pub const SESSION_TICK: Duration = Duration::from_secs(1);

/// DMS error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DmsError {
    #[error("Malformed landmarks: {0}")]
    MalformedInput(ValidationError),

    #[error("Degenerate {feature} geometry: reference width {width} too small")]
    DegenerateGeometry { feature: &'static str, width: f32 },

    #[error("Configuration error: {0}")]
    Config(ValidationError),

    #[error("Monitoring session already active")]
    AlreadyMonitoring,
}

impl DmsError {
    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed",
            Self::DegenerateGeometry { .. } => "degenerate",
            Self::Config(_) => "config",
            Self::AlreadyMonitoring => "already_monitoring",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTask {
    Tick,
}

#[derive(Debug, Clone, Copy)]
struct ActiveSession {
    id: Uuid,
    started_at: Instant,
    tick: TaskHandle,
}

/// Fatigue monitoring session: owns every piece of per-session state
pub struct FatigueMonitor<C: Clock = MonotonicClock> {
    config: ThresholdConfig,
    validator: Validator,
    clock: C,
    alert_config: AlertConfig,
    tracker: TemporalStateTracker,
    arbiter: AlertArbiter,
    stats: SessionStatsAggregator,
    timers: TaskQueue<SessionTask>,
    session: Option<ActiveSession>,
    status: SystemStatus,
}

impl<C: Clock> FatigueMonitor<C> {
    /// Create a monitor with default alert timing
    pub fn new(config: ThresholdConfig, clock: C) -> Result<Self, DmsError> {
        Self::with_alert_config(config, AlertConfig::default(), clock)
    }

    /// Create a monitor with explicit alert timing
    pub fn with_alert_config(
        config: ThresholdConfig,
        alert_config: AlertConfig,
        clock: C,
    ) -> Result<Self, DmsError> {
        let validator = Validator::default();
        config.validate(&validator).map_err(DmsError::Config)?;

        Ok(Self {
            config,
            validator,
            clock,
            arbiter: AlertArbiter::new(alert_config.clone()),
            alert_config,
            tracker: TemporalStateTracker::new(),
            stats: SessionStatsAggregator::new(),
            timers: TaskQueue::new(),
            session: None,
            status: SystemStatus::Ready,
        })
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Replace thresholds. Takes effect on the next frame; no state is reset.
    pub fn update_config(&mut self, config: ThresholdConfig) -> Result<(), DmsError> {
        config.validate(&self.validator).map_err(|err| {
            warn!("Rejected configuration update: {}", err);
            DmsError::Config(err)
        })?;
        info!("Configuration updated: {:?}", config);
        self.config = config;
        Ok(())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn status(&self) -> SystemStatus {
        self.status
    }

    pub fn is_monitoring(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.map(|s| s.id)
    }

    /// Time since the session started
    pub fn session_elapsed(&self) -> Option<Duration> {
        self.session
            .map(|s| self.clock.now().saturating_duration_since(s.started_at))
    }

    pub fn temporal_state(&self) -> &TemporalState {
        self.tracker.state()
    }

    pub fn stats(&self) -> &SessionStats {
        self.stats.stats()
    }

    pub fn alert_count(&self) -> u32 {
        self.arbiter.trigger_count()
    }

    pub fn alert_active(&self) -> bool {
        self.arbiter.state().alert_active
    }

    /// Start a fresh session. All detector state starts from scratch.
    pub fn start(&mut self) -> Result<SessionEvent, DmsError> {
        if self.session.is_some() {
            return Err(DmsError::AlreadyMonitoring);
        }

        let now = self.clock.now();
        let id = Uuid::new_v4();

        self.tracker = TemporalStateTracker::new();
        self.stats = SessionStatsAggregator::new();
        self.arbiter = AlertArbiter::new(self.alert_config.clone());
        self.timers.clear();

        let tick = self
            .timers
            .schedule_every(now + SESSION_TICK, SESSION_TICK, SessionTask::Tick);
        self.session = Some(ActiveSession {
            id,
            started_at: now,
            tick,
        });
        self.status = SystemStatus::MonitoringActive;

        info!("Monitoring session {} started", id);
        Ok(SessionEvent::Started { session_id: id, at: now })
    }

    /// Stop the session, cancelling the alert repeat and the session tick
    pub fn stop<A: AlertChannels + ?Sized>(&mut self, channels: &mut A) -> Option<SessionEvent> {
        let session = self.session.take()?;
        let duration = self.clock.now().saturating_duration_since(session.started_at);

        self.timers.cancel(session.tick);
        self.arbiter.clear(channels);
        self.status = SystemStatus::Stopped;

        info!(
            "Monitoring session {} stopped after {:.1}s ({} alerts)",
            session.id,
            duration.as_secs_f32(),
            self.arbiter.trigger_count()
        );
        Some(SessionEvent::Stopped {
            session_id: session.id,
            duration,
        })
    }

    /// Zero every counter and clear all temporal episodes
    pub fn reset_stats(&mut self) {
        self.stats.reset();
        self.tracker.reset();
        self.arbiter.reset_count();
        info!("Statistics reset");
    }

    fn measure(&self, points: &[LandmarkPoint], now: Instant) -> Result<FrameMetrics, DmsError> {
        let face = FaceGeometry::from_landmarks(points, &self.validator)
            .map_err(DmsError::MalformedInput)?;
        FrameMetrics::compute(&face, now)
    }

    /// Run one evaluation pass. `landmarks` is `None` when the provider found no face.
    pub fn process_frame<A: AlertChannels + ?Sized>(
        &mut self,
        landmarks: Option<&[LandmarkPoint]>,
        channels: &mut A,
    ) -> FrameOutcome {
        if self.session.is_none() {
            return FrameOutcome::Inactive;
        }

        let now = self.clock.now();

        let Some(points) = landmarks else {
            self.status = SystemStatus::NoFace;
            return FrameOutcome::NoSignal { rejection: None };
        };

        let metrics = match self.measure(points, now) {
            Ok(metrics) => metrics,
            Err(err) => {
                warn!("Frame rejected: {}", err);
                ::metrics::counter!("dms_frames_rejected_total", "reason" => err.kind()).increment(1);
                self.status = SystemStatus::NoFace;
                return FrameOutcome::NoSignal {
                    rejection: Some(err),
                };
            }
        };

        let signals = self.tracker.update(&metrics, &self.config, now);
        let verdict = evaluator::evaluate(&metrics, &signals, &self.config);
        self.stats.record(&metrics, &signals, &verdict);

        let alert = self
            .arbiter
            .on_verdict(verdict.reason, now, self.config.toggles(), channels);

        match (&alert, verdict.reason) {
            (Some(event), _) => {
                info!("ALERT: {}", event.reason.message());
                ::metrics::counter!("dms_alerts_triggered_total", "reason" => event.reason.as_str())
                    .increment(1);
            }
            (None, Some(reason)) => {
                debug!("Detection {:?} suppressed by cooldown", reason);
                ::metrics::counter!("dms_alerts_suppressed_total").increment(1);
            }
            (None, None) => {}
        }
        ::metrics::counter!("dms_frames_evaluated_total").increment(1);

        self.status = if verdict.detected() {
            SystemStatus::FatigueDetected
        } else {
            SystemStatus::MonitoringActive
        };

        let snapshot = self
            .stats
            .snapshot(&metrics, &verdict, self.arbiter.trigger_count());

        FrameOutcome::Evaluated(Box::new(FrameReport {
            metrics,
            signals,
            verdict,
            alert,
            snapshot,
            status: self.status,
        }))
    }

    /// Fire every timer due by now
    pub fn poll_timers<A: AlertChannels + ?Sized>(&mut self, channels: &mut A) -> Vec<TimerEvent> {
        let now = self.clock.now();

        let mut events: Vec<TimerEvent> = self
            .arbiter
            .poll_timers(now, self.config.toggles(), channels)
            .into_iter()
            .map(TimerEvent::Alert)
            .collect();

        for fired in self.timers.poll(now) {
            match fired.kind {
                SessionTask::Tick => {
                    if let Some(session) = self.session {
                        events.push(TimerEvent::SessionTick {
                            elapsed: fired.due.saturating_duration_since(session.started_at),
                        });
                    }
                }
            }
        }

        events
    }

    /// Earliest pending timer across the arbiter and the session tick
    pub fn next_timer(&self) -> Option<Instant> {
        match (self.arbiter.next_timer(), self.timers.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

//! Driver state tracking across frames

use crate::config::ThresholdConfig;
use crate::metrics::FrameMetrics;
use ring_buffer::TimeWindow;
use std::time::{Duration, Instant};
use tracing::debug;

/// Pitch above this means looking down (phone/lap)
pub const PHONE_PITCH_DEGREES: f32 = 15.0;
/// Looking down this long is phone usage
pub const PHONE_HOLD: Duration = Duration::from_millis(2000);
/// |yaw| above this means looking away
pub const LOOK_AWAY_YAW: f32 = 25.0;
/// Looking away this long is a distraction
pub const LOOK_AWAY_HOLD: Duration = Duration::from_millis(1500);
/// Frame-to-frame pitch change that counts as a nod movement
pub const NOD_PITCH_DELTA: f32 = 8.0;
/// Nod movements are clustered within this window
pub const NOD_WINDOW: Duration = Duration::from_millis(5000);
/// Movements inside the window needed to call it nodding
pub const NOD_MIN_EVENTS: usize = 3;
/// Minimum gap between two counted yawns
pub const YAWN_REFRACTORY: Duration = Duration::from_millis(3000);

/// Temporal state (one writer, updated once per frame)
#[derive(Debug, Clone)]
pub struct TemporalState {
    /// When the current eye closure began
    pub eye_closure_start: Option<Instant>,

    /// When the current looking-down episode began
    pub looking_down_start: Option<Instant>,

    /// When the current looking-away episode began
    pub looking_away_start: Option<Instant>,

    /// Rapid pitch changes in the trailing nod window
    pub nod_events: TimeWindow,

    /// Previous frame's pitch; `None` until a face has been seen
    pub last_pitch: Option<f32>,

    /// Last counted yawn
    pub last_yawn_time: Option<Instant>,

    /// Nod events since session start
    pub head_nod_count: u32,
}

impl Default for TemporalState {
    fn default() -> Self {
        Self {
            eye_closure_start: None,
            looking_down_start: None,
            looking_away_start: None,
            nod_events: TimeWindow::new(NOD_WINDOW),
            last_pitch: None,
            last_yawn_time: None,
            head_nod_count: 0,
        }
    }
}

/// What the tracker observed this frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemporalSignals {
    /// EAR below threshold
    pub eye_closed: bool,
    /// This frame opened a new closure (open→closed edge)
    pub closure_started: bool,
    /// Seconds the eyes have been closed, 0 when open
    pub closure_duration_sec: f32,
    /// Looking down for at least [`PHONE_HOLD`]
    pub phone_usage: bool,
    /// Nod cluster completed on this frame
    pub head_nodding: bool,
    /// Looking away for at least [`LOOK_AWAY_HOLD`]
    pub looking_away: bool,
    /// MAR above threshold
    pub mouth_open: bool,
    /// Debounce-accepted yawn on this frame
    pub yawn: bool,
}

/// Opens an episode on the first active frame, closes it on the first inactive one.
/// Returns elapsed time while active.
fn track_episode(start: &mut Option<Instant>, active: bool, now: Instant) -> Option<Duration> {
    if active {
        let began = *start.get_or_insert(now);
        Some(now.saturating_duration_since(began))
    } else {
        *start = None;
        None
    }
}

/// Per-signal duration and window tracker
#[derive(Debug, Clone, Default)]
pub struct TemporalStateTracker {
    state: TemporalState,
}

impl TemporalStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TemporalState {
        &self.state
    }

    pub fn head_nod_count(&self) -> u32 {
        self.state.head_nod_count
    }

    /// Advance every sub-signal by one frame. All of them see the same `now` and `metrics`.
    pub fn update(
        &mut self,
        metrics: &FrameMetrics,
        config: &ThresholdConfig,
        now: Instant,
    ) -> TemporalSignals {
        let mut signals = TemporalSignals::default();

        // Eye closure
        let was_closed = self.state.eye_closure_start.is_some();
        signals.eye_closed = metrics.ear < config.ear_threshold;
        if let Some(elapsed) =
            track_episode(&mut self.state.eye_closure_start, signals.eye_closed, now)
        {
            signals.closure_started = !was_closed;
            signals.closure_duration_sec = elapsed.as_secs_f32();
        }

        // Phone usage (looking down)
        signals.phone_usage = track_episode(
            &mut self.state.looking_down_start,
            metrics.pitch > PHONE_PITCH_DEGREES,
            now,
        )
        .is_some_and(|elapsed| elapsed >= PHONE_HOLD);

        // Looking away
        signals.looking_away = track_episode(
            &mut self.state.looking_away_start,
            metrics.yaw.abs() > LOOK_AWAY_YAW,
            now,
        )
        .is_some_and(|elapsed| elapsed >= LOOK_AWAY_HOLD);

        // Head nodding
        signals.head_nodding = self.update_nodding(metrics.pitch, now);

        // Yawn
        signals.mouth_open = metrics.mar > config.mar_threshold;
        if signals.mouth_open {
            let refractory_over = self
                .state
                .last_yawn_time
                .map_or(true, |last| now.saturating_duration_since(last) > YAWN_REFRACTORY);
            if refractory_over {
                self.state.last_yawn_time = Some(now);
                signals.yawn = true;
            }
        }

        signals
    }

    fn update_nodding(&mut self, pitch: f32, now: Instant) -> bool {
        let moved = self
            .state
            .last_pitch
            .is_some_and(|last| (pitch - last).abs() > NOD_PITCH_DELTA);

        if moved {
            self.state.nod_events.push(now);
        }
        self.state.nod_events.evict(now);
        self.state.last_pitch = Some(pitch);

        if moved && self.state.nod_events.len() >= NOD_MIN_EVENTS {
            self.state.head_nod_count += 1;
            debug!(
                "Head nod cluster: {} movements in window (total nods {})",
                self.state.nod_events.len(),
                self.state.head_nod_count
            );
            return true;
        }
        false
    }

    /// Clear every episode, the nod history and the nod counter. The yawn debounce survives
    /// so a yawn in progress is not counted twice.
    pub fn reset(&mut self) {
        self.state = TemporalState {
            last_yawn_time: self.state.last_yawn_time,
            ..TemporalState::default()
        };
    }
}

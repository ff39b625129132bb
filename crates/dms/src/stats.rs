//! Session statistics

use crate::analysis::{StatsSnapshot, Verdict};
use crate::metrics::FrameMetrics;
use crate::state::TemporalSignals;
use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};

/// EAR samples kept for the running average
pub const EAR_HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub ear_history: RingBuffer<f32>,
    pub blink_count: u32,
    pub yawn_count: u32,
    pub distraction_count: u32,
    pub head_nod_count: u32,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            ear_history: RingBuffer::new(EAR_HISTORY_CAPACITY),
            blink_count: 0,
            yawn_count: 0,
            distraction_count: 0,
            head_nod_count: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionStatsAggregator {
    stats: SessionStats,
}

impl SessionStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Mean of the EAR history, recomputed on every call
    pub fn average_ear(&self) -> Option<f32> {
        self.stats.ear_history.mean()
    }

    /// Fold one evaluated frame into the counters
    pub fn record(&mut self, metrics: &FrameMetrics, signals: &TemporalSignals, verdict: &Verdict) {
        self.stats.ear_history.push(metrics.ear);

        if signals.closure_started {
            self.stats.blink_count += 1;
        }
        if signals.yawn {
            self.stats.yawn_count += 1;
        }
        if signals.head_nodding {
            self.stats.head_nod_count += 1;
        }
        if verdict.head_pose.is_distraction() {
            self.stats.distraction_count += 1;
        }
    }

    pub fn snapshot(&self, metrics: &FrameMetrics, verdict: &Verdict, alert_count: u32) -> StatsSnapshot {
        StatsSnapshot {
            ear: metrics.ear,
            mar: metrics.mar,
            avg_ear: self.average_ear().unwrap_or(0.0),
            blink_count: self.stats.blink_count,
            yawn_count: self.stats.yawn_count,
            distraction_count: self.stats.distraction_count,
            head_nod_count: self.stats.head_nod_count,
            alert_count,
            head_pose: verdict.head_pose,
            ui: verdict.ui,
        }
    }

    pub fn reset(&mut self) {
        self.stats = SessionStats::default();
    }
}

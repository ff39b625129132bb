//! Recorded landmark stream playback

use crate::{AppConfig, ReplayError};
use alerting::{AlertChannels, AlertTimerEvent};
use dms::{FatigueMonitor, FrameOutcome, LandmarkPoint, ManualClock, SessionEvent, TimerEvent};
use serde::Deserialize;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// One line of a recording
#[derive(Debug, Clone, Deserialize)]
pub struct FrameRecord {
    /// Capture time relative to the start of the recording
    pub t_ms: u64,
    /// Detected faces; empty when nobody was found
    #[serde(default)]
    pub faces: Vec<Vec<LandmarkPoint>>,
}

impl FrameRecord {
    /// Single-face tracking: only the first face is used
    pub fn primary_face(&self) -> Option<&[LandmarkPoint]> {
        self.faces.first().map(Vec::as_slice)
    }
}

/// Parse one recording line
pub fn parse_record(line: &str, line_no: usize) -> Result<FrameRecord, ReplayError> {
    serde_json::from_str(line).map_err(|source| ReplayError::Parse {
        line: line_no,
        source,
    })
}

/// `mm:ss` session clock
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Alert collaborator that reports through tracing
#[derive(Debug, Default)]
pub struct LogChannels {
    pub shown: u32,
    pub hidden: u32,
    pub sounds: u32,
}

impl AlertChannels for LogChannels {
    fn show_visual(&mut self) {
        self.shown += 1;
        info!("Visual alert shown");
    }

    fn hide_visual(&mut self) {
        self.hidden += 1;
        debug!("Visual alert hidden");
    }

    fn play_sound(&mut self) {
        self.sounds += 1;
        info!("Alert sound played");
    }
}

/// Totals for one replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    pub frames: u64,
    pub evaluated: u64,
    pub no_face: u64,
    pub rejected: u64,
    pub alerts: u32,
    pub blinks: u32,
    pub yawns: u32,
    pub distractions: u32,
    pub head_nods: u32,
    pub duration: Duration,
}

fn report_timers(events: Vec<TimerEvent>) {
    for event in events {
        match event {
            TimerEvent::SessionTick { elapsed } => {
                debug!("Session time {}", format_elapsed(elapsed));
            }
            TimerEvent::Alert(AlertTimerEvent::Repeat { sounded }) => {
                debug!("Continuous alert tick (sounded: {})", sounded);
            }
            TimerEvent::Alert(other) => debug!("Alert timer: {:?}", other),
        }
    }
}

/// Advance the replay clock to `target`, firing every timer at its own due time on the way
fn advance_to<A: AlertChannels>(
    monitor: &mut FatigueMonitor<&ManualClock>,
    clock: &ManualClock,
    target: Duration,
    channels: &mut A,
) {
    let target_at = clock.origin() + target;
    while let Some(due) = monitor.next_timer() {
        if due > target_at {
            break;
        }
        clock.set_offset(due.saturating_duration_since(clock.origin()));
        report_timers(monitor.poll_timers(channels));
    }
    clock.set_offset(target);
    report_timers(monitor.poll_timers(channels));
}

/// Play a JSON-lines recording through a fresh monitoring session
pub async fn replay<R>(
    reader: R,
    config: &AppConfig,
    channels: &mut LogChannels,
) -> Result<ReplaySummary, ReplayError>
where
    R: AsyncBufRead + Unpin,
{
    let clock = ManualClock::new();
    let mut monitor =
        FatigueMonitor::with_alert_config(config.thresholds.clone(), config.alerts.clone(), &clock)?;

    if let SessionEvent::Started { session_id, .. } = monitor.start()? {
        info!("Replay session {} started", session_id);
    }

    let started = tokio::time::Instant::now();
    let mut summary = ReplaySummary::default();
    let mut lines = reader.lines();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_record(&line, line_no)?;
        let offset = Duration::from_millis(record.t_ms);

        if config.replay.realtime {
            tokio::time::sleep_until(started + offset).await;
        }

        if offset < clock.elapsed() {
            warn!(
                "Line {}: timestamp {}ms goes backwards, holding clock at {}ms",
                line_no,
                record.t_ms,
                clock.elapsed().as_millis()
            );
        }
        advance_to(&mut monitor, &clock, offset, channels);

        summary.frames += 1;
        match monitor.process_frame(record.primary_face(), channels) {
            FrameOutcome::Evaluated(report) => {
                summary.evaluated += 1;
                if let Some(alert) = report.alert {
                    info!(
                        "[{}] {} (alert #{})",
                        format_elapsed(offset),
                        alert.reason.message(),
                        alert.trigger_count
                    );
                }
            }
            FrameOutcome::NoSignal { rejection: None } => summary.no_face += 1,
            FrameOutcome::NoSignal {
                rejection: Some(_),
            } => summary.rejected += 1,
            FrameOutcome::Inactive => {}
        }
    }

    let stats = monitor.stats().clone();
    summary.alerts = monitor.alert_count();
    summary.blinks = stats.blink_count;
    summary.yawns = stats.yawn_count;
    summary.distractions = stats.distraction_count;
    summary.head_nods = stats.head_nod_count;

    if let Some(SessionEvent::Stopped { duration, .. }) = monitor.stop(channels) {
        summary.duration = duration;
    }

    info!(
        "Replay finished at {}: {} frames, {} alerts",
        format_elapsed(clock.elapsed()),
        summary.frames,
        summary.alerts
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Face with collapsed eyelids and a closed mouth, looking straight ahead
    fn closed_eyes() -> Vec<LandmarkPoint> {
        let mut points = vec![LandmarkPoint::flat(0.5, 0.5); 468];
        points[33] = LandmarkPoint::flat(0.3, 0.4);
        points[133] = LandmarkPoint::flat(0.4, 0.4);
        points[362] = LandmarkPoint::flat(0.6, 0.4);
        points[263] = LandmarkPoint::flat(0.7, 0.4);
        points[61] = LandmarkPoint::flat(0.4, 0.7);
        points[291] = LandmarkPoint::flat(0.6, 0.7);
        points
    }

    fn recording(frames: &[(u64, Option<Vec<LandmarkPoint>>)]) -> String {
        frames
            .iter()
            .map(|(t_ms, face)| {
                let faces: Vec<_> = face.iter().cloned().collect();
                json!({ "t_ms": t_ms, "faces": faces }).to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::ZERO), "00:00");
        assert_eq!(format_elapsed(Duration::from_millis(65_900)), "01:05");
        assert_eq!(format_elapsed(Duration::from_secs(3600)), "60:00");
    }

    #[test]
    fn test_parse_record_without_depth() {
        let record = parse_record(r#"{"t_ms": 40, "faces": [[{"x": 0.1, "y": 0.2}]]}"#, 1).unwrap();
        assert_eq!(record.t_ms, 40);
        assert_eq!(record.primary_face(), Some(&[LandmarkPoint::flat(0.1, 0.2)][..]));

        let empty = parse_record(r#"{"t_ms": 80}"#, 2).unwrap();
        assert!(empty.primary_face().is_none());

        let err = parse_record("{not json", 7).unwrap_err();
        assert!(matches!(err, ReplayError::Parse { line: 7, .. }));
    }

    #[tokio::test]
    async fn test_replay_raises_eye_closure_alert() {
        let frames: Vec<_> = [0, 500, 1000, 1500, 2000]
            .into_iter()
            .map(|t| (t, Some(closed_eyes())))
            .collect();
        let input = recording(&frames);
        let mut channels = LogChannels::default();

        let summary = replay(input.as_bytes(), &AppConfig::default(), &mut channels)
            .await
            .unwrap();

        assert_eq!(summary.frames, 5);
        assert_eq!(summary.evaluated, 5);
        assert_eq!(summary.alerts, 1);
        assert_eq!(summary.blinks, 1);
        assert_eq!(summary.duration, Duration::from_millis(2000));
        assert_eq!(channels.shown, 1);
        assert_eq!(channels.sounds, 1);
        // Stopping hides the overlay
        assert_eq!(channels.hidden, 1);
    }

    #[tokio::test]
    async fn test_replay_counts_missing_and_bad_faces() {
        let input = recording(&[
            (0, None),
            (100, Some(vec![LandmarkPoint::flat(0.5, 0.5); 10])),
            (200, Some(closed_eyes())),
        ]);
        let mut channels = LogChannels::default();

        let summary = replay(input.as_bytes(), &AppConfig::default(), &mut channels)
            .await
            .unwrap();

        assert_eq!(summary.frames, 3);
        assert_eq!(summary.no_face, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.evaluated, 1);
        assert_eq!(summary.alerts, 0);
    }

    #[tokio::test]
    async fn test_replay_fires_repeat_between_frames() {
        let input = recording(&[
            (0, Some(closed_eyes())),
            (1500, Some(closed_eyes())),
            (4100, Some(closed_eyes())),
        ]);
        let mut channels = LogChannels::default();

        replay(input.as_bytes(), &AppConfig::default(), &mut channels)
            .await
            .unwrap();

        // Initial sound at 1500ms, repeat at 4000ms
        assert_eq!(channels.sounds, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_pacing_follows_timestamps() {
        let input = recording(&[(0, None), (5000, None)]);
        let mut config = AppConfig::default();
        config.replay.realtime = true;
        let mut channels = LogChannels::default();

        let before = tokio::time::Instant::now();
        replay(input.as_bytes(), &config, &mut channels).await.unwrap();
        assert!(before.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_bad_line_aborts_with_line_number() {
        let input = format!("{}\n\n{{\"t_ms\": \"soon\"}}", recording(&[(0, None)]));
        let mut channels = LogChannels::default();

        let err = replay(input.as_bytes(), &AppConfig::default(), &mut channels)
            .await
            .unwrap_err();
        assert!(matches!(err, ReplayError::Parse { line: 3, .. }));
    }
}

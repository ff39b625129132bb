//! PulseVision - Replay Entry Point

use monitor::{format_elapsed, init_logging, replay, AppConfig, LogChannels, ReplayError};
use tokio::fs::File;
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.replay.path = Some(path.into());
    }

    init_logging(&config.logging)?;

    info!("=== PulseVision v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Thresholds: {:?}", config.thresholds);

    let path = config.replay.path.clone().ok_or(ReplayError::NoInput)?;
    info!("Replaying {}", path.display());

    let file = File::open(&path).await.map_err(ReplayError::from)?;
    let mut channels = LogChannels::default();
    let summary = replay(BufReader::new(file), &config, &mut channels).await?;

    info!(
        "Session {}: {} frames ({} evaluated, {} without face, {} rejected)",
        format_elapsed(summary.duration),
        summary.frames,
        summary.evaluated,
        summary.no_face,
        summary.rejected
    );
    info!(
        "Alerts: {} | Blinks: {} | Yawns: {} | Distractions: {} | Head nods: {}",
        summary.alerts, summary.blinks, summary.yawns, summary.distractions, summary.head_nods
    );

    Ok(())
}

//! Alerting System
//!
//! Provides cooldown-based alert arbitration, per-channel gating of presentation
//! side effects, and a deterministic task queue for the timers behind them.

mod arbiter;
mod channels;
mod scheduler;

pub use arbiter::{
    AlertArbiter, AlertConfig, AlertEvent, AlertState, AlertTask, AlertTimerEvent, ArbiterPhase,
};
pub use channels::{AlertChannels, AlertToggles, SilentChannels};
pub use scheduler::{FiredTask, TaskHandle, TaskQueue};

//! Alert Arbiter Implementation

use crate::channels::{AlertChannels, AlertToggles};
use crate::scheduler::{TaskHandle, TaskQueue};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Cooldown after a trigger during which detections emit no event (default: 3000)
    pub cooldown_ms: u64,
    /// Continuous sound repeat period (default: 2500)
    pub repeat_period_ms: u64,
    /// How long a visual alert stays up before hiding itself (default: 3000)
    pub visual_hold_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 3000,
            repeat_period_ms: 2500,
            visual_hold_ms: 3000,
        }
    }
}

impl AlertConfig {
    fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    fn repeat_period(&self) -> Duration {
        Duration::from_millis(self.repeat_period_ms)
    }

    fn visual_hold(&self) -> Duration {
        Duration::from_millis(self.visual_hold_ms)
    }
}

/// Timer tasks owned by the arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTask {
    CooldownExpiry,
    ContinuousRepeat,
    VisualAutoHide,
}

/// Observable outcome of a fired arbiter timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTimerEvent {
    /// Arbiter returned to idle
    CooldownExpired,
    /// Continuous repeat tick; `sounded` is false when sound was switched off
    Repeat { sounded: bool },
    /// Visual overlay hid itself after its hold time
    VisualHidden,
}

/// A raised (not suppressed) alert
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertEvent<R> {
    pub reason: R,
    pub at: Instant,
    /// Trigger count including this alert
    pub trigger_count: u32,
}

/// Arbiter phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArbiterPhase {
    #[default]
    Idle,
    CooldownActive {
        expires_at: Instant,
    },
}

/// State of the arbiter
#[derive(Debug, Clone, Default)]
pub struct AlertState {
    /// Idle or cooling down
    pub phase: ArbiterPhase,
    /// An alert is currently being presented
    pub alert_active: bool,
    /// The visual overlay is showing
    pub visual_active: bool,
    /// Alerts raised since creation or last reset
    pub trigger_count: u32,
    repeat: Option<TaskHandle>,
    visual_hide: Option<TaskHandle>,
    cooldown_task: Option<TaskHandle>,
}

impl AlertState {
    /// Whether the continuous repeat schedule is armed
    pub fn repeat_armed(&self) -> bool {
        self.repeat.is_some()
    }
}

/// Cooldown-based alert arbiter
pub struct AlertArbiter {
    config: AlertConfig,
    state: AlertState,
    timers: TaskQueue<AlertTask>,
}

impl AlertArbiter {
    /// Create a new alert arbiter
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert arbiter with config: {:?}", config);
        Self {
            config,
            state: AlertState::default(),
            timers: TaskQueue::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> &AlertState {
        &self.state
    }

    /// Alerts raised so far
    pub fn trigger_count(&self) -> u32 {
        self.state.trigger_count
    }

    /// Whether new detections are currently suppressed
    pub fn in_cooldown(&self, now: Instant) -> bool {
        matches!(self.state.phase, ArbiterPhase::CooldownActive { expires_at } if now < expires_at)
    }

    /// Earliest pending timer
    pub fn next_timer(&self) -> Option<Instant> {
        self.timers.next_due()
    }

    /// Decide on one frame's verdict. `detection` is `Some(reason)` when fatigue was detected.
    pub fn on_verdict<R, C>(
        &mut self,
        detection: Option<R>,
        now: Instant,
        toggles: AlertToggles,
        channels: &mut C,
    ) -> Option<AlertEvent<R>>
    where
        R: Copy + Debug,
        C: AlertChannels + ?Sized,
    {
        self.expire_cooldown(now);

        let Some(reason) = detection else {
            self.clear(channels);
            return None;
        };

        if self.in_cooldown(now) {
            debug!("Alert suppressed: in cooldown period ({:?})", reason);
            return None;
        }

        Some(self.trigger(reason, now, toggles, channels))
    }

    fn trigger<R, C>(
        &mut self,
        reason: R,
        now: Instant,
        toggles: AlertToggles,
        channels: &mut C,
    ) -> AlertEvent<R>
    where
        R: Copy + Debug,
        C: AlertChannels + ?Sized,
    {
        self.state.trigger_count += 1;
        info!("Alert raised: {:?} (count: {})", reason, self.state.trigger_count);

        if toggles.visual && !self.state.visual_active {
            channels.show_visual();
            self.state.visual_active = true;
            if let Some(handle) = self.state.visual_hide.take() {
                self.timers.cancel(handle);
            }
            self.state.visual_hide = Some(
                self.timers
                    .schedule_once(now + self.config.visual_hold(), AlertTask::VisualAutoHide),
            );
        }

        if toggles.sound && !self.state.alert_active {
            channels.play_sound();
        }

        if toggles.continuous && self.state.repeat.is_none() {
            let period = self.config.repeat_period();
            debug!("Arming continuous alert every {:?}", period);
            self.state.repeat = Some(self.timers.schedule_every(
                now + period,
                period,
                AlertTask::ContinuousRepeat,
            ));
        }

        self.state.alert_active = true;

        let expires_at = now + self.config.cooldown();
        self.state.phase = ArbiterPhase::CooldownActive { expires_at };
        if let Some(handle) = self.state.cooldown_task.take() {
            self.timers.cancel(handle);
        }
        self.state.cooldown_task = Some(
            self.timers
                .schedule_once(expires_at, AlertTask::CooldownExpiry),
        );

        AlertEvent {
            reason,
            at: now,
            trigger_count: self.state.trigger_count,
        }
    }

    fn expire_cooldown(&mut self, now: Instant) {
        if let ArbiterPhase::CooldownActive { expires_at } = self.state.phase {
            if now >= expires_at {
                debug!("Alert cooldown expired");
                self.state.phase = ArbiterPhase::Idle;
                if let Some(handle) = self.state.cooldown_task.take() {
                    self.timers.cancel(handle);
                }
            }
        }
    }

    /// Clear any active presentation. Leaves the cooldown running.
    pub fn clear<C: AlertChannels + ?Sized>(&mut self, channels: &mut C) {
        if self.state.visual_active {
            channels.hide_visual();
        }
        if let Some(handle) = self.state.visual_hide.take() {
            self.timers.cancel(handle);
        }
        if let Some(handle) = self.state.repeat.take() {
            debug!("Continuous alert cancelled");
            self.timers.cancel(handle);
        }
        self.state.visual_active = false;
        self.state.alert_active = false;
    }

    /// Fire due timers against the collaborators
    pub fn poll_timers<C: AlertChannels + ?Sized>(
        &mut self,
        now: Instant,
        toggles: AlertToggles,
        channels: &mut C,
    ) -> Vec<AlertTimerEvent> {
        let mut events = Vec::new();

        for fired in self.timers.poll(now) {
            match fired.kind {
                AlertTask::CooldownExpiry => {
                    self.state.cooldown_task = None;
                    self.expire_cooldown(now);
                    events.push(AlertTimerEvent::CooldownExpired);
                }
                AlertTask::ContinuousRepeat => {
                    if toggles.sound {
                        channels.play_sound();
                    }
                    events.push(AlertTimerEvent::Repeat {
                        sounded: toggles.sound,
                    });
                }
                AlertTask::VisualAutoHide => {
                    // The continuous repeat stays armed until `clear`
                    self.state.visual_hide = None;
                    channels.hide_visual();
                    self.state.visual_active = false;
                    self.state.alert_active = false;
                    events.push(AlertTimerEvent::VisualHidden);
                }
            }
        }

        events
    }

    /// Reset the trigger counter
    pub fn reset_count(&mut self) {
        self.state.trigger_count = 0;
    }
}

impl Default for AlertArbiter {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

//! Presentation collaborators driven by the arbiter

use serde::{Deserialize, Serialize};

/// Output devices an alert is forwarded to (overlay, speaker)
pub trait AlertChannels {
    /// Show the visual alert overlay
    fn show_visual(&mut self);

    /// Hide the visual alert overlay
    fn hide_visual(&mut self);

    /// Play one alert sound pattern
    fn play_sound(&mut self);
}

/// Collaborator that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentChannels;

impl AlertChannels for SilentChannels {
    fn show_visual(&mut self) {}
    fn hide_visual(&mut self) {}
    fn play_sound(&mut self) {}
}

/// Independent on/off switches for each alert channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertToggles {
    pub sound: bool,
    pub continuous: bool,
    pub visual: bool,
}

impl Default for AlertToggles {
    fn default() -> Self {
        Self {
            sound: true,
            continuous: true,
            visual: true,
        }
    }
}

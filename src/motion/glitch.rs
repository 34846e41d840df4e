//! Glitch effect layered on a settled reveal.
//!
//! Idle until armed (the reveal reached its visible pose). Once armed it
//! either bursts on a repeating interval (`auto_play`), glitches while the
//! pointer is over the text (`enable_on_hover`), or both. While glitching a
//! jitter tick re-rolls a small positional offset and skew every
//! `JITTER_INTERVAL_MS`, and two color-shifted ghost copies are shown.

use std::time::Duration;

use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::config::{ConfigError, check_interval};
use super::scheduler::{Scheduler, TimerToken};

pub mod constants {
    pub const JITTER_INTERVAL_MS: u64 = 50;
    pub const PLAY_INTERVAL_MS: f32 = 3000.0;
    pub const GHOST_OFFSET: f32 = 2.0;
    pub const GHOST_OPACITY: f32 = 0.8;
    pub const MAX_SKEW_DEG: f32 = 4.0;
    /// #8B5CF6
    pub const PRIMARY: [f32; 3] = [0.545, 0.361, 0.965];
    /// #F97316
    pub const SECONDARY: [f32; 3] = [0.976, 0.451, 0.086];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GlitchIntensity {
    Low,
    #[default]
    Medium,
    High,
}

impl GlitchIntensity {
    /// Maximum jitter offset in pixels.
    pub fn magnitude(self) -> f32 {
        match self {
            GlitchIntensity::Low => 1.0,
            GlitchIntensity::Medium => 2.0,
            GlitchIntensity::High => 4.0,
        }
    }

    pub fn burst(self) -> Duration {
        match self {
            GlitchIntensity::Low => Duration::from_millis(300),
            GlitchIntensity::Medium => Duration::from_millis(500),
            GlitchIntensity::High => Duration::from_millis(800),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    pub intensity: GlitchIntensity,
    pub auto_play: bool,
    pub enable_on_hover: bool,
    pub play_interval_ms: f32,
    pub primary: [f32; 3],
    pub secondary: [f32; 3],
    pub seed: u64,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            intensity: GlitchIntensity::Medium,
            auto_play: false,
            enable_on_hover: false,
            play_interval_ms: constants::PLAY_INTERVAL_MS,
            primary: constants::PRIMARY,
            secondary: constants::SECONDARY,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlitchPhase {
    Idle,
    /// Armed, waiting for the next burst or hover.
    Waiting,
    Glitching,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostCopy {
    pub offset: Vec2,
    pub color: [f32; 3],
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlitchFrame {
    pub offset: Vec2,
    pub skew_deg: f32,
    pub ghosts: [GhostCopy; 2],
}

enum GlitchTick {
    BurstStart,
    BurstEnd,
    Jitter,
}

pub struct GlitchEffect {
    config: GlitchConfig,
    interval: Duration,
    scheduler: Scheduler<GlitchTick>,
    rng: StdRng,
    armed: bool,
    bursting: bool,
    hovered: bool,
    burst_end: Option<TimerToken>,
    jitter: Option<TimerToken>,
    offset: Vec2,
    skew_deg: f32,
}

impl GlitchEffect {
    pub fn new(config: GlitchConfig) -> Result<Self, ConfigError> {
        let interval = check_interval("play_interval_ms", config.play_interval_ms)?;
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            interval,
            scheduler: Scheduler::new(),
            armed: false,
            bursting: false,
            hovered: false,
            burst_end: None,
            jitter: None,
            offset: Vec2::ZERO,
            skew_deg: 0.0,
        })
    }

    pub fn config(&self) -> &GlitchConfig {
        &self.config
    }

    pub fn phase(&self) -> GlitchPhase {
        match (self.armed, self.is_glitching()) {
            (false, _) => GlitchPhase::Idle,
            (true, true) => GlitchPhase::Glitching,
            (true, false) => GlitchPhase::Waiting,
        }
    }

    pub fn is_glitching(&self) -> bool {
        self.armed && (self.bursting || self.hover_glitch())
    }

    /// Enables the effect once the underlying text is fully visible.
    pub fn arm(&mut self) {
        if self.armed {
            return;
        }
        self.armed = true;
        if self.config.auto_play {
            self.start_burst();
        } else if self.hover_glitch() {
            self.start_jitter();
        }
    }

    /// Drops every pending tick and returns to idle. The pointer state is
    /// kept, so a hovered effect resumes glitching when armed again.
    pub fn disarm(&mut self) {
        self.scheduler.cancel_all();
        self.armed = false;
        self.bursting = false;
        self.burst_end = None;
        self.jitter = None;
    }

    /// Recorded even while idle; the glitch starts on `arm` if the pointer
    /// is still over the text.
    pub fn pointer_enter(&mut self) {
        self.hovered = true;
        if self.armed && self.config.enable_on_hover {
            self.start_jitter();
        }
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = false;
    }

    pub fn advance(&mut self, dt: Duration) {
        let deadline = self.scheduler.deadline(dt);
        while let Some(tick) = self.scheduler.pop_due(deadline) {
            match tick {
                GlitchTick::BurstStart => self.start_burst(),
                GlitchTick::BurstEnd => {
                    self.bursting = false;
                    self.burst_end = None;
                }
                GlitchTick::Jitter => {
                    self.jitter = None;
                    if self.is_glitching() {
                        self.start_jitter();
                    }
                }
            }
        }
        self.scheduler.finish(deadline);
    }

    pub fn frame(&self) -> Option<GlitchFrame> {
        if !self.is_glitching() {
            return None;
        }
        let magnitude = self.config.intensity.magnitude();
        let ghost_shift = constants::GHOST_OFFSET * magnitude / GlitchIntensity::Medium.magnitude();
        Some(GlitchFrame {
            offset: self.offset * magnitude,
            skew_deg: self.skew_deg,
            ghosts: [
                GhostCopy {
                    offset: Vec2::new(-ghost_shift, 0.0),
                    color: self.config.primary,
                    opacity: constants::GHOST_OPACITY,
                },
                GhostCopy {
                    offset: Vec2::new(ghost_shift, 0.0),
                    color: self.config.secondary,
                    opacity: constants::GHOST_OPACITY,
                },
            ],
        })
    }

    fn start_burst(&mut self) {
        if let Some(token) = self.burst_end.take() {
            self.scheduler.cancel(token);
        }
        self.bursting = true;
        self.burst_end = Some(self.scheduler.schedule(self.config.intensity.burst(), GlitchTick::BurstEnd));
        self.scheduler.schedule(self.interval, GlitchTick::BurstStart);
        self.start_jitter();
    }

    fn hover_glitch(&self) -> bool {
        self.config.enable_on_hover && self.hovered
    }

    /// Rolls a fresh offset and skew, and keeps one jitter tick pending.
    fn start_jitter(&mut self) {
        self.offset = Vec2::new(self.rng.gen_range(-1.0..=1.0), self.rng.gen_range(-1.0..=1.0));
        self.skew_deg = self.rng.gen_range(-constants::MAX_SKEW_DEG..=constants::MAX_SKEW_DEG);
        if self.jitter.is_none() {
            let every = Duration::from_millis(constants::JITTER_INTERVAL_MS);
            self.jitter = Some(self.scheduler.schedule(every, GlitchTick::Jitter));
        }
    }
}

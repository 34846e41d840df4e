//! Highlight band sweeping across a settled reveal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::{ConfigError, check_finite, check_interval};
use super::scheduler::Scheduler;

pub mod constants {
    pub const PERIOD_MS: f32 = 3000.0;
    pub const BAND_WIDTH: f32 = 1.0;
    pub const COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.8];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShimmerDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl ShimmerDirection {
    pub fn axis(self) -> Axis {
        match self {
            ShimmerDirection::LeftToRight | ShimmerDirection::RightToLeft => Axis::Horizontal,
            ShimmerDirection::TopToBottom | ShimmerDirection::BottomToTop => Axis::Vertical,
        }
    }

    fn reversed(self) -> bool {
        matches!(self, ShimmerDirection::RightToLeft | ShimmerDirection::BottomToTop)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShimmerConfig {
    pub direction: ShimmerDirection,
    pub period_ms: f32,
    /// Band size as a fraction of the text extent along the sweep axis.
    pub band_width: f32,
    pub color: [f32; 4],
    /// Sweep continuously once armed.
    pub auto_play: bool,
    /// One pass per pointer entry.
    pub play_on_hover: bool,
}

impl Default for ShimmerConfig {
    fn default() -> Self {
        Self {
            direction: ShimmerDirection::LeftToRight,
            period_ms: constants::PERIOD_MS,
            band_width: constants::BAND_WIDTH,
            color: constants::COLOR,
            auto_play: true,
            play_on_hover: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimmerPhase {
    Idle,
    Waiting,
    Sweeping,
}

/// Band extent along the sweep axis, normalized to the text (0 = leading
/// edge, 1 = trailing edge). Parts outside [0, 1] are clipped by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShimmerFrame {
    pub axis: Axis,
    pub band_start: f32,
    pub band_end: f32,
    pub color: [f32; 4],
}

enum ShimmerTick {
    PassEnd,
}

pub struct ShimmerEffect {
    config: ShimmerConfig,
    period: Duration,
    scheduler: Scheduler<ShimmerTick>,
    armed: bool,
    hovered: bool,
    sweeping: bool,
    pass_started: Duration,
    passes: u32,
}

impl ShimmerEffect {
    pub fn new(config: ShimmerConfig) -> Result<Self, ConfigError> {
        let period = check_interval("period_ms", config.period_ms)?;
        let band_width = check_finite("band_width", config.band_width)?;
        if !(band_width > 0.0 && band_width <= 1.0) {
            return Err(ConfigError::BandWidthOutOfRange(band_width));
        }
        Ok(Self {
            config,
            period,
            scheduler: Scheduler::new(),
            armed: false,
            hovered: false,
            sweeping: false,
            pass_started: Duration::ZERO,
            passes: 0,
        })
    }

    pub fn config(&self) -> &ShimmerConfig {
        &self.config
    }

    pub fn phase(&self) -> ShimmerPhase {
        match (self.armed, self.sweeping) {
            (false, _) => ShimmerPhase::Idle,
            (true, true) => ShimmerPhase::Sweeping,
            (true, false) => ShimmerPhase::Waiting,
        }
    }

    /// Completed passes since construction.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn arm(&mut self) {
        if self.armed {
            return;
        }
        self.armed = true;
        if self.config.auto_play || (self.config.play_on_hover && self.hovered) {
            self.start_pass();
        }
    }

    pub fn disarm(&mut self) {
        self.scheduler.cancel_all();
        self.armed = false;
        self.sweeping = false;
    }

    pub fn pointer_enter(&mut self) {
        self.hovered = true;
        if self.armed && self.config.play_on_hover && !self.sweeping {
            self.start_pass();
        }
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = false;
        if self.config.play_on_hover && !self.config.auto_play {
            self.scheduler.cancel_all();
            self.sweeping = false;
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        let deadline = self.scheduler.deadline(dt);
        while let Some(ShimmerTick::PassEnd) = self.scheduler.pop_due(deadline) {
            self.passes += 1;
            if self.config.auto_play {
                self.start_pass();
            } else {
                self.sweeping = false;
            }
        }
        self.scheduler.finish(deadline);
    }

    pub fn frame(&self) -> Option<ShimmerFrame> {
        if !self.armed || !self.sweeping {
            return None;
        }
        let into = self.scheduler.now().saturating_sub(self.pass_started);
        let t = (into.as_secs_f32() / self.period.as_secs_f32()).clamp(0.0, 1.0);
        let width = self.config.band_width;
        let (from, to) = if self.config.direction.reversed() { (1.0, -width) } else { (-width, 1.0) };
        let band_start = from + (to - from) * t;
        Some(ShimmerFrame {
            axis: self.config.direction.axis(),
            band_start,
            band_end: band_start + width,
            color: self.config.color,
        })
    }

    fn start_pass(&mut self) {
        self.sweeping = true;
        self.pass_started = self.scheduler.now();
        self.scheduler.schedule(self.period, ShimmerTick::PassEnd);
    }
}

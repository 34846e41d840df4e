//! Reveal configuration, presets and validation.
//!
//! Durations are written in milliseconds (the unit scenes are authored in)
//! and validated into `Duration`s once, at construction. Nothing downstream
//! re-checks them.

use std::time::Duration;

use bevy::math::curve::{Curve, EaseFunction};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use super::split::SplitUnit;

pub mod constants {
    pub const SPLIT_DURATION_MS: f32 = 500.0;
    pub const SPLIT_STAGGER_MS: f32 = 50.0;
    pub const SPLIT_OFFSET: f32 = 20.0;
    pub const SPLIT_SCALE: f32 = 0.8;
    pub const SPLIT_ROTATION_DEG: f32 = -90.0;
    pub const BLUR_DURATION_MS: f32 = 800.0;
    pub const BLUR_OFFSET: f32 = 20.0;
    pub const BLUR_RADIUS: f32 = 10.0;
    pub const VIEWPORT_THRESHOLD: f32 = 0.3;
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("`{field}` must not be negative (got {value} ms)")]
    NegativeDuration { field: &'static str, value: f32 },
    #[error("`{field}` must be greater than zero (got {value} ms)")]
    NonPositiveInterval { field: &'static str, value: f32 },
    #[error("`{field}` must be a finite number")]
    NonFinite { field: &'static str },
    #[error("viewport threshold must be within (0, 1] (got {0})")]
    ThresholdOutOfRange(f32),
    #[error("shimmer band width must be within (0, 1] (got {0})")]
    BandWidthOutOfRange(f32),
    #[error("typewriter needs at least one candidate string")]
    EmptyCandidates,
}

/// Viewport thresholds are area fractions in (0, 1]; zero would fire for
/// elements that are not on screen at all.
pub fn is_valid_threshold(threshold: f32) -> bool {
    threshold > 0.0 && threshold <= 1.0
}

pub(crate) fn check_finite(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

/// Non-negative millisecond value into a `Duration` (microsecond precision).
pub(crate) fn check_duration(field: &'static str, ms: f32) -> Result<Duration, ConfigError> {
    let ms = check_finite(field, ms)?;
    if ms < 0.0 {
        return Err(ConfigError::NegativeDuration { field, value: ms });
    }
    Ok(Duration::from_micros((ms as f64 * 1000.0).round() as u64))
}

/// Like `check_duration`, but zero is rejected too. Used for repeating timers.
pub(crate) fn check_interval(field: &'static str, ms: f32) -> Result<Duration, ConfigError> {
    let duration = check_duration(field, ms)?;
    if duration.is_zero() {
        return Err(ConfigError::NonPositiveInterval { field, value: ms });
    }
    Ok(duration)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Trigger {
    OnMount,
    #[default]
    OnViewportEnter,
    OnHover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReplayPolicy {
    #[default]
    Once,
    EveryTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    /// Closest match to CSS `ease`.
    #[default]
    CubicOut,
    CubicInOut,
    /// Overshoots slightly before settling, like a light spring.
    BackOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let function = match self {
            Easing::Linear => EaseFunction::Linear,
            Easing::CubicOut => EaseFunction::CubicOut,
            Easing::CubicInOut => EaseFunction::CubicInOut,
            Easing::BackOut => EaseFunction::BackOut,
        };
        function.sample_clamped(t)
    }
}

/// Per-instance reveal settings. Construct through a preset and adjust with
/// the `with_*` methods, or deserialize from a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub text: String,
    pub unit: SplitUnit,
    pub delay_ms: f32,
    pub stagger_ms: f32,
    /// Transition length of a single unit.
    pub duration_ms: f32,
    pub direction: Direction,
    pub distance: f32,
    pub blur: f32,
    pub scale: f32,
    pub rotation_deg: f32,
    pub easing: Easing,
    pub trigger: Trigger,
    pub replay: ReplayPolicy,
    /// Fraction of the element's area that must be on screen.
    pub viewport_threshold: f32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self::split("")
    }
}

impl RevealConfig {
    /// Per-character pop-in: rises from below while scaling and unfolding.
    pub fn split(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            unit: SplitUnit::Char,
            delay_ms: 0.0,
            stagger_ms: constants::SPLIT_STAGGER_MS,
            duration_ms: constants::SPLIT_DURATION_MS,
            direction: Direction::Bottom,
            distance: constants::SPLIT_OFFSET,
            blur: 0.0,
            scale: constants::SPLIT_SCALE,
            rotation_deg: constants::SPLIT_ROTATION_DEG,
            easing: Easing::BackOut,
            trigger: Trigger::OnViewportEnter,
            replay: ReplayPolicy::Once,
            viewport_threshold: constants::VIEWPORT_THRESHOLD,
        }
    }

    /// Whole-text fade out of blur, sliding in from `direction`.
    pub fn blur(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            unit: SplitUnit::Line,
            delay_ms: 0.0,
            stagger_ms: 0.0,
            duration_ms: constants::BLUR_DURATION_MS,
            direction: Direction::Top,
            distance: constants::BLUR_OFFSET,
            blur: constants::BLUR_RADIUS,
            scale: 1.0,
            rotation_deg: 0.0,
            easing: Easing::CubicOut,
            trigger: Trigger::OnViewportEnter,
            replay: ReplayPolicy::Once,
            viewport_threshold: constants::VIEWPORT_THRESHOLD,
        }
    }

    pub fn with_unit(mut self, unit: SplitUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_timing(mut self, delay_ms: f32, stagger_ms: f32, duration_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self.stagger_ms = stagger_ms;
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_direction(mut self, direction: Direction, distance: f32) -> Self {
        self.direction = direction;
        self.distance = distance;
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger, replay: ReplayPolicy) -> Self {
        self.trigger = trigger;
        self.replay = replay;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_viewport_threshold(mut self, threshold: f32) -> Self {
        self.viewport_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<RevealTiming, ConfigError> {
        check_finite("distance", self.distance)?;
        check_finite("blur", self.blur)?;
        check_finite("scale", self.scale)?;
        check_finite("rotation_deg", self.rotation_deg)?;
        let threshold = check_finite("viewport_threshold", self.viewport_threshold)?;
        if !is_valid_threshold(threshold) {
            return Err(ConfigError::ThresholdOutOfRange(threshold));
        }

        Ok(RevealTiming {
            delay: check_duration("delay_ms", self.delay_ms)?,
            stagger: check_duration("stagger_ms", self.stagger_ms)?,
            duration: check_duration("duration_ms", self.duration_ms)?,
        })
    }
}

/// Validated timing of a reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTiming {
    pub delay: Duration,
    pub stagger: Duration,
    pub duration: Duration,
}

impl RevealTiming {
    /// `delay + index * stagger`, measured from activation.
    pub fn unit_start(&self, index: usize) -> Duration {
        self.delay + self.stagger * index as u32
    }

    /// When the last of `unit_count` units reaches its visible pose.
    pub fn total(&self, unit_count: usize) -> Duration {
        match unit_count {
            0 => Duration::ZERO,
            n => self.unit_start(n - 1) + self.duration,
        }
    }
}

//! Host-agnostic text animation engine.
//!
//! Nothing in here touches the ECS: every machine is advanced explicitly with
//! a `Duration` and reads visibility through the `ViewportWatcher` capability.
//! `crate::animator` drives these from Bevy's frame loop.

pub mod config;
pub mod glitch;
pub mod pose;
pub mod reveal;
pub mod scheduler;
pub mod shimmer;
pub mod split;
pub mod typewriter;
pub mod viewport;

pub use config::{ConfigError, Direction, Easing, ReplayPolicy, RevealConfig, SplitUnit, Trigger};
pub use glitch::{GlitchConfig, GlitchEffect, GlitchIntensity};
pub use reveal::{RevealAnimator, RevealPhase, TriggerEvent};
pub use shimmer::{ShimmerConfig, ShimmerDirection, ShimmerEffect};
pub use typewriter::{Typewriter, TypewriterConfig};
pub use viewport::{IntersectionTracker, ViewportWatcher, WatchId};

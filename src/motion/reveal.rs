//! Unit-by-unit reveal of a text from its hidden pose to its visible pose.
//!
//! One `RevealAnimator` per mounted text. The unit list is computed once at
//! construction and never reordered. Every activation cancels whatever the
//! previous one left on the scheduler, so a stale completion can't fire.

use std::time::Duration;

use super::config::{ConfigError, ReplayPolicy, RevealConfig, RevealTiming, Trigger};
use super::pose::Pose;
use super::scheduler::Scheduler;
use super::split::{self, TextUnit};
use super::viewport::{ViewportWatcher, WatchId};

pub type CompletionCallback = Box<dyn FnMut() + Send + Sync>;

/// Host events that may start or reset a reveal. Only those matching the
/// configured `Trigger` have any effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    ViewportChanged(bool),
    PointerEnter,
    PointerLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Hidden,
    Active,
    Settled,
}

enum RevealTick {
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitFrame<'a> {
    pub index: usize,
    pub content: &'a str,
    /// Eased progress; may briefly exceed 1 with overshooting curves.
    pub progress: f32,
    pub pose: Pose,
}

pub struct RevealAnimator {
    config: RevealConfig,
    timing: RevealTiming,
    units: Vec<TextUnit>,
    hidden: Pose,
    phase: RevealPhase,
    elapsed: Duration,
    mounted: bool,
    activations: u32,
    completions: u32,
    scheduler: Scheduler<RevealTick>,
    on_complete: Option<CompletionCallback>,
}

impl RevealAnimator {
    pub fn new(config: RevealConfig) -> Result<Self, ConfigError> {
        let timing = config.validate()?;
        let units = split::split(&config.text, config.unit);
        let hidden = Pose::hidden(&config);
        Ok(Self {
            config,
            timing,
            units,
            hidden,
            phase: RevealPhase::Hidden,
            elapsed: Duration::ZERO,
            mounted: false,
            activations: 0,
            completions: 0,
            scheduler: Scheduler::new(),
            on_complete: None,
        })
    }

    /// Called once after the last unit settles, once per activation.
    pub fn with_on_complete(mut self, callback: impl FnMut() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Registers the trigger watcher. `OnMount` reveals activate here, so the
    /// return value reports a completion for empty texts. A `Once` reveal
    /// that already completed stays settled.
    pub fn mount(&mut self, watcher: &mut dyn ViewportWatcher, id: WatchId) -> bool {
        self.teardown();
        self.mounted = true;
        if self.spent() {
            return false;
        }
        match self.config.trigger {
            Trigger::OnMount => self.try_activate(),
            Trigger::OnViewportEnter => {
                watcher.observe(id, self.config.viewport_threshold);
                false
            }
            Trigger::OnHover => false,
        }
    }

    /// Stops timers and the viewport observer. The animator can be mounted again.
    pub fn unmount(&mut self, watcher: &mut dyn ViewportWatcher, id: WatchId) {
        if self.config.trigger == Trigger::OnViewportEnter {
            watcher.unobserve(id);
        }
        self.teardown();
        self.mounted = false;
    }

    /// Returns true when this event completed the reveal (empty text).
    pub fn handle_event(&mut self, event: TriggerEvent) -> bool {
        if !self.mounted {
            return false;
        }
        let replays = self.config.replay == ReplayPolicy::EveryTrigger;
        match (self.config.trigger, event) {
            (Trigger::OnViewportEnter, TriggerEvent::ViewportChanged(true))
            | (Trigger::OnHover, TriggerEvent::PointerEnter) => self.try_activate(),
            (Trigger::OnViewportEnter, TriggerEvent::ViewportChanged(false))
            | (Trigger::OnHover, TriggerEvent::PointerLeave)
                if replays =>
            {
                self.teardown();
                false
            }
            _ => false,
        }
    }

    /// Moves the reveal clock forward. Returns true on the call that
    /// completes the current activation.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.phase == RevealPhase::Active {
            self.elapsed += dt;
        }
        let deadline = self.scheduler.deadline(dt);
        let mut completed = false;
        while let Some(tick) = self.scheduler.pop_due(deadline) {
            match tick {
                RevealTick::Complete => {
                    self.settle();
                    completed = true;
                }
            }
        }
        self.scheduler.finish(deadline);
        completed
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub fn units(&self) -> &[TextUnit] {
        &self.units
    }

    pub fn activations(&self) -> u32 {
        self.activations
    }

    pub fn completions(&self) -> u32 {
        self.completions
    }

    pub fn unit_start(&self, index: usize) -> Duration {
        self.timing.unit_start(index)
    }

    /// Time from activation until the completion callback fires.
    pub fn total_duration(&self) -> Duration {
        self.timing.total(self.units.len())
    }

    pub fn unit_frames(&self) -> impl Iterator<Item = UnitFrame<'_>> + '_ {
        self.units.iter().map(move |unit| self.frame_for(unit))
    }

    pub fn unit_frame(&self, index: usize) -> Option<UnitFrame<'_>> {
        self.units.get(index).map(|unit| self.frame_for(unit))
    }

    /// Whether unit `index` has started its transition.
    pub fn is_unit_visible(&self, index: usize) -> bool {
        self.raw_progress(index) > 0.0
            || (self.phase == RevealPhase::Active && self.elapsed >= self.unit_start(index))
    }

    fn frame_for<'a>(&'a self, unit: &'a TextUnit) -> UnitFrame<'a> {
        let (progress, pose) = match self.raw_progress(unit.index) {
            p if p <= 0.0 => (0.0, self.hidden),
            p if p >= 1.0 => (1.0, Pose::VISIBLE),
            p => {
                let eased = self.config.easing.apply(p);
                (eased, self.hidden.lerp(&Pose::VISIBLE, eased))
            }
        };
        UnitFrame {
            index: unit.index,
            content: &unit.content,
            progress,
            pose,
        }
    }

    fn raw_progress(&self, index: usize) -> f32 {
        match self.phase {
            RevealPhase::Hidden => 0.0,
            RevealPhase::Settled => 1.0,
            RevealPhase::Active => {
                let start = self.unit_start(index);
                if self.elapsed < start {
                    return 0.0;
                }
                let into = self.elapsed - start;
                if self.timing.duration.is_zero() {
                    return 1.0;
                }
                (into.as_secs_f32() / self.timing.duration.as_secs_f32()).min(1.0)
            }
        }
    }

    /// A `Once` reveal ignores every trigger after its first completion.
    fn spent(&self) -> bool {
        self.config.replay == ReplayPolicy::Once && self.completions > 0
    }

    fn try_activate(&mut self) -> bool {
        let policy_allows = match self.config.replay {
            ReplayPolicy::Once => !self.spent() && self.phase == RevealPhase::Hidden,
            ReplayPolicy::EveryTrigger => true,
        };
        if !policy_allows {
            return false;
        }

        self.teardown();
        self.activations += 1;
        if self.units.is_empty() {
            self.settle();
            return true;
        }
        self.phase = RevealPhase::Active;
        self.scheduler.schedule(self.total_duration(), RevealTick::Complete);
        false
    }

    fn settle(&mut self) {
        self.phase = RevealPhase::Settled;
        self.completions += 1;
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
    }

    fn teardown(&mut self) {
        self.scheduler.cancel_all();
        if self.spent() {
            return;
        }
        self.phase = RevealPhase::Hidden;
        self.elapsed = Duration::ZERO;
    }
}

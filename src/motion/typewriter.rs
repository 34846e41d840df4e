//! Typewriter cycling through candidate strings.
//!
//! Each string is typed one code point per `type_speed`, held for `pause`,
//! deleted one code point per `delete_speed`, then the next string starts.
//! With `looping` off the machine stops once the last string is fully typed
//! (the text stays on screen) and fires completion.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::{ConfigError, check_duration, check_interval};
use super::reveal::CompletionCallback;
use super::scheduler::Scheduler;

pub mod constants {
    pub const TYPE_SPEED_MS: f32 = 100.0;
    pub const DELETE_SPEED_MS: f32 = 50.0;
    pub const PAUSE_MS: f32 = 1000.0;
    pub const CURSOR_BLINK_MS: u64 = 500;
    pub const CURSOR_CHAR: char = '|';
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub texts: Vec<String>,
    pub type_speed_ms: f32,
    pub delete_speed_ms: f32,
    pub pause_ms: f32,
    pub start_delay_ms: f32,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub show_cursor: bool,
    pub cursor_char: char,
    pub cursor_blink: bool,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            texts: Vec::new(),
            type_speed_ms: constants::TYPE_SPEED_MS,
            delete_speed_ms: constants::DELETE_SPEED_MS,
            pause_ms: constants::PAUSE_MS,
            start_delay_ms: 0.0,
            looping: true,
            show_cursor: true,
            cursor_char: constants::CURSOR_CHAR,
            cursor_blink: true,
        }
    }
}

impl TypewriterConfig {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypewriterPhase {
    Idle,
    Typing,
    Holding,
    Deleting,
    Finished,
}

enum TypeTick {
    Step,
    HoldEnd,
    CursorBlink,
}

struct Speeds {
    typing: Duration,
    deleting: Duration,
    pause: Duration,
    start_delay: Duration,
}

pub struct Typewriter {
    config: TypewriterConfig,
    speeds: Speeds,
    scheduler: Scheduler<TypeTick>,
    phase: TypewriterPhase,
    text_index: usize,
    typed: usize,
    display: String,
    cursor_on: bool,
    on_complete: Option<CompletionCallback>,
}

impl Typewriter {
    pub fn new(config: TypewriterConfig) -> Result<Self, ConfigError> {
        if config.texts.is_empty() {
            return Err(ConfigError::EmptyCandidates);
        }
        let speeds = Speeds {
            typing: check_interval("type_speed_ms", config.type_speed_ms)?,
            deleting: check_interval("delete_speed_ms", config.delete_speed_ms)?,
            pause: check_duration("pause_ms", config.pause_ms)?,
            start_delay: check_duration("start_delay_ms", config.start_delay_ms)?,
        };
        Ok(Self {
            config,
            speeds,
            scheduler: Scheduler::new(),
            phase: TypewriterPhase::Idle,
            text_index: 0,
            typed: 0,
            display: String::new(),
            cursor_on: true,
            on_complete: None,
        })
    }

    pub fn with_on_complete(mut self, callback: impl FnMut() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Starts (or restarts) from the first string.
    pub fn start(&mut self) {
        self.stop();
        self.phase = TypewriterPhase::Typing;
        self.scheduler.schedule(self.speeds.start_delay, TypeTick::Step);
        if self.config.show_cursor && self.config.cursor_blink {
            self.scheduler
                .schedule(Duration::from_millis(constants::CURSOR_BLINK_MS), TypeTick::CursorBlink);
        }
    }

    /// Cancels every pending tick and clears the text.
    pub fn stop(&mut self) {
        self.scheduler.cancel_all();
        self.phase = TypewriterPhase::Idle;
        self.text_index = 0;
        self.typed = 0;
        self.display.clear();
        self.cursor_on = true;
    }

    /// Returns true on the call that finishes a non-looping run.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let deadline = self.scheduler.deadline(dt);
        let mut finished = false;
        while let Some(tick) = self.scheduler.pop_due(deadline) {
            match tick {
                TypeTick::Step => finished |= self.step(),
                TypeTick::HoldEnd => {
                    self.phase = TypewriterPhase::Deleting;
                    self.scheduler.schedule(self.speeds.deleting, TypeTick::Step);
                }
                TypeTick::CursorBlink => {
                    self.cursor_on = !self.cursor_on;
                    self.scheduler
                        .schedule(Duration::from_millis(constants::CURSOR_BLINK_MS), TypeTick::CursorBlink);
                }
            }
        }
        self.scheduler.finish(deadline);
        finished
    }

    pub fn phase(&self) -> TypewriterPhase {
        self.phase
    }

    pub fn text_index(&self) -> usize {
        self.text_index
    }

    pub fn display_text(&self) -> &str {
        &self.display
    }

    /// Cursor glyph when it should currently be drawn.
    pub fn cursor(&self) -> Option<char> {
        (self.config.show_cursor && self.cursor_on).then_some(self.config.cursor_char)
    }

    fn current(&self) -> &str {
        &self.config.texts[self.text_index]
    }

    fn step(&mut self) -> bool {
        match self.phase {
            TypewriterPhase::Typing => {
                if self.typed < self.current().chars().count() {
                    self.typed += 1;
                    self.refresh_display();
                }
                if self.typed < self.current().chars().count() {
                    self.scheduler.schedule(self.speeds.typing, TypeTick::Step);
                } else {
                    return self.finish_string();
                }
            }
            TypewriterPhase::Deleting => {
                self.typed = self.typed.saturating_sub(1);
                self.refresh_display();
                if self.typed == 0 {
                    self.text_index = (self.text_index + 1) % self.config.texts.len();
                    self.phase = TypewriterPhase::Typing;
                    self.scheduler.schedule(self.speeds.typing, TypeTick::Step);
                } else {
                    self.scheduler.schedule(self.speeds.deleting, TypeTick::Step);
                }
            }
            TypewriterPhase::Idle | TypewriterPhase::Holding | TypewriterPhase::Finished => {}
        }
        false
    }

    /// The last character is on screen: hold it, or stop on the final string
    /// of a non-looping run.
    fn finish_string(&mut self) -> bool {
        if !self.config.looping && self.text_index + 1 == self.config.texts.len() {
            self.phase = TypewriterPhase::Finished;
            if let Some(callback) = self.on_complete.as_mut() {
                callback();
            }
            return true;
        }
        self.phase = TypewriterPhase::Holding;
        self.scheduler.schedule(self.speeds.pause, TypeTick::HoldEnd);
        false
    }

    fn refresh_display(&mut self) {
        self.display = self.current().chars().take(self.typed).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn config(texts: &[&str]) -> TypewriterConfig {
        TypewriterConfig {
            type_speed_ms: 100.0,
            delete_speed_ms: 50.0,
            pause_ms: 1000.0,
            cursor_blink: false,
            ..TypewriterConfig::new(texts.iter().copied())
        }
    }

    #[test]
    fn types_holds_deletes_and_advances() {
        let mut writer = Typewriter::new(config(&["Hi", "Yo"])).unwrap();
        writer.start();

        writer.advance(ms(0));
        assert_eq!(writer.display_text(), "H");
        writer.advance(ms(100));
        assert_eq!(writer.display_text(), "Hi");
        assert_eq!(writer.phase(), TypewriterPhase::Holding);

        writer.advance(ms(999));
        assert_eq!(writer.phase(), TypewriterPhase::Holding);
        writer.advance(ms(1));
        assert_eq!(writer.phase(), TypewriterPhase::Deleting);
        assert_eq!(writer.display_text(), "Hi");
        writer.advance(ms(50));
        assert_eq!(writer.display_text(), "H");
        writer.advance(ms(50));
        assert_eq!(writer.display_text(), "");
        assert_eq!(writer.text_index(), 1);
        assert_eq!(writer.phase(), TypewriterPhase::Typing);
        writer.advance(ms(100));
        assert_eq!(writer.display_text(), "Y");
    }

    #[test]
    fn non_looping_run_finishes_on_last_string() {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        let mut writer = Typewriter::new(TypewriterConfig { looping: false, ..config(&["ab", "Ок"]) })
            .unwrap()
            .with_on_complete(move || {
                inner.fetch_add(1, Ordering::SeqCst);
            });
        writer.start();

        let mut finished_calls = 0;
        for _ in 0..200 {
            if writer.advance(ms(25)) {
                finished_calls += 1;
            }
        }

        assert_eq!(finished_calls, 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(writer.phase(), TypewriterPhase::Finished);
        assert_eq!(writer.display_text(), "Ок");
    }

    #[test]
    fn hold_starts_with_the_last_character() {
        let mut writer = Typewriter::new(config(&["abc", "d"])).unwrap();
        writer.start();
        writer.advance(ms(200));
        assert_eq!(writer.display_text(), "abc");
        assert_eq!(writer.phase(), TypewriterPhase::Holding);

        writer.advance(ms(999));
        assert_eq!(writer.display_text(), "abc");
        writer.advance(ms(51));
        assert_eq!(writer.display_text(), "ab");
    }

    #[test]
    fn looping_wraps_to_first_string() {
        let mut writer = Typewriter::new(config(&["a"])).unwrap();
        writer.start();
        writer.advance(ms(10_000));

        assert_eq!(writer.text_index(), 0);
        assert_ne!(writer.phase(), TypewriterPhase::Finished);
    }

    #[test]
    fn start_delay_and_cursor_blink() {
        let mut writer = Typewriter::new(TypewriterConfig {
            start_delay_ms: 300.0,
            cursor_blink: true,
            ..config(&["x"])
        })
        .unwrap();
        writer.start();

        writer.advance(ms(299));
        assert_eq!(writer.display_text(), "");
        assert_eq!(writer.cursor(), Some('|'));
        writer.advance(ms(1));
        assert_eq!(writer.display_text(), "x");
        writer.advance(ms(200));
        assert_eq!(writer.cursor(), None);
    }

    #[test]
    fn stop_clears_pending_ticks() {
        let mut writer = Typewriter::new(config(&["abc"])).unwrap();
        writer.start();
        writer.advance(ms(0));
        writer.stop();
        writer.advance(ms(5_000));

        assert_eq!(writer.phase(), TypewriterPhase::Idle);
        assert_eq!(writer.display_text(), "");
    }

    #[test]
    fn empty_candidates_and_zero_speed_rejected() {
        assert!(matches!(Typewriter::new(TypewriterConfig::default()), Err(ConfigError::EmptyCandidates)));
        let zero = TypewriterConfig { type_speed_ms: 0.0, ..config(&["a"]) };
        assert!(matches!(Typewriter::new(zero), Err(ConfigError::NonPositiveInterval { .. })));
    }
}

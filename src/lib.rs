//! FitCoach motion: reveal-style text animation and the app's client-side
//! state store, hosted in Bevy.
//!
//! `motion` and `store` are usable without a running app; the plugins wire
//! them into the frame loop and the egui dashboard.

pub mod animator;
pub mod input;
pub mod motion;
pub mod persistence;
pub mod scene;
pub mod settings;
pub mod store;
pub mod ui;

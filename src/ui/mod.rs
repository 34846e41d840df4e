//! UI systems using bevy_egui.
//!
//! A dashboard side panel over the landing scene. Widgets read `AppStore`
//! and emit `StoreAction`s rather than mutating state in place.

mod dashboard;
mod search;
mod theme;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

pub use search::{Product, SearchPanel};

pub struct UiPlugin;
impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<SearchPanel>()
            .add_systems(Startup, theme::ThemeSync::install)
            .add_systems(EguiPrimaryContextPass, (
                theme::ThemeSync::apply,
                dashboard::dashboard_panel,
            ).chain())
            ;
    }
}

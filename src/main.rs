//! FitCoach landing page with animated headlines and a nutrition dashboard.
//!
//! Built with Bevy 0.18 and bevy_egui.

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use fitcoach_motion::{animator, input, scene, settings, store, ui};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "FitCoach".into(),
                    resolution: (1280, 720).into(),
                    ..default()
                }),
                ..default()
            })
            // Disable asset meta files as WASM version requests them and fails when they are not found.
            .set(AssetPlugin {
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        .add_plugins(EguiPlugin::default())
        .add_plugins((
            settings::SettingsPlugin,
            store::StorePlugin,
            animator::AnimatorPlugin,
            input::InputPlugin,
            scene::ScenePlugin,
            ui::UiPlugin,
        ))
        .run();
}

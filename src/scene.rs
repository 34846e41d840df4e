//! Landing scene: a hero headline that reveals on load, a typewriter
//! tagline, and feature headings that reveal as they scroll into view.

use bevy::prelude::*;

use crate::animator::{RevealSpawn, TypewriterSpawn};
use crate::motion::{
    Direction, Easing, GlitchConfig, ReplayPolicy, RevealConfig, ShimmerConfig, SplitUnit, Trigger, TypewriterConfig,
};
use crate::settings::AppConfig;

pub struct ScenePlugin;
impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app
            .add_systems(Startup, (spawn_camera, spawn_landing).chain())
            ;
    }
}

const LEFT_EDGE: f32 = -560.0;
const ACCENT: Color = Color::srgb(0.545, 0.361, 0.965);
const MUTED: Color = Color::srgb(0.78, 0.80, 0.86);

const TAGLINES: &[&str] = &["Scan your plate", "Track your macros", "Ask the AI coach"];

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn spawn_landing(mut commands: Commands, settings: Res<AppConfig>) {
    let threshold = settings.viewport_threshold;

    // Above the fold
    commands.trigger(
        RevealSpawn::new(
            RevealConfig::split("Eat smarter with AI")
                .with_trigger(Trigger::OnMount, ReplayPolicy::Once),
            Vec2::new(LEFT_EDGE, 320.0),
        )
        .with_font_size(64.0),
    );
    commands.trigger(
        RevealSpawn::new(
            RevealConfig::blur("Snap a photo of your meal.\nGet calories and macros in seconds.")
                .with_timing(600.0, 150.0, 800.0)
                .with_trigger(Trigger::OnMount, ReplayPolicy::Once),
            Vec2::new(LEFT_EDGE, 220.0),
        )
        .with_font_size(24.0)
        .with_color(MUTED),
    );
    commands.trigger(TypewriterSpawn {
        config: TypewriterConfig {
            start_delay_ms: 1_500.0,
            ..TypewriterConfig::new(TAGLINES.iter().copied())
        },
        position: Vec2::new(LEFT_EDGE, 110.0),
        font_size: 32.0,
        color: ACCENT,
    });

    // Below the fold
    commands.trigger(
        RevealSpawn::new(
            RevealConfig::split("AI Vision")
                .with_easing(Easing::BackOut)
                .with_viewport_threshold(threshold),
            Vec2::new(LEFT_EDGE, -180.0),
        )
        .with_glitch(GlitchConfig { enable_on_hover: true, ..default() }),
    );
    commands.trigger(
        RevealSpawn::new(
            RevealConfig::split("Nutrition Database")
                .with_unit(SplitUnit::Word)
                .with_direction(Direction::Left, 40.0)
                .with_viewport_threshold(threshold),
            Vec2::new(LEFT_EDGE, -380.0),
        )
        .with_shimmer(ShimmerConfig::default()),
    );
    commands.trigger(
        RevealSpawn::new(
            RevealConfig::blur("Coaching that adapts\nto every meal you log")
                .with_trigger(Trigger::OnViewportEnter, ReplayPolicy::EveryTrigger)
                .with_viewport_threshold(threshold),
            Vec2::new(LEFT_EDGE, -580.0),
        )
        .with_font_size(36.0),
    );
    commands.trigger(
        RevealSpawn::new(
            RevealConfig::split("Hover to see your streak")
                .with_unit(SplitUnit::Word)
                .with_direction(Direction::Top, 20.0)
                .with_trigger(Trigger::OnHover, ReplayPolicy::EveryTrigger),
            Vec2::new(LEFT_EDGE, -820.0),
        )
        .with_font_size(28.0)
        .with_color(ACCENT)
        .with_glitch(GlitchConfig { auto_play: true, ..default() }),
    );
}

//! Scrolls the landing scene with the keyboard and mouse wheel.
//!
//! Moving the camera is what brings viewport-triggered reveals into view.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app
            .add_systems(Update, scroll_camera)
            ;
    }
}

const LINE_STEP: f32 = 40.0;
const PAGE_STEP: f32 = 560.0;
const WHEEL_PIXEL_SCALE: f32 = 1.0;
/// Camera y range covering the whole scene.
const SCROLL_TOP: f32 = 0.0;
const SCROLL_BOTTOM: f32 = -800.0;

fn scroll_delta(keyboard: &ButtonInput<KeyCode>) -> f32 {
    let mut delta = 0.0;
    if keyboard.pressed(KeyCode::ArrowDown) {
        delta -= LINE_STEP;
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        delta += LINE_STEP;
    }
    if keyboard.just_pressed(KeyCode::PageDown) {
        delta -= PAGE_STEP;
    }
    if keyboard.just_pressed(KeyCode::PageUp) {
        delta += PAGE_STEP;
    }
    delta
}

fn clamp_scroll(y: f32) -> f32 {
    y.clamp(SCROLL_BOTTOM, SCROLL_TOP)
}

fn scroll_camera(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut wheel: MessageReader<MouseWheel>,
    mut contexts: EguiContexts,
    mut camera: Single<&mut Transform, With<Camera2d>>,
) {
    let (keyboard_taken, pointer_taken) = contexts
        .ctx_mut()
        .map(|ctx| (ctx.wants_keyboard_input(), ctx.is_pointer_over_area()))
        .unwrap_or((false, false));

    let mut delta = 0.0;
    if !keyboard_taken {
        delta += scroll_delta(&keyboard);
    }
    for event in wheel.read() {
        if pointer_taken {
            continue;
        }
        delta += match event.unit {
            MouseScrollUnit::Line => event.y * LINE_STEP,
            MouseScrollUnit::Pixel => event.y * WHEEL_PIXEL_SCALE,
        };
    }

    if delta != 0.0 {
        camera.translation.y = clamp_scroll(camera.translation.y + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_scroll_by_line_and_page() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::ArrowDown);
        assert_eq!(scroll_delta(&keyboard), -LINE_STEP);

        keyboard.press(KeyCode::PageUp);
        assert_eq!(scroll_delta(&keyboard), PAGE_STEP - LINE_STEP);
    }

    #[test]
    fn scroll_stays_inside_scene() {
        assert_eq!(clamp_scroll(120.0), SCROLL_TOP);
        assert_eq!(clamp_scroll(-5_000.0), SCROLL_BOTTOM);
        assert_eq!(clamp_scroll(-300.0), -300.0);
    }
}

//! Hidden and visible poses of an animated unit.

use bevy::math::Vec2;

use super::config::{Direction, RevealConfig};

/// Visual state of one unit. `offset` is in screen space (y grows downward),
/// `rotation_deg` is the unfold angle around the unit's baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub offset: Vec2,
    pub opacity: f32,
    pub blur: f32,
    pub scale: f32,
    pub rotation_deg: f32,
}

impl Pose {
    pub const VISIBLE: Pose = Pose {
        offset: Vec2::ZERO,
        opacity: 1.0,
        blur: 0.0,
        scale: 1.0,
        rotation_deg: 0.0,
    };

    pub fn hidden(config: &RevealConfig) -> Self {
        Self {
            offset: direction_offset(config.direction, config.distance),
            opacity: 0.0,
            blur: config.blur,
            scale: config.scale,
            rotation_deg: config.rotation_deg,
        }
    }

    /// Linear blend; `t` comes from an easing curve and may overshoot 1.
    pub fn lerp(&self, to: &Pose, t: f32) -> Pose {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Pose {
            offset: self.offset.lerp(to.offset, t),
            opacity: mix(self.opacity, to.opacity).clamp(0.0, 1.0),
            blur: mix(self.blur, to.blur).max(0.0),
            scale: mix(self.scale, to.scale),
            rotation_deg: mix(self.rotation_deg, to.rotation_deg),
        }
    }
}

pub fn direction_offset(direction: Direction, distance: f32) -> Vec2 {
    match direction {
        Direction::Top => Vec2::new(0.0, -distance),
        Direction::Bottom => Vec2::new(0.0, distance),
        Direction::Left => Vec2::new(-distance, 0.0),
        Direction::Right => Vec2::new(distance, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_sets_offset_sign() {
        assert_eq!(direction_offset(Direction::Top, 20.0), Vec2::new(0.0, -20.0));
        assert_eq!(direction_offset(Direction::Bottom, 20.0), Vec2::new(0.0, 20.0));
        assert_eq!(direction_offset(Direction::Left, 5.0), Vec2::new(-5.0, 0.0));
        assert_eq!(direction_offset(Direction::Right, 5.0), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn hidden_pose_follows_blur_preset() {
        let hidden = Pose::hidden(&RevealConfig::blur("Scan your plate"));

        assert_eq!(hidden.offset, Vec2::new(0.0, -20.0));
        assert_eq!(hidden.opacity, 0.0);
        assert_eq!(hidden.blur, 10.0);
        assert_eq!(hidden.scale, 1.0);
    }

    #[test]
    fn overshoot_keeps_opacity_in_range() {
        let hidden = Pose::hidden(&RevealConfig::split("A"));
        let pose = hidden.lerp(&Pose::VISIBLE, 1.1);

        assert_eq!(pose.opacity, 1.0);
        assert!(pose.scale > 1.0);
    }
}

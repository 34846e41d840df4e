//! Bevy host for the motion engine.
//!
//! A `RevealSpawn` event creates one parent entity holding a `RevealAnimator`
//! and one `Text2d` child per text unit. Every frame the camera rectangle and
//! cursor are fed to the engine, machines are advanced by the frame delta,
//! and the resulting poses are copied onto the unit transforms and colors.
//! Glitch and shimmer effects ride on a reveal and arm once it completes.

use bevy::log::{debug, warn};
use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::motion::glitch::{GlitchPhase, constants::GHOST_OPACITY};
use crate::motion::shimmer::{Axis, ShimmerPhase};
use crate::motion::split::TextUnit;
use crate::motion::viewport::intersection_ratio;
use crate::motion::{
    GlitchConfig, GlitchEffect, IntersectionTracker, RevealAnimator, RevealConfig, RevealPhase, ShimmerConfig,
    ShimmerEffect, SplitUnit, TriggerEvent, Typewriter, TypewriterConfig, ViewportWatcher, WatchId,
};
use crate::settings::AppConfig;

pub mod constants {
    /// Glyph advance as a fraction of font size for the bundled monospace font.
    pub const CHAR_WIDTH_RATIO: f32 = 0.6;
    pub const LINE_HEIGHT_RATIO: f32 = 1.2;
    /// Extra fade applied per pixel of blur radius.
    pub const BLUR_FADE_PER_PX: f32 = 0.1;
    /// Scales the configured shimmer alpha, since the band is drawn over the glyphs.
    pub const SHIMMER_OVERLAY_ALPHA: f32 = 0.35;
    pub const SHIMMER_Z: f32 = 1.0;
    pub const GHOST_Z: f32 = -0.1;
}
use constants::*;

pub struct AnimatorPlugin;
impl Plugin for AnimatorPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<Viewport>()
            .add_observer(RevealSpawn::on_trigger)
            .add_observer(TypewriterSpawn::on_trigger)
            .add_observer(RevealCompleted::arm_effects)
            .add_observer(RevealText::on_remove)
            .add_systems(Update, (
                feed_viewport,
                track_hover,
                tick_reveals,
                tick_glitches,
                tick_shimmers,
                tick_typewriters,
                (apply_unit_frames, apply_glitch_ghosts, apply_shimmer_bands),
            ).chain())
            ;
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Viewport intersection state for every viewport-triggered reveal.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct Viewport(IntersectionTracker);

// ============================================================================
// Components
// ============================================================================

/// Parent of a revealed text. Its translation is the block's top-left corner.
#[derive(Component)]
pub struct RevealText {
    animator: RevealAnimator,
    watch_id: WatchId,
    origin: Vec2,
    size: Vec2,
    color: Color,
    hovered: bool,
}
impl RevealText {
    pub fn animator(&self) -> &RevealAnimator {
        &self.animator
    }

    /// World-space bounds of the laid out text.
    pub fn bounds(&self) -> Rect {
        Rect::from_corners(self.origin, self.origin + Vec2::new(self.size.x, -self.size.y))
    }

    fn on_remove(trigger: On<Remove, RevealText>, mut viewport: ResMut<Viewport>, mut reveals: Query<&mut RevealText>) {
        let Ok(mut reveal) = reveals.get_mut(trigger.event_target()) else { return };
        let watch_id = reveal.watch_id;
        reveal.animator.unmount(&mut viewport.0, watch_id);
    }
}

#[derive(Component)]
pub struct RevealUnit {
    pub index: usize,
    /// Resting offset from the parent, in world space.
    pub rest: Vec2,
}

#[derive(Component, Deref, DerefMut)]
pub struct Glitch(GlitchEffect);

#[derive(Component)]
pub struct GlitchGhost {
    pub slot: usize,
}

#[derive(Component, Deref, DerefMut)]
pub struct Shimmer(ShimmerEffect);

#[derive(Component)]
pub struct ShimmerBand;

#[derive(Component)]
pub struct TypewriterText {
    machine: Typewriter,
}

// ============================================================================
// Events
// ============================================================================

/// Spawns a reveal text with its top-left corner at `position`.
#[derive(Event, Clone)]
pub struct RevealSpawn {
    pub config: RevealConfig,
    pub position: Vec2,
    /// Falls back to `AppConfig::reveal_font_size`.
    pub font_size: Option<f32>,
    pub color: Color,
    pub glitch: Option<GlitchConfig>,
    pub shimmer: Option<ShimmerConfig>,
}
impl RevealSpawn {
    pub fn new(config: RevealConfig, position: Vec2) -> Self {
        Self {
            config,
            position,
            font_size: None,
            color: Color::WHITE,
            glitch: None,
            shimmer: None,
        }
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_glitch(mut self, glitch: GlitchConfig) -> Self {
        self.glitch = Some(glitch);
        self
    }

    pub fn with_shimmer(mut self, shimmer: ShimmerConfig) -> Self {
        self.shimmer = Some(shimmer);
        self
    }

    fn on_trigger(
        trigger: On<RevealSpawn>,
        mut commands: Commands,
        mut viewport: ResMut<Viewport>,
        settings: Res<AppConfig>,
    ) {
        let text = &trigger.config.text;
        let mut animator = match RevealAnimator::new(trigger.config.clone()) {
            Ok(animator) => animator,
            Err(e) => {
                warn!("Skipping reveal '{}': {}", text, e);
                return;
            }
        };
        let glitch = match trigger.glitch.clone().map(GlitchEffect::new).transpose() {
            Ok(glitch) => glitch,
            Err(e) => {
                warn!("Skipping reveal '{}': glitch {}", text, e);
                return;
            }
        };
        let shimmer = match trigger.shimmer.clone().map(ShimmerEffect::new).transpose() {
            Ok(shimmer) => shimmer,
            Err(e) => {
                warn!("Skipping reveal '{}': shimmer {}", text, e);
                return;
            }
        };

        let font_size = trigger.font_size.unwrap_or(settings.reveal_font_size);
        let layout = layout_units(animator.units(), trigger.config.unit, font_size);
        let text_font = TextFont { font_size, ..default() };

        let entity = commands.spawn((
            Name::new(format!("Reveal: {}", text)),
            Transform::from_translation(trigger.position.extend(0.0)),
            Visibility::default(),
        )).id();
        let watch_id = WatchId(entity.to_bits());
        let completed = animator.mount(&mut viewport.0, watch_id);

        commands.entity(entity).with_children(|parent| {
            for (unit, offset) in animator.units().iter().zip(&layout.offsets) {
                let rest = to_world(*offset);
                parent.spawn((
                    Text2d::new(unit.content.clone()),
                    text_font.clone(),
                    TextColor(trigger.color.with_alpha(0.0)),
                    Anchor::TOP_LEFT,
                    Transform::from_translation(rest.extend(0.0)),
                    RevealUnit { index: unit.index, rest },
                ));
            }
            if let Some(glitch) = &glitch {
                let colors = [glitch.config().primary, glitch.config().secondary];
                for (slot, [r, g, b]) in colors.into_iter().enumerate() {
                    parent.spawn((
                        Text2d::new(text.clone()),
                        text_font.clone(),
                        TextColor(Color::srgba(r, g, b, GHOST_OPACITY)),
                        Anchor::TOP_LEFT,
                        Transform::from_xyz(0.0, 0.0, GHOST_Z),
                        Visibility::Hidden,
                        GlitchGhost { slot },
                    ));
                }
            }
            if shimmer.is_some() {
                parent.spawn((
                    Sprite::from_color(Color::NONE, Vec2::ZERO),
                    Anchor::TOP_LEFT,
                    Transform::from_xyz(0.0, 0.0, SHIMMER_Z),
                    Visibility::Hidden,
                    ShimmerBand,
                ));
            }
        });

        let mut entity_commands = commands.entity(entity);
        entity_commands.insert(RevealText {
            animator,
            watch_id,
            origin: trigger.position,
            size: layout.size,
            color: trigger.color,
            hovered: false,
        });
        if let Some(glitch) = glitch {
            entity_commands.insert(Glitch(glitch));
        }
        if let Some(shimmer) = shimmer {
            entity_commands.insert(Shimmer(shimmer));
        }
        debug!("Spawned reveal '{}' with {} units", text, layout.offsets.len());

        if completed {
            commands.trigger(RevealCompleted { entity });
        }
    }
}

/// Spawns a typewriter line with its top-left corner at `position`.
#[derive(Event, Clone)]
pub struct TypewriterSpawn {
    pub config: TypewriterConfig,
    pub position: Vec2,
    pub font_size: f32,
    pub color: Color,
}
impl TypewriterSpawn {
    fn on_trigger(trigger: On<TypewriterSpawn>, mut commands: Commands) {
        let mut machine = match Typewriter::new(trigger.config.clone()) {
            Ok(machine) => machine,
            Err(e) => {
                warn!("Skipping typewriter: {}", e);
                return;
            }
        };
        machine.start();
        commands.spawn((
            Name::new("Typewriter"),
            Text2d::new(""),
            TextFont { font_size: trigger.font_size, ..default() },
            TextColor(trigger.color),
            Anchor::TOP_LEFT,
            Transform::from_translation(trigger.position.extend(0.0)),
            TypewriterText { machine },
        ));
    }
}

/// Fired once per activation, after the last unit of a reveal has settled.
#[derive(EntityEvent)]
pub struct RevealCompleted {
    pub entity: Entity,
}
impl RevealCompleted {
    fn arm_effects(
        trigger: On<RevealCompleted>,
        mut effects: Query<(Option<&mut Glitch>, Option<&mut Shimmer>), With<RevealText>>,
    ) {
        let Ok((glitch, shimmer)) = effects.get_mut(trigger.entity) else { return };
        if let Some(mut glitch) = glitch {
            glitch.arm();
        }
        if let Some(mut shimmer) = shimmer {
            shimmer.arm();
        }
    }
}

/// Fired when a non-looping typewriter has typed its last string.
#[derive(EntityEvent)]
pub struct TypewriterFinished {
    pub entity: Entity,
}

// ============================================================================
// Layout
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct UnitLayout {
    /// Top-left of each unit relative to the block, y growing downwards.
    pub offsets: Vec<Vec2>,
    pub size: Vec2,
}

/// Places units the way the joined text would be typeset in a monospace font.
pub fn layout_units(units: &[TextUnit], unit: SplitUnit, font_size: f32) -> UnitLayout {
    let advance = font_size * CHAR_WIDTH_RATIO;
    let line_height = font_size * LINE_HEIGHT_RATIO;
    let mut cursor = Vec2::ZERO;
    let mut extent = Vec2::ZERO;
    let mut offsets = Vec::with_capacity(units.len());

    for (position, text_unit) in units.iter().enumerate() {
        if position > 0 {
            match unit {
                SplitUnit::Char => {}
                SplitUnit::Word => cursor.x += advance,
                SplitUnit::Line => cursor = Vec2::new(0.0, cursor.y + line_height),
            }
        }
        let start = cursor;
        offsets.push(start);
        for c in text_unit.content.chars() {
            if c == '\n' {
                cursor = Vec2::new(if unit == SplitUnit::Char { 0.0 } else { start.x }, cursor.y + line_height);
            } else {
                cursor.x += advance;
                extent.x = extent.x.max(cursor.x);
            }
        }
        extent.y = cursor.y + line_height;
    }

    UnitLayout { offsets, size: extent }
}

fn to_world(screen: Vec2) -> Vec2 {
    Vec2::new(screen.x, -screen.y)
}

// ============================================================================
// Systems
// ============================================================================

fn camera_view(window: &Window, camera: &Camera, transform: &GlobalTransform) -> Option<Rect> {
    let top_left = camera.viewport_to_world_2d(transform, Vec2::ZERO).ok()?;
    let bottom_right = camera.viewport_to_world_2d(transform, window.size()).ok()?;
    Some(Rect::from_corners(top_left, bottom_right))
}

fn feed_viewport(
    mut commands: Commands,
    mut viewport: ResMut<Viewport>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform)>,
    mut reveals: Query<(Entity, &mut RevealText)>,
) {
    let (camera, camera_transform) = camera.into_inner();
    let Some(view) = camera_view(&window, camera, camera_transform) else { return };

    for (_, reveal) in &reveals {
        viewport.report(reveal.watch_id, intersection_ratio(reveal.bounds(), view));
    }
    let changes = viewport.poll();
    if changes.is_empty() {
        return;
    }
    for (entity, mut reveal) in &mut reveals {
        let watch_id = reveal.watch_id;
        for change in changes.iter().filter(|change| change.id == watch_id) {
            if reveal.animator.handle_event(TriggerEvent::ViewportChanged(change.visible)) {
                commands.trigger(RevealCompleted { entity });
            }
        }
    }
}

fn track_hover(
    mut commands: Commands,
    mut contexts: EguiContexts,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform)>,
    mut reveals: Query<(Entity, &mut RevealText, Option<&mut Glitch>, Option<&mut Shimmer>)>,
) {
    let over_ui = contexts.ctx_mut().is_ok_and(|ctx| ctx.is_pointer_over_area());
    let (camera, camera_transform) = camera.into_inner();
    let cursor = window
        .cursor_position()
        .filter(|_| !over_ui)
        .and_then(|position| camera.viewport_to_world_2d(camera_transform, position).ok());

    for (entity, mut reveal, glitch, shimmer) in &mut reveals {
        let hovered = cursor.is_some_and(|point| reveal.bounds().contains(point));
        if hovered == reveal.hovered {
            continue;
        }
        reveal.hovered = hovered;
        let event = if hovered { TriggerEvent::PointerEnter } else { TriggerEvent::PointerLeave };
        if reveal.animator.handle_event(event) {
            commands.trigger(RevealCompleted { entity });
        }
        if let Some(mut glitch) = glitch {
            if hovered { glitch.pointer_enter() } else { glitch.pointer_leave() }
        }
        if let Some(mut shimmer) = shimmer {
            if hovered { shimmer.pointer_enter() } else { shimmer.pointer_leave() }
        }
    }
}

fn tick_reveals(mut commands: Commands, time: Res<Time>, mut reveals: Query<(Entity, &mut RevealText)>) {
    for (entity, mut reveal) in &mut reveals {
        if reveal.animator.advance(time.delta()) {
            commands.trigger(RevealCompleted { entity });
        }
    }
}

/// Glitches only run on a fully revealed text; a reset reveal disarms them.
fn tick_glitches(time: Res<Time>, mut glitches: Query<(&mut Glitch, &RevealText, &mut Transform)>) {
    for (mut glitch, reveal, mut transform) in &mut glitches {
        if reveal.animator.phase() != RevealPhase::Settled && glitch.phase() != GlitchPhase::Idle {
            glitch.disarm();
        }
        glitch.advance(time.delta());

        let (offset, skew_deg) = glitch
            .frame()
            .map(|frame| (to_world(frame.offset), frame.skew_deg))
            .unwrap_or((Vec2::ZERO, 0.0));
        transform.translation = (reveal.origin + offset).extend(transform.translation.z);
        // Transform has no skew; a small tilt stands in for it.
        transform.rotation = Quat::from_rotation_z(-skew_deg.to_radians());
    }
}

fn tick_shimmers(time: Res<Time>, mut shimmers: Query<(&mut Shimmer, &RevealText)>) {
    for (mut shimmer, reveal) in &mut shimmers {
        if reveal.animator.phase() != RevealPhase::Settled && shimmer.phase() != ShimmerPhase::Idle {
            shimmer.disarm();
        }
        shimmer.advance(time.delta());
    }
}

fn tick_typewriters(
    mut commands: Commands,
    time: Res<Time>,
    mut typewriters: Query<(Entity, &mut TypewriterText, &mut Text2d)>,
) {
    for (entity, mut typewriter, mut text) in &mut typewriters {
        if typewriter.machine.advance(time.delta()) {
            commands.trigger(TypewriterFinished { entity });
        }
        let machine = &typewriter.machine;
        let mut shown = machine.display_text().to_string();
        // A blank keeps the line width steady while the cursor blinks off.
        shown.push(machine.cursor().unwrap_or(' '));
        if text.0 != shown {
            text.0 = shown;
        }
    }
}

fn apply_unit_frames(
    reveals: Query<&RevealText>,
    mut units: Query<(&RevealUnit, &ChildOf, &mut Transform, &mut TextColor)>,
) {
    for (unit, child_of, mut transform, mut color) in &mut units {
        let Ok(reveal) = reveals.get(child_of.parent()) else { continue };
        let Some(frame) = reveal.animator.unit_frame(unit.index) else { continue };
        let pose = frame.pose;

        transform.translation = (unit.rest + to_world(pose.offset)).extend(0.0);
        transform.scale = Vec3::splat(pose.scale);
        transform.rotation = Quat::from_rotation_z(-pose.rotation_deg.to_radians());
        let fade = 1.0 / (1.0 + pose.blur * BLUR_FADE_PER_PX);
        color.0 = reveal.color.with_alpha(pose.opacity * fade);
    }
}

fn apply_glitch_ghosts(
    glitches: Query<&Glitch>,
    mut ghosts: Query<(&GlitchGhost, &ChildOf, &mut Transform, &mut Visibility), Without<Glitch>>,
) {
    for (ghost, child_of, mut transform, mut visibility) in &mut ghosts {
        let Ok(glitch) = glitches.get(child_of.parent()) else { continue };
        match glitch.frame() {
            Some(frame) => {
                let offset = to_world(frame.ghosts[ghost.slot].offset);
                transform.translation = offset.extend(GHOST_Z);
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

fn apply_shimmer_bands(
    shimmers: Query<(&Shimmer, &RevealText)>,
    mut bands: Query<(&ChildOf, &mut Sprite, &mut Transform, &mut Visibility), With<ShimmerBand>>,
) {
    for (child_of, mut sprite, mut transform, mut visibility) in &mut bands {
        let Ok((shimmer, reveal)) = shimmers.get(child_of.parent()) else { continue };
        let Some(frame) = shimmer.frame() else {
            *visibility = Visibility::Hidden;
            continue;
        };
        let start = frame.band_start.clamp(0.0, 1.0);
        let end = frame.band_end.clamp(0.0, 1.0);
        if end <= start {
            *visibility = Visibility::Hidden;
            continue;
        }

        let size = reveal.size;
        let (position, extent) = match frame.axis {
            Axis::Horizontal => (Vec2::new(start * size.x, 0.0), Vec2::new((end - start) * size.x, size.y)),
            Axis::Vertical => (Vec2::new(0.0, start * size.y), Vec2::new(size.x, (end - start) * size.y)),
        };
        let [r, g, b, a] = frame.color;
        sprite.color = Color::srgba(r, g, b, a * SHIMMER_OVERLAY_ALPHA);
        sprite.custom_size = Some(extent);
        transform.translation = to_world(position).extend(SHIMMER_Z);
        *visibility = Visibility::Inherited;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::split::split;

    const FONT: f32 = 10.0;
    const ADVANCE: f32 = FONT * CHAR_WIDTH_RATIO;
    const LINE: f32 = FONT * LINE_HEIGHT_RATIO;

    #[test]
    fn chars_sit_side_by_side() {
        let layout = layout_units(&split("AI", SplitUnit::Char), SplitUnit::Char, FONT);

        assert_eq!(layout.offsets, vec![Vec2::ZERO, Vec2::new(ADVANCE, 0.0)]);
        assert_eq!(layout.size, Vec2::new(2.0 * ADVANCE, LINE));
    }

    #[test]
    fn words_leave_one_space_between() {
        let layout = layout_units(&split("eat well", SplitUnit::Word), SplitUnit::Word, FONT);

        assert_eq!(layout.offsets, vec![Vec2::ZERO, Vec2::new(4.0 * ADVANCE, 0.0)]);
        assert_eq!(layout.size, Vec2::new(8.0 * ADVANCE, LINE));
    }

    #[test]
    fn lines_stack_downwards() {
        let layout = layout_units(&split("a\nbc", SplitUnit::Line), SplitUnit::Line, FONT);

        assert_eq!(layout.offsets, vec![Vec2::ZERO, Vec2::new(0.0, LINE)]);
        assert_eq!(layout.size, Vec2::new(2.0 * ADVANCE, 2.0 * LINE));
    }

    #[test]
    fn newline_chars_wrap_the_cursor() {
        let layout = layout_units(&split("a\nb", SplitUnit::Char), SplitUnit::Char, FONT);

        assert_eq!(layout.offsets[2], Vec2::new(0.0, LINE));
        assert_eq!(layout.size, Vec2::new(ADVANCE, 2.0 * LINE));
    }

    #[test]
    fn empty_text_has_no_extent() {
        let layout = layout_units(&[], SplitUnit::Char, FONT);

        assert!(layout.offsets.is_empty());
        assert_eq!(layout.size, Vec2::ZERO);
    }

    #[test]
    fn screen_offsets_flip_into_world_space() {
        assert_eq!(to_world(Vec2::new(3.0, 20.0)), Vec2::new(3.0, -20.0));
    }

    #[test]
    fn spawn_with_invalid_config_spawns_nothing() {
        let mut app = App::new();
        app
            .add_plugins(MinimalPlugins)
            .init_resource::<Viewport>()
            .init_resource::<AppConfig>()
            .add_observer(RevealSpawn::on_trigger)
            ;

        let bad = RevealConfig::split("oops").with_timing(-5.0, 0.0, 0.0);
        app.world_mut().trigger(RevealSpawn::new(bad, Vec2::ZERO));
        app.world_mut().flush();

        let count = app.world_mut().query::<&RevealText>().iter(app.world()).count();
        assert_eq!(count, 0);
    }

    #[test]
    fn spawn_lays_out_units_and_watches_viewport() {
        let mut app = App::new();
        app
            .add_plugins(MinimalPlugins)
            .init_resource::<Viewport>()
            .init_resource::<AppConfig>()
            .add_observer(RevealSpawn::on_trigger)
            .add_observer(RevealText::on_remove)
            ;

        let config = RevealConfig::split("Eat").with_viewport_threshold(0.5);
        app.world_mut().trigger(RevealSpawn::new(config, Vec2::new(10.0, 0.0)).with_font_size(FONT));
        app.world_mut().flush();

        let units = app.world_mut().query::<&RevealUnit>().iter(app.world()).count();
        assert_eq!(units, 3);
        let (entity, bounds) = {
            let mut query = app.world_mut().query::<(Entity, &RevealText)>();
            let (entity, reveal) = query.single(app.world()).unwrap();
            (entity, reveal.bounds())
        };
        assert_eq!(bounds.min, Vec2::new(10.0, -LINE));
        assert_eq!(bounds.max, Vec2::new(10.0 + 3.0 * ADVANCE, 0.0));
        assert_eq!(app.world().resource::<Viewport>().observed_len(), 1);

        app.world_mut().entity_mut(entity).remove::<RevealText>();
        assert_eq!(app.world().resource::<Viewport>().observed_len(), 0);
    }
}

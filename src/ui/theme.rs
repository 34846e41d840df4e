//! Keeps egui visuals and the clear color in step with the store's theme.
//!
//! The store notifies a theme subscription on change; the flag it sets is
//! consumed on the next egui pass.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::log::debug;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::store::model::Theme;
use crate::store::{AppStore, selectors};

const LIGHT_BACKGROUND: Color = Color::srgb(0.36, 0.42, 0.55);
const DARK_BACKGROUND: Color = Color::srgb(0.06, 0.07, 0.10);

#[derive(Resource)]
pub struct ThemeSync {
    dark: Arc<AtomicBool>,
    pending: Arc<AtomicBool>,
}
impl ThemeSync {
    pub fn install(mut commands: Commands, mut store: ResMut<AppStore>) {
        let dark = Arc::new(AtomicBool::new(store.state().theme().is_dark()));
        let pending = Arc::new(AtomicBool::new(true));

        let (dark_flag, pending_flag) = (dark.clone(), pending.clone());
        store.subscribe(selectors::theme, move |theme: &Theme| {
            dark_flag.store(theme.is_dark(), Ordering::Relaxed);
            pending_flag.store(true, Ordering::Relaxed);
        });
        commands.insert_resource(ThemeSync { dark, pending });
    }

    pub fn apply(sync: Res<ThemeSync>, mut contexts: EguiContexts, mut clear_color: ResMut<ClearColor>) {
        if !sync.pending.load(Ordering::Relaxed) {
            return;
        }
        let Ok(ctx) = contexts.ctx_mut() else { return };
        sync.pending.store(false, Ordering::Relaxed);

        let dark = sync.dark.load(Ordering::Relaxed);
        ctx.set_visuals(if dark { egui::Visuals::dark() } else { egui::Visuals::light() });
        clear_color.0 = background(dark);
        debug!("Applied {} theme", if dark { "dark" } else { "light" });
    }
}

fn background(dark: bool) -> Color {
    if dark { DARK_BACKGROUND } else { LIGHT_BACKGROUND }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn theme_toggle_flags_a_pending_sync() {
        let mut app = App::new();
        app
            .add_plugins(MinimalPlugins)
            .insert_resource(AppStore::in_memory())
            ;
        app.world_mut().run_system_once(ThemeSync::install).unwrap();

        let sync = app.world().resource::<ThemeSync>();
        assert!(sync.pending.load(Ordering::Relaxed));
        assert!(!sync.dark.load(Ordering::Relaxed));
        sync.pending.store(false, Ordering::Relaxed);

        app.world_mut().resource_mut::<AppStore>().add_recent_search("eggs");
        assert!(!app.world().resource::<ThemeSync>().pending.load(Ordering::Relaxed));

        app.world_mut().resource_mut::<AppStore>().toggle_theme();
        let sync = app.world().resource::<ThemeSync>();
        assert!(sync.pending.load(Ordering::Relaxed));
        assert!(sync.dark.load(Ordering::Relaxed));
    }

    #[test]
    fn backgrounds_differ_per_theme() {
        assert_ne!(background(true), background(false));
    }
}

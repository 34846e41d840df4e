//! Application store: the single owner of user, history, stats and theme state.
//!
//! `AppStore` is a Bevy resource. UI code mutates it either by triggering a
//! `StoreAction` or by calling the matching method; both go through
//! `dispatch`, which applies the change, writes the persisted subset to
//! storage and notifies selector subscriptions, in that order, before
//! returning.

pub mod history;
pub mod model;
pub mod request;
pub mod selectors;

use std::sync::atomic::{AtomicU64, Ordering};

use bevy::log::{info, warn};
use bevy::prelude::*;

use crate::persistence::{self, MemoryStorage, PersistedState, SnapshotStorage};
use crate::settings::AppConfig;

use history::BoundedHistory;
use model::constants::{NUTRITION_HISTORY_CAPACITY, RECENT_DETECTIONS_CAPACITY, RECENT_SEARCHES_CAPACITY};
use model::{AppState, AppStats, DailyTotals, NewFoodDetection, NewNutritionEntry, StatsUpdate, UserIdentity};
use selectors::{SubscriptionId, Subscriptions};

pub use request::ApiEnvelope;

pub struct StorePlugin;
impl Plugin for StorePlugin {
    fn build(&self, app: &mut App) {
        let key = app
            .world()
            .get_resource::<AppConfig>()
            .map(|config| config.storage_key.clone())
            .unwrap_or_else(|| persistence::STORAGE_KEY.to_string());

        app
            .insert_resource(AppStore::load(persistence::platform_storage(), key))
            .add_observer(on_store_action)
            ;
    }
}

// ============================================================================
// Actions
// ============================================================================

#[derive(Event, Debug, Clone, PartialEq)]
pub enum StoreAction {
    SetUser(Option<UserIdentity>),
    SetLoading(bool),
    SetError(Option<String>),
    AddNutritionEntry(NewNutritionEntry),
    AddFoodDetection(NewFoodDetection),
    AddRecentSearch(String),
    UpdateDailyNutrition(DailyTotals),
    UpdateStats(StatsUpdate),
    ClearHistory,
    ToggleTheme,
    Reset,
}

fn on_store_action(action: On<StoreAction>, mut store: ResMut<AppStore>) {
    store.dispatch(action.event().clone());
}

// ============================================================================
// Store
// ============================================================================

static NEXT_RECORD_SEQ: AtomicU64 = AtomicU64::new(0);

/// Ids are unique for the lifetime of the process, across store instances.
fn next_record_id() -> String {
    let seq = NEXT_RECORD_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", now_millis(), seq)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

/// `YYYY-MM-DD` for the given epoch milliseconds, in UTC.
pub fn date_for(millis: u64) -> String {
    chrono::DateTime::from_timestamp_millis(millis as i64)
        .map(|time| time.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// RFC 3339 timestamp for the given epoch milliseconds.
pub fn timestamp_for(millis: u64) -> String {
    chrono::DateTime::from_timestamp_millis(millis as i64)
        .map(|time| time.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        .unwrap_or_default()
}

#[derive(Resource)]
pub struct AppStore {
    state: AppState,
    storage: Box<dyn SnapshotStorage>,
    key: String,
    subscriptions: Subscriptions,
}

impl AppStore {
    /// Seeds state from the snapshot under `key`, or from defaults.
    pub fn load(storage: Box<dyn SnapshotStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = match persistence::load_snapshot(storage.as_ref(), &key) {
            Some(snapshot) => {
                info!(
                    "Restored store: {} entries, {} detections, {} searches",
                    snapshot.nutrition_history.len(),
                    snapshot.recent_detections.len(),
                    snapshot.recent_searches.len()
                );
                restore(snapshot)
            }
            None => AppState::default(),
        };
        Self {
            state,
            storage,
            key,
            subscriptions: Subscriptions::default(),
        }
    }

    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStorage::default()), persistence::STORAGE_KEY)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn select<T>(&self, selector: impl Fn(&AppState) -> T) -> T {
        selector(&self.state)
    }

    /// Calls `on_change` whenever the selected slice changes value.
    pub fn subscribe<T, S, F>(&mut self, selector: S, on_change: F) -> SubscriptionId
    where
        T: PartialEq + Send + Sync + 'static,
        S: Fn(&AppState) -> T + Send + Sync + 'static,
        F: FnMut(&T) + Send + Sync + 'static,
    {
        self.subscriptions.add(&self.state, selector, on_change)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// The persisted subset of the current state.
    pub fn persisted(&self) -> PersistedState {
        persisted(&self.state)
    }

    /// Hands back the storage backend, e.g. to reload from it.
    pub fn into_storage(self) -> Box<dyn SnapshotStorage> {
        self.storage
    }

    pub fn dispatch(&mut self, action: StoreAction) {
        apply(&mut self.state, action);
        persistence::save_snapshot(self.storage.as_mut(), &self.key, &persisted(&self.state));
        self.subscriptions.notify(&self.state);
    }

    pub fn set_user(&mut self, user: Option<UserIdentity>) {
        self.dispatch(StoreAction::SetUser(user));
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.dispatch(StoreAction::SetLoading(loading));
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.dispatch(StoreAction::SetError(error));
    }

    pub fn add_nutrition_entry(&mut self, entry: NewNutritionEntry) {
        self.dispatch(StoreAction::AddNutritionEntry(entry));
    }

    pub fn add_food_detection(&mut self, detection: NewFoodDetection) {
        self.dispatch(StoreAction::AddFoodDetection(detection));
    }

    pub fn add_recent_search(&mut self, query: impl Into<String>) {
        self.dispatch(StoreAction::AddRecentSearch(query.into()));
    }

    pub fn update_daily_nutrition(&mut self, totals: DailyTotals) {
        self.dispatch(StoreAction::UpdateDailyNutrition(totals));
    }

    pub fn update_stats(&mut self, update: StatsUpdate) {
        self.dispatch(StoreAction::UpdateStats(update));
    }

    pub fn clear_history(&mut self) {
        self.dispatch(StoreAction::ClearHistory);
    }

    pub fn toggle_theme(&mut self) {
        self.dispatch(StoreAction::ToggleTheme);
    }

    pub fn reset(&mut self) {
        self.dispatch(StoreAction::Reset);
    }
}

fn apply(state: &mut AppState, action: StoreAction) {
    match action {
        StoreAction::SetUser(user) => {
            state.is_authenticated = user.is_some();
            state.user = user;
        }
        StoreAction::SetLoading(loading) => state.is_loading = loading,
        StoreAction::SetError(error) => state.error = error,
        StoreAction::AddNutritionEntry(entry) => {
            let entry = entry.with_id(next_record_id());
            state.daily_totals.add_entry(&entry);
            state.nutrition_history.push_front(entry);
        }
        StoreAction::AddFoodDetection(detection) => {
            state.recent_detections.push_front(detection.with_id(next_record_id()));
            state.stats.total_detections += 1;
            state.stats.api_calls.vision += 1;
        }
        StoreAction::AddRecentSearch(query) => {
            state.recent_searches.promote(query);
            state.stats.total_searches += 1;
            state.stats.api_calls.nutrition += 1;
        }
        StoreAction::UpdateDailyNutrition(totals) => state.daily_totals = totals,
        StoreAction::UpdateStats(update) => merge_stats(&mut state.stats, update),
        StoreAction::ClearHistory => {
            state.nutrition_history.clear();
            state.recent_detections.clear();
            state.recent_searches.clear();
            state.daily_totals = DailyTotals::default();
        }
        StoreAction::ToggleTheme => state.theme = state.theme.toggled(),
        StoreAction::Reset => *state = AppState::default(),
    }
}

/// Counters only move up outside of `Reset`; lower values are ignored.
fn merge_stats(stats: &mut AppStats, update: StatsUpdate) {
    fn raise(field: &str, counter: &mut u64, value: u64) {
        if value < *counter {
            warn!("Ignoring stats update lowering {} from {} to {}", field, counter, value);
        } else {
            *counter = value;
        }
    }

    if let Some(value) = update.total_detections {
        raise("totalDetections", &mut stats.total_detections, value);
    }
    if let Some(value) = update.total_searches {
        raise("totalSearches", &mut stats.total_searches, value);
    }
    if let Some(calls) = update.api_calls {
        raise("apiCalls.vision", &mut stats.api_calls.vision, calls.vision);
        raise("apiCalls.nutrition", &mut stats.api_calls.nutrition, calls.nutrition);
        raise("apiCalls.ai", &mut stats.api_calls.ai, calls.ai);
    }
    if let Some(savings) = update.monthly_savings {
        stats.monthly_savings = savings;
    }
}

fn persisted(state: &AppState) -> PersistedState {
    PersistedState {
        user: state.user.clone(),
        is_authenticated: state.is_authenticated,
        recent_searches: state.recent_searches.to_vec(),
        nutrition_history: state.nutrition_history.to_vec(),
        recent_detections: state.recent_detections.to_vec(),
        stats: state.stats,
        theme: state.theme,
    }
}

fn restore(snapshot: PersistedState) -> AppState {
    AppState {
        user: snapshot.user,
        is_authenticated: snapshot.is_authenticated,
        recent_searches: BoundedHistory::from_recent_first(RECENT_SEARCHES_CAPACITY, snapshot.recent_searches),
        nutrition_history: BoundedHistory::from_recent_first(NUTRITION_HISTORY_CAPACITY, snapshot.nutrition_history),
        recent_detections: BoundedHistory::from_recent_first(RECENT_DETECTIONS_CAPACITY, snapshot.recent_detections),
        stats: snapshot.stats,
        theme: snapshot.theme,
        ..AppState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::model::{ApiCalls, Theme};
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn entry(name: &str, calories: f64) -> NewNutritionEntry {
        NewNutritionEntry {
            name: name.to_string(),
            calories,
            protein: 10.0,
            carbohydrates: 5.0,
            fat: 2.0,
            weight: 100.0,
            date: "2026-10-18".to_string(),
        }
    }

    fn detection(name: &str, confidence: f64) -> NewFoodDetection {
        NewFoodDetection {
            food_name: name.to_string(),
            confidence,
            estimated_weight: 150.0,
            calories: 80.0,
            timestamp: "2026-10-18T12:00:00Z".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn dates_format_in_utc() {
        assert_eq!(date_for(0), "1970-01-01");
        assert_eq!(timestamp_for(1_500), "1970-01-01T00:00:01.500Z");
    }

    #[test]
    fn set_user_tracks_authentication() {
        let mut store = AppStore::in_memory();
        store.set_user(Some(UserIdentity::new("42", "Sam")));
        assert!(store.state().is_authenticated());

        store.set_user(None);
        assert!(!store.state().is_authenticated());
        assert_eq!(store.state().user(), None);
    }

    #[test]
    fn entries_accumulate_daily_totals() {
        let mut store = AppStore::in_memory();
        store.add_nutrition_entry(entry("Oatmeal", 100.0));
        store.add_nutrition_entry(entry("Banana", 50.0));

        let totals = store.state().daily_totals();
        assert_eq!(totals.calories, 150.0);
        assert_eq!(totals.protein, 20.0);
        assert_eq!(totals.carbs, 10.0);
        assert_eq!(totals.fat, 4.0);
    }

    #[test]
    fn update_daily_nutrition_replaces_totals() {
        let mut store = AppStore::in_memory();
        store.add_nutrition_entry(entry("Oatmeal", 100.0));
        store.update_daily_nutrition(DailyTotals { calories: 1800.0, protein: 90.0, carbs: 200.0, fat: 60.0 });
        store.add_nutrition_entry(entry("Apple", 52.0));

        assert_eq!(store.state().daily_totals().calories, 1852.0);
    }

    #[test]
    fn nutrition_history_keeps_fifty_most_recent() {
        let mut store = AppStore::in_memory();
        for n in 0..51 {
            store.add_nutrition_entry(entry(&format!("meal {n}"), 1.0));
        }

        let history = store.state().nutrition_history();
        assert_eq!(history.len(), 50);
        let names: Vec<&str> = history.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"meal 50"));
        assert_eq!(names.last(), Some(&"meal 1"));

        let ids: HashSet<&str> = history.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn recent_searches_promote_without_duplicates() {
        let mut store = AppStore::in_memory();
        store.add_recent_search("chicken");
        store.add_recent_search("rice");
        store.add_recent_search("chicken");

        assert_eq!(store.select(selectors::recent_searches), vec!["chicken", "rice"]);
        assert_eq!(store.state().stats().total_searches, 3);
        assert_eq!(store.state().stats().api_calls.nutrition, 3);
    }

    #[test]
    fn detections_are_bounded_and_counted() {
        let mut store = AppStore::in_memory();
        for n in 0..25 {
            store.add_food_detection(detection(&format!("dish {n}"), 1.4));
        }

        let detections = store.state().recent_detections();
        assert_eq!(detections.len(), 20);
        assert_eq!(detections.front().map(|d| d.food_name.as_str()), Some("dish 24"));
        assert!(detections.iter().all(|d| d.confidence == 1.0));
        assert_eq!(store.state().stats().total_detections, 25);
        assert_eq!(store.state().stats().api_calls.vision, 25);
    }

    #[test]
    fn update_stats_merges_without_lowering_counters() {
        let mut store = AppStore::in_memory();
        store.add_food_detection(detection("apple", 0.9));
        store.update_stats(StatsUpdate {
            total_detections: Some(0),
            monthly_savings: Some(4000.0),
            api_calls: Some(ApiCalls { vision: 1, nutrition: 0, ai: 7 }),
            ..StatsUpdate::default()
        });

        let stats = store.state().stats();
        assert_eq!(stats.total_detections, 1);
        assert_eq!(stats.monthly_savings, 4000.0);
        assert_eq!(stats.api_calls.ai, 7);
        assert_eq!(stats.total_searches, 0);
    }

    #[test]
    fn clear_history_keeps_stats_and_user() {
        let mut store = AppStore::in_memory();
        store.set_user(Some(UserIdentity::new("1", "Kai")));
        store.add_nutrition_entry(entry("Rice", 130.0));
        store.add_food_detection(detection("Rice", 0.8));
        store.add_recent_search("rice");
        store.clear_history();

        let state = store.state();
        assert!(state.nutrition_history().is_empty());
        assert!(state.recent_detections().is_empty());
        assert!(state.recent_searches().is_empty());
        assert_eq!(state.daily_totals(), DailyTotals::default());
        assert_eq!(state.stats().total_detections, 1);
        assert!(state.user().is_some());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut store = AppStore::in_memory();
        store.set_user(Some(UserIdentity::new("1", "Kai")));
        store.toggle_theme();
        store.add_nutrition_entry(entry("Rice", 130.0));
        store.add_recent_search("rice");
        store.set_loading(true);
        store.set_error(Some("boom".into()));
        store.reset();

        assert_eq!(store.state(), &AppState::default());
        assert_eq!(store.select(selectors::theme), Theme::Light);
        assert_eq!(store.select(selectors::app_stats), AppStats::default());
    }

    #[test]
    fn reload_restores_persisted_fields_only() {
        let mut store = AppStore::in_memory();
        store.set_user(Some(UserIdentity::new("7", "Noor")));
        store.add_nutrition_entry(entry("Salmon", 208.0));
        store.add_food_detection(detection("Salmon", 0.95));
        store.add_recent_search("salmon");
        store.toggle_theme();
        store.set_loading(true);
        store.set_error(Some("offline".into()));
        let before = store.persisted();

        let reloaded = AppStore::load(store.into_storage(), persistence::STORAGE_KEY);

        assert_eq!(reloaded.persisted(), before);
        assert!(!reloaded.state().is_loading());
        assert_eq!(reloaded.state().error(), None);
        assert_eq!(reloaded.state().daily_totals(), DailyTotals::default());
        assert_eq!(reloaded.state().theme(), Theme::Dark);
    }

    #[test]
    fn subscriptions_fire_only_on_slice_change() {
        let mut store = AppStore::in_memory();
        let theme_calls = Arc::new(AtomicUsize::new(0));
        let seen = theme_calls.clone();
        let id = store.subscribe(selectors::theme, move |_theme| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        store.add_recent_search("oats");
        store.set_loading(true);
        assert_eq!(theme_calls.load(Ordering::SeqCst), 0);

        store.toggle_theme();
        assert_eq!(theme_calls.load(Ordering::SeqCst), 1);

        assert!(store.unsubscribe(id));
        store.toggle_theme();
        assert_eq!(theme_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn actions_dispatch_through_observer() {
        let mut app = App::new();
        app
            .add_plugins(MinimalPlugins)
            .insert_resource(AppStore::in_memory())
            .add_observer(on_store_action)
            ;

        app.world_mut().trigger(StoreAction::ToggleTheme);
        app.world_mut().trigger(StoreAction::AddRecentSearch("oats".into()));

        let store = app.world().resource::<AppStore>();
        assert_eq!(store.state().theme(), Theme::Dark);
        assert_eq!(store.select(selectors::recent_searches), vec!["oats"]);
    }
}

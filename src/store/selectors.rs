//! Narrow views of `AppState` and change-only subscriptions to them.
//!
//! A subscriber picks one slice with a selector and is called only when
//! that slice compares unequal to the value it last saw, so a search
//! keystroke doesn't wake a theme listener.

use super::model::{AppState, AppStats, DailyTotals, FoodDetection, NutritionEntry, Theme, UserIdentity};

pub fn user(state: &AppState) -> Option<UserIdentity> {
    state.user().cloned()
}

pub fn is_authenticated(state: &AppState) -> bool {
    state.is_authenticated()
}

pub fn nutrition_history(state: &AppState) -> Vec<NutritionEntry> {
    state.nutrition_history().to_vec()
}

pub fn recent_detections(state: &AppState) -> Vec<FoodDetection> {
    state.recent_detections().to_vec()
}

pub fn recent_searches(state: &AppState) -> Vec<String> {
    state.recent_searches().to_vec()
}

pub fn daily_nutrition(state: &AppState) -> DailyTotals {
    state.daily_totals()
}

pub fn app_stats(state: &AppState) -> AppStats {
    *state.stats()
}

pub fn theme(state: &AppState) -> Theme {
    state.theme()
}

pub fn loading(state: &AppState) -> bool {
    state.is_loading()
}

pub fn error(state: &AppState) -> Option<String> {
    state.error().map(str::to_owned)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

trait Subscription: Send + Sync {
    fn notify_if_changed(&mut self, state: &AppState);
}

struct SliceSubscription<T, S, F> {
    select: S,
    last: T,
    on_change: F,
}

impl<T, S, F> Subscription for SliceSubscription<T, S, F>
where
    T: PartialEq + Send + Sync,
    S: Fn(&AppState) -> T + Send + Sync,
    F: FnMut(&T) + Send + Sync,
{
    fn notify_if_changed(&mut self, state: &AppState) {
        let next = (self.select)(state);
        if next != self.last {
            (self.on_change)(&next);
            self.last = next;
        }
    }
}

#[derive(Default)]
pub(super) struct Subscriptions {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn Subscription>)>,
}

impl Subscriptions {
    pub(super) fn add<T, S, F>(&mut self, state: &AppState, select: S, on_change: F) -> SubscriptionId
    where
        T: PartialEq + Send + Sync + 'static,
        S: Fn(&AppState) -> T + Send + Sync + 'static,
        F: FnMut(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let last = select(state);
        self.entries.push((id, Box::new(SliceSubscription { select, last, on_change })));
        id
    }

    pub(super) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(super) fn notify(&mut self, state: &AppState) {
        for (_, subscription) in &mut self.entries {
            subscription.notify_if_changed(state);
        }
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }
}

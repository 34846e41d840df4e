//! Dashboard side panel.
//!
//! Reads everything from `AppStore` and writes back through `StoreAction`,
//! except food search, which needs the store's request bookkeeping directly.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use super::search::{self, SearchPanel};
use crate::store::model::{AppState, AppStats, DailyTotals, NewFoodDetection, NutritionEntry, UserIdentity};
use crate::store::{AppStore, StoreAction, date_for, now_millis, selectors, timestamp_for};

const PANEL_WIDTH: f32 = 300.0;
const HISTORY_ROWS: usize = 8;
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);

/// Food name, confidence, estimated grams, calories.
const SAMPLE_DETECTIONS: &[(&str, f64, f64, f64)] = &[
    ("Grilled salmon", 0.94, 180.0, 367.0),
    ("Caesar salad", 0.88, 220.0, 330.0),
    ("Banana", 0.97, 120.0, 107.0),
];

pub fn dashboard_panel(
    mut commands: Commands,
    mut contexts: EguiContexts,
    mut store: ResMut<AppStore>,
    mut panel: ResMut<SearchPanel>,
    mut next_detection: Local<usize>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    egui::SidePanel::right("dashboard")
        .resizable(false)
        .exact_width(PANEL_WIDTH)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                account_section(ui, &mut commands, store.state());
                ui.separator();
                totals_section(ui, store.state().daily_totals());
                ui.separator();
                stats_section(ui, store.state().stats());
                ui.separator();
                search_section(ui, &mut commands, &mut store, &mut panel);
                ui.separator();
                history_section(ui, store.state());
                ui.separator();
                actions_section(ui, &mut commands, store.state(), &mut next_detection);
            });
        });
}

fn account_section(ui: &mut egui::Ui, commands: &mut Commands, state: &AppState) {
    ui.horizontal(|ui| match state.user() {
        Some(user) if state.is_authenticated() => {
            ui.label(format!("Signed in as {}", user.name));
            if ui.small_button("Sign out").clicked() {
                commands.trigger(StoreAction::SetUser(None));
            }
        }
        _ => {
            ui.label("Guest");
            if ui.small_button("Sign in (demo)").clicked() {
                commands.trigger(StoreAction::SetUser(Some(UserIdentity::new("demo", "Demo User"))));
            }
        }
    });
}

fn totals_section(ui: &mut egui::Ui, totals: DailyTotals) {
    ui.heading("Today");
    egui::Grid::new("daily_totals").num_columns(2).show(ui, |ui| {
        ui.label("Calories");
        ui.label(format!("{:.0} kcal", totals.calories));
        ui.end_row();
        ui.label("Protein");
        ui.label(format!("{:.1} g", totals.protein));
        ui.end_row();
        ui.label("Carbs");
        ui.label(format!("{:.1} g", totals.carbs));
        ui.end_row();
        ui.label("Fat");
        ui.label(format!("{:.1} g", totals.fat));
        ui.end_row();
    });
}

fn stats_section(ui: &mut egui::Ui, stats: &AppStats) {
    ui.heading("Stats");
    egui::Grid::new("app_stats").num_columns(2).show(ui, |ui| {
        ui.label("Detections");
        ui.label(stats.total_detections.to_string());
        ui.end_row();
        ui.label("Searches");
        ui.label(stats.total_searches.to_string());
        ui.end_row();
        ui.label("API calls");
        ui.label(format!(
            "vision {} · nutrition {} · ai {}",
            stats.api_calls.vision, stats.api_calls.nutrition, stats.api_calls.ai
        ));
        ui.end_row();
        ui.label("Monthly savings");
        ui.label(format!("${:.0}", stats.monthly_savings));
        ui.end_row();
    });
}

fn search_section(ui: &mut egui::Ui, commands: &mut Commands, store: &mut AppStore, panel: &mut SearchPanel) {
    ui.heading("Food search");
    let mut submit: Option<String> = None;
    ui.horizontal(|ui| {
        let response = ui.text_edit_singleline(&mut panel.query);
        let entered = response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
        let button = ui.add_enabled(!store.state().is_loading(), egui::Button::new("Search"));
        if entered || button.clicked() {
            submit = Some(panel.query.clone());
        }
    });

    let recent = store.select(selectors::recent_searches);
    if !recent.is_empty() {
        ui.horizontal_wrapped(|ui| {
            for query in recent {
                if ui.small_button(query.as_str()).clicked() {
                    panel.query = query.clone();
                    submit = Some(query);
                }
            }
        });
    }

    if let Some(query) = submit {
        panel.result = store.run_request(|| search::lookup(&query));
        if panel.result.is_some() {
            store.add_recent_search(query.trim());
        }
    }

    if store.state().is_loading() {
        ui.spinner();
    }
    if let Some(error) = store.state().error() {
        ui.colored_label(ERROR_COLOR, error);
    }
    if let Some(product) = &panel.result {
        ui.label(format!(
            "{}: {:.0} kcal · P {:.1} g · C {:.1} g · F {:.1} g per 100 g",
            product.name, product.calories, product.protein, product.carbohydrates, product.fat
        ));
        if ui.button("Add to today").clicked() {
            commands.trigger(StoreAction::AddNutritionEntry(product.to_entry(date_for(now_millis()))));
        }
    }
}

fn history_section(ui: &mut egui::Ui, state: &AppState) {
    ui.heading("Meals");
    if state.nutrition_history().is_empty() {
        ui.weak("Nothing logged yet");
    }
    for entry in state.nutrition_history().iter().take(HISTORY_ROWS) {
        ui.label(format!("{} · {:.0} kcal · {}", entry.name, entry.calories, entry.date));
    }

    ui.heading("Detections");
    if state.recent_detections().is_empty() {
        ui.weak("No photos scanned yet");
    }
    for detection in state.recent_detections().iter().take(HISTORY_ROWS) {
        ui.label(format!(
            "{} · {:.0}% · {:.0} kcal",
            detection.food_name,
            detection.confidence * 100.0,
            detection.calories
        ));
    }
}

fn actions_section(ui: &mut egui::Ui, commands: &mut Commands, state: &AppState, next_detection: &mut usize) {
    ui.heading("Actions");
    ui.horizontal_wrapped(|ui| {
        if ui.button("Sample detection").clicked() {
            commands.trigger(StoreAction::AddFoodDetection(sample_detection(*next_detection, now_millis())));
            *next_detection += 1;
        }
        if ui.button("Recalculate today").clicked() {
            let today = date_for(now_millis());
            commands.trigger(StoreAction::UpdateDailyNutrition(totals_for_day(
                state.nutrition_history().iter(),
                &today,
            )));
        }
        let theme_label = if state.theme().is_dark() { "Light theme" } else { "Dark theme" };
        if ui.button(theme_label).clicked() {
            commands.trigger(StoreAction::ToggleTheme);
        }
        if ui.button("Clear history").clicked() {
            commands.trigger(StoreAction::ClearHistory);
        }
        if ui.button("Reset").clicked() {
            commands.trigger(StoreAction::Reset);
        }
    });
}

fn sample_detection(index: usize, millis: u64) -> NewFoodDetection {
    let (food_name, confidence, estimated_weight, calories) = SAMPLE_DETECTIONS[index % SAMPLE_DETECTIONS.len()];
    NewFoodDetection {
        food_name: food_name.to_string(),
        confidence,
        estimated_weight,
        calories,
        timestamp: timestamp_for(millis),
        image_url: None,
    }
}

fn totals_for_day<'a>(entries: impl Iterator<Item = &'a NutritionEntry>, date: &str) -> DailyTotals {
    entries
        .filter(|entry| entry.date == date)
        .fold(DailyTotals::default(), |mut totals, entry| {
            totals.calories += entry.calories;
            totals.protein += entry.protein;
            totals.carbs += entry.carbohydrates;
            totals.fat += entry.fat;
            totals
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, calories: f64) -> NutritionEntry {
        NutritionEntry {
            id: format!("{date}-{calories}"),
            name: "Rice".into(),
            calories,
            protein: 3.0,
            carbohydrates: 28.0,
            fat: 0.5,
            weight: 100.0,
            date: date.into(),
        }
    }

    #[test]
    fn totals_only_count_the_given_day() {
        let entries = [entry("2026-10-18", 130.0), entry("2026-10-17", 500.0), entry("2026-10-18", 70.0)];
        let totals = totals_for_day(entries.iter(), "2026-10-18");

        assert_eq!(totals.calories, 200.0);
        assert_eq!(totals.carbs, 56.0);
        assert_eq!(totals.fat, 1.0);
    }

    #[test]
    fn sample_detections_cycle() {
        let first = sample_detection(0, 0);
        let wrapped = sample_detection(SAMPLE_DETECTIONS.len(), 0);

        assert_eq!(first.food_name, wrapped.food_name);
        assert_eq!(first.timestamp, "1970-01-01T00:00:00.000Z");
    }
}

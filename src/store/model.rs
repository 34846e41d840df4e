//! Application state and the records it holds.

use serde::{Deserialize, Serialize};

use super::history::BoundedHistory;

pub mod constants {
    pub const RECENT_SEARCHES_CAPACITY: usize = 10;
    pub const NUTRITION_HISTORY_CAPACITY: usize = 50;
    pub const RECENT_DETECTIONS_CAPACITY: usize = 20;
    pub const DEFAULT_MONTHLY_SAVINGS: f64 = 3540.0;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), email: None, avatar: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionEntry {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub weight: f64,
    pub date: String,
}

/// A nutrition entry before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewNutritionEntry {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub weight: f64,
    pub date: String,
}

impl NewNutritionEntry {
    pub(super) fn with_id(self, id: String) -> NutritionEntry {
        NutritionEntry {
            id,
            name: self.name,
            calories: self.calories,
            protein: self.protein,
            carbohydrates: self.carbohydrates,
            fat: self.fat,
            weight: self.weight,
            date: self.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodDetection {
    pub id: String,
    pub food_name: String,
    /// Always within [0, 1].
    pub confidence: f64,
    pub estimated_weight: f64,
    pub calories: f64,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewFoodDetection {
    pub food_name: String,
    pub confidence: f64,
    pub estimated_weight: f64,
    pub calories: f64,
    pub timestamp: String,
    pub image_url: Option<String>,
}

impl NewFoodDetection {
    pub(super) fn with_id(self, id: String) -> FoodDetection {
        FoodDetection {
            id,
            food_name: self.food_name,
            confidence: self.confidence.clamp(0.0, 1.0),
            estimated_weight: self.estimated_weight,
            calories: self.calories,
            timestamp: self.timestamp,
            image_url: self.image_url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl DailyTotals {
    pub(super) fn add_entry(&mut self, entry: &NutritionEntry) {
        self.calories += entry.calories;
        self.protein += entry.protein;
        self.carbs += entry.carbohydrates;
        self.fat += entry.fat;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiCalls {
    pub vision: u64,
    pub nutrition: u64,
    pub ai: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStats {
    pub total_detections: u64,
    pub total_searches: u64,
    pub monthly_savings: f64,
    pub api_calls: ApiCalls,
}

impl Default for AppStats {
    fn default() -> Self {
        Self {
            total_detections: 0,
            total_searches: 0,
            monthly_savings: constants::DEFAULT_MONTHLY_SAVINGS,
            api_calls: ApiCalls::default(),
        }
    }
}

/// Shallow patch for `AppStats`; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatsUpdate {
    pub total_detections: Option<u64>,
    pub total_searches: Option<u64>,
    pub monthly_savings: Option<f64>,
    pub api_calls: Option<ApiCalls>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

/// Everything the store holds. Fields are only written by `AppStore` actions.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub(super) user: Option<UserIdentity>,
    pub(super) is_authenticated: bool,
    pub(super) recent_searches: BoundedHistory<String>,
    pub(super) nutrition_history: BoundedHistory<NutritionEntry>,
    pub(super) recent_detections: BoundedHistory<FoodDetection>,
    pub(super) daily_totals: DailyTotals,
    pub(super) stats: AppStats,
    pub(super) is_loading: bool,
    pub(super) error: Option<String>,
    pub(super) theme: Theme,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            recent_searches: BoundedHistory::new(constants::RECENT_SEARCHES_CAPACITY),
            nutrition_history: BoundedHistory::new(constants::NUTRITION_HISTORY_CAPACITY),
            recent_detections: BoundedHistory::new(constants::RECENT_DETECTIONS_CAPACITY),
            daily_totals: DailyTotals::default(),
            stats: AppStats::default(),
            is_loading: false,
            error: None,
            theme: Theme::Light,
        }
    }
}

impl AppState {
    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn recent_searches(&self) -> &BoundedHistory<String> {
        &self.recent_searches
    }

    pub fn nutrition_history(&self) -> &BoundedHistory<NutritionEntry> {
        &self.nutrition_history
    }

    pub fn recent_detections(&self) -> &BoundedHistory<FoodDetection> {
        &self.recent_detections
    }

    pub fn daily_totals(&self) -> DailyTotals {
        self.daily_totals
    }

    pub fn stats(&self) -> &AppStats {
        &self.stats
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }
}

//! Food lookup against a bundled sample catalogue.
//!
//! Answers arrive in the backend's `{ success, product | error }` envelope so
//! the dashboard goes through the same decode and request bookkeeping it
//! would use against the live nutrition service.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::store::ApiEnvelope;
use crate::store::model::NewNutritionEntry;

/// Name and per-100 g values.
const SAMPLE_PRODUCTS: &[(&str, f64, f64, f64, f64)] = &[
    ("Chicken breast", 165.0, 31.0, 0.0, 3.6),
    ("Oatmeal", 68.0, 2.4, 12.0, 1.4),
    ("Avocado", 160.0, 2.0, 9.0, 15.0),
];
const SERVING_GRAMS: f64 = 100.0;

#[derive(Resource, Default)]
pub struct SearchPanel {
    pub query: String,
    pub result: Option<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
}
impl Product {
    pub fn to_entry(&self, date: String) -> NewNutritionEntry {
        NewNutritionEntry {
            name: self.name.clone(),
            calories: self.calories,
            protein: self.protein,
            carbohydrates: self.carbohydrates,
            fat: self.fat,
            weight: SERVING_GRAMS,
            date,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductLookup {
    #[serde(default)]
    product: Option<Product>,
}

fn sample_response(query: &str) -> String {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return json!({ "success": false, "error": "Enter a food to search for" }).to_string();
    }
    let found = SAMPLE_PRODUCTS
        .iter()
        .find(|(name, ..)| name.to_lowercase().contains(&needle));
    let response = match found {
        Some(&(name, calories, protein, carbohydrates, fat)) => json!({
            "success": true,
            "product": { "name": name, "calories": calories, "protein": protein, "carbohydrates": carbohydrates, "fat": fat }
        }),
        None => json!({ "success": false, "error": format!("No product matches '{}'", query.trim()) }),
    };
    response.to_string()
}

pub fn lookup(query: &str) -> Result<Product, String> {
    let envelope: ApiEnvelope<ProductLookup> =
        serde_json::from_str(&sample_response(query)).map_err(|e| e.to_string())?;
    envelope
        .into_result()?
        .product
        .ok_or_else(|| "Response carried no product".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_matches_case_insensitive_substrings() {
        let product = lookup("  avo ").unwrap();

        assert_eq!(product.name, "Avocado");
        assert_eq!(product.fat, 15.0);
    }

    #[test]
    fn lookup_reports_backend_errors() {
        assert_eq!(lookup("pizza"), Err("No product matches 'pizza'".to_string()));
        assert_eq!(lookup("   "), Err("Enter a food to search for".to_string()));
    }

    #[test]
    fn product_becomes_one_serving_entry() {
        let entry = lookup("oat").unwrap().to_entry("2026-10-18".into());

        assert_eq!(entry.name, "Oatmeal");
        assert_eq!(entry.weight, SERVING_GRAMS);
        assert_eq!(entry.carbohydrates, 12.0);
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::category::Category;
use crate::models::plan::MealSlot;

/// Atwater factors.
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Calories from macro grams via the 4/4/9 rule.
#[inline]
pub fn kcal_from_macros(protein: f64, carbs: f64, fat: f64) -> f64 {
    protein * KCAL_PER_GRAM_PROTEIN + carbs * KCAL_PER_GRAM_CARBS + fat * KCAL_PER_GRAM_FAT
}

/// One of the quantities the planner tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Nutrient {
    Protein,
    Carbs,
    Fat,
    Calories,
}

impl Nutrient {
    pub const ALL: [Nutrient; 4] = [
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Fat,
        Nutrient::Calories,
    ];

    pub const MACROS: [Nutrient; 3] = [Nutrient::Protein, Nutrient::Carbs, Nutrient::Fat];

    pub fn label(&self) -> &'static str {
        match self {
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Fat => "fat",
            Nutrient::Calories => "calories",
        }
    }
}

/// Grams of protein/carbs/fat plus kcal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub calories: f64,
}

impl Macros {
    pub fn new(protein: f64, carbs: f64, fat: f64, calories: f64) -> Self {
        Self {
            protein,
            carbs,
            fat,
            calories,
        }
    }

    /// Build from macro grams, deriving calories via 4/4/9.
    pub fn from_grams(protein: f64, carbs: f64, fat: f64) -> Self {
        Self::new(protein, carbs, fat, kcal_from_macros(protein, carbs, fat))
    }

    #[inline]
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fat => self.fat,
            Nutrient::Calories => self.calories,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        match nutrient {
            Nutrient::Protein => self.protein = value,
            Nutrient::Carbs => self.carbs = value,
            Nutrient::Fat => self.fat = value,
            Nutrient::Calories => self.calories = value,
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.protein * factor,
            self.carbs * factor,
            self.fat * factor,
            self.calories * factor,
        )
    }

    pub fn plus(&self, other: &Macros) -> Self {
        Self::new(
            self.protein + other.protein,
            self.carbs + other.carbs,
            self.fat + other.fat,
            self.calories + other.calories,
        )
    }

    /// Element-wise maximum.
    pub fn max_each(&self, other: &Macros) -> Self {
        Self::new(
            self.protein.max(other.protein),
            self.carbs.max(other.carbs),
            self.fat.max(other.fat),
            self.calories.max(other.calories),
        )
    }

    pub fn is_zero(&self) -> bool {
        Nutrient::ALL.iter().all(|n| self.get(*n) == 0.0)
    }
}

/// A named household serving, e.g. "1 slice" at 0.3x the base quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonServing {
    pub quantity: f64,
    pub display_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingInfo {
    #[serde(default = "default_base_unit")]
    pub base_unit: String,

    #[serde(default = "default_base_quantity")]
    pub base_quantity: f64,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub common_servings: Vec<CommonServing>,
}

fn default_base_unit() -> String {
    "g".to_string()
}

fn default_base_quantity() -> f64 {
    100.0
}

impl Default for ServingInfo {
    fn default() -> Self {
        Self {
            base_unit: default_base_unit(),
            base_quantity: default_base_quantity(),
            display_name: String::new(),
            common_servings: Vec::new(),
        }
    }
}

/// Serving bounds as multiples of the base quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingConstraints {
    pub min_serving: f64,
    pub max_serving: f64,
    #[serde(default)]
    pub increment: Option<f64>,
}

impl Default for ServingConstraints {
    fn default() -> Self {
        Self {
            min_serving: 0.5,
            max_serving: 3.0,
            increment: None,
        }
    }
}

impl ServingConstraints {
    pub fn is_valid(&self) -> bool {
        self.min_serving > 0.0
            && self.min_serving <= self.max_serving
            && self.max_serving.is_finite()
            && self.increment.is_none_or(|inc| inc > 0.0 && inc.is_finite())
    }

    /// Increment if one is set and usable.
    pub fn step(&self) -> Option<f64> {
        self.increment.filter(|inc| *inc > 0.0)
    }
}

/// 0-10 score per meal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealSuitability {
    #[serde(default)]
    pub breakfast: u8,
    #[serde(default)]
    pub lunch: u8,
    #[serde(default)]
    pub dinner: u8,
    #[serde(default)]
    pub snack: u8,
}

impl MealSuitability {
    pub fn score(&self, slot: MealSlot) -> u8 {
        match slot {
            MealSlot::Breakfast => self.breakfast,
            MealSlot::Lunch => self.lunch,
            MealSlot::Snack => self.snack,
            MealSlot::Dinner => self.dinner,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietaryFlags {
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_gluten_free: bool,
    #[serde(default)]
    pub is_lactose_free: bool,
    #[serde(default)]
    pub contains_gluten: bool,
    #[serde(default)]
    pub contains_lactose: bool,
}

/// Food as stored: macros are flat fields, categories are raw tag strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecord {
    pub id: String,
    pub name: String,

    /// Missing calories are derived from macros.
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,

    #[serde(default)]
    pub serving_info: ServingInfo,
    #[serde(default)]
    pub constraints: ServingConstraints,
    #[serde(default)]
    pub meal_suitability: MealSuitability,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub dietary_flags: DietaryFlags,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// A catalog food with macros per base serving.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: String,
    pub name: String,
    pub macros: Macros,
    pub serving: ServingInfo,
    pub constraints: ServingConstraints,
    pub suitability: MealSuitability,
    pub categories: BTreeSet<Category>,
    pub flags: DietaryFlags,
    pub is_active: bool,
}

impl From<FoodRecord> for Food {
    fn from(record: FoodRecord) -> Self {
        let mut categories = BTreeSet::new();
        for tag in &record.categories {
            match Category::from_tag(tag) {
                Some(category) => {
                    categories.insert(category);
                }
                None => debug!(food = %record.id, tag = %tag, "ignoring unknown category tag"),
            }
        }

        let calories = record
            .calories
            .unwrap_or_else(|| kcal_from_macros(record.protein, record.carbs, record.fat));

        let mut serving = record.serving_info;
        if serving.display_name.is_empty() {
            serving.display_name = record.name.to_lowercase();
        }

        Food {
            id: record.id,
            name: record.name,
            macros: Macros::new(record.protein, record.carbs, record.fat, calories),
            serving,
            constraints: record.constraints,
            suitability: record.meal_suitability,
            categories,
            flags: record.dietary_flags,
            is_active: record.is_active,
        }
    }
}

impl Food {
    #[inline]
    pub fn per_base(&self, nutrient: Nutrient) -> f64 {
        self.macros.get(nutrient)
    }

    /// Macros contributed at `quantity` base servings.
    pub fn provides(&self, quantity: f64) -> Macros {
        self.macros.scaled(quantity)
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    pub fn has_any(&self, categories: &[Category]) -> bool {
        categories.iter().any(|c| self.categories.contains(c))
    }

    pub fn suitability_for(&self, slot: MealSlot) -> u8 {
        self.suitability.score(slot)
    }

    pub fn is_vegan_safe(&self) -> bool {
        self.flags.is_vegan || self.has_category(Category::SafeVegan)
    }

    /// Vegan foods are vegetarian-safe too.
    pub fn is_vegetarian_safe(&self) -> bool {
        self.flags.is_vegetarian || self.has_category(Category::SafeVegetarian) || self.is_vegan_safe()
    }

    pub fn contains_gluten(&self) -> bool {
        self.flags.contains_gluten || self.has_category(Category::ContainsGluten)
    }

    pub fn contains_lactose(&self) -> bool {
        self.flags.contains_lactose || self.has_category(Category::ContainsLactose)
    }

    pub fn is_legume(&self) -> bool {
        self.has_category(Category::Legume) || self.has_category(Category::LegumesLunch)
    }

    /// Non-negative finite macros and sane serving bounds.
    pub fn is_valid(&self) -> bool {
        Nutrient::ALL
            .iter()
            .all(|n| self.macros.get(*n) >= 0.0 && self.macros.get(*n).is_finite())
            && self.constraints.is_valid()
            && self.serving.base_quantity > 0.0
            && self.suitability.breakfast <= 10
            && self.suitability.lunch <= 10
            && self.suitability.dinner <= 10
            && self.suitability.snack <= 10
    }

    /// Debug string for logging.
    pub fn debug_string(&self) -> String {
        format!(
            "{} [{}]: {} kcal, P:{} C:{} F:{} per {} {}",
            self.name,
            self.id,
            self.macros.calories,
            self.macros.protein,
            self.macros.carbs,
            self.macros.fat,
            self.serving.base_quantity,
            self.serving.base_unit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> FoodRecord {
        serde_json::from_str(
            r#"{
                "id": "f-oats",
                "name": "Oats",
                "protein": 13.0,
                "carbs": 60.0,
                "fat": 7.0,
                "servingInfo": {"baseUnit": "g", "baseQuantity": 100},
                "constraints": {"minServing": 0.3, "maxServing": 1.2, "increment": 0.1},
                "mealSuitability": {"breakfast": 9, "snack": 5},
                "categories": ["carbs_breakfast", "safe_vegan", "gluten", "mystery_tag"]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_record_conversion_maps_tags() {
        let food = Food::from(sample_record());
        assert!(food.has_category(Category::CarbsBreakfast));
        assert!(food.has_category(Category::SafeVegan));
        assert!(food.has_category(Category::ContainsGluten));
        assert_eq!(food.categories.len(), 3);
        assert!(food.is_active);
    }

    #[test]
    fn test_missing_calories_derived() {
        let food = Food::from(sample_record());
        assert!((food.macros.calories - (13.0 * 4.0 + 60.0 * 4.0 + 7.0 * 9.0)).abs() < 1e-9);
    }

    #[test]
    fn test_display_name_defaults_to_name() {
        let food = Food::from(sample_record());
        assert_eq!(food.serving.display_name, "oats");
    }

    #[test]
    fn test_dietary_markers() {
        let food = Food::from(sample_record());
        assert!(food.is_vegan_safe());
        assert!(food.is_vegetarian_safe());
        assert!(food.contains_gluten());
        assert!(!food.contains_lactose());
    }

    #[test]
    fn test_is_valid() {
        let food = Food::from(sample_record());
        assert!(food.is_valid());

        let mut invalid = food.clone();
        invalid.constraints.min_serving = 2.0;
        assert!(!invalid.is_valid());

        let mut negative = food;
        negative.macros.fat = -1.0;
        assert!(!negative.is_valid());
    }

    #[test]
    fn test_provides_scales_all_nutrients() {
        let food = Food::from(sample_record());
        let half = food.provides(0.5);
        assert!((half.protein - 6.5).abs() < 1e-9);
        assert!((half.carbs - 30.0).abs() < 1e-9);
        assert!((half.calories - food.macros.calories / 2.0).abs() < 1e-9);
    }
}

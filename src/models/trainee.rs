use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};
use crate::models::food::kcal_from_macros;
use crate::models::plan::MealSlot;

/// Targets as supplied by the caller; any field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTargets {
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
}

/// Validated daily macro targets in grams and kcal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTargets {
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub total_calories: f64,
}

fn check_amount(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(PlanError::InvalidTargets(format!("{} is not a number", name)));
    }
    if value < 0.0 {
        return Err(PlanError::InvalidTargets(format!(
            "{} must not be negative (got {})",
            name, value
        )));
    }
    Ok(value)
}

impl DailyTargets {
    /// Calories default to 4/4/9 of the macros when not supplied.
    pub fn new(protein: f64, carbs: f64, fat: f64, calories: Option<f64>) -> Result<Self> {
        let total_protein = check_amount("protein", protein)?;
        let total_carbs = check_amount("carbs", carbs)?;
        let total_fat = check_amount("fat", fat)?;
        let total_calories = match calories {
            Some(kcal) => check_amount("calories", kcal)?,
            None => kcal_from_macros(total_protein, total_carbs, total_fat),
        };

        Ok(Self {
            total_protein,
            total_carbs,
            total_fat,
            total_calories,
        })
    }

    /// Re-check values; fields are public so a caller may have edited them.
    pub fn validate(&self) -> Result<()> {
        check_amount("protein", self.total_protein)?;
        check_amount("carbs", self.total_carbs)?;
        check_amount("fat", self.total_fat)?;
        check_amount("calories", self.total_calories)?;
        Ok(())
    }
}

impl TryFrom<RawTargets> for DailyTargets {
    type Error = PlanError;

    fn try_from(raw: RawTargets) -> Result<Self> {
        let missing = |name: &str| PlanError::InvalidTargets(format!("{} is missing", name));
        DailyTargets::new(
            raw.protein.ok_or_else(|| missing("protein"))?,
            raw.carbs.ok_or_else(|| missing("carbs"))?,
            raw.fat.ok_or_else(|| missing("fat"))?,
            raw.calories,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
    pub gluten_sensitive: bool,
    #[serde(default)]
    pub lactose_sensitive: bool,
}

impl Preferences {
    /// Vegan trainees get vegetarian handling as well.
    pub fn is_plant_based(&self) -> bool {
        self.is_vegetarian || self.is_vegan
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkoutTime {
    Morning,
    Noon,
    Evening,
}

impl WorkoutTime {
    /// The meal that follows the workout.
    pub fn recovery_meal(&self) -> MealSlot {
        match self {
            WorkoutTime::Morning => MealSlot::Breakfast,
            WorkoutTime::Noon => MealSlot::Lunch,
            WorkoutTime::Evening => MealSlot::Dinner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanContext {
    #[serde(default)]
    pub is_training_day: bool,
    #[serde(default)]
    pub workout_time: Option<WorkoutTime>,
    #[serde(default)]
    pub prefer_low_carb_dinner: bool,
    #[serde(default)]
    pub higher_breakfast_protein: bool,
    /// Slots to plan, in order. Empty means all four.
    #[serde(default)]
    pub meals: Vec<MealSlot>,
}

impl Default for PlanContext {
    fn default() -> Self {
        Self {
            is_training_day: false,
            workout_time: None,
            prefer_low_carb_dinner: false,
            higher_breakfast_protein: false,
            meals: MealSlot::ALL.to_vec(),
        }
    }
}

impl PlanContext {
    /// Included slots, deduplicated, in caller order.
    pub fn included_meals(&self) -> Vec<MealSlot> {
        if self.meals.is_empty() {
            return MealSlot::ALL.to_vec();
        }
        let mut seen = HashSet::new();
        self.meals
            .iter()
            .copied()
            .filter(|slot| seen.insert(*slot))
            .collect()
    }
}

/// Custom gram allocation for one meal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MealGrams {
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

impl MealGrams {
    pub fn new(protein: f64, carbs: f64, fat: f64) -> Self {
        Self { protein, carbs, fat }
    }

    pub fn is_zero(&self) -> bool {
        self.protein <= 0.0 && self.carbs <= 0.0 && self.fat <= 0.0
    }
}

/// Trainee-specified per-meal grams. Absent or all-zero meals use the default split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomSplit {
    pub meals: BTreeMap<MealSlot, MealGrams>,
}

impl CustomSplit {
    pub fn with_meal(mut self, slot: MealSlot, grams: MealGrams) -> Self {
        self.meals.insert(slot, grams);
        self
    }

    /// The allocation for `slot`, if it carries any grams.
    pub fn meal(&self, slot: MealSlot) -> Option<&MealGrams> {
        self.meals.get(&slot).filter(|g| !g.is_zero())
    }

    pub fn is_empty(&self) -> bool {
        self.meals.values().all(MealGrams::is_zero)
    }
}

/// Trainee record as handed over by the storage layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraineeRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub targets: RawTargets,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub disliked_food_ids: Vec<String>,
    #[serde(default)]
    pub custom_split: Option<CustomSplit>,
    #[serde(default)]
    pub context: PlanContext,
}

impl TraineeRecord {
    pub fn excluded_ids(&self) -> HashSet<String> {
        self.disliked_food_ids.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calories_derived_when_missing() {
        let targets = DailyTargets::new(120.0, 150.0, 50.0, None).unwrap();
        assert!((targets.total_calories - 1530.0).abs() < 1e-9);
    }

    #[test]
    fn test_supplied_calories_kept() {
        let targets = DailyTargets::new(120.0, 150.0, 50.0, Some(1600.0)).unwrap();
        assert!((targets.total_calories - 1600.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_macro_is_invalid() {
        let raw = RawTargets {
            protein: Some(100.0),
            carbs: None,
            fat: Some(40.0),
            calories: None,
        };
        let err = DailyTargets::try_from(raw).unwrap_err();
        assert!(matches!(err, PlanError::InvalidTargets(ref msg) if msg.contains("carbs")));
    }

    #[test]
    fn test_non_finite_or_negative_is_invalid() {
        assert!(DailyTargets::new(f64::NAN, 100.0, 40.0, None).is_err());
        assert!(DailyTargets::new(100.0, -5.0, 40.0, None).is_err());
        assert!(DailyTargets::new(100.0, 100.0, 40.0, Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_included_meals_dedupes() {
        let context = PlanContext {
            meals: vec![MealSlot::Dinner, MealSlot::Breakfast, MealSlot::Dinner],
            ..Default::default()
        };
        assert_eq!(
            context.included_meals(),
            vec![MealSlot::Dinner, MealSlot::Breakfast]
        );

        let all = PlanContext {
            meals: Vec::new(),
            ..Default::default()
        };
        assert_eq!(all.included_meals().len(), 4);
    }

    #[test]
    fn test_custom_split_zero_meal_ignored() {
        let split = CustomSplit::default()
            .with_meal(MealSlot::Breakfast, MealGrams::new(30.0, 40.0, 10.0))
            .with_meal(MealSlot::Lunch, MealGrams::default());
        assert!(split.meal(MealSlot::Breakfast).is_some());
        assert!(split.meal(MealSlot::Lunch).is_none());
        assert!(!split.is_empty());
        assert!(CustomSplit::default().is_empty());
    }

    #[test]
    fn test_trainee_record_parses() {
        let record: TraineeRecord = serde_json::from_str(
            r#"{
                "name": "Dana",
                "targets": {"protein": 120, "carbs": 150, "fat": 50},
                "preferences": {"isVegetarian": true},
                "dislikedFoodIds": ["f-tuna"],
                "customSplit": {"breakfast": {"protein": 30, "carbs": 40, "fat": 12}},
                "context": {"isTrainingDay": true, "workoutTime": "evening", "meals": ["breakfast", "lunch"]}
            }"#,
        )
        .unwrap();
        assert!(record.preferences.is_vegetarian);
        assert!(record.excluded_ids().contains("f-tuna"));
        assert_eq!(record.context.workout_time, Some(WorkoutTime::Evening));
        assert!(record.custom_split.unwrap().meal(MealSlot::Breakfast).is_some());
    }
}

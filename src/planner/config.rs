use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{MacroShares, MealSlot, Nutrient};
use crate::planner::constants::*;

/// Ceilings per nutrient plus the pre-fit safety shrink for one meal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToleranceProfile {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub calories: f64,
    pub safety: f64,
}

impl Default for ToleranceProfile {
    fn default() -> Self {
        Self {
            protein: DEFAULT_CEILING,
            carbs: DEFAULT_CEILING,
            fat: DEFAULT_CEILING,
            calories: DEFAULT_CEILING,
            safety: DEFAULT_SAFETY,
        }
    }
}

impl ToleranceProfile {
    pub fn main_meal(safety: f64) -> Self {
        Self {
            protein: MAIN_MEAL_PROTEIN_CEILING,
            carbs: MAIN_MEAL_CARBS_CEILING,
            fat: MAIN_MEAL_FAT_CEILING,
            calories: MAIN_MEAL_CALORIES_CEILING,
            safety,
        }
    }

    pub fn snack() -> Self {
        Self {
            protein: SNACK_PROTEIN_CEILING,
            carbs: SNACK_CARBS_CEILING,
            fat: SNACK_FAT_CEILING,
            calories: SNACK_CALORIES_CEILING,
            safety: DEFAULT_SAFETY,
        }
    }

    pub fn ceiling(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fat => self.fat,
            Nutrient::Calories => self.calories,
        }
    }
}

/// Per-meal tolerance profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealTolerances {
    pub breakfast: ToleranceProfile,
    pub lunch: ToleranceProfile,
    pub snack: ToleranceProfile,
    pub dinner: ToleranceProfile,
}

impl Default for MealTolerances {
    fn default() -> Self {
        Self {
            breakfast: ToleranceProfile::default(),
            lunch: ToleranceProfile::main_meal(LUNCH_SAFETY),
            snack: ToleranceProfile::snack(),
            dinner: ToleranceProfile::main_meal(DEFAULT_SAFETY),
        }
    }
}

impl MealTolerances {
    pub fn for_slot(&self, slot: MealSlot) -> &ToleranceProfile {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Snack => &self.snack,
            MealSlot::Dinner => &self.dinner,
        }
    }
}

/// What happens to meals left unset by a partial custom split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResidualPolicy {
    /// Unset meals keep their default shares; day totals may drift from 1.0.
    #[default]
    KeepDefaults,
    /// Unset meals share whatever the custom meals left, weighted by their default shares.
    Renormalize,
}

/// Every tunable the planner reads. Missing fields fall back to the constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerConfig {
    pub suitability_threshold: u8,
    pub max_options: usize,
    pub tolerances: MealTolerances,
    pub top_up_tolerance: f64,
    /// Cap on the share of a meal target reserved for later groups.
    pub holdback_limit: f64,
    pub context_nudge: f64,
    pub residual_policy: ResidualPolicy,
    pub default_split: BTreeMap<MealSlot, MacroShares>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            suitability_threshold: DEFAULT_SUITABILITY_THRESHOLD,
            max_options: DEFAULT_MAX_OPTIONS,
            tolerances: MealTolerances::default(),
            top_up_tolerance: TOP_UP_TOLERANCE,
            holdback_limit: HOLDBACK_LIMIT,
            context_nudge: CONTEXT_NUDGE,
            residual_policy: ResidualPolicy::default(),
            default_split: DEFAULT_SPLIT.clone(),
        }
    }
}

impl PlannerConfig {
    /// Default share for a meal; zero if the table lacks the slot.
    pub fn default_share(&self, slot: MealSlot) -> MacroShares {
        self.default_split.get(&slot).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles() {
        let tolerances = MealTolerances::default();
        assert_eq!(tolerances.breakfast.protein, DEFAULT_CEILING);
        assert_eq!(tolerances.lunch.safety, 1.0);
        assert_eq!(tolerances.dinner.safety, DEFAULT_SAFETY);
        assert_eq!(tolerances.lunch.ceiling(Nutrient::Fat), 1.08);
        assert_eq!(tolerances.snack.ceiling(Nutrient::Protein), 1.03);
        assert_eq!(tolerances.snack.ceiling(Nutrient::Calories), 1.04);
    }

    #[test]
    fn test_partial_config_json_uses_defaults() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"suitabilityThreshold": 4, "residualPolicy": "renormalize"}"#)
                .unwrap();
        assert_eq!(config.suitability_threshold, 4);
        assert_eq!(config.residual_policy, ResidualPolicy::Renormalize);
        assert_eq!(config.max_options, DEFAULT_MAX_OPTIONS);
        assert_eq!(config.tolerances, MealTolerances::default());
        assert_eq!(config.default_split.len(), 4);
    }
}

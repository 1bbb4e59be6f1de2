use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::models::{MacroShares, MealSlot};

/// Minimum meal-suitability score (0-10) for a food to be offered in a meal.
pub const DEFAULT_SUITABILITY_THRESHOLD: u8 = 6;

/// Options kept per group after ranking.
pub const DEFAULT_MAX_OPTIONS: usize = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance ceilings (achieved / target)
// ─────────────────────────────────────────────────────────────────────────────

/// Ceiling used for every nutrient unless a meal overrides it.
pub const DEFAULT_CEILING: f64 = 1.005;

pub const MAIN_MEAL_PROTEIN_CEILING: f64 = 1.04;
pub const MAIN_MEAL_CARBS_CEILING: f64 = 1.06;
pub const MAIN_MEAL_FAT_CEILING: f64 = 1.08;
pub const MAIN_MEAL_CALORIES_CEILING: f64 = 1.04;

pub const SNACK_PROTEIN_CEILING: f64 = 1.03;
pub const SNACK_CARBS_CEILING: f64 = 1.06;
pub const SNACK_FAT_CEILING: f64 = 1.07;
pub const SNACK_CALORIES_CEILING: f64 = 1.04;

/// Pre-shrink applied to a group's sub-target before fitting.
pub const DEFAULT_SAFETY: f64 = 0.97;

/// Lunch fits against the full sub-target.
pub const LUNCH_SAFETY: f64 = 1.0;

/// Ceiling for the one-step top-up pass.
pub const TOP_UP_TOLERANCE: f64 = 1.06;

/// Most of a meal's nutrient target that may be held back for later groups' spill.
pub const HOLDBACK_LIMIT: f64 = 0.5;

// ─────────────────────────────────────────────────────────────────────────────
// Quantity fitting
// ─────────────────────────────────────────────────────────────────────────────

/// Floor step for foods without an explicit increment.
pub const QUANTITY_STEP: f64 = 0.05;

/// A common serving within this distance of the fitted quantity supplies the display text.
pub const COMMON_SERVING_SNAP: f64 = 0.1;

/// Float slack for bound comparisons.
pub const EPSILON: f64 = 1e-9;

/// Bounded share nudge applied by context flags (0.10 = ±10%).
pub const CONTEXT_NUDGE: f64 = 0.10;

/// Default per-meal share of each daily macro. Every macro sums to 1.0.
pub static DEFAULT_SPLIT: LazyLock<BTreeMap<MealSlot, MacroShares>> = LazyLock::new(|| {
    let mut m = BTreeMap::new();
    m.insert(MealSlot::Breakfast, MacroShares::new(0.25, 0.25, 0.25));
    m.insert(MealSlot::Lunch, MacroShares::new(0.35, 0.35, 0.30));
    m.insert(MealSlot::Snack, MacroShares::new(0.10, 0.15, 0.15));
    m.insert(MealSlot::Dinner, MacroShares::new(0.30, 0.25, 0.30));
    m
});

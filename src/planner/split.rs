//! Daily target -> per-meal target allocation.
//!
//! Shares are tracked per macro. Meal calories are never split independently:
//! a meal's calorie share is derived from its macro grams via 4/4/9.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::models::{
    CustomSplit, DailyTargets, MacroShares, Macros, MealSlot, Nutrient, PlanContext, SplitMode,
    SplitPercentages, kcal_from_macros,
};
use crate::planner::config::{PlannerConfig, ResidualPolicy};

/// Split shares plus the absolute per-meal targets they produce.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSplit {
    pub mode: SplitMode,
    pub percentages: SplitPercentages,
    pub targets: BTreeMap<MealSlot, Macros>,
}

impl ResolvedSplit {
    pub fn target(&self, slot: MealSlot) -> Macros {
        self.targets.get(&slot).copied().unwrap_or_default()
    }
}

/// `part / whole`, or 0 when the whole is empty.
#[inline]
fn fraction(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole } else { 0.0 }
}

fn daily_grams(daily: &DailyTargets, nutrient: Nutrient) -> f64 {
    match nutrient {
        Nutrient::Protein => daily.total_protein,
        Nutrient::Carbs => daily.total_carbs,
        Nutrient::Fat => daily.total_fat,
        Nutrient::Calories => daily.total_calories,
    }
}

/// The configured default table for all four meals.
pub fn default_percentages(config: &PlannerConfig) -> SplitPercentages {
    SplitPercentages {
        meals: MealSlot::ALL
            .iter()
            .map(|slot| (*slot, config.default_share(*slot)))
            .collect(),
    }
}

/// Shares derived from a custom gram allocation.
///
/// Each macro is divided by the day's total for that macro independently.
/// Meals with no custom grams use the default share, adjusted per
/// `config.residual_policy`.
pub fn custom_percentages(
    daily: &DailyTargets,
    custom: &CustomSplit,
    config: &PlannerConfig,
) -> SplitPercentages {
    let mut meals = BTreeMap::new();
    let mut unset = Vec::new();

    for slot in MealSlot::ALL {
        match custom.meal(slot) {
            Some(grams) => {
                let shares = MacroShares::new(
                    fraction(grams.protein, daily.total_protein),
                    fraction(grams.carbs, daily.total_carbs),
                    fraction(grams.fat, daily.total_fat),
                );
                meals.insert(slot, shares);
            }
            None => unset.push(slot),
        }
    }

    match config.residual_policy {
        ResidualPolicy::KeepDefaults => {
            for slot in &unset {
                meals.insert(*slot, config.default_share(*slot));
            }
        }
        ResidualPolicy::Renormalize => {
            let mut filled: BTreeMap<MealSlot, MacroShares> =
                unset.iter().map(|s| (*s, MacroShares::default())).collect();
            for nutrient in Nutrient::MACROS {
                let claimed: f64 = meals.values().map(|s| s.get(nutrient)).sum();
                let residual = (1.0 - claimed).max(0.0);
                let default_total: f64 = unset
                    .iter()
                    .map(|s| config.default_share(*s).get(nutrient))
                    .sum();
                for slot in &unset {
                    let weight = fraction(config.default_share(*slot).get(nutrient), default_total);
                    if let Some(shares) = filled.get_mut(slot) {
                        shares.set(nutrient, residual * weight);
                    }
                }
            }
            meals.extend(filled);
        }
    }

    let split = SplitPercentages { meals };
    for nutrient in Nutrient::MACROS {
        let total = split.total(nutrient);
        if daily_grams(daily, nutrient) > 0.0 && (total - 1.0).abs() > 1e-6 {
            warn!(
                nutrient = nutrient.label(),
                total, "custom split shares do not sum to 1.0"
            );
        }
    }
    split
}

/// Drop meals outside `included`, topping the included meals up to the full
/// day in proportion to what they already hold.
///
/// Included meals that already cover the day (a custom split that puts
/// everything in one meal) are left as they are.
pub fn restrict_to_meals(split: &SplitPercentages, included: &[MealSlot]) -> SplitPercentages {
    let mut meals: BTreeMap<MealSlot, MacroShares> = split
        .meals
        .iter()
        .filter(|(slot, _)| included.contains(slot))
        .map(|(slot, shares)| (*slot, *shares))
        .collect();

    if meals.len() == split.meals.len() {
        return split.clone();
    }

    for nutrient in Nutrient::MACROS {
        let kept: f64 = meals.values().map(|s| s.get(nutrient)).sum();
        let dropped = (1.0 - kept).max(0.0);
        if kept <= 0.0 || dropped <= 0.0 {
            continue;
        }
        for shares in meals.values_mut() {
            let value = shares.get(nutrient);
            shares.set(nutrient, value + dropped * value / kept);
        }
    }

    SplitPercentages { meals }
}

/// Scale one meal's share of `nutrient` by `factor`, taking or giving the
/// difference from the other meals proportionally. The day total is unchanged.
pub fn nudge_share(split: &mut SplitPercentages, slot: MealSlot, nutrient: Nutrient, factor: f64) {
    let Some(current) = split.meals.get(&slot).map(|s| s.get(nutrient)) else {
        return;
    };
    let others: f64 = split
        .meals
        .iter()
        .filter(|(s, _)| **s != slot)
        .map(|(_, shares)| shares.get(nutrient))
        .sum();
    if others <= 0.0 {
        return;
    }

    let day_total = current + others;
    let updated = (current * factor).clamp(0.0, day_total);
    let delta = updated - current;

    for (s, shares) in split.meals.iter_mut() {
        let value = shares.get(nutrient);
        if *s == slot {
            shares.set(nutrient, updated);
        } else {
            shares.set(nutrient, (value - delta * value / others).max(0.0));
        }
    }
}

/// Apply the context flags as bounded nudges.
pub fn apply_context(split: &mut SplitPercentages, context: &PlanContext, nudge: f64) {
    if context.higher_breakfast_protein {
        nudge_share(split, MealSlot::Breakfast, Nutrient::Protein, 1.0 + nudge);
    }
    if context.prefer_low_carb_dinner {
        nudge_share(split, MealSlot::Dinner, Nutrient::Carbs, 1.0 - nudge);
    }
    if context.is_training_day {
        if let Some(workout) = context.workout_time {
            nudge_share(split, workout.recovery_meal(), Nutrient::Carbs, 1.0 + nudge);
        }
    }
}

/// Fill in each meal's calorie share from its macro shares.
pub fn derive_calorie_shares(split: &mut SplitPercentages, daily: &DailyTargets) {
    let day_kcal = kcal_from_macros(daily.total_protein, daily.total_carbs, daily.total_fat);
    for shares in split.meals.values_mut() {
        let meal_kcal = kcal_from_macros(
            shares.protein * daily.total_protein,
            shares.carbs * daily.total_carbs,
            shares.fat * daily.total_fat,
        );
        shares.calories = fraction(meal_kcal, day_kcal);
    }
}

/// Absolute per-meal targets.
///
/// Custom mode takes calories from the meal's macros via 4/4/9; auto mode
/// scales the day's calorie target by the meal's calorie share.
pub fn meal_targets(
    daily: &DailyTargets,
    split: &SplitPercentages,
    mode: SplitMode,
) -> BTreeMap<MealSlot, Macros> {
    split
        .meals
        .iter()
        .map(|(slot, shares)| {
            let protein = shares.protein * daily.total_protein;
            let carbs = shares.carbs * daily.total_carbs;
            let fat = shares.fat * daily.total_fat;
            let calories = match mode {
                SplitMode::Custom => kcal_from_macros(protein, carbs, fat),
                SplitMode::Auto => shares.calories * daily.total_calories,
            };
            (*slot, Macros::new(protein, carbs, fat, calories))
        })
        .collect()
}

/// Pick custom or auto, then apply meal inclusion and context nudges.
pub fn resolve_split(
    daily: &DailyTargets,
    custom: Option<&CustomSplit>,
    context: &PlanContext,
    config: &PlannerConfig,
) -> ResolvedSplit {
    let (mode, base) = match custom {
        Some(custom) if !custom.is_empty() => {
            (SplitMode::Custom, custom_percentages(daily, custom, config))
        }
        _ => (SplitMode::Auto, default_percentages(config)),
    };

    let mut percentages = restrict_to_meals(&base, &context.included_meals());
    apply_context(&mut percentages, context, config.context_nudge);
    derive_calorie_shares(&mut percentages, daily);

    let targets = meal_targets(daily, &percentages, mode);

    info!(split_mode = %mode, meals = percentages.meals.len(), "resolved meal split");
    for (slot, target) in &targets {
        debug!(
            meal = %slot,
            protein = target.protein,
            carbs = target.carbs,
            fat = target.fat,
            calories = target.calories,
            "meal target"
        );
    }

    ResolvedSplit {
        mode,
        percentages,
        targets,
    }
}

/// True when every macro's shares sum to 1.0 within float slack.
pub fn is_balanced(split: &SplitPercentages) -> bool {
    Nutrient::MACROS
        .iter()
        .all(|n| (split.total(*n) - 1.0).abs() < 1e-6)
}

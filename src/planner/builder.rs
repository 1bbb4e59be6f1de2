use std::collections::HashSet;

use tracing::info;

use crate::error::Result;
use crate::models::{
    CustomSplit, DailyTargets, Food, MealPlan, PlanContext, PlanMetadata, Preferences,
    TraineeRecord,
};
use crate::planner::assembler::assemble_meal;
use crate::planner::config::PlannerConfig;
use crate::planner::filter::filter_catalog;
use crate::planner::split::resolve_split;

/// Build the full-day plan.
///
/// `foods` is expected to be the filtered catalog; preferences are applied
/// again so no food violating them can be selected. Meals come back in the
/// order of `context.meals`.
///
/// Only invalid targets fail. Meals or groups that cannot be filled are
/// reported inside the plan.
pub fn build_all(
    foods: &[Food],
    daily: &DailyTargets,
    preferences: &Preferences,
    context: &PlanContext,
    custom: Option<&CustomSplit>,
    config: &PlannerConfig,
) -> Result<MealPlan> {
    daily.validate()?;

    let foods = filter_catalog(foods, &HashSet::new(), preferences);
    let split = resolve_split(daily, custom, context, config);

    let meals: Vec<_> = context
        .included_meals()
        .into_iter()
        .map(|slot| assemble_meal(&foods, slot, split.target(slot), preferences, config))
        .collect();

    let populated = meals.iter().filter(|m| m.is_populated()).count();
    info!(
        split_mode = %split.mode,
        meals = meals.len(),
        populated,
        options = meals
            .iter()
            .flat_map(|m| m.groups.iter().chain(m.variants.iter().flat_map(|v| v.groups.iter())))
            .map(|g| g.choices().count())
            .sum::<usize>(),
        "built meal plan"
    );

    Ok(MealPlan {
        meals,
        metadata: PlanMetadata {
            split_mode: split.mode,
            split: split.percentages,
        },
    })
}

/// Validate a stored trainee's targets, drop disliked and unsuitable foods,
/// then plan.
pub fn plan_for_trainee(
    catalog: &[Food],
    trainee: &TraineeRecord,
    config: &PlannerConfig,
) -> Result<MealPlan> {
    let daily = DailyTargets::try_from(trainee.targets)?;
    let foods = filter_catalog(catalog, &trainee.excluded_ids(), &trainee.preferences);

    info!(
        trainee = %trainee.name,
        catalog = catalog.len(),
        eligible = foods.len(),
        "planning for trainee"
    );

    build_all(
        &foods,
        &daily,
        &trainee.preferences,
        &trainee.context,
        trainee.custom_split.as_ref(),
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use crate::models::{FoodRecord, MealSlot, RawTargets, SplitMode};

    fn catalog() -> Vec<Food> {
        let records: Vec<FoodRecord> = serde_json::from_str(
            r#"[
                {"id": "oats", "name": "Oats", "protein": 13, "carbs": 60, "fat": 7,
                 "constraints": {"minServing": 0.2, "maxServing": 1.5},
                 "mealSuitability": {"breakfast": 9}, "categories": ["carbs_breakfast", "safe_vegan"]},
                {"id": "chicken", "name": "Chicken", "protein": 31, "carbs": 0, "fat": 3.6,
                 "constraints": {"minServing": 0.5, "maxServing": 3.0},
                 "mealSuitability": {"lunch": 9, "dinner": 9}, "categories": ["protein_lunch", "protein_dinner"]}
            ]"#,
        )
        .unwrap();
        records.into_iter().map(Food::from).collect()
    }

    #[test]
    fn test_invalid_targets_refused() {
        let daily = DailyTargets {
            total_protein: f64::NAN,
            total_carbs: 100.0,
            total_fat: 40.0,
            total_calories: 1800.0,
        };
        let result = build_all(
            &catalog(),
            &daily,
            &Preferences::default(),
            &PlanContext::default(),
            None,
            &PlannerConfig::default(),
        );
        assert!(matches!(result, Err(PlanError::InvalidTargets(_))));
    }

    #[test]
    fn test_meal_order_follows_context() {
        let daily = DailyTargets::new(120.0, 150.0, 50.0, None).unwrap();
        let context = PlanContext {
            meals: vec![MealSlot::Dinner, MealSlot::Breakfast],
            ..Default::default()
        };
        let plan = build_all(
            &catalog(),
            &daily,
            &Preferences::default(),
            &context,
            None,
            &PlannerConfig::default(),
        )
        .unwrap();

        let slots: Vec<MealSlot> = plan.meals.iter().map(|m| m.slot).collect();
        assert_eq!(slots, vec![MealSlot::Dinner, MealSlot::Breakfast]);
        assert_eq!(plan.metadata.split_mode, SplitMode::Auto);
        assert_eq!(plan.metadata.split.meals.len(), 2);
    }

    #[test]
    fn test_preferences_reapplied() {
        let daily = DailyTargets::new(120.0, 150.0, 50.0, None).unwrap();
        let prefs = Preferences {
            is_vegan: true,
            ..Default::default()
        };
        let plan = build_all(
            &catalog(),
            &daily,
            &prefs,
            &PlanContext::default(),
            None,
            &PlannerConfig::default(),
        )
        .unwrap();
        assert!(plan.all_options().iter().all(|o| o.food_id == "oats"));
    }

    #[test]
    fn test_invalid_serving_bounds_never_planned() {
        let mut foods = catalog();
        foods[0].constraints.min_serving = f64::NAN;
        foods[1].constraints.min_serving = 0.0;

        let daily = DailyTargets::new(120.0, 150.0, 50.0, None).unwrap();
        let plan = build_all(
            &foods,
            &daily,
            &Preferences::default(),
            &PlanContext::default(),
            None,
            &PlannerConfig::default(),
        )
        .unwrap();
        assert!(plan.all_options().is_empty());
    }

    #[test]
    fn test_trainee_missing_target() {
        let trainee = TraineeRecord {
            targets: RawTargets {
                protein: Some(120.0),
                carbs: None,
                fat: Some(50.0),
                calories: None,
            },
            ..Default::default()
        };
        let result = plan_for_trainee(&catalog(), &trainee, &PlannerConfig::default());
        assert!(matches!(result, Err(PlanError::InvalidTargets(_))));
    }

    #[test]
    fn test_trainee_dislikes_excluded() {
        let trainee = TraineeRecord {
            targets: RawTargets {
                protein: Some(120.0),
                carbs: Some(150.0),
                fat: Some(50.0),
                calories: None,
            },
            disliked_food_ids: vec!["chicken".to_string()],
            ..Default::default()
        };
        let plan = plan_for_trainee(&catalog(), &trainee, &PlannerConfig::default()).unwrap();
        assert!(plan.all_options().iter().all(|o| o.food_id != "chicken"));
        assert_eq!(plan.meals.len(), 4);
    }
}

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use macro_meal_planner_rs::models::{
    DailyTargets, Food, FoodGroup, FoodRecord, GroupRole, Macros, MealSlot, MealSuitability,
    Nutrient, PlanContext, Preferences, ServingConstraints, WorkoutTime,
};
use macro_meal_planner_rs::planner::{
    GroupRequest, PlannerConfig, QUANTITY_STEP, TOP_UP_TOLERANCE, build_all, fit_cap,
    select_group, top_up,
};
use macro_meal_planner_rs::state::{FoodCatalog, load_catalog};

const SAMPLE_CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/foods.json");

fn random_preferences(rng: &mut StdRng) -> Preferences {
    Preferences {
        is_vegetarian: rng.gen_bool(0.3),
        is_vegan: rng.gen_bool(0.15),
        gluten_sensitive: rng.gen_bool(0.2),
        lactose_sensitive: rng.gen_bool(0.2),
    }
}

fn random_context(rng: &mut StdRng) -> PlanContext {
    let mut meals: Vec<MealSlot> = MealSlot::ALL
        .iter()
        .copied()
        .filter(|_| rng.gen_bool(0.8))
        .collect();
    if meals.is_empty() {
        meals.push(MealSlot::Lunch);
    }
    let workout_time = match rng.gen_range(0..4) {
        0 => Some(WorkoutTime::Morning),
        1 => Some(WorkoutTime::Noon),
        2 => Some(WorkoutTime::Evening),
        _ => None,
    };
    PlanContext {
        is_training_day: rng.gen_bool(0.5),
        workout_time,
        prefer_low_carb_dinner: rng.gen_bool(0.3),
        higher_breakfast_protein: rng.gen_bool(0.3),
        meals,
    }
}

fn worst_case(groups: &[FoodGroup]) -> Macros {
    groups.iter().fold(Macros::default(), |acc, group| {
        let group_max = group
            .choices()
            .fold(Macros::default(), |m, o| m.max_each(&o.provides));
        acc.plus(&group_max)
    })
}

fn check_plan(catalog: &FoodCatalog, daily: &DailyTargets, preferences: Preferences, context: &PlanContext) {
    let config = PlannerConfig::default();
    let plan = build_all(catalog.foods(), daily, &preferences, context, None, &config).unwrap();

    assert_eq!(plan.meals.len(), context.included_meals().len());

    for option in plan.all_options() {
        let food = catalog.get_food(&option.food_id).unwrap();
        assert!(
            option.quantity >= food.constraints.min_serving - 1e-9,
            "{} below minimum: {}",
            food.id,
            option.quantity
        );
        assert!(
            option.quantity <= food.constraints.max_serving + 1e-9,
            "{} above maximum: {}",
            food.id,
            option.quantity
        );
        assert!(food.is_active);
    }

    for meal in &plan.meals {
        let profile = config.tolerances.for_slot(meal.slot);
        let mut group_sets: Vec<&[FoodGroup]> = vec![&meal.groups];
        group_sets.extend(meal.variants.iter().map(|v| v.groups.as_slice()));
        for groups in group_sets {
            for group in groups {
                let driving = group.role.driving_nutrient();
                let limit = group.target * profile.ceiling(driving);
                for option in &group.options {
                    assert!(
                        option.provides.get(driving) <= limit + 1e-3,
                        "{} {:?}: {} gives {} {} over group limit {}",
                        meal.slot,
                        group.role,
                        option.food_id,
                        option.provides.get(driving),
                        driving.label(),
                        limit
                    );
                }
            }

            let worst = worst_case(groups);
            for n in Nutrient::ALL {
                assert!(
                    worst.get(n) <= meal.targets.get(n) * profile.ceiling(n) + 1e-3,
                    "{} {} over ceiling: {} vs target {}",
                    meal.slot,
                    n.label(),
                    worst.get(n),
                    meal.targets.get(n)
                );
            }
        }
    }
}

#[test]
fn test_random_days_respect_serving_bounds_and_ceilings() {
    let catalog = load_catalog(SAMPLE_CATALOG).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let daily = DailyTargets::new(
            rng.gen_range(50.0..250.0),
            rng.gen_range(40.0..400.0),
            rng.gen_range(20.0..120.0),
            None,
        )
        .unwrap();
        let preferences = random_preferences(&mut rng);
        let context = random_context(&mut rng);
        check_plan(&catalog, &daily, preferences, &context);
    }
}

#[test]
fn test_tiny_and_zero_targets_do_not_break_bounds() {
    let catalog = load_catalog(SAMPLE_CATALOG).unwrap();
    let context = PlanContext::default();

    for (p, c, f) in [(0.0, 0.0, 0.0), (5.0, 5.0, 2.0), (120.0, 0.0, 50.0), (0.0, 300.0, 0.0)] {
        let daily = DailyTargets::new(p, c, f, None).unwrap();
        check_plan(&catalog, &daily, Preferences::default(), &context);
    }
}

fn random_food(rng: &mut StdRng, index: usize) -> Food {
    let min_serving = rng.gen_range(0.05..1.0);
    let increment = if rng.gen_bool(0.5) {
        Some([0.05, 0.1, 0.25, 0.3, 0.5][rng.gen_range(0..5)])
    } else {
        None
    };
    Food::from(FoodRecord {
        id: format!("food_{}", index),
        name: format!("Food {}", index),
        calories: None,
        protein: rng.gen_range(2.0..90.0),
        carbs: rng.gen_range(0.0..60.0),
        fat: rng.gen_range(0.0..40.0),
        serving_info: Default::default(),
        constraints: ServingConstraints {
            min_serving,
            max_serving: min_serving + rng.gen_range(0.0..3.0),
            increment,
        },
        meal_suitability: MealSuitability {
            lunch: rng.gen_range(6..=10),
            ..Default::default()
        },
        categories: vec!["protein_lunch".to_string()],
        dietary_flags: Default::default(),
        is_active: true,
    })
}

fn random_request(rng: &mut StdRng) -> GroupRequest {
    let target = rng.gen_range(5.0..80.0);
    let ceiling = rng.gen_range(1.0..1.1);
    let mut room = Macros::new(
        target * ceiling,
        rng.gen_range(5.0..100.0),
        rng.gen_range(5.0..60.0),
        rng.gen_range(100.0..1500.0),
    );
    // now and then the meal has less headroom left than the group limit
    if rng.gen_bool(0.3) {
        room.protein = target * rng.gen_range(0.5..1.0);
    }
    GroupRequest {
        role: GroupRole::LunchProtein,
        slot: MealSlot::Lunch,
        driving: Nutrient::Protein,
        target,
        room,
        ceiling,
        safety: rng.gen_range(0.9..=1.0),
        max_options: 6,
    }
}

#[test]
fn test_fitted_quantities_sit_within_one_step_of_the_best_fit() {
    let mut rng = StdRng::seed_from_u64(0xf17);

    for _ in 0..300 {
        let foods: Vec<Food> = (0..8).map(|i| random_food(&mut rng, i)).collect();
        let candidates: Vec<(usize, &Food)> = foods.iter().enumerate().collect();
        let request = random_request(&mut rng);

        let selected = select_group(&request, &candidates);
        let raised = top_up(selected, &request, TOP_UP_TOLERANCE);

        for candidate in &raised {
            let food = candidate.food;
            let q = candidate.quantity;
            let per = food.per_base(Nutrient::Protein);
            let cap = fit_cap(food, &request);
            let step = food.constraints.step().unwrap_or(QUANTITY_STEP);

            assert!(q >= food.constraints.min_serving - 1e-6, "{} below min: {}", food.id, q);
            assert!(q <= cap + 1e-6, "{} above cap {}: {}", food.id, cap, q);
            assert!(
                food.provides(q).protein <= request.group_limit() + 1e-4,
                "{} over group limit",
                food.id
            );

            // the next step up would reach the shrunk target or break a bound
            let best = (request.fit_target() / per).min(cap);
            assert!(
                q + step >= best - 1e-6,
                "{} at {} is more than one step ({}) below {}",
                food.id,
                q,
                step,
                best
            );
        }
    }
}

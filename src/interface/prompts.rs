use dialoguer::{Confirm, Input, Select};

use crate::error::{PlanError, Result};
use crate::models::{PlanContext, Preferences, RawTargets, TraineeRecord, WorkoutTime};
use crate::state::FoodCatalog;

/// Suggestions offered when a disliked food isn't an exact match.
const MAX_SUGGESTIONS: usize = 5;

fn parse_grams(input: &str, what: &str) -> Result<f64> {
    input
        .trim()
        .parse()
        .map_err(|_| PlanError::InvalidInput(format!("Invalid number for {}: '{}'", what, input)))
}

/// Prompt for a gram amount.
fn prompt_grams(prompt: &str, default: &str) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;
    parse_grams(&input, prompt)
}

/// Prompt for daily targets. Calories may be left empty to derive them from macros.
pub fn prompt_targets() -> Result<RawTargets> {
    let protein = prompt_grams("Daily protein (g)", "120")?;
    let carbs = prompt_grams("Daily carbs (g)", "150")?;
    let fat = prompt_grams("Daily fat (g)", "50")?;

    let calories: String = Input::new()
        .with_prompt("Daily calories (leave empty to derive from macros)")
        .allow_empty(true)
        .interact_text()?;
    let calories = match calories.trim() {
        "" => None,
        text => Some(parse_grams(text, "calories")?),
    };

    Ok(RawTargets {
        protein: Some(protein),
        carbs: Some(carbs),
        fat: Some(fat),
        calories,
    })
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

pub fn prompt_preferences() -> Result<Preferences> {
    let is_vegan = prompt_yes_no("Vegan?", false)?;
    let is_vegetarian = is_vegan || prompt_yes_no("Vegetarian?", false)?;
    Ok(Preferences {
        is_vegetarian,
        is_vegan,
        gluten_sensitive: prompt_yes_no("Gluten sensitive?", false)?,
        lactose_sensitive: prompt_yes_no("Lactose sensitive?", false)?,
    })
}

/// Prompt for training-day context and meal biases.
pub fn prompt_context() -> Result<PlanContext> {
    let is_training_day = prompt_yes_no("Is today a training day?", false)?;

    let workout_time = if is_training_day {
        let options = ["Morning", "Noon", "Evening", "Not sure"];
        let selection = Select::new()
            .with_prompt("When is the workout?")
            .items(&options)
            .default(3)
            .interact()?;
        match selection {
            0 => Some(WorkoutTime::Morning),
            1 => Some(WorkoutTime::Noon),
            2 => Some(WorkoutTime::Evening),
            _ => None,
        }
    } else {
        None
    };

    Ok(PlanContext {
        is_training_day,
        workout_time,
        prefer_low_carb_dinner: prompt_yes_no("Prefer a lower-carb dinner?", false)?,
        higher_breakfast_protein: prompt_yes_no("More protein at breakfast?", false)?,
        ..Default::default()
    })
}

/// Prompt for disliked foods with fuzzy matching. Returns food ids.
pub fn prompt_disliked_foods(catalog: &FoodCatalog) -> Result<Vec<String>> {
    let mut disliked: Vec<String> = Vec::new();

    loop {
        let input: String = Input::new()
            .with_prompt("Enter a food to avoid (or press Enter to finish)")
            .allow_empty(true)
            .interact_text()?;

        let input = input.trim();
        if input.is_empty() {
            break;
        }

        if let Ok(food) = catalog.resolve(input) {
            if !disliked.contains(&food.id) {
                disliked.push(food.id.clone());
            }
            println!("Avoiding: {}", food.name);
            continue;
        }

        let candidates = catalog.fuzzy_matches(input, MAX_SUGGESTIONS);

        match candidates.as_slice() {
            [] => println!("No matching food found for '{}'", input),
            [food] => {
                if prompt_yes_no(&format!("Did you mean '{}'?", food.name), true)? {
                    disliked.push(food.id.clone());
                    println!("Avoiding: {}", food.name);
                }
            }
            _ => {
                let mut options: Vec<String> = candidates.iter().map(|f| f.name.clone()).collect();
                options.push("None of these".to_string());

                let selection = Select::new()
                    .with_prompt("Which did you mean?")
                    .items(&options)
                    .default(0)
                    .interact()?;

                if let Some(food) = candidates.get(selection) {
                    disliked.push(food.id.clone());
                    println!("Avoiding: {}", food.name);
                }
            }
        }
    }

    Ok(disliked)
}

/// Collect everything needed to plan for an ad-hoc trainee.
pub fn collect_trainee(catalog: &FoodCatalog) -> Result<TraineeRecord> {
    let targets = prompt_targets()?;
    let preferences = prompt_preferences()?;
    let context = prompt_context()?;
    let disliked_food_ids = prompt_disliked_foods(catalog)?;

    Ok(TraineeRecord {
        name: "interactive".to_string(),
        targets,
        preferences,
        disliked_food_ids,
        custom_split: None,
        context,
    })
}

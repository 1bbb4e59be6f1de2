use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{PlanError, Result};
use crate::models::{Food, FoodRecord, MealPlan, TraineeRecord};
use crate::planner::PlannerConfig;
use crate::state::catalog::FoodCatalog;

/// Load foods from a JSON array of food records, in file order.
///
/// Invalid records are skipped. Repeated ids are left for [`FoodCatalog`]
/// to resolve.
pub fn load_foods<P: AsRef<Path>>(path: P) -> Result<Vec<Food>> {
    let content = fs::read_to_string(path)?;
    let records: Vec<FoodRecord> = serde_json::from_str(&content)?;

    let foods = records
        .into_iter()
        .map(Food::from)
        .filter(|food| {
            let valid = food.is_valid();
            if !valid {
                warn!(food = %food.debug_string(), "skipping invalid food record");
            }
            valid
        })
        .collect();

    Ok(foods)
}

/// Load foods into a catalog, refusing one with nothing active.
///
/// Repeated ids keep the last record at the position of the first.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<FoodCatalog> {
    let catalog = FoodCatalog::new(load_foods(path)?);
    if catalog.active().is_empty() {
        return Err(PlanError::EmptyCatalog);
    }
    info!(foods = catalog.len(), active = catalog.active().len(), "loaded food catalog");
    Ok(catalog)
}

pub fn load_trainee<P: AsRef<Path>>(path: P) -> Result<TraineeRecord> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Planner settings; fields absent from the file keep their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PlannerConfig> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_plan_json<P: AsRef<Path>>(path: P, plan: &MealPlan) -> Result<()> {
    let json = serde_json::to_string_pretty(plan)?;
    fs::write(path, json)?;
    Ok(())
}

/// One CSV row per selectable option, fixed selections included.
pub fn write_plan_csv<W: io::Write>(writer: W, plan: &MealPlan) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "meal", "variant", "group", "food_id", "food", "quantity", "display", "protein", "carbs",
        "fat", "calories",
    ])?;

    for meal in &plan.meals {
        let groups = meal
            .groups
            .iter()
            .map(|g| ("", g))
            .chain(
                meal.variants
                    .iter()
                    .flat_map(|v| v.groups.iter().map(move |g| (v.style.as_str(), g))),
            );

        for (variant, group) in groups {
            for option in group.choices() {
                wtr.write_record([
                    meal.slot.as_str().to_string(),
                    variant.to_string(),
                    group.role.label().to_string(),
                    option.food_id.clone(),
                    option.food_name.clone(),
                    format!("{:.2}", option.quantity),
                    option.display_text.clone(),
                    format!("{:.1}", option.provides.protein),
                    format!("{:.1}", option.provides.carbs),
                    format!("{:.1}", option.provides.fat),
                    format!("{:.0}", option.provides.calories),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

pub fn save_plan_csv<P: AsRef<Path>>(path: P, plan: &MealPlan) -> Result<()> {
    let file = fs::File::create(path)?;
    write_plan_csv(file, plan)
}

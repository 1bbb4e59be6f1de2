use crate::models::{Food, FoodGroup, Macros, MealPlan, MealSlot, PlannedMeal};
use crate::planner::ResolvedSplit;

fn format_macros(m: &Macros) -> String {
    format!(
        "P:{:>5.1}g C:{:>5.1}g F:{:>5.1}g {:>5.0} kcal",
        m.protein, m.carbs, m.fat, m.calories
    )
}

fn display_group(group: &FoodGroup, indent: &str) {
    println!("{}{} (target {:.1}g)", indent, group.role.label(), group.target);

    if let Some(reason) = group.empty_reason {
        println!("{}  - {}", indent, reason.describe());
        return;
    }

    let width = group
        .choices()
        .map(|o| o.display_text.len())
        .max()
        .unwrap_or(10);

    for option in group.choices() {
        let marker = if group.fixed.as_ref() == Some(option) { "*" } else { "-" };
        println!(
            "{}  {} {:<width$}  {}  ({})",
            indent,
            marker,
            option.display_text,
            format_macros(&option.provides),
            option.food_name,
            width = width
        );
    }
}

fn display_meal(meal: &PlannedMeal) {
    println!("=== {} ===", meal.slot.as_str().to_uppercase());
    println!("Targets: {}", format_macros(&meal.targets));

    if let Some(notice) = meal.notice {
        println!("Note: {}", notice.describe());
    }

    for group in &meal.groups {
        display_group(group, "  ");
    }

    for variant in &meal.variants {
        println!("  [{}]", variant.style.as_str());
        for group in &variant.groups {
            display_group(group, "    ");
        }
    }

    println!();
}

/// Display a meal plan, one block per meal. Pick one option from each group.
pub fn display_meal_plan(plan: &MealPlan) {
    if plan.meals.is_empty() {
        println!("No meals were planned.");
        return;
    }

    println!();
    println!("Split mode: {}", plan.metadata.split_mode);
    println!();

    for meal in &plan.meals {
        display_meal(meal);
    }

    let empty: Vec<&str> = plan
        .meals
        .iter()
        .filter(|m| !m.is_populated())
        .map(|m| m.slot.as_str())
        .collect();
    if !empty.is_empty() {
        println!("Meals without options: {}", empty.join(", "));
        println!();
    }
}

/// Display the per-meal shares and absolute targets.
pub fn display_split(split: &ResolvedSplit) {
    println!();
    println!("=== Split ({}) ===", split.mode);
    println!();
    println!(
        "{:<10} {:>8} {:>8} {:>8} {:>8}   targets",
        "meal", "protein", "carbs", "fat", "kcal"
    );

    for slot in MealSlot::ALL {
        let Some(shares) = split.percentages.get(slot) else {
            continue;
        };
        println!(
            "{:<10} {:>7.1}% {:>7.1}% {:>7.1}% {:>7.1}%   {}",
            slot.as_str(),
            shares.protein * 100.0,
            shares.carbs * 100.0,
            shares.fat * 100.0,
            shares.calories * 100.0,
            format_macros(&split.target(slot))
        );
    }
    println!();
}

/// Display a list of foods with their role tags and dietary markers.
pub fn display_food_list(foods: &[&Food], title: &str) {
    if foods.is_empty() {
        println!("{}: (none)", title);
        return;
    }

    println!();
    println!("=== {} ({} items) ===", title, foods.len());
    println!();

    for food in foods {
        let roles: Vec<&str> = food
            .categories
            .iter()
            .filter(|c| c.is_role())
            .map(|c| c.as_tag())
            .collect();

        let mut markers = Vec::new();
        if food.is_vegan_safe() {
            markers.push("vegan");
        } else if food.is_vegetarian_safe() {
            markers.push("vegetarian");
        }
        if food.contains_gluten() {
            markers.push("gluten");
        }
        if food.contains_lactose() {
            markers.push("lactose");
        }

        println!(
            "  {} [{}] - per {} {}: {}  roles: {}  {}",
            food.name,
            food.id,
            food.serving.base_quantity,
            food.serving.base_unit,
            format_macros(&food.macros),
            roles.join(", "),
            markers.join(" ")
        );
    }

    println!();
}

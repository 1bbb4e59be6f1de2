use std::collections::HashSet;

use tracing::debug;

use crate::models::{Food, Preferences};

/// Check a single food against every active preference.
pub fn satisfies_preferences(food: &Food, preferences: &Preferences) -> bool {
    if preferences.is_vegan && !food.is_vegan_safe() {
        return false;
    }
    if preferences.is_vegetarian && !food.is_vegetarian_safe() {
        return false;
    }
    if preferences.gluten_sensitive && food.contains_gluten() {
        return false;
    }
    if preferences.lactose_sensitive && food.contains_lactose() {
        return false;
    }
    true
}

/// Narrow the catalog to valid, active, not-disliked foods that satisfy the
/// preferences.
///
/// Catalog order is preserved; it is the final tie-break during selection.
/// An empty result is valid and means every dependent group comes out empty.
pub fn filter_catalog(
    foods: &[Food],
    excluded_ids: &HashSet<String>,
    preferences: &Preferences,
) -> Vec<Food> {
    let filtered: Vec<Food> = foods
        .iter()
        .filter(|f| f.is_active)
        .filter(|f| {
            let valid = f.is_valid();
            if !valid {
                debug!(food = %f.id, "dropping food with invalid nutrients or serving bounds");
            }
            valid
        })
        .filter(|f| !excluded_ids.contains(&f.id))
        .filter(|f| satisfies_preferences(f, preferences))
        .cloned()
        .collect();

    debug!(
        total = foods.len(),
        kept = filtered.len(),
        excluded = excluded_ids.len(),
        "filtered food catalog"
    );

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, FoodRecord};

    fn food(id: &str, tags: &[&str]) -> Food {
        Food::from(FoodRecord {
            id: id.to_string(),
            name: id.to_string(),
            calories: None,
            protein: 10.0,
            carbs: 10.0,
            fat: 1.0,
            serving_info: Default::default(),
            constraints: Default::default(),
            meal_suitability: Default::default(),
            categories: tags.iter().map(|t| t.to_string()).collect(),
            dietary_flags: Default::default(),
            is_active: true,
        })
    }

    fn sample_foods() -> Vec<Food> {
        vec![
            food("chicken", &["protein_lunch", "safe_gluten_free", "safe_lactose_free"]),
            food("tofu", &["protein_lunch", "safe_vegan"]),
            food("cheese", &["dairy_dinner", "safe_vegetarian", "dairy"]),
            food("bread", &["bread_dinner", "safe_vegan", "gluten"]),
        ]
    }

    fn ids(foods: &[Food]) -> Vec<&str> {
        foods.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_no_preferences_keeps_everything() {
        let foods = sample_foods();
        let kept = filter_catalog(&foods, &HashSet::new(), &Preferences::default());
        assert_eq!(ids(&kept), vec!["chicken", "tofu", "cheese", "bread"]);
    }

    #[test]
    fn test_excluded_ids_removed() {
        let foods = sample_foods();
        let excluded: HashSet<String> = ["tofu".to_string()].into_iter().collect();
        let kept = filter_catalog(&foods, &excluded, &Preferences::default());
        assert!(!ids(&kept).contains(&"tofu"));
    }

    #[test]
    fn test_vegetarian_includes_vegan_safe() {
        let foods = sample_foods();
        let prefs = Preferences {
            is_vegetarian: true,
            ..Default::default()
        };
        let kept = filter_catalog(&foods, &HashSet::new(), &prefs);
        assert_eq!(ids(&kept), vec!["tofu", "cheese", "bread"]);
    }

    #[test]
    fn test_vegan_requires_marker() {
        let foods = sample_foods();
        let prefs = Preferences {
            is_vegan: true,
            ..Default::default()
        };
        let kept = filter_catalog(&foods, &HashSet::new(), &prefs);
        assert!(kept.iter().all(|f| f.has_category(Category::SafeVegan)));
        assert_eq!(ids(&kept), vec!["tofu", "bread"]);
    }

    #[test]
    fn test_gluten_and_lactose() {
        let foods = sample_foods();
        let prefs = Preferences {
            gluten_sensitive: true,
            lactose_sensitive: true,
            ..Default::default()
        };
        let kept = filter_catalog(&foods, &HashSet::new(), &prefs);
        assert_eq!(ids(&kept), vec!["chicken", "tofu"]);
    }

    #[test]
    fn test_inactive_foods_dropped() {
        let mut foods = sample_foods();
        foods[0].is_active = false;
        let kept = filter_catalog(&foods, &HashSet::new(), &Preferences::default());
        assert!(!ids(&kept).contains(&"chicken"));
    }

    #[test]
    fn test_invalid_foods_dropped() {
        let mut foods = sample_foods();
        foods[0].constraints.min_serving = 0.0;
        foods[1].constraints.min_serving = f64::NAN;
        foods[2].macros.fat = -1.0;
        let kept = filter_catalog(&foods, &HashSet::new(), &Preferences::default());
        assert_eq!(ids(&kept), vec!["bread"]);
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let foods = vec![food("steak", &["protein_dinner"])];
        let prefs = Preferences {
            is_vegan: true,
            ..Default::default()
        };
        assert!(filter_catalog(&foods, &HashSet::new(), &prefs).is_empty());
    }
}

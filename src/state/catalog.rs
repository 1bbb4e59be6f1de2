use std::collections::HashMap;

use crate::error::{PlanError, Result};
use crate::models::Food;

/// Minimum Jaro-Winkler similarity for a fuzzy name match.
const FUZZY_THRESHOLD: f64 = 0.82;

/// The loaded food catalog: catalog order plus lookup by id.
pub struct FoodCatalog {
    foods: Vec<Food>,
    /// Food id -> position in `foods`.
    by_id: HashMap<String, usize>,
}

impl FoodCatalog {
    /// Build from loaded foods. A repeated id replaces the earlier entry in place.
    pub fn new(foods: Vec<Food>) -> Self {
        let mut ordered: Vec<Food> = Vec::with_capacity(foods.len());
        let mut by_id = HashMap::new();
        for food in foods {
            match by_id.get(&food.id) {
                Some(&index) => ordered[index] = food,
                None => {
                    by_id.insert(food.id.clone(), ordered.len());
                    ordered.push(food);
                }
            }
        }
        Self {
            foods: ordered,
            by_id,
        }
    }

    /// All foods in catalog order, inactive ones included.
    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn get_food(&self, id: &str) -> Option<&Food> {
        self.by_id.get(id).map(|&i| &self.foods[i])
    }

    /// Exact name lookup (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Food> {
        let wanted = name.trim().to_lowercase();
        self.foods.iter().find(|f| f.name.to_lowercase() == wanted)
    }

    /// Id, then exact name.
    pub fn resolve(&self, query: &str) -> Result<&Food> {
        self.get_food(query.trim())
            .or_else(|| self.find_by_name(query))
            .ok_or_else(|| PlanError::FoodNotFound(query.to_string()))
    }

    /// Active foods whose names resemble `query`, best first.
    pub fn fuzzy_matches(&self, query: &str, limit: usize) -> Vec<&Food> {
        let wanted = query.trim().to_lowercase();
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, usize, &Food)> = self
            .foods
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_active)
            .filter_map(|(i, f)| {
                let name = f.name.to_lowercase();
                let score = if name.contains(&wanted) {
                    1.0
                } else {
                    strsim::jaro_winkler(&wanted, &name)
                };
                (score >= FUZZY_THRESHOLD).then_some((score, i, f))
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.into_iter().take(limit).map(|(_, _, f)| f).collect()
    }

    pub fn active(&self) -> Vec<&Food> {
        self.foods.iter().filter(|f| f.is_active).collect()
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

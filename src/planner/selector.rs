//! Group selection: candidate lookup, quantity fitting, ranking and top-up.

use std::cmp::Ordering;

use tracing::debug;

use crate::models::{Category, Food, FoodOption, GroupRole, Macros, MealSlot, Nutrient};
use crate::planner::constants::{COMMON_SERVING_SNAP, EPSILON, QUANTITY_STEP};

/// Inputs for fitting one group of a meal.
#[derive(Debug, Clone, Copy)]
pub struct GroupRequest {
    pub role: GroupRole,
    pub slot: MealSlot,
    pub driving: Nutrient,
    /// Grams of the driving macro this group should supply.
    pub target: f64,
    /// Headroom per nutrient before the meal ceiling is reached.
    pub room: Macros,
    /// Meal ceiling for the driving macro; no option may supply more than
    /// `target * ceiling`.
    pub ceiling: f64,
    /// Shrink applied to `target` before fitting.
    pub safety: f64,
    pub max_options: usize,
}

impl GroupRequest {
    pub fn fit_target(&self) -> f64 {
        self.target * self.safety
    }

    /// Most driving-macro grams a single option may supply.
    pub fn group_limit(&self) -> f64 {
        self.target * self.ceiling
    }
}

/// A food fitted to a group, still tied to its catalog entry.
#[derive(Debug, Clone)]
pub struct RankedCandidate<'a> {
    pub food: &'a Food,
    pub catalog_index: usize,
    pub quantity: f64,
    pub suitability: u8,
}

impl<'a> RankedCandidate<'a> {
    pub fn provides(&self) -> Macros {
        self.food.provides(self.quantity)
    }

    /// Absolute gap between supplied and targeted driving-macro grams.
    pub fn error(&self, request: &GroupRequest) -> f64 {
        (self.provides().get(request.driving) - request.target).abs()
    }

    pub fn to_option(&self) -> FoodOption {
        FoodOption {
            food_id: self.food.id.clone(),
            food_name: self.food.name.clone(),
            quantity: self.quantity,
            display_text: display_text(self.food, self.quantity),
            provides: self.provides(),
        }
    }
}

/// Foods carrying any of `categories` and scoring at least `threshold` for `slot`,
/// paired with their catalog position.
pub fn group_candidates<'a>(
    foods: &'a [Food],
    categories: &[Category],
    slot: MealSlot,
    threshold: u8,
) -> Vec<(usize, &'a Food)> {
    foods
        .iter()
        .enumerate()
        .filter(|(_, f)| f.has_any(categories))
        .filter(|(_, f)| f.suitability_for(slot) >= threshold)
        .collect()
}

/// Round away float noise so repeated runs print identical quantities.
#[inline]
fn tidy(quantity: f64) -> f64 {
    (quantity * 1e6).round() / 1e6
}

/// Largest quantity that keeps every nutrient within `room` and the food's max.
pub fn quantity_cap(food: &Food, room: &Macros) -> f64 {
    Nutrient::ALL
        .iter()
        .filter(|n| food.per_base(**n) > 0.0)
        .map(|n| room.get(*n) / food.per_base(*n))
        .fold(food.constraints.max_serving, f64::min)
}

/// Largest quantity allowed by the meal headroom, the food's max and the
/// group's own limit on the driving macro.
pub fn fit_cap(food: &Food, request: &GroupRequest) -> f64 {
    let per = food.per_base(request.driving);
    let cap = quantity_cap(food, &request.room);
    if per > 0.0 {
        cap.min(request.group_limit() / per)
    } else {
        cap
    }
}

/// Nearest increment multiple inside `[min, cap]`, preferring whichever side
/// lands closer to `fit_target`. Ties go down.
fn round_to_increment(q: f64, increment: f64, min: f64, cap: f64, per: f64, fit_target: f64) -> f64 {
    let lower = (q / increment + EPSILON).floor() * increment;
    let upper = (q / increment - EPSILON).ceil() * increment;
    let in_bounds = |x: f64| x >= min - EPSILON && x <= cap + EPSILON;

    let best = [lower, upper]
        .into_iter()
        .filter(|x| in_bounds(*x))
        .min_by(|a, b| {
            let ea = (per * a - fit_target).abs();
            let eb = (per * b - fit_target).abs();
            ea.total_cmp(&eb).then(a.total_cmp(b))
        });

    if let Some(x) = best {
        return x;
    }

    // q sits between bounds that straddle no neighbouring multiple
    let first = (min / increment - EPSILON).ceil() * increment;
    if in_bounds(first) { first } else { q }
}

/// Round down to the default step, never below `min`.
fn floor_to_step(q: f64, min: f64) -> f64 {
    let floored = (q / QUANTITY_STEP + EPSILON).floor() * QUANTITY_STEP;
    if floored < min - EPSILON { min } else { floored }
}

/// Serving quantity (multiple of base) whose driving-macro contribution best
/// matches the request, or `None` if the food cannot contribute or even its
/// minimum serving overshoots the meal's headroom or the group's limit.
pub fn fit_quantity(food: &Food, request: &GroupRequest) -> Option<f64> {
    let per = food.per_base(request.driving);
    if per <= 0.0 {
        return None;
    }

    let min = food.constraints.min_serving;
    let cap = fit_cap(food, request);
    if cap + EPSILON < min {
        return None;
    }
    let cap = cap.max(min);

    let fit_target = request.fit_target();
    let clamped = (fit_target / per).clamp(min, cap);

    let quantity = match food.constraints.step() {
        Some(increment) => round_to_increment(clamped, increment, min, cap, per, fit_target),
        None => floor_to_step(clamped, min),
    };

    Some(tidy(quantity))
}

/// Higher suitability, then smaller error, then catalog order.
fn rank_order(a: &RankedCandidate, b: &RankedCandidate, request: &GroupRequest) -> Ordering {
    b.suitability
        .cmp(&a.suitability)
        .then_with(|| a.error(request).total_cmp(&b.error(request)))
        .then_with(|| a.catalog_index.cmp(&b.catalog_index))
}

fn sort_ranked(candidates: &mut [RankedCandidate], request: &GroupRequest) {
    candidates.sort_by(|a, b| rank_order(a, b, request));
}

/// Fit every candidate and return the ranked survivors, best first.
///
/// An empty result means nothing fits; it is not an error.
pub fn select_group<'a>(
    request: &GroupRequest,
    candidates: &[(usize, &'a Food)],
) -> Vec<RankedCandidate<'a>> {
    let mut fitted: Vec<RankedCandidate<'a>> = candidates
        .iter()
        .filter_map(|(index, food)| {
            fit_quantity(food, request).map(|quantity| RankedCandidate {
                food,
                catalog_index: *index,
                quantity,
                suitability: food.suitability_for(request.slot),
            })
        })
        .collect();

    sort_ranked(&mut fitted, request);
    fitted.truncate(request.max_options);

    debug!(
        role = ?request.role,
        meal = %request.slot,
        target = request.target,
        candidates = candidates.len(),
        fitted = fitted.len(),
        "selected group"
    );

    fitted
}

/// One-step increase per option, applied only when it stays inside the
/// meal headroom, the group limit and `tolerance`, and strictly reduces the error.
///
/// Runs after group-level selection; the returned list is re-ranked.
pub fn top_up<'a>(
    candidates: Vec<RankedCandidate<'a>>,
    request: &GroupRequest,
    tolerance: f64,
) -> Vec<RankedCandidate<'a>> {
    let mut raised: Vec<RankedCandidate<'a>> = candidates
        .into_iter()
        .map(|candidate| {
            let step = candidate.food.constraints.step().unwrap_or(QUANTITY_STEP);
            let next = tidy(candidate.quantity + step);
            if next > candidate.food.constraints.max_serving + EPSILON {
                return candidate;
            }

            let provides = candidate.food.provides(next);
            let within_room = Nutrient::ALL
                .iter()
                .all(|n| provides.get(*n) <= request.room.get(*n) + EPSILON);
            let driving = provides.get(request.driving);
            let within_tolerance = driving <= request.target * tolerance + EPSILON
                && driving <= request.group_limit() + EPSILON;
            let improves = (driving - request.target).abs() + EPSILON < candidate.error(request);

            if within_room && within_tolerance && improves {
                RankedCandidate {
                    quantity: next,
                    ..candidate
                }
            } else {
                candidate
            }
        })
        .collect();

    sort_ranked(&mut raised, request);
    raised
}

/// Pick the single best food at its usual serving (e.g. eggs).
///
/// Prefers the first common serving that fits the headroom, else the minimum serving.
pub fn pick_fixed<'a>(
    request: &GroupRequest,
    candidates: &[(usize, &'a Food)],
) -> Option<RankedCandidate<'a>> {
    let mut ordered: Vec<&(usize, &'a Food)> = candidates.iter().collect();
    ordered.sort_by(|a, b| {
        b.1.suitability_for(request.slot)
            .cmp(&a.1.suitability_for(request.slot))
            .then(a.0.cmp(&b.0))
    });

    ordered.into_iter().find_map(|(index, food)| {
        let min = food.constraints.min_serving;
        let cap = quantity_cap(food, &request.room);
        if cap + EPSILON < min {
            return None;
        }
        let quantity = food
            .serving
            .common_servings
            .iter()
            .map(|cs| cs.quantity)
            .find(|q| *q >= min - EPSILON && *q <= cap + EPSILON)
            .unwrap_or(min);

        Some(RankedCandidate {
            food,
            catalog_index: *index,
            quantity: tidy(quantity),
            suitability: food.suitability_for(request.slot),
        })
    })
}

fn format_amount(amount: f64) -> String {
    if (amount - amount.round()).abs() < 0.05 {
        format!("{:.0}", amount)
    } else {
        format!("{:.1}", amount)
    }
}

/// Text shown to the trainee for `quantity` base servings of `food`.
///
/// A common serving within 0.1 of the quantity is used verbatim; otherwise the
/// text is built from the absolute amount and base unit.
pub fn display_text(food: &Food, quantity: f64) -> String {
    let common = food
        .serving
        .common_servings
        .iter()
        .filter(|cs| (cs.quantity - quantity).abs() <= COMMON_SERVING_SNAP + EPSILON)
        .min_by(|a, b| {
            (a.quantity - quantity)
                .abs()
                .total_cmp(&(b.quantity - quantity).abs())
        });

    if let Some(serving) = common {
        return serving.display_text.clone();
    }

    let amount = quantity * food.serving.base_quantity;
    format!(
        "{} {} {}",
        format_amount(amount),
        food.serving.base_unit,
        food.serving.display_name
    )
    .trim()
    .to_string()
}

//! Per-meal composition.
//!
//! Groups in a meal are fitted one after another against a shared
//! reservation. A fitted group reserves the element-wise worst case of its
//! options, so any one-pick-per-group combination stays inside the meal's
//! ceilings. Before a group is fitted, room is held back for what the groups
//! after it will unavoidably bring along (the protein in bread, the carbs in
//! nuts). Dinner styles and the lunch legumes variant are fitted
//! independently of each other.

use tracing::debug;

use crate::models::{
    EmptyReason, Food, FoodGroup, GroupRole, Macros, MealNotice, MealSlot, MealVariant, Nutrient,
    PlannedMeal, Preferences, VariantStyle,
};
use crate::planner::config::{PlannerConfig, ToleranceProfile};
use crate::planner::constants::EPSILON;
use crate::planner::selector::{GroupRequest, group_candidates, pick_fixed, select_group, top_up};

/// Sweets take half the snack's carbs; fruit fills what remains.
const SWEETS_SHARE: f64 = 0.5;

type Candidates<'a> = Vec<(usize, &'a Food)>;

/// One group of a meal template, in fitting order.
struct GroupTemplate<'a> {
    role: GroupRole,
    /// Fraction of the remaining driving-macro budget this group targets.
    share: f64,
    candidates: Candidates<'a>,
    /// A single preset selection rather than a ranked list.
    fixed: bool,
}

impl<'a> GroupTemplate<'a> {
    fn new(role: GroupRole, share: f64, candidates: Candidates<'a>) -> Self {
        Self {
            role,
            share,
            candidates,
            fixed: false,
        }
    }

    fn fixed(role: GroupRole, candidates: Candidates<'a>) -> Self {
        Self {
            role,
            share: 1.0,
            candidates,
            fixed: true,
        }
    }

    /// Least amount of `nutrient` any candidate brings along when it
    /// supplies this group's share of the meal target.
    fn spill(&self, nutrient: Nutrient, targets: &Macros, safety: f64) -> f64 {
        let driving = self.role.driving_nutrient();
        if nutrient == driving {
            return 0.0;
        }
        let expected = targets.get(driving) * self.share * safety;
        self.candidates
            .iter()
            .filter(|(_, f)| f.per_base(driving) > 0.0)
            .map(|(_, f)| f.per_base(nutrient) / f.per_base(driving) * expected)
            .min_by(f64::total_cmp)
            .unwrap_or(0.0)
    }
}

fn role_candidates<'a>(
    foods: &'a [Food],
    role: GroupRole,
    slot: MealSlot,
    config: &PlannerConfig,
) -> Candidates<'a> {
    group_candidates(foods, role.categories(), slot, config.suitability_threshold)
}

/// Fits a meal's groups in order against one reservation.
struct MealFitter<'a> {
    slot: MealSlot,
    targets: Macros,
    profile: &'a ToleranceProfile,
    config: &'a PlannerConfig,
    reserved: Macros,
}

impl<'a> MealFitter<'a> {
    fn new(slot: MealSlot, targets: Macros, config: &'a PlannerConfig) -> Self {
        Self {
            slot,
            targets,
            profile: config.tolerances.for_slot(slot),
            config,
            reserved: Macros::default(),
        }
    }

    /// Macro room to keep free for `later` groups. Calories are left alone.
    fn holdback(&self, later: &[GroupTemplate]) -> Macros {
        let mut held = Macros::default();
        for n in Nutrient::MACROS {
            let spill: f64 = later
                .iter()
                .map(|entry| entry.spill(n, &self.targets, self.profile.safety))
                .sum();
            held.set(n, spill.min(self.targets.get(n) * self.config.holdback_limit));
        }
        held
    }

    fn request(&self, role: GroupRole, share: f64, held: &Macros) -> GroupRequest {
        let driving = role.driving_nutrient();
        let remaining =
            (self.targets.get(driving) - self.reserved.get(driving) - held.get(driving)).max(0.0);

        let mut room = Macros::default();
        for n in Nutrient::ALL {
            room.set(
                n,
                self.targets.get(n) * self.profile.ceiling(n) - self.reserved.get(n) - held.get(n),
            );
        }

        GroupRequest {
            role,
            slot: self.slot,
            driving,
            target: remaining * share,
            room,
            ceiling: self.profile.ceiling(driving),
            safety: self.profile.safety,
            max_options: self.config.max_options,
        }
    }

    fn reserve<'b>(&mut self, provided: impl Iterator<Item = &'b Macros>) {
        let worst = provided.fold(Macros::default(), |acc, m| acc.max_each(m));
        self.reserved = self.reserved.plus(&worst);
    }

    fn fit_all(&mut self, templates: &[GroupTemplate]) -> Vec<FoodGroup> {
        let mut groups: Vec<FoodGroup> = templates
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let held = self.holdback(&templates[i + 1..]);
                let request = self.request(entry.role, entry.share, &held);
                if entry.fixed {
                    self.fit_fixed(entry, &request)
                } else {
                    self.fit(entry, &request)
                }
            })
            .collect();
        groups.sort_by_key(|g| g.role);
        groups
    }

    fn fit(&mut self, entry: &GroupTemplate, request: &GroupRequest) -> FoodGroup {
        if entry.candidates.is_empty() {
            return FoodGroup::empty(entry.role, request.target, EmptyReason::NoCandidates);
        }
        if request.target <= EPSILON {
            return FoodGroup::empty(entry.role, request.target, EmptyReason::NoRemainingBudget);
        }

        let selected = select_group(request, &entry.candidates);
        let selected = top_up(selected, request, self.config.top_up_tolerance);
        if selected.is_empty() {
            return FoodGroup::empty(entry.role, request.target, EmptyReason::ToleranceUnsatisfiable);
        }

        let options: Vec<_> = selected.iter().map(|c| c.to_option()).collect();
        self.reserve(options.iter().map(|o| &o.provides));

        FoodGroup {
            role: entry.role,
            target: request.target,
            options,
            fixed: None,
            empty_reason: None,
        }
    }

    fn fit_fixed(&mut self, entry: &GroupTemplate, request: &GroupRequest) -> FoodGroup {
        if entry.candidates.is_empty() {
            return FoodGroup::empty(entry.role, request.target, EmptyReason::NoCandidates);
        }

        match pick_fixed(request, &entry.candidates) {
            Some(choice) => {
                let option = choice.to_option();
                self.reserve(std::iter::once(&option.provides));
                FoodGroup {
                    role: entry.role,
                    target: option.provides.get(request.driving),
                    options: Vec::new(),
                    fixed: Some(option),
                    empty_reason: None,
                }
            }
            None => FoodGroup::empty(entry.role, request.target, EmptyReason::ToleranceUnsatisfiable),
        }
    }
}

fn nothing_fits(groups: &[FoodGroup]) -> Option<MealNotice> {
    if groups.iter().any(FoodGroup::is_populated) {
        None
    } else {
        Some(MealNotice::NothingFits)
    }
}

/// Fixed eggs, then breads, then whatever protein is left.
pub fn assemble_breakfast(foods: &[Food], targets: Macros, config: &PlannerConfig) -> PlannedMeal {
    let slot = MealSlot::Breakfast;
    let templates = [
        GroupTemplate::fixed(GroupRole::Eggs, role_candidates(foods, GroupRole::Eggs, slot, config)),
        GroupTemplate::new(
            GroupRole::BreakfastCarbs,
            1.0,
            role_candidates(foods, GroupRole::BreakfastCarbs, slot, config),
        ),
        GroupTemplate::new(
            GroupRole::BreakfastProtein,
            1.0,
            role_candidates(foods, GroupRole::BreakfastProtein, slot, config),
        ),
    ];

    let groups = MealFitter::new(slot, targets, config).fit_all(&templates);
    PlannedMeal {
        slot,
        targets,
        notice: nothing_fits(&groups),
        groups,
        variants: Vec::new(),
    }
}

/// Legume foods eligible for the lunch legumes variant.
///
/// Plant-based trainees also get legume-tagged carbs here, since those are
/// pulled out of the generic carb group.
fn legume_candidates<'a>(
    foods: &'a [Food],
    preferences: &Preferences,
    config: &PlannerConfig,
) -> Candidates<'a> {
    foods
        .iter()
        .enumerate()
        .filter(|(_, f)| f.suitability_for(MealSlot::Lunch) >= config.suitability_threshold)
        .filter(|(_, f)| {
            f.has_any(GroupRole::Legumes.categories())
                || (preferences.is_plant_based()
                    && f.has_any(GroupRole::LunchCarbs.categories())
                    && f.is_legume())
        })
        .collect()
}

/// Protein + carb pairing, plus a legumes-only variant whenever one can be built.
pub fn assemble_lunch(
    foods: &[Food],
    targets: Macros,
    preferences: &Preferences,
    config: &PlannerConfig,
) -> PlannedMeal {
    let slot = MealSlot::Lunch;

    let mut carbs = role_candidates(foods, GroupRole::LunchCarbs, slot, config);
    if preferences.is_plant_based() {
        carbs.retain(|(_, f)| !f.is_legume());
    }
    let pairing = [
        GroupTemplate::new(GroupRole::LunchCarbs, 1.0, carbs),
        GroupTemplate::new(
            GroupRole::LunchProtein,
            1.0,
            role_candidates(foods, GroupRole::LunchProtein, slot, config),
        ),
    ];
    let groups = MealFitter::new(slot, targets, config).fit_all(&pairing);
    let paired = groups.iter().all(FoodGroup::is_populated);

    let legumes = [GroupTemplate::new(
        GroupRole::Legumes,
        1.0,
        legume_candidates(foods, preferences, config),
    )];
    let variants: Vec<MealVariant> = Some(MealVariant {
        style: VariantStyle::LegumesOnly,
        groups: MealFitter::new(slot, targets, config).fit_all(&legumes),
    })
    .filter(MealVariant::is_populated)
    .into_iter()
    .collect();

    let notice = match (paired, variants.is_empty()) {
        (true, _) => None,
        (false, false) => Some(MealNotice::LegumesOnly),
        (false, true) => Some(MealNotice::NoPairing),
    };

    debug!(paired, legumes = !variants.is_empty(), "assembled lunch");

    PlannedMeal {
        slot,
        targets,
        groups,
        variants,
        notice,
    }
}

pub fn assemble_snack(foods: &[Food], targets: Macros, config: &PlannerConfig) -> PlannedMeal {
    let slot = MealSlot::Snack;
    let entry = |role: GroupRole, share: f64| {
        GroupTemplate::new(role, share, role_candidates(foods, role, slot, config))
    };
    let templates = [
        entry(GroupRole::Sweets, SWEETS_SHARE),
        entry(GroupRole::Fruit, 1.0),
        entry(GroupRole::SnackFat, 1.0),
        entry(GroupRole::SnackProtein, 1.0),
    ];

    let groups = MealFitter::new(slot, targets, config).fit_all(&templates);
    PlannedMeal {
        slot,
        targets,
        notice: nothing_fits(&groups),
        groups,
        variants: Vec::new(),
    }
}

/// Carb and protein roles of each dinner style, in fitting order.
const DINNER_STYLES: [(VariantStyle, GroupRole, GroupRole); 3] = [
    (VariantStyle::DairyStyle, GroupRole::DinnerBread, GroupRole::Dairy),
    (VariantStyle::VeggieStyle, GroupRole::DinnerCarbs, GroupRole::VeggieProtein),
    (VariantStyle::MeatStyle, GroupRole::DinnerCarbs, GroupRole::MeatProtein),
];

/// Up to three independent styles; only fully populated ones are kept.
pub fn assemble_dinner(
    foods: &[Food],
    targets: Macros,
    preferences: &Preferences,
    config: &PlannerConfig,
) -> PlannedMeal {
    let slot = MealSlot::Dinner;
    let variants: Vec<MealVariant> = DINNER_STYLES
        .iter()
        .map(|(style, carb_role, protein_role)| {
            let templates = [
                GroupTemplate::new(*carb_role, 1.0, role_candidates(foods, *carb_role, slot, config)),
                GroupTemplate::new(
                    *protein_role,
                    1.0,
                    role_candidates(foods, *protein_role, slot, config),
                ),
            ];
            MealVariant {
                style: *style,
                groups: MealFitter::new(slot, targets, config).fit_all(&templates),
            }
        })
        .inspect(|v| {
            if !v.is_populated() {
                debug!(style = v.style.as_str(), "dropping unpopulated dinner style");
            }
        })
        .filter(MealVariant::is_populated)
        .collect();

    let notice = match (variants.is_empty(), preferences.is_plant_based()) {
        (false, _) => None,
        (true, true) => Some(MealNotice::NoDietSafeVariant),
        (true, false) => Some(MealNotice::NoVariant),
    };

    PlannedMeal {
        slot,
        targets,
        groups: Vec::new(),
        variants,
        notice,
    }
}

/// Route a slot to its template.
pub fn assemble_meal(
    foods: &[Food],
    slot: MealSlot,
    targets: Macros,
    preferences: &Preferences,
    config: &PlannerConfig,
) -> PlannedMeal {
    let meal = match slot {
        MealSlot::Breakfast => assemble_breakfast(foods, targets, config),
        MealSlot::Lunch => assemble_lunch(foods, targets, preferences, config),
        MealSlot::Snack => assemble_snack(foods, targets, config),
        MealSlot::Dinner => assemble_dinner(foods, targets, preferences, config),
    };

    debug!(
        meal = %slot,
        groups = meal.groups.iter().filter(|g| g.is_populated()).count(),
        variants = meal.variants.len(),
        notice = ?meal.notice,
        "assembled meal"
    );

    meal
}

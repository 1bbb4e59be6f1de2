use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::category::Category;
use crate::models::food::{Macros, Nutrient};

/// Meal slots in serving order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Snack,
        MealSlot::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Snack => "snack",
            MealSlot::Dinner => "dinner",
        }
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pick-one choice set within a meal. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupRole {
    BreakfastProtein,
    BreakfastCarbs,
    Eggs,
    LunchProtein,
    LunchCarbs,
    Legumes,
    SnackProtein,
    Sweets,
    Fruit,
    SnackFat,
    MeatProtein,
    VeggieProtein,
    Dairy,
    DinnerCarbs,
    DinnerBread,
}

impl GroupRole {
    /// Catalog tags that make a food a member of this group.
    pub fn categories(&self) -> &'static [Category] {
        match self {
            GroupRole::BreakfastProtein => &[Category::ProteinBreakfast],
            GroupRole::BreakfastCarbs => &[Category::CarbsBreakfast],
            GroupRole::Eggs => &[Category::Eggs],
            GroupRole::LunchProtein => &[Category::ProteinLunch],
            GroupRole::LunchCarbs => &[Category::CarbsLunch],
            GroupRole::Legumes => &[Category::LegumesLunch],
            GroupRole::SnackProtein => &[Category::ProteinSnack],
            GroupRole::Sweets => &[Category::SweetsSnack],
            GroupRole::Fruit => &[Category::FruitSnack],
            GroupRole::SnackFat => &[Category::FatSnack],
            GroupRole::MeatProtein => &[Category::ProteinDinner],
            GroupRole::VeggieProtein => &[Category::VeggieProteinDinner],
            GroupRole::Dairy => &[Category::DairyDinner],
            GroupRole::DinnerCarbs => &[Category::CarbsDinner],
            GroupRole::DinnerBread => &[Category::BreadDinner],
        }
    }

    /// The macro whose grams decide a member's serving size.
    pub fn driving_nutrient(&self) -> Nutrient {
        match self {
            GroupRole::BreakfastProtein
            | GroupRole::Eggs
            | GroupRole::LunchProtein
            | GroupRole::Legumes
            | GroupRole::SnackProtein
            | GroupRole::MeatProtein
            | GroupRole::VeggieProtein
            | GroupRole::Dairy => Nutrient::Protein,
            GroupRole::BreakfastCarbs
            | GroupRole::LunchCarbs
            | GroupRole::Sweets
            | GroupRole::Fruit
            | GroupRole::DinnerCarbs
            | GroupRole::DinnerBread => Nutrient::Carbs,
            GroupRole::SnackFat => Nutrient::Fat,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupRole::BreakfastProtein => "protein options",
            GroupRole::BreakfastCarbs => "bread options",
            GroupRole::Eggs => "eggs",
            GroupRole::LunchProtein => "protein options",
            GroupRole::LunchCarbs => "carb options",
            GroupRole::Legumes => "legume options",
            GroupRole::SnackProtein => "protein options",
            GroupRole::Sweets => "sweet options",
            GroupRole::Fruit => "fruit options",
            GroupRole::SnackFat => "fat options",
            GroupRole::MeatProtein => "meat options",
            GroupRole::VeggieProtein => "vegetarian protein options",
            GroupRole::Dairy => "dairy options",
            GroupRole::DinnerCarbs => "carb options",
            GroupRole::DinnerBread => "bread options",
        }
    }
}

/// Named alternative meal shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariantStyle {
    DairyStyle,
    VeggieStyle,
    MeatStyle,
    LegumesOnly,
}

impl VariantStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantStyle::DairyStyle => "dairyStyle",
            VariantStyle::VeggieStyle => "veggieStyle",
            VariantStyle::MeatStyle => "meatStyle",
            VariantStyle::LegumesOnly => "legumesOnly",
        }
    }
}

/// One selectable food at a fitted quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodOption {
    pub food_id: String,
    pub food_name: String,
    /// Multiple of the food's base quantity.
    pub quantity: f64,
    pub display_text: String,
    pub provides: Macros,
}

/// Why a group came out empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyReason {
    /// No food passed the dietary filter, category and suitability checks.
    NoCandidates,
    /// Candidates exist but every one overshoots the meal ceiling.
    ToleranceUnsatisfiable,
    /// Earlier groups already consumed this group's macro budget.
    NoRemainingBudget,
}

impl EmptyReason {
    pub fn describe(&self) -> &'static str {
        match self {
            EmptyReason::NoCandidates => "no foods match your preferences for this group",
            EmptyReason::ToleranceUnsatisfiable => "every candidate exceeds this meal's targets",
            EmptyReason::NoRemainingBudget => "this meal's targets are already covered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodGroup {
    pub role: GroupRole,
    /// Grams of the driving macro this group was fitted against.
    pub target: f64,
    pub options: Vec<FoodOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<FoodOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_reason: Option<EmptyReason>,
}

impl FoodGroup {
    pub fn empty(role: GroupRole, target: f64, reason: EmptyReason) -> Self {
        Self {
            role,
            target,
            options: Vec::new(),
            fixed: None,
            empty_reason: Some(reason),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.fixed.is_some() || !self.options.is_empty()
    }

    /// Every selectable entry, fixed selection first.
    pub fn choices(&self) -> impl Iterator<Item = &FoodOption> {
        self.fixed.iter().chain(self.options.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealVariant {
    pub style: VariantStyle,
    pub groups: Vec<FoodGroup>,
}

impl MealVariant {
    pub fn is_populated(&self) -> bool {
        !self.groups.is_empty() && self.groups.iter().all(FoodGroup::is_populated)
    }
}

/// Meal-level explanation shown instead of (or next to) the food tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MealNotice {
    /// No protein + carb pairing; only the legumes variant is offered.
    LegumesOnly,
    /// Neither a pairing nor a legumes variant could be built.
    NoPairing,
    /// Vegetarian/vegan trainee and no diet-safe dinner style could be built.
    NoDietSafeVariant,
    /// No dinner style could be built.
    NoVariant,
    /// No group in the meal could be populated.
    NothingFits,
}

impl MealNotice {
    pub fn describe(&self) -> &'static str {
        match self {
            MealNotice::LegumesOnly => "no protein and carb pairing fits; choose from the legume options",
            MealNotice::NoPairing => "no protein and carb pairing fits your preferences",
            MealNotice::NoDietSafeVariant => {
                "no vegetarian-friendly dinner could be built from the current food list"
            }
            MealNotice::NoVariant => "no dinner style could be built from the current food list",
            MealNotice::NothingFits => "no foods fit this meal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedMeal {
    pub slot: MealSlot,
    pub targets: Macros,
    pub groups: Vec<FoodGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<MealVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<MealNotice>,
}

impl PlannedMeal {
    pub fn variant(&self, style: VariantStyle) -> Option<&MealVariant> {
        self.variants.iter().find(|v| v.style == style)
    }

    pub fn group(&self, role: GroupRole) -> Option<&FoodGroup> {
        self.groups.iter().find(|g| g.role == role)
    }

    /// True when at least one group or variant offers food.
    pub fn is_populated(&self) -> bool {
        self.groups.iter().any(FoodGroup::is_populated)
            || self.variants.iter().any(MealVariant::is_populated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SplitMode {
    Custom,
    Auto,
}

impl SplitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMode::Custom => "custom",
            SplitMode::Auto => "auto",
        }
    }
}

impl std::fmt::Display for SplitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One meal's fraction of each daily macro. `calories` is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroShares {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub calories: f64,
}

impl MacroShares {
    pub fn new(protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            protein,
            carbs,
            fat,
            calories: 0.0,
        }
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fat => self.fat,
            Nutrient::Calories => self.calories,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        match nutrient {
            Nutrient::Protein => self.protein = value,
            Nutrient::Carbs => self.carbs = value,
            Nutrient::Fat => self.fat = value,
            Nutrient::Calories => self.calories = value,
        }
    }
}

/// Per-meal shares of the day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SplitPercentages {
    pub meals: BTreeMap<MealSlot, MacroShares>,
}

impl SplitPercentages {
    pub fn get(&self, slot: MealSlot) -> Option<&MacroShares> {
        self.meals.get(&slot)
    }

    /// Sum of one nutrient's shares across all meals.
    pub fn total(&self, nutrient: Nutrient) -> f64 {
        self.meals.values().map(|s| s.get(nutrient)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    pub split_mode: SplitMode,
    pub split: SplitPercentages,
}

/// The full-day plan. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub meals: Vec<PlannedMeal>,
    pub metadata: PlanMetadata,
}

impl MealPlan {
    pub fn meal(&self, slot: MealSlot) -> Option<&PlannedMeal> {
        self.meals.iter().find(|m| m.slot == slot)
    }

    /// Every option in the plan, across groups and variants.
    pub fn all_options(&self) -> Vec<&FoodOption> {
        self.meals
            .iter()
            .flat_map(|m| {
                m.groups
                    .iter()
                    .chain(m.variants.iter().flat_map(|v| v.groups.iter()))
            })
            .flat_map(FoodGroup::choices)
            .collect()
    }
}

pub mod category;
pub mod food;
pub mod plan;
pub mod trainee;

pub use category::Category;
pub use food::{
    CommonServing, DietaryFlags, Food, FoodRecord, Macros, MealSuitability, Nutrient,
    ServingConstraints, ServingInfo, kcal_from_macros,
};
pub use plan::{
    EmptyReason, FoodGroup, FoodOption, GroupRole, MacroShares, MealNotice, MealPlan, MealSlot,
    MealVariant, PlanMetadata, PlannedMeal, SplitMode, SplitPercentages, VariantStyle,
};
pub use trainee::{
    CustomSplit, DailyTargets, MealGrams, PlanContext, Preferences, RawTargets, TraineeRecord,
    WorkoutTime,
};

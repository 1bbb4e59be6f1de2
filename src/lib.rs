#[cfg(test)]
#[macro_use]
extern crate assert_float_eq;

pub mod cli;
pub mod error;
pub mod interface;
pub mod models;
pub mod planner;
pub mod state;

pub use error::{PlanError, Result};
pub use models::{DailyTargets, Food, MealPlan, PlanContext, Preferences};
pub use planner::{PlannerConfig, build_all, plan_for_trainee};

pub mod assembler;
pub mod builder;
pub mod config;
pub mod constants;
pub mod filter;
pub mod selector;
pub mod split;

pub use assembler::{assemble_breakfast, assemble_dinner, assemble_lunch, assemble_meal, assemble_snack};
pub use builder::{build_all, plan_for_trainee};
pub use config::{MealTolerances, PlannerConfig, ResidualPolicy, ToleranceProfile};
pub use constants::*;
pub use filter::{filter_catalog, satisfies_preferences};
pub use selector::{
    GroupRequest, RankedCandidate, display_text, fit_cap, fit_quantity, group_candidates,
    pick_fixed, select_group, top_up,
};
pub use split::{ResolvedSplit, resolve_split};

pub mod prompts;
pub mod render;

pub use prompts::{
    collect_trainee, prompt_context, prompt_disliked_foods, prompt_preferences, prompt_targets,
    prompt_yes_no,
};
pub use render::{display_food_list, display_meal_plan, display_split};

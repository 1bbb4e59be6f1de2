mod catalog;
mod persistence;

pub use catalog::FoodCatalog;
pub use persistence::{
    load_catalog, load_config, load_foods, load_trainee, save_plan_csv, save_plan_json,
    write_plan_csv,
};

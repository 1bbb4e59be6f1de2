use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use macro_meal_planner_rs::cli::{Cli, Command};
use macro_meal_planner_rs::error::Result;
use macro_meal_planner_rs::interface::{
    collect_trainee, display_food_list, display_meal_plan, display_split, prompt_yes_no,
};
use macro_meal_planner_rs::models::DailyTargets;
use macro_meal_planner_rs::planner::{PlannerConfig, plan_for_trainee, resolve_split};
use macro_meal_planner_rs::state::{
    load_catalog, load_config, load_trainee, save_plan_csv, save_plan_json,
};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Plan {
            catalog,
            trainee,
            config,
            json,
            csv,
        } => cmd_plan(&catalog, &trainee, config.as_deref(), json, csv),
        Command::Split { trainee, config } => cmd_split(&trainee, config.as_deref()),
        Command::Interactive { catalog, config } => cmd_interactive(&catalog, config.as_deref()),
        Command::Catalog { catalog } => cmd_catalog(&catalog),
    }
}

fn planner_config(path: Option<&Path>) -> Result<PlannerConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(PlannerConfig::default()),
    }
}

/// Plan for a stored trainee and optionally export the result.
fn cmd_plan(
    catalog_path: &Path,
    trainee_path: &Path,
    config_path: Option<&Path>,
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
) -> Result<()> {
    let config = planner_config(config_path)?;
    let catalog = load_catalog(catalog_path)?;
    let trainee = load_trainee(trainee_path)?;

    println!("Loaded {} foods", catalog.len());

    let plan = plan_for_trainee(catalog.foods(), &trainee, &config)?;
    display_meal_plan(&plan);

    if let Some(path) = json {
        save_plan_json(&path, &plan)?;
        println!("Plan written to {}", path.display());
    }
    if let Some(path) = csv {
        save_plan_csv(&path, &plan)?;
        println!("Options written to {}", path.display());
    }

    Ok(())
}

/// Print the resolved split without planning meals.
fn cmd_split(trainee_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = planner_config(config_path)?;
    let trainee = load_trainee(trainee_path)?;
    let daily = DailyTargets::try_from(trainee.targets)?;

    let split = resolve_split(
        &daily,
        trainee.custom_split.as_ref(),
        &trainee.context,
        &config,
    );
    display_split(&split);
    Ok(())
}

fn cmd_interactive(catalog_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = planner_config(config_path)?;
    let catalog = load_catalog(catalog_path)?;

    println!("Loaded {} foods ({} active)", catalog.len(), catalog.active().len());
    println!();

    let trainee = collect_trainee(&catalog)?;
    let plan = plan_for_trainee(catalog.foods(), &trainee, &config)?;
    display_meal_plan(&plan);

    if prompt_yes_no("Save the plan as JSON?", false)? {
        let path = Path::new("meal_plan.json");
        save_plan_json(path, &plan)?;
        println!("Plan written to {}", path.display());
    }

    Ok(())
}

fn cmd_catalog(catalog_path: &Path) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    display_food_list(&catalog.active(), "Active foods");
    Ok(())
}

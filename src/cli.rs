use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// meal_planner — splits daily macro targets across meals and suggests portioned food options.
#[derive(Parser, Debug)]
#[command(name = "meal_planner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log planner decisions (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a meal plan for a stored trainee.
    Plan {
        /// Food catalog JSON file.
        #[arg(short, long, default_value = "foods.json")]
        catalog: PathBuf,

        /// Trainee JSON file (targets, preferences, dislikes, context).
        #[arg(short, long, default_value = "trainee.json")]
        trainee: PathBuf,

        /// Planner settings JSON file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write the plan as JSON.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Also write every option as a CSV row.
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show how a trainee's targets are split across meals.
    Split {
        #[arg(short, long, default_value = "trainee.json")]
        trainee: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Enter targets and preferences at the prompt, then plan.
    Interactive {
        #[arg(short, long, default_value = "foods.json")]
        catalog: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the active foods in a catalog.
    Catalog {
        #[arg(short, long, default_value = "foods.json")]
        catalog: PathBuf,
    },
}

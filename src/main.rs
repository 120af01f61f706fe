// Copyright 2023 Remi Bernotavicius

use clap::Parser;
use clap::Subcommand;
use error::{Error, Result};
use model::ScheduleId;
use settings::{ServerSettings, StoreSettings};
use std::path::PathBuf;
use store::Store;

mod database;
mod error;
mod model;
mod schedule;
mod server;
mod settings;
mod shopping_list;
mod store;

#[derive(Parser, Debug)]
#[command(version, about = "Plans a week of meals and keeps its shopping list")]
struct Args {
    #[arg(long, global = true, env = "MEAL_PLANNER_LOG", default_value = "info")]
    log_level: log::LevelFilter,

    #[command(flatten)]
    store: StoreSettings,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the HTTP API.
    Run(ServerSettings),
    /// Refresh and print the shopping list of a schedule (the current one by default).
    ShoppingList {
        #[arg(long)]
        schedule: Option<i32>,
    },
}

/// This is where the database and other user-data lives on-disk. On Linux it should be like:
/// `~/.local/share/meal_planner/`
fn data_path() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| Error::Internal("failed to get user home directory".into()))?;
    let path = dirs.data_dir().join("meal_planner");
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

fn run(store: Box<dyn Store>, settings: ServerSettings) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(store, &settings))
}

fn print_shopping_list(store: &mut dyn Store, schedule_id: Option<ScheduleId>) -> Result<()> {
    let schedule = match schedule_id {
        Some(id) => store
            .schedule(id)?
            .ok_or_else(|| Error::NotFound(format!("schedule {id}")))?,
        None => store
            .current_schedule()?
            .ok_or_else(|| Error::NotFound("current schedule".into()))?,
    };

    println!("{} (week of {})", schedule.name, schedule.start_date);
    for item in shopping_list::refresh(store, schedule.id)? {
        let mark = if item.is_checked { "x" } else { " " };
        println!("[{mark}] {item}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    simple_logger::SimpleLogger::new()
        .with_level(args.log_level)
        .init()
        .map_err(|error| Error::Internal(error.to_string()))?;

    let mut store = store::open(&args.store.store_config(&data_path()?))?;
    log::info!("storing data with the {} backend", store.backend());

    match args.commands {
        Commands::Run(settings) => run(store, settings)?,
        Commands::ShoppingList { schedule } => {
            print_shopping_list(store.as_mut(), schedule.map(ScheduleId::from))?
        }
    }
    Ok(())
}

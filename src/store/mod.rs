// Copyright 2023 Remi Bernotavicius

use crate::error::Result;
use crate::model::{
    Ingredient, IngredientId, NewIngredient, NewRecipe, Recipe, RecipeId, ScheduleId,
    ShoppingListItemId,
};
use crate::schedule::{Day, MealType, NewSchedule, WeeklySchedule};
use crate::shopping_list::{GeneratedItem, ShoppingListItem};
use derive_more::Display;
use serde::Serialize;
use std::path::PathBuf;

mod local;
mod sqlite;

pub use local::LocalStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[display("sqlite")]
    Sqlite,
    #[display("local")]
    Local,
}

/// Everything the server and the CLI need from persistence.
///
/// Lookups of a single entity return `None` when it does not exist, as do updates of a
/// missing entity. Deletes report whether anything was removed. Writes that reference
/// another entity which does not exist fail with `Error::NotFound` and change nothing.
pub trait Store: Send {
    fn backend(&self) -> Backend;

    fn ingredients(&mut self) -> Result<Vec<Ingredient>>;
    fn ingredient(&mut self, id: IngredientId) -> Result<Option<Ingredient>>;
    fn create_ingredient(&mut self, ingredient: &NewIngredient) -> Result<Ingredient>;
    fn update_ingredient(
        &mut self,
        id: IngredientId,
        ingredient: &NewIngredient,
    ) -> Result<Option<Ingredient>>;
    /// Also removes the ingredient from every recipe and shopping list.
    fn delete_ingredient(&mut self, id: IngredientId) -> Result<bool>;

    fn recipes(&mut self) -> Result<Vec<Recipe>>;
    fn recipe(&mut self, id: RecipeId) -> Result<Option<Recipe>>;
    fn create_recipe(&mut self, recipe: &NewRecipe) -> Result<Recipe>;
    fn update_recipe(&mut self, id: RecipeId, recipe: &NewRecipe) -> Result<Option<Recipe>>;
    /// Also empties every schedule slot that held the recipe.
    fn delete_recipe(&mut self, id: RecipeId) -> Result<bool>;

    /// Newest `start_date` first.
    fn schedules(&mut self) -> Result<Vec<WeeklySchedule>>;
    fn schedule(&mut self, id: ScheduleId) -> Result<Option<WeeklySchedule>>;
    /// The schedule with the greatest `start_date`, the most recently created one on ties.
    fn current_schedule(&mut self) -> Result<Option<WeeklySchedule>>;
    fn create_schedule(&mut self, schedule: &NewSchedule) -> Result<WeeklySchedule>;
    /// Fills the slot, replacing whatever was there, and rebuilds the schedule's shopping list
    /// in the same change. When either step fails neither is kept.
    fn assign_meal_and_refresh(
        &mut self,
        schedule_id: ScheduleId,
        day: Day,
        meal_type: MealType,
        recipe_id: RecipeId,
    ) -> Result<WeeklySchedule>;
    /// Empties the slot (which may already be empty) and rebuilds the shopping list, as one
    /// change.
    fn remove_meal_and_refresh(
        &mut self,
        schedule_id: ScheduleId,
        day: Day,
        meal_type: MealType,
    ) -> Result<WeeklySchedule>;
    fn delete_schedule(&mut self, id: ScheduleId) -> Result<bool>;

    /// Unchecked items first, then by ingredient name.
    fn shopping_list(&mut self, schedule_id: ScheduleId) -> Result<Vec<ShoppingListItem>>;
    fn upsert_shopping_list_item(
        &mut self,
        schedule_id: ScheduleId,
        item: &GeneratedItem,
    ) -> Result<ShoppingListItem>;
    fn update_checked_status(&mut self, id: ShoppingListItemId, is_checked: bool)
        -> Result<bool>;
    /// Replaces the whole list atomically. Ingredients that were checked before and are still
    /// on the list stay checked.
    fn regenerate_shopping_list(
        &mut self,
        schedule_id: ScheduleId,
        items: &[GeneratedItem],
    ) -> Result<Vec<ShoppingListItem>>;
    fn delete_shopping_list(&mut self, schedule_id: ScheduleId) -> Result<bool>;
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub database: PathBuf,
    /// Where the fallback store keeps its data. `None` keeps it in memory only.
    pub local_store: Option<PathBuf>,
}

/// Opens the SQLite database, or the local store if the database can't be used.
pub fn open(config: &StoreConfig) -> Result<Box<dyn Store>> {
    match SqliteStore::open(&config.database) {
        Ok(store) => {
            log::info!("using database at {}", config.database.display());
            Ok(Box::new(store))
        }
        Err(error) => {
            log::warn!(
                "database at {} is unavailable ({error}), falling back to the local store",
                config.database.display()
            );
            let store = match &config.local_store {
                Some(path) => {
                    log::info!("using local store at {}", path.display());
                    LocalStore::open(path)?
                }
                None => LocalStore::in_memory(),
            };
            Ok(Box::new(store))
        }
    }
}

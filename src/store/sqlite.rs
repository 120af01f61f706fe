// Copyright 2023 Remi Bernotavicius

use super::{Backend, Store};
use crate::database::{self, query};
use crate::error::Result;
use crate::model::{
    Ingredient, IngredientId, NewIngredient, NewRecipe, Recipe, RecipeId, ScheduleId,
    ShoppingListItemId,
};
use crate::schedule::{Day, MealType, NewSchedule, WeeklySchedule};
use crate::shopping_list::{GeneratedItem, ShoppingListItem};
use std::path::Path;

pub struct SqliteStore {
    conn: database::Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            conn: database::establish_connection(path)?,
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }
}

impl Store for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn ingredients(&mut self) -> Result<Vec<Ingredient>> {
        query::all_ingredients(&mut self.conn)
    }

    fn ingredient(&mut self, id: IngredientId) -> Result<Option<Ingredient>> {
        query::get_ingredient(&mut self.conn, id)
    }

    fn create_ingredient(&mut self, ingredient: &NewIngredient) -> Result<Ingredient> {
        query::add_ingredient(&mut self.conn, ingredient)
    }

    fn update_ingredient(
        &mut self,
        id: IngredientId,
        ingredient: &NewIngredient,
    ) -> Result<Option<Ingredient>> {
        query::update_ingredient(&mut self.conn, id, ingredient)
    }

    fn delete_ingredient(&mut self, id: IngredientId) -> Result<bool> {
        query::delete_ingredient(&mut self.conn, id)
    }

    fn recipes(&mut self) -> Result<Vec<Recipe>> {
        query::all_recipes(&mut self.conn)
    }

    fn recipe(&mut self, id: RecipeId) -> Result<Option<Recipe>> {
        query::get_recipe(&mut self.conn, id)
    }

    fn create_recipe(&mut self, recipe: &NewRecipe) -> Result<Recipe> {
        query::add_recipe(&mut self.conn, recipe)
    }

    fn update_recipe(&mut self, id: RecipeId, recipe: &NewRecipe) -> Result<Option<Recipe>> {
        query::update_recipe(&mut self.conn, id, recipe)
    }

    fn delete_recipe(&mut self, id: RecipeId) -> Result<bool> {
        query::delete_recipe(&mut self.conn, id)
    }

    fn schedules(&mut self) -> Result<Vec<WeeklySchedule>> {
        query::all_schedules(&mut self.conn)
    }

    fn schedule(&mut self, id: ScheduleId) -> Result<Option<WeeklySchedule>> {
        query::get_schedule(&mut self.conn, id)
    }

    fn current_schedule(&mut self) -> Result<Option<WeeklySchedule>> {
        query::current_schedule(&mut self.conn)
    }

    fn create_schedule(&mut self, schedule: &NewSchedule) -> Result<WeeklySchedule> {
        query::add_schedule(&mut self.conn, schedule)
    }

    fn assign_meal_and_refresh(
        &mut self,
        schedule_id: ScheduleId,
        day: Day,
        meal_type: MealType,
        recipe_id: RecipeId,
    ) -> Result<WeeklySchedule> {
        query::assign_meal_and_refresh(&mut self.conn, schedule_id, day, meal_type, recipe_id)
    }

    fn remove_meal_and_refresh(
        &mut self,
        schedule_id: ScheduleId,
        day: Day,
        meal_type: MealType,
    ) -> Result<WeeklySchedule> {
        query::remove_meal_and_refresh(&mut self.conn, schedule_id, day, meal_type)
    }

    fn delete_schedule(&mut self, id: ScheduleId) -> Result<bool> {
        query::delete_schedule(&mut self.conn, id)
    }

    fn shopping_list(&mut self, schedule_id: ScheduleId) -> Result<Vec<ShoppingListItem>> {
        query::get_shopping_list(&mut self.conn, schedule_id)
    }

    fn upsert_shopping_list_item(
        &mut self,
        schedule_id: ScheduleId,
        item: &GeneratedItem,
    ) -> Result<ShoppingListItem> {
        query::upsert_shopping_list_item(&mut self.conn, schedule_id, item)
    }

    fn update_checked_status(
        &mut self,
        id: ShoppingListItemId,
        is_checked: bool,
    ) -> Result<bool> {
        query::update_checked_status(&mut self.conn, id, is_checked)
    }

    fn regenerate_shopping_list(
        &mut self,
        schedule_id: ScheduleId,
        items: &[GeneratedItem],
    ) -> Result<Vec<ShoppingListItem>> {
        query::regenerate_shopping_list(&mut self.conn, schedule_id, items)
    }

    fn delete_shopping_list(&mut self, schedule_id: ScheduleId) -> Result<bool> {
        query::delete_shopping_list(&mut self.conn, schedule_id)
    }
}

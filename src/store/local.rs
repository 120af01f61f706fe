// Copyright 2023 Remi Bernotavicius

use super::{Backend, Store};
use crate::error::{Error, Result};
use crate::model::{
    Difficulty, Ingredient, IngredientId, NewIngredient, NewRecipe, NewRecipeIngredient, Recipe,
    RecipeCategory, RecipeId, RecipeIngredient, ScheduleId, ShoppingListItemId,
};
use crate::schedule::{Day, MealType, NewSchedule, WeeklySchedule};
use crate::shopping_list::{self, GeneratedItem, ShoppingListItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecipe {
    id: RecipeId,
    name: String,
    category: RecipeCategory,
    difficulty: Difficulty,
    servings: i32,
    cooking_time: Option<i32>,
    instructions: Option<String>,
    ingredients: Vec<NewRecipeIngredient>,
}

impl StoredRecipe {
    fn new(id: RecipeId, recipe: &NewRecipe) -> Self {
        Self {
            id,
            name: recipe.name.clone(),
            category: recipe.category,
            difficulty: recipe.difficulty,
            servings: recipe.servings,
            cooking_time: recipe.cooking_time,
            instructions: recipe.instructions.clone(),
            ingredients: recipe.ingredients.clone(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMeal {
    day: Day,
    meal_type: MealType,
    recipe_id: RecipeId,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSchedule {
    id: ScheduleId,
    name: String,
    start_date: chrono::NaiveDate,
    meals: Vec<StoredMeal>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredItem {
    id: ShoppingListItemId,
    schedule_id: ScheduleId,
    ingredient_id: IngredientId,
    total_quantity: f64,
    recipes: Vec<String>,
    is_checked: bool,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NextIds {
    ingredient: IngredientId,
    recipe: RecipeId,
    schedule: ScheduleId,
    item: ShoppingListItemId,
}

impl Default for NextIds {
    fn default() -> Self {
        Self {
            ingredient: IngredientId::INITIAL,
            recipe: RecipeId::INITIAL,
            schedule: ScheduleId::INITIAL,
            item: ShoppingListItemId::INITIAL,
        }
    }
}

/// The whole data set. Records refer to each other by id, the way the tables do.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    ingredients: Vec<Ingredient>,
    recipes: Vec<StoredRecipe>,
    schedules: Vec<StoredSchedule>,
    shopping_list_items: Vec<StoredItem>,
    next_ids: NextIds,
}

fn missing(what: impl std::fmt::Display) -> Error {
    Error::NotFound(what.to_string())
}

impl Snapshot {
    fn ingredient(&self, id: IngredientId) -> Option<&Ingredient> {
        self.ingredients.iter().find(|i| i.id == id)
    }

    fn ensure_ingredient(&self, id: IngredientId) -> Result<&Ingredient> {
        self.ingredient(id)
            .ok_or_else(|| missing(format!("ingredient {id}")))
    }

    fn ensure_schedule(&mut self, id: ScheduleId) -> Result<&mut StoredSchedule> {
        self.schedules
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| missing(format!("schedule {id}")))
    }

    fn recipe(&self, id: RecipeId) -> Option<Recipe> {
        let stored = self.recipes.iter().find(|r| r.id == id)?;
        let ingredients = stored
            .ingredients
            .iter()
            .filter_map(|usage| {
                Some(RecipeIngredient {
                    ingredient: self.ingredient(usage.ingredient_id)?.clone(),
                    quantity: usage.quantity,
                })
            })
            .collect();
        Some(Recipe {
            id: stored.id,
            name: stored.name.clone(),
            category: stored.category,
            difficulty: stored.difficulty,
            servings: stored.servings,
            cooking_time: stored.cooking_time,
            instructions: stored.instructions.clone(),
            ingredients,
        })
    }

    fn schedule(&self, stored: &StoredSchedule) -> WeeklySchedule {
        let mut schedule = WeeklySchedule::new(stored.id, stored.name.clone(), stored.start_date);
        for meal in &stored.meals {
            if let Some(recipe) = self.recipe(meal.recipe_id) {
                schedule.assign(meal.day, meal.meal_type, recipe);
            }
        }
        schedule
    }

    fn sorted_schedules(&self) -> Vec<&StoredSchedule> {
        let mut schedules: Vec<_> = self.schedules.iter().collect();
        schedules.sort_by(|a, b| (b.start_date, b.id).cmp(&(a.start_date, a.id)));
        schedules
    }

    fn item(&self, stored: &StoredItem) -> Option<ShoppingListItem> {
        Some(ShoppingListItem {
            id: stored.id,
            schedule_id: stored.schedule_id,
            ingredient: self.ingredient(stored.ingredient_id)?.clone(),
            total_quantity: stored.total_quantity,
            recipes: stored.recipes.clone(),
            is_checked: stored.is_checked,
        })
    }

    fn shopping_list(&self, schedule_id: ScheduleId) -> Vec<ShoppingListItem> {
        let mut items: Vec<_> = self
            .shopping_list_items
            .iter()
            .filter(|i| i.schedule_id == schedule_id)
            .filter_map(|i| self.item(i))
            .collect();
        items.sort_by(|a, b| {
            (a.is_checked, &a.ingredient.name, a.id).cmp(&(b.is_checked, &b.ingredient.name, b.id))
        });
        items
    }

    fn put_meal(
        &mut self,
        schedule_id: ScheduleId,
        day: Day,
        meal_type: MealType,
        recipe_id: RecipeId,
    ) -> Result<()> {
        if !self.recipes.iter().any(|r| r.id == recipe_id) {
            return Err(missing(format!("recipe {recipe_id}")));
        }
        let schedule = self.ensure_schedule(schedule_id)?;
        schedule
            .meals
            .retain(|m| (m.day, m.meal_type) != (day, meal_type));
        schedule.meals.push(StoredMeal {
            day,
            meal_type,
            recipe_id,
        });
        Ok(())
    }

    fn take_meal(&mut self, schedule_id: ScheduleId, day: Day, meal_type: MealType) -> Result<()> {
        self.ensure_schedule(schedule_id)?
            .meals
            .retain(|m| (m.day, m.meal_type) != (day, meal_type));
        Ok(())
    }

    /// Callers have already checked `items`.
    fn replace_shopping_list(
        &mut self,
        schedule_id: ScheduleId,
        items: &[GeneratedItem],
    ) -> Result<Vec<ShoppingListItem>> {
        self.ensure_schedule(schedule_id)?;
        for item in items {
            self.ensure_ingredient(item.ingredient.id)?;
        }

        let checked: HashSet<IngredientId> = self
            .shopping_list_items
            .iter()
            .filter(|i| i.schedule_id == schedule_id && i.is_checked)
            .map(|i| i.ingredient_id)
            .collect();
        self.shopping_list_items
            .retain(|i| i.schedule_id != schedule_id);
        for item in items {
            self.push_item(schedule_id, item, checked.contains(&item.ingredient.id));
        }
        Ok(self.shopping_list(schedule_id))
    }

    fn refresh_shopping_list(&mut self, schedule_id: ScheduleId) -> Result<WeeklySchedule> {
        let schedule = {
            let stored = self
                .schedules
                .iter()
                .find(|s| s.id == schedule_id)
                .ok_or_else(|| missing(format!("schedule {schedule_id}")))?;
            self.schedule(stored)
        };
        let items = shopping_list::items_for(&schedule)?;
        self.replace_shopping_list(schedule_id, &items)?;
        Ok(schedule)
    }

    fn push_item(&mut self, schedule_id: ScheduleId, item: &GeneratedItem, is_checked: bool) {
        let id = self.next_ids.item;
        self.next_ids.item = id.next();
        self.shopping_list_items.push(StoredItem {
            id,
            schedule_id,
            ingredient_id: item.ingredient.id,
            total_quantity: item.total_quantity,
            recipes: item.recipes.clone(),
            is_checked,
        });
    }
}

/// Keeps everything in memory, and optionally in a JSON file that is rewritten after every
/// change. Used when the database can't be opened.
pub struct LocalStore {
    data: Snapshot,
    path: Option<PathBuf>,
}

impl LocalStore {
    pub fn in_memory() -> Self {
        Self {
            data: Snapshot::default(),
            path: None,
        }
    }

    /// Loads the data saved at `path`, starting empty if there is none yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(path)?)?
        } else {
            Snapshot::default()
        };
        Ok(Self {
            data,
            path: Some(path.to_owned()),
        })
    }

    fn save(path: &Path, data: &Snapshot) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, serde_json::to_string_pretty(data)?)?;
        std::fs::rename(&temp, path)?;
        Ok(())
    }

    /// Applies `mutate` to a copy of the data, which replaces the current data only once it
    /// has been saved.
    fn commit<T>(&mut self, mutate: impl FnOnce(&mut Snapshot) -> Result<T>) -> Result<T> {
        let mut data = self.data.clone();
        let value = mutate(&mut data)?;
        if let Some(path) = &self.path {
            Self::save(path, &data)?;
        }
        self.data = data;
        Ok(value)
    }
}

impl Store for LocalStore {
    fn backend(&self) -> Backend {
        Backend::Local
    }

    fn ingredients(&mut self) -> Result<Vec<Ingredient>> {
        let mut ingredients = self.data.ingredients.clone();
        ingredients.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(ingredients)
    }

    fn ingredient(&mut self, id: IngredientId) -> Result<Option<Ingredient>> {
        Ok(self.data.ingredient(id).cloned())
    }

    fn create_ingredient(&mut self, ingredient: &NewIngredient) -> Result<Ingredient> {
        self.commit(|data| {
            let id = data.next_ids.ingredient;
            data.next_ids.ingredient = id.next();
            let ingredient = ingredient.clone().with_id(id);
            data.ingredients.push(ingredient.clone());
            Ok(ingredient)
        })
    }

    fn update_ingredient(
        &mut self,
        id: IngredientId,
        ingredient: &NewIngredient,
    ) -> Result<Option<Ingredient>> {
        if self.data.ingredient(id).is_none() {
            return Ok(None);
        }
        self.commit(|data| {
            let updated = ingredient.clone().with_id(id);
            for existing in data.ingredients.iter_mut().filter(|i| i.id == id) {
                *existing = updated.clone();
            }
            Ok(Some(updated))
        })
    }

    fn delete_ingredient(&mut self, id: IngredientId) -> Result<bool> {
        if self.data.ingredient(id).is_none() {
            return Ok(false);
        }
        self.commit(|data| {
            data.ingredients.retain(|i| i.id != id);
            for recipe in &mut data.recipes {
                recipe.ingredients.retain(|usage| usage.ingredient_id != id);
            }
            data.shopping_list_items.retain(|i| i.ingredient_id != id);
            Ok(true)
        })
    }

    fn recipes(&mut self) -> Result<Vec<Recipe>> {
        let mut recipes: Vec<_> = self
            .data
            .recipes
            .iter()
            .filter_map(|r| self.data.recipe(r.id))
            .collect();
        recipes.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(recipes)
    }

    fn recipe(&mut self, id: RecipeId) -> Result<Option<Recipe>> {
        Ok(self.data.recipe(id))
    }

    fn create_recipe(&mut self, recipe: &NewRecipe) -> Result<Recipe> {
        self.commit(|data| {
            for ingredient_id in recipe.ingredient_ids() {
                data.ensure_ingredient(ingredient_id)?;
            }
            let id = data.next_ids.recipe;
            data.next_ids.recipe = id.next();
            data.recipes.push(StoredRecipe::new(id, recipe));
            data.recipe(id)
                .ok_or_else(|| Error::Internal(format!("recipe {id} vanished after insert")))
        })
    }

    fn update_recipe(&mut self, id: RecipeId, recipe: &NewRecipe) -> Result<Option<Recipe>> {
        if !self.data.recipes.iter().any(|r| r.id == id) {
            return Ok(None);
        }
        self.commit(|data| {
            for ingredient_id in recipe.ingredient_ids() {
                data.ensure_ingredient(ingredient_id)?;
            }
            for existing in data.recipes.iter_mut().filter(|r| r.id == id) {
                *existing = StoredRecipe::new(id, recipe);
            }
            Ok(data.recipe(id))
        })
    }

    fn delete_recipe(&mut self, id: RecipeId) -> Result<bool> {
        if !self.data.recipes.iter().any(|r| r.id == id) {
            return Ok(false);
        }
        self.commit(|data| {
            data.recipes.retain(|r| r.id != id);
            for schedule in &mut data.schedules {
                schedule.meals.retain(|m| m.recipe_id != id);
            }
            Ok(true)
        })
    }

    fn schedules(&mut self) -> Result<Vec<WeeklySchedule>> {
        Ok(self
            .data
            .sorted_schedules()
            .into_iter()
            .map(|s| self.data.schedule(s))
            .collect())
    }

    fn schedule(&mut self, id: ScheduleId) -> Result<Option<WeeklySchedule>> {
        Ok(self
            .data
            .schedules
            .iter()
            .find(|s| s.id == id)
            .map(|s| self.data.schedule(s)))
    }

    fn current_schedule(&mut self) -> Result<Option<WeeklySchedule>> {
        Ok(self
            .data
            .sorted_schedules()
            .first()
            .map(|s| self.data.schedule(s)))
    }

    fn create_schedule(&mut self, schedule: &NewSchedule) -> Result<WeeklySchedule> {
        self.commit(|data| {
            let id = data.next_ids.schedule;
            data.next_ids.schedule = id.next();
            data.schedules.push(StoredSchedule {
                id,
                name: schedule.name.clone(),
                start_date: schedule.start_date,
                meals: vec![],
            });
            Ok(schedule.clone().with_id(id))
        })
    }

    fn assign_meal_and_refresh(
        &mut self,
        schedule_id: ScheduleId,
        day: Day,
        meal_type: MealType,
        recipe_id: RecipeId,
    ) -> Result<WeeklySchedule> {
        self.commit(|data| {
            data.put_meal(schedule_id, day, meal_type, recipe_id)?;
            data.refresh_shopping_list(schedule_id)
        })
    }

    fn remove_meal_and_refresh(
        &mut self,
        schedule_id: ScheduleId,
        day: Day,
        meal_type: MealType,
    ) -> Result<WeeklySchedule> {
        self.commit(|data| {
            data.take_meal(schedule_id, day, meal_type)?;
            data.refresh_shopping_list(schedule_id)
        })
    }

    fn delete_schedule(&mut self, id: ScheduleId) -> Result<bool> {
        if !self.data.schedules.iter().any(|s| s.id == id) {
            return Ok(false);
        }
        self.commit(|data| {
            data.schedules.retain(|s| s.id != id);
            data.shopping_list_items.retain(|i| i.schedule_id != id);
            Ok(true)
        })
    }

    fn shopping_list(&mut self, schedule_id: ScheduleId) -> Result<Vec<ShoppingListItem>> {
        Ok(self.data.shopping_list(schedule_id))
    }

    fn upsert_shopping_list_item(
        &mut self,
        schedule_id: ScheduleId,
        item: &GeneratedItem,
    ) -> Result<ShoppingListItem> {
        shopping_list::check_item(item)?;
        self.commit(|data| {
            data.ensure_schedule(schedule_id)?;
            data.ensure_ingredient(item.ingredient.id)?;
            let existing = data
                .shopping_list_items
                .iter_mut()
                .find(|i| i.schedule_id == schedule_id && i.ingredient_id == item.ingredient.id);
            match existing {
                Some(existing) => {
                    existing.total_quantity = item.total_quantity;
                    existing.recipes = item.recipes.clone();
                }
                None => data.push_item(schedule_id, item, item.is_checked),
            }
            data.shopping_list_items
                .iter()
                .find(|i| i.schedule_id == schedule_id && i.ingredient_id == item.ingredient.id)
                .and_then(|i| data.item(i))
                .ok_or_else(|| Error::Internal("shopping list item vanished after upsert".into()))
        })
    }

    fn update_checked_status(
        &mut self,
        id: ShoppingListItemId,
        is_checked: bool,
    ) -> Result<bool> {
        if !self.data.shopping_list_items.iter().any(|i| i.id == id) {
            return Ok(false);
        }
        self.commit(|data| {
            for item in data.shopping_list_items.iter_mut().filter(|i| i.id == id) {
                item.is_checked = is_checked;
            }
            Ok(true)
        })
    }

    fn regenerate_shopping_list(
        &mut self,
        schedule_id: ScheduleId,
        items: &[GeneratedItem],
    ) -> Result<Vec<ShoppingListItem>> {
        shopping_list::check_items(items)?;
        self.commit(|data| data.replace_shopping_list(schedule_id, items))
    }

    fn delete_shopping_list(&mut self, schedule_id: ScheduleId) -> Result<bool> {
        if !self
            .data
            .shopping_list_items
            .iter()
            .any(|i| i.schedule_id == schedule_id)
        {
            return Ok(false);
        }
        self.commit(|data| {
            data.shopping_list_items
                .retain(|i| i.schedule_id != schedule_id);
            Ok(true)
        })
    }
}

#[test]
fn saved_data_survives_reopening() {
    let dir = std::env::temp_dir().join(format!("meal-planner-local-{}", std::process::id()));
    let path = dir.join("local.json");
    let _ = std::fs::remove_file(&path);

    let mut store = LocalStore::open(&path).unwrap();
    let flour = store
        .create_ingredient(&NewIngredient::new("Flour", "cups").unwrap())
        .unwrap();
    drop(store);

    let mut store = LocalStore::open(&path).unwrap();
    assert_eq!(store.ingredients().unwrap(), vec![flour.clone()]);

    let salt = store
        .create_ingredient(&NewIngredient::new("Salt", "tsp").unwrap())
        .unwrap();
    assert_eq!(salt.id, flour.id.next());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn failed_save_keeps_previous_data() {
    let dir = std::env::temp_dir().join(format!("meal-planner-unsaved-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("local.json");

    let mut store = LocalStore::open(&path).unwrap();
    let flour = store
        .create_ingredient(&NewIngredient::new("Flour", "cups").unwrap())
        .unwrap();
    let bread = store
        .create_recipe(&NewRecipe {
            ingredients: vec![NewRecipeIngredient {
                ingredient_id: flour.id,
                quantity: 3.0,
            }],
            ..crate::model::sample_recipe("Bread")
        })
        .unwrap();
    let week = store
        .create_schedule(&NewSchedule {
            name: "Week".into(),
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        })
        .unwrap();
    store
        .assign_meal_and_refresh(week.id, Day::Monday, MealType::Dinner, bread.id)
        .unwrap();
    let list = store.shopping_list(week.id).unwrap();
    assert_eq!(list.len(), 1);

    // A non-empty directory where the file belongs makes the rename fail.
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir_all(path.join("blocker")).unwrap();

    assert!(store
        .assign_meal_and_refresh(week.id, Day::Tuesday, MealType::Dinner, bread.id)
        .is_err());
    assert!(store.regenerate_shopping_list(week.id, &[]).is_err());
    assert_eq!(store.shopping_list(week.id).unwrap(), list);
    let schedule = store.schedule(week.id).unwrap().unwrap();
    assert!(schedule.meal_for_slot(Day::Tuesday, MealType::Dinner).is_none());
    assert!(schedule.meal_for_slot(Day::Monday, MealType::Dinner).is_some());

    std::fs::remove_dir_all(&dir).unwrap();
}

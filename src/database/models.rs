// Copyright 2023 Remi Bernotavicius

use crate::error::Result;
use crate::model::{
    Difficulty, Ingredient, IngredientId, NewRecipe, Recipe, RecipeCategory, RecipeId,
    RecipeIngredient, ScheduleId, ShoppingListItemId,
};
use crate::schedule::{Day, MealType};
use crate::shopping_list::{GeneratedItem, ShoppingListItem};
use diesel::associations::{Associations, Identifiable};
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel::prelude::{AsChangeset, Insertable};

#[derive(Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct RecipeRow {
    pub id: RecipeId,
    pub name: String,
    pub category: RecipeCategory,
    pub difficulty: Difficulty,
    pub servings: i32,
    pub cooking_time: Option<i32>,
    pub instructions: Option<String>,
}

impl RecipeRow {
    pub fn into_recipe(self, ingredients: Vec<RecipeIngredient>) -> Recipe {
        Recipe {
            id: self.id,
            name: self.name,
            category: self.category,
            difficulty: self.difficulty,
            servings: self.servings,
            cooking_time: self.cooking_time,
            instructions: self.instructions,
            ingredients,
        }
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::database::schema::recipes)]
#[diesel(treat_none_as_null = true)]
pub struct RecipeChanges<'a> {
    pub name: &'a str,
    pub category: RecipeCategory,
    pub difficulty: Difficulty,
    pub servings: i32,
    pub cooking_time: Option<i32>,
    pub instructions: Option<&'a str>,
}

impl<'a> From<&'a NewRecipe> for RecipeChanges<'a> {
    fn from(recipe: &'a NewRecipe) -> Self {
        Self {
            name: &recipe.name,
            category: recipe.category,
            difficulty: recipe.difficulty,
            servings: recipe.servings,
            cooking_time: recipe.cooking_time,
            instructions: recipe.instructions.as_deref(),
        }
    }
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(RecipeRow, foreign_key = recipe_id))]
#[diesel(table_name = crate::database::schema::recipe_ingredients)]
pub struct RecipeIngredientRow {
    pub id: i32,
    pub recipe_id: RecipeId,
    pub ingredient_id: IngredientId,
    pub quantity: f64,
}

#[derive(Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::database::schema::weekly_schedules)]
pub struct ScheduleRow {
    pub id: ScheduleId,
    pub name: String,
    pub start_date: chrono::NaiveDate,
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(ScheduleRow, foreign_key = schedule_id))]
#[diesel(table_name = crate::database::schema::schedule_meals)]
pub struct ScheduleMealRow {
    pub id: i32,
    pub schedule_id: ScheduleId,
    pub day: Day,
    pub meal_type: MealType,
    pub recipe_id: RecipeId,
}

#[derive(Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::database::schema::shopping_list_items)]
pub struct ShoppingListRow {
    pub id: ShoppingListItemId,
    pub schedule_id: ScheduleId,
    pub ingredient_id: IngredientId,
    pub total_quantity: f64,
    /// JSON array of recipe names.
    pub recipes: String,
    pub is_checked: bool,
}

impl ShoppingListRow {
    pub fn into_item(self, ingredient: Ingredient) -> Result<ShoppingListItem> {
        Ok(ShoppingListItem {
            id: self.id,
            schedule_id: self.schedule_id,
            ingredient,
            total_quantity: self.total_quantity,
            recipes: serde_json::from_str(&self.recipes)?,
            is_checked: self.is_checked,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::database::schema::shopping_list_items)]
pub struct NewShoppingListRow {
    pub schedule_id: ScheduleId,
    pub ingredient_id: IngredientId,
    pub total_quantity: f64,
    pub recipes: String,
    pub is_checked: bool,
}

impl NewShoppingListRow {
    pub fn new(schedule_id: ScheduleId, item: &GeneratedItem, is_checked: bool) -> Result<Self> {
        Ok(Self {
            schedule_id,
            ingredient_id: item.ingredient.id,
            total_quantity: item.total_quantity,
            recipes: serde_json::to_string(&item.recipes)?,
            is_checked,
        })
    }
}

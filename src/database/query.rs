// Copyright 2023 Remi Bernotavicius

use crate::database;
use crate::database::models::{
    NewShoppingListRow, RecipeChanges, RecipeIngredientRow, RecipeRow, ScheduleMealRow,
    ScheduleRow, ShoppingListRow,
};
use crate::error::{Error, Result};
use crate::model::{
    Ingredient, IngredientId, NewIngredient, NewRecipe, NewRecipeIngredient, Recipe, RecipeId,
    RecipeIngredient, ScheduleId, ShoppingListItemId,
};
use crate::schedule::{Day, MealType, NewSchedule, WeeklySchedule};
use crate::shopping_list::{self, GeneratedItem, ShoppingListItem};
use diesel::prelude::BelongingToDsl as _;
use diesel::prelude::Connection as _;
use diesel::prelude::GroupedBy as _;
use diesel::prelude::OptionalExtension as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use std::collections::{HashMap, HashSet};

fn last_insert_id<T: From<i32>>(conn: &mut database::Connection) -> Result<T> {
    use diesel::dsl::sql;
    use diesel::sql_types::Integer;

    let id: i32 = diesel::select(sql::<Integer>("last_insert_rowid()")).get_result(conn)?;
    Ok(id.into())
}

pub fn all_ingredients(conn: &mut database::Connection) -> Result<Vec<Ingredient>> {
    use database::schema::ingredients::dsl::*;

    Ok(ingredients
        .select(Ingredient::as_select())
        .order((name.asc(), id.asc()))
        .load(conn)?)
}

pub fn get_ingredient(
    conn: &mut database::Connection,
    ingredient_id: IngredientId,
) -> Result<Option<Ingredient>> {
    use database::schema::ingredients::dsl::*;

    Ok(ingredients
        .select(Ingredient::as_select())
        .filter(id.eq(ingredient_id))
        .get_result(conn)
        .optional()?)
}

pub fn add_ingredient(
    conn: &mut database::Connection,
    new_ingredient: &NewIngredient,
) -> Result<Ingredient> {
    use database::schema::ingredients::dsl::*;
    use diesel::insert_into;

    conn.transaction::<_, Error, _>(|conn| {
        insert_into(ingredients)
            .values(new_ingredient)
            .execute(conn)?;
        Ok(new_ingredient.clone().with_id(last_insert_id(conn)?))
    })
}

pub fn update_ingredient(
    conn: &mut database::Connection,
    edit_id: IngredientId,
    edited: &NewIngredient,
) -> Result<Option<Ingredient>> {
    use database::schema::ingredients::dsl::*;
    use diesel::update;

    let updated = update(ingredients.filter(id.eq(edit_id)))
        .set((name.eq(&edited.name), unit.eq(&edited.unit)))
        .execute(conn)?;
    Ok((updated > 0).then(|| edited.clone().with_id(edit_id)))
}

/// Recipe ingredients and shopping list items that use the ingredient go with it.
pub fn delete_ingredient(conn: &mut database::Connection, delete_id: IngredientId) -> Result<bool> {
    use database::schema::ingredients::dsl::*;
    use diesel::delete;

    Ok(delete(ingredients.filter(id.eq(delete_id))).execute(conn)? > 0)
}

fn ensure_ingredients_exist(
    conn: &mut database::Connection,
    wanted: Vec<IngredientId>,
) -> Result<()> {
    use database::schema::ingredients::dsl::*;

    let found: HashSet<IngredientId> = ingredients
        .select(id)
        .filter(id.eq_any(wanted.clone()))
        .load::<IngredientId>(conn)?
        .into_iter()
        .collect();
    match wanted.into_iter().find(|i| !found.contains(i)) {
        Some(missing) => Err(Error::NotFound(format!("ingredient {missing}"))),
        None => Ok(()),
    }
}

fn with_ingredients(conn: &mut database::Connection, rows: Vec<RecipeRow>) -> Result<Vec<Recipe>> {
    use database::schema::{ingredients, recipe_ingredients};

    let usages = RecipeIngredientRow::belonging_to(&rows)
        .inner_join(ingredients::table)
        .order(recipe_ingredients::id.asc())
        .select((RecipeIngredientRow::as_select(), Ingredient::as_select()))
        .load::<(RecipeIngredientRow, Ingredient)>(conn)?;

    let grouped = usages.grouped_by(&rows);
    Ok(grouped
        .into_iter()
        .zip(rows)
        .map(|(usages, row)| {
            row.into_recipe(
                usages
                    .into_iter()
                    .map(|(usage, ingredient)| RecipeIngredient {
                        ingredient,
                        quantity: usage.quantity,
                    })
                    .collect(),
            )
        })
        .collect())
}

pub fn all_recipes(conn: &mut database::Connection) -> Result<Vec<Recipe>> {
    use database::schema::recipes::dsl::*;

    let rows = recipes
        .select(RecipeRow::as_select())
        .order((name.asc(), id.asc()))
        .load(conn)?;
    with_ingredients(conn, rows)
}

pub fn get_recipe(conn: &mut database::Connection, recipe_id: RecipeId) -> Result<Option<Recipe>> {
    use database::schema::recipes::dsl::*;

    let row = recipes
        .select(RecipeRow::as_select())
        .filter(id.eq(recipe_id))
        .get_result(conn)
        .optional()?;
    match row {
        Some(row) => Ok(with_ingredients(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

fn recipes_by_id(
    conn: &mut database::Connection,
    wanted: Vec<RecipeId>,
) -> Result<HashMap<RecipeId, Recipe>> {
    use database::schema::recipes::dsl::*;

    let rows = recipes
        .select(RecipeRow::as_select())
        .filter(id.eq_any(wanted))
        .load(conn)?;
    Ok(with_ingredients(conn, rows)?
        .into_iter()
        .map(|r| (r.id, r))
        .collect())
}

fn insert_recipe_ingredients(
    conn: &mut database::Connection,
    new_recipe_id: RecipeId,
    usages: &[NewRecipeIngredient],
) -> Result<()> {
    use database::schema::recipe_ingredients::dsl::*;
    use diesel::insert_into;

    for usage in usages {
        insert_into(recipe_ingredients)
            .values((
                recipe_id.eq(new_recipe_id),
                ingredient_id.eq(usage.ingredient_id),
                quantity.eq(usage.quantity),
            ))
            .execute(conn)?;
    }
    Ok(())
}

pub fn add_recipe(conn: &mut database::Connection, new_recipe: &NewRecipe) -> Result<Recipe> {
    use database::schema::recipes::dsl::*;
    use diesel::insert_into;

    conn.transaction::<_, Error, _>(|conn| {
        ensure_ingredients_exist(conn, new_recipe.ingredient_ids())?;
        insert_into(recipes)
            .values(RecipeChanges::from(new_recipe))
            .execute(conn)?;
        let new_id = last_insert_id(conn)?;
        insert_recipe_ingredients(conn, new_id, &new_recipe.ingredients)?;
        get_recipe(conn, new_id)?
            .ok_or_else(|| Error::Internal(format!("recipe {new_id} vanished after insert")))
    })
}

/// Replaces the recipe's fields and its whole ingredient list.
pub fn update_recipe(
    conn: &mut database::Connection,
    edit_id: RecipeId,
    edited: &NewRecipe,
) -> Result<Option<Recipe>> {
    use database::schema::{recipe_ingredients, recipes};
    use diesel::{delete, update};

    conn.transaction::<_, Error, _>(|conn| {
        let updated = update(recipes::table.filter(recipes::id.eq(edit_id)))
            .set(RecipeChanges::from(edited))
            .execute(conn)?;
        if updated == 0 {
            return Ok(None);
        }
        ensure_ingredients_exist(conn, edited.ingredient_ids())?;
        delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(edit_id)))
            .execute(conn)?;
        insert_recipe_ingredients(conn, edit_id, &edited.ingredients)?;
        get_recipe(conn, edit_id)
    })
}

/// Clears the recipe from every schedule slot it occupied.
pub fn delete_recipe(conn: &mut database::Connection, delete_id: RecipeId) -> Result<bool> {
    use database::schema::recipes::dsl::*;
    use diesel::delete;

    Ok(delete(recipes.filter(id.eq(delete_id))).execute(conn)? > 0)
}

fn with_meals(
    conn: &mut database::Connection,
    rows: Vec<ScheduleRow>,
) -> Result<Vec<WeeklySchedule>> {
    let meals = ScheduleMealRow::belonging_to(&rows)
        .select(ScheduleMealRow::as_select())
        .load::<ScheduleMealRow>(conn)?;
    let recipe_ids: HashSet<RecipeId> = meals.iter().map(|m| m.recipe_id).collect();
    let recipes = recipes_by_id(conn, recipe_ids.into_iter().collect())?;

    let grouped = meals.grouped_by(&rows);
    Ok(grouped
        .into_iter()
        .zip(rows)
        .map(|(meals, row)| {
            let mut schedule = WeeklySchedule::new(row.id, row.name, row.start_date);
            for meal in meals {
                if let Some(recipe) = recipes.get(&meal.recipe_id) {
                    schedule.assign(meal.day, meal.meal_type, recipe.clone());
                }
            }
            schedule
        })
        .collect())
}

/// Newest first.
pub fn all_schedules(conn: &mut database::Connection) -> Result<Vec<WeeklySchedule>> {
    use database::schema::weekly_schedules::dsl::*;

    let rows = weekly_schedules
        .select(ScheduleRow::as_select())
        .order((start_date.desc(), id.desc()))
        .load(conn)?;
    with_meals(conn, rows)
}

pub fn get_schedule(
    conn: &mut database::Connection,
    schedule_id: ScheduleId,
) -> Result<Option<WeeklySchedule>> {
    use database::schema::weekly_schedules::dsl::*;

    let row = weekly_schedules
        .select(ScheduleRow::as_select())
        .filter(id.eq(schedule_id))
        .get_result(conn)
        .optional()?;
    Ok(with_meals(conn, row.into_iter().collect())?.pop())
}

pub fn current_schedule(conn: &mut database::Connection) -> Result<Option<WeeklySchedule>> {
    use database::schema::weekly_schedules::dsl::*;

    let row = weekly_schedules
        .select(ScheduleRow::as_select())
        .order((start_date.desc(), id.desc()))
        .first(conn)
        .optional()?;
    Ok(with_meals(conn, row.into_iter().collect())?.pop())
}

pub fn add_schedule(
    conn: &mut database::Connection,
    new_schedule: &NewSchedule,
) -> Result<WeeklySchedule> {
    use database::schema::weekly_schedules::dsl::*;
    use diesel::insert_into;

    conn.transaction::<_, Error, _>(|conn| {
        insert_into(weekly_schedules)
            .values(new_schedule)
            .execute(conn)?;
        Ok(new_schedule.clone().with_id(last_insert_id(conn)?))
    })
}

fn ensure_schedule_exists(conn: &mut database::Connection, wanted: ScheduleId) -> Result<()> {
    use database::schema::weekly_schedules::dsl::*;

    let count: i64 = weekly_schedules
        .filter(id.eq(wanted))
        .count()
        .get_result(conn)?;
    if count == 0 {
        return Err(Error::NotFound(format!("schedule {wanted}")));
    }
    Ok(())
}

fn ensure_recipe_exists(conn: &mut database::Connection, wanted: RecipeId) -> Result<()> {
    use database::schema::recipes::dsl::*;

    let count: i64 = recipes.filter(id.eq(wanted)).count().get_result(conn)?;
    if count == 0 {
        return Err(Error::NotFound(format!("recipe {wanted}")));
    }
    Ok(())
}

fn put_meal(
    conn: &mut database::Connection,
    target_schedule: ScheduleId,
    target_day: Day,
    target_meal_type: MealType,
    new_recipe_id: RecipeId,
) -> Result<()> {
    use database::schema::schedule_meals::dsl::*;
    use diesel::insert_into;

    ensure_schedule_exists(conn, target_schedule)?;
    ensure_recipe_exists(conn, new_recipe_id)?;
    insert_into(schedule_meals)
        .values((
            schedule_id.eq(target_schedule),
            day.eq(target_day),
            meal_type.eq(target_meal_type),
            recipe_id.eq(new_recipe_id),
        ))
        .on_conflict((schedule_id, day, meal_type))
        .do_update()
        .set(recipe_id.eq(new_recipe_id))
        .execute(conn)?;
    Ok(())
}

fn take_meal(
    conn: &mut database::Connection,
    target_schedule: ScheduleId,
    target_day: Day,
    target_meal_type: MealType,
) -> Result<()> {
    use database::schema::schedule_meals::dsl::*;
    use diesel::delete;

    delete(
        schedule_meals
            .filter(schedule_id.eq(target_schedule))
            .filter(day.eq(target_day))
            .filter(meal_type.eq(target_meal_type)),
    )
    .execute(conn)?;
    Ok(())
}

/// Fills the slot, replacing whatever was there, and rebuilds the schedule's shopping list in
/// the same transaction.
pub fn assign_meal_and_refresh(
    conn: &mut database::Connection,
    target_schedule: ScheduleId,
    target_day: Day,
    target_meal_type: MealType,
    new_recipe_id: RecipeId,
) -> Result<WeeklySchedule> {
    conn.immediate_transaction::<_, Error, _>(|conn| {
        put_meal(
            conn,
            target_schedule,
            target_day,
            target_meal_type,
            new_recipe_id,
        )?;
        refresh_shopping_list(conn, target_schedule)
    })
}

/// Empties the slot and rebuilds the schedule's shopping list in the same transaction.
pub fn remove_meal_and_refresh(
    conn: &mut database::Connection,
    target_schedule: ScheduleId,
    target_day: Day,
    target_meal_type: MealType,
) -> Result<WeeklySchedule> {
    conn.immediate_transaction::<_, Error, _>(|conn| {
        ensure_schedule_exists(conn, target_schedule)?;
        take_meal(conn, target_schedule, target_day, target_meal_type)?;
        refresh_shopping_list(conn, target_schedule)
    })
}

pub fn delete_schedule(conn: &mut database::Connection, delete_id: ScheduleId) -> Result<bool> {
    use database::schema::weekly_schedules::dsl::*;
    use diesel::delete;

    Ok(delete(weekly_schedules.filter(id.eq(delete_id))).execute(conn)? > 0)
}

/// Unchecked items first, then by ingredient name.
pub fn get_shopping_list(
    conn: &mut database::Connection,
    target_schedule: ScheduleId,
) -> Result<Vec<ShoppingListItem>> {
    use database::schema::{ingredients, shopping_list_items};

    shopping_list_items::table
        .inner_join(ingredients::table)
        .filter(shopping_list_items::schedule_id.eq(target_schedule))
        .order((
            shopping_list_items::is_checked.asc(),
            ingredients::name.asc(),
            shopping_list_items::id.asc(),
        ))
        .select((ShoppingListRow::as_select(), Ingredient::as_select()))
        .load::<(ShoppingListRow, Ingredient)>(conn)?
        .into_iter()
        .map(|(row, ingredient)| row.into_item(ingredient))
        .collect()
}

/// Keyed by (schedule, ingredient): an existing row keeps its id and checked state and only
/// has its quantity and recipe names replaced.
pub fn upsert_shopping_list_item(
    conn: &mut database::Connection,
    target_schedule: ScheduleId,
    item: &GeneratedItem,
) -> Result<ShoppingListItem> {
    use database::schema::ingredients;
    use database::schema::shopping_list_items::dsl::*;
    use diesel::insert_into;

    shopping_list::check_item(item)?;
    conn.transaction::<_, Error, _>(|conn| {
        ensure_schedule_exists(conn, target_schedule)?;
        let row = NewShoppingListRow::new(target_schedule, item, item.is_checked)?;
        insert_into(shopping_list_items)
            .values(&row)
            .on_conflict((schedule_id, ingredient_id))
            .do_update()
            .set((
                total_quantity.eq(row.total_quantity),
                recipes.eq(&row.recipes),
            ))
            .execute(conn)?;

        let (stored, ingredient) = shopping_list_items
            .inner_join(ingredients::table)
            .filter(schedule_id.eq(target_schedule))
            .filter(ingredient_id.eq(item.ingredient.id))
            .select((ShoppingListRow::as_select(), Ingredient::as_select()))
            .get_result::<(ShoppingListRow, Ingredient)>(conn)?;
        stored.into_item(ingredient)
    })
}

pub fn update_checked_status(
    conn: &mut database::Connection,
    item_id: ShoppingListItemId,
    checked: bool,
) -> Result<bool> {
    use database::schema::shopping_list_items::dsl::*;
    use diesel::update;

    let updated = update(shopping_list_items.filter(id.eq(item_id)))
        .set(is_checked.eq(checked))
        .execute(conn)?;
    Ok(updated > 0)
}

/// Callers run this inside a transaction and have already checked `items`.
fn replace_shopping_list(
    conn: &mut database::Connection,
    target_schedule: ScheduleId,
    items: &[GeneratedItem],
) -> Result<Vec<ShoppingListItem>> {
    use database::schema::shopping_list_items::dsl::*;
    use diesel::{delete, insert_into};

    ensure_schedule_exists(conn, target_schedule)?;

    let checked: HashSet<IngredientId> = shopping_list_items
        .select(ingredient_id)
        .filter(schedule_id.eq(target_schedule))
        .filter(is_checked.eq(true))
        .load::<IngredientId>(conn)?
        .into_iter()
        .collect();

    delete(shopping_list_items.filter(schedule_id.eq(target_schedule))).execute(conn)?;

    for item in items {
        let row = NewShoppingListRow::new(
            target_schedule,
            item,
            checked.contains(&item.ingredient.id),
        )?;
        insert_into(shopping_list_items).values(&row).execute(conn)?;
    }

    get_shopping_list(conn, target_schedule)
}

/// Rebuilds the list from the meals as this transaction sees them.
fn refresh_shopping_list(
    conn: &mut database::Connection,
    target_schedule: ScheduleId,
) -> Result<WeeklySchedule> {
    let schedule = get_schedule(conn, target_schedule)?
        .ok_or_else(|| Error::NotFound(format!("schedule {target_schedule}")))?;
    let items = shopping_list::items_for(&schedule)?;
    replace_shopping_list(conn, target_schedule, &items)?;
    Ok(schedule)
}

/// Swaps the schedule's whole list for `items` in one transaction. Ingredients that were
/// checked before stay checked.
pub fn regenerate_shopping_list(
    conn: &mut database::Connection,
    target_schedule: ScheduleId,
    items: &[GeneratedItem],
) -> Result<Vec<ShoppingListItem>> {
    shopping_list::check_items(items)?;
    conn.immediate_transaction::<_, Error, _>(|conn| {
        replace_shopping_list(conn, target_schedule, items)
    })
}

pub fn delete_shopping_list(
    conn: &mut database::Connection,
    target_schedule: ScheduleId,
) -> Result<bool> {
    use database::schema::shopping_list_items::dsl::*;
    use diesel::delete;

    Ok(delete(shopping_list_items.filter(schedule_id.eq(target_schedule))).execute(conn)? > 0)
}

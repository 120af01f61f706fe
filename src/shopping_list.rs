// Copyright 2023 Remi Bernotavicius

use crate::error::{Error, Result};
use crate::model::{Ingredient, IngredientId, ScheduleId, ShoppingListItemId};
use crate::schedule::WeeklySchedule;
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// What one ingredient adds up to across a schedule, before it is persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedItem {
    pub ingredient: Ingredient,
    pub total_quantity: f64,
    pub recipes: Vec<String>,
    /// Only consulted when an upsert inserts a new row.
    #[serde(default)]
    pub is_checked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    pub id: ShoppingListItemId,
    pub schedule_id: ScheduleId,
    pub ingredient: Ingredient,
    pub total_quantity: f64,
    pub recipes: Vec<String>,
    pub is_checked: bool,
}

impl fmt::Display for ShoppingListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} of {}",
            self.total_quantity, self.ingredient.unit, self.ingredient.name
        )?;
        if !self.recipes.is_empty() {
            write!(f, " ({})", self.recipes.join(", "))?;
        }
        Ok(())
    }
}

/// Sums the ingredients of every occupied slot. Quantities are taken from the recipes as
/// written; servings are not rescaled.
pub fn generate(schedule: &WeeklySchedule) -> Vec<GeneratedItem> {
    let mut items: BTreeMap<IngredientId, GeneratedItem> = BTreeMap::new();
    for (_, _, recipe) in schedule.occupied() {
        for usage in &recipe.ingredients {
            items
                .entry(usage.ingredient.id)
                .and_modify(|item| {
                    item.total_quantity += usage.quantity;
                    if !item.recipes.contains(&recipe.name) {
                        item.recipes.push(recipe.name.clone());
                    }
                })
                .or_insert_with(|| GeneratedItem {
                    ingredient: usage.ingredient.clone(),
                    total_quantity: usage.quantity,
                    recipes: vec![recipe.name.clone()],
                    is_checked: false,
                });
        }
    }
    items.into_values().collect()
}

/// Rejects lists `generate` could never produce: repeated ingredients or unusable quantities.
pub fn check_items(items: &[GeneratedItem]) -> Result<()> {
    let mut seen = HashSet::new();
    for item in items {
        check_item(item)?;
        if !seen.insert(item.ingredient.id) {
            return Err(Error::Validation(format!(
                "ingredient {} appears more than once",
                item.ingredient.id
            )));
        }
    }
    Ok(())
}

pub fn check_item(item: &GeneratedItem) -> Result<()> {
    if !item.total_quantity.is_finite() || item.total_quantity < 0.0 {
        return Err(Error::Validation(format!(
            "totalQuantity for ingredient {} must be a finite, non-negative number",
            item.ingredient.id
        )));
    }
    Ok(())
}

/// The checked list `generate` yields for `schedule`. Sums that overflow are rejected.
pub fn items_for(schedule: &WeeklySchedule) -> Result<Vec<GeneratedItem>> {
    let items = generate(schedule);
    check_items(&items)?;
    log::debug!(
        "regenerating shopping list for schedule {} with {} items",
        schedule.id,
        items.len()
    );
    Ok(items)
}

/// Rebuilds the persisted list of a schedule from its current meals.
pub fn refresh(store: &mut dyn Store, schedule_id: ScheduleId) -> Result<Vec<ShoppingListItem>> {
    let schedule = store
        .schedule(schedule_id)?
        .ok_or_else(|| Error::NotFound(format!("schedule {schedule_id}")))?;
    let items = items_for(&schedule)?;
    store.regenerate_shopping_list(schedule_id, &items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Recipe, RecipeCategory, RecipeIngredient};
    use crate::schedule::{Day, MealType};
    use maplit::btreeset;
    use std::collections::BTreeSet;

    fn ingredient(id: i32, name: &str, unit: &str) -> Ingredient {
        Ingredient {
            id: id.into(),
            name: name.into(),
            unit: unit.into(),
        }
    }

    fn recipe(id: i32, name: &str, ingredients: &[(&Ingredient, f64)]) -> Recipe {
        Recipe {
            id: id.into(),
            name: name.into(),
            category: RecipeCategory::Lunch,
            difficulty: Difficulty::Medium,
            servings: 4,
            cooking_time: Some(20),
            instructions: None,
            ingredients: ingredients
                .iter()
                .map(|(i, quantity)| RecipeIngredient {
                    ingredient: (*i).clone(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    fn schedule() -> WeeklySchedule {
        WeeklySchedule::new(
            ScheduleId::INITIAL,
            "This week".into(),
            chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
    }

    #[test]
    fn empty_schedule() {
        assert_eq!(generate(&schedule()), vec![]);
    }

    #[test]
    fn recipe_without_ingredients() {
        let mut s = schedule();
        s.assign(Day::Monday, MealType::Lunch, recipe(1, "Water", &[]));
        assert_eq!(generate(&s), vec![]);
    }

    #[test]
    fn shared_ingredient_is_summed() {
        let flour = ingredient(1, "Flour", "cups");
        let mut s = schedule();
        s.assign(Day::Monday, MealType::Breakfast, recipe(1, "A", &[(&flour, 2.0)]));
        s.assign(Day::Tuesday, MealType::Lunch, recipe(2, "B", &[(&flour, 1.5)]));

        assert_eq!(
            generate(&s),
            vec![GeneratedItem {
                ingredient: flour,
                total_quantity: 3.5,
                recipes: vec!["A".into(), "B".into()],
                is_checked: false,
            }]
        );
    }

    #[test]
    fn repeated_recipe_is_counted_per_slot_but_named_once() {
        let eggs = ingredient(1, "Eggs", "pieces");
        let milk = ingredient(2, "Milk", "cups");
        let omelette = recipe(1, "Omelette", &[(&eggs, 3.0), (&milk, 0.25)]);
        let pancakes = recipe(2, "Pancakes", &[(&eggs, 2.0)]);

        let mut s = schedule();
        s.assign(Day::Monday, MealType::Breakfast, omelette.clone());
        s.assign(Day::Wednesday, MealType::Breakfast, omelette);
        s.assign(Day::Sunday, MealType::Snack2, pancakes);

        let items = generate(&s);
        assert_eq!(items.len(), 2);

        let egg_item = &items[0];
        assert_eq!(egg_item.ingredient, eggs);
        assert_eq!(egg_item.total_quantity, 8.0);
        let names: BTreeSet<_> = egg_item.recipes.iter().map(String::as_str).collect();
        assert_eq!(names, btreeset! {"Omelette", "Pancakes"});
        assert_eq!(egg_item.recipes.len(), 2);

        let milk_item = &items[1];
        assert_eq!(milk_item.total_quantity, 0.5);
        assert_eq!(milk_item.recipes, vec!["Omelette".to_owned()]);
    }

    #[test]
    fn servings_do_not_scale_quantities() {
        let rice = ingredient(1, "Rice", "cups");
        let mut big = recipe(1, "Feast", &[(&rice, 1.0)]);
        big.servings = 12;
        let mut s = schedule();
        s.assign(Day::Friday, MealType::Dinner, big);

        assert_eq!(generate(&s)[0].total_quantity, 1.0);
    }

    #[test]
    fn unusable_quantities_are_rejected() {
        let rice = ingredient(7, "Rice", "cups");
        for quantity in [-1.0, f64::NAN, f64::INFINITY] {
            let item = GeneratedItem {
                ingredient: rice.clone(),
                total_quantity: quantity,
                recipes: vec![],
                is_checked: false,
            };
            match check_item(&item) {
                Err(Error::Validation(message)) => assert_eq!(
                    message,
                    "totalQuantity for ingredient 7 must be a finite, non-negative number"
                ),
                other => panic!("{quantity}: {other:?}"),
            }
        }
    }

    #[test]
    fn overflowing_sum_is_rejected() {
        let salt = ingredient(1, "Salt", "g");
        let huge = recipe(1, "Big", &[(&salt, 1e308)]);
        let mut s = schedule();
        s.assign(Day::Monday, MealType::Lunch, huge.clone());
        assert_eq!(items_for(&s).unwrap()[0].total_quantity, 1e308);

        s.assign(Day::Tuesday, MealType::Lunch, huge);
        assert!(matches!(items_for(&s), Err(Error::Validation(_))));
    }

    #[test]
    fn item_display() {
        let item = ShoppingListItem {
            id: ShoppingListItemId::INITIAL,
            schedule_id: ScheduleId::INITIAL,
            ingredient: ingredient(1, "tomatoes", "cups"),
            total_quantity: 2.0,
            recipes: vec!["Soup".into(), "Salad".into()],
            is_checked: false,
        };
        assert_eq!(item.to_string(), "2 cups of tomatoes (Soup, Salad)");

        let item = ShoppingListItem {
            total_quantity: 3.5,
            recipes: vec![],
            ..item
        };
        assert_eq!(item.to_string(), "3.5 cups of tomatoes");
    }
}

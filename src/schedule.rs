// Copyright 2023 Remi Bernotavicius

//! The weekly meal grid: seven days of five meals each, every slot holding at most one recipe.

use crate::error::Result;
use crate::model::{required, Recipe, ScheduleId};
use derive_more::Display;
use diesel::prelude::Insertable;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize, Serializer};
use strum::EnumIter;

#[derive(
    Debug,
    Display,
    EnumIter,
    Hash,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    DbEnum,
    Serialize,
    Deserialize,
)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

#[derive(
    Debug,
    Display,
    EnumIter,
    Hash,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    DbEnum,
    Serialize,
    Deserialize,
)]
pub enum MealType {
    Breakfast,
    #[display("Snack 1")]
    #[serde(rename = "Snack 1")]
    Snack1,
    Lunch,
    Dinner,
    #[display("Snack 2")]
    #[serde(rename = "Snack 2")]
    Snack2,
}

impl MealType {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

const DAYS: usize = 7;
const MEAL_TYPES: usize = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct WeeklySchedule {
    pub id: ScheduleId,
    pub name: String,
    pub start_date: chrono::NaiveDate,
    meals: [[Option<Recipe>; MEAL_TYPES]; DAYS],
}

#[derive(Insertable, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::database::schema::weekly_schedules)]
pub struct NewSchedule {
    pub name: String,
    pub start_date: chrono::NaiveDate,
}

impl NewSchedule {
    pub fn new(name: &str, start_date: chrono::NaiveDate) -> Result<Self> {
        Ok(Self {
            name: required("name", name)?,
            start_date,
        })
    }

    pub fn with_id(self, id: ScheduleId) -> WeeklySchedule {
        WeeklySchedule::new(id, self.name, self.start_date)
    }
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealSlot<'a> {
    pub day: Day,
    pub meal_type: MealType,
    pub recipe: Option<&'a Recipe>,
}

impl WeeklySchedule {
    /// A schedule with every slot empty.
    pub fn new(id: ScheduleId, name: String, start_date: chrono::NaiveDate) -> Self {
        Self {
            id,
            name,
            start_date,
            meals: Default::default(),
        }
    }

    /// Puts `recipe` in the slot, replacing whatever was there.
    pub fn assign(&mut self, day: Day, meal_type: MealType, recipe: Recipe) {
        self.meals[day as usize][meal_type as usize] = Some(recipe);
    }

    pub fn remove(&mut self, day: Day, meal_type: MealType) -> Option<Recipe> {
        self.meals[day as usize][meal_type as usize].take()
    }

    pub fn meal_for_slot(&self, day: Day, meal_type: MealType) -> Option<&Recipe> {
        self.meals[day as usize][meal_type as usize].as_ref()
    }

    pub fn slots(&self) -> impl Iterator<Item = MealSlot<'_>> {
        Day::iter().flat_map(move |day| {
            MealType::iter().map(move |meal_type| MealSlot {
                day,
                meal_type,
                recipe: self.meal_for_slot(day, meal_type),
            })
        })
    }

    /// Only the slots that have a recipe, in grid order.
    pub fn occupied(&self) -> impl Iterator<Item = (Day, MealType, &Recipe)> {
        self.slots()
            .filter_map(|slot| slot.recipe.map(|r| (slot.day, slot.meal_type, r)))
    }

    pub fn is_empty(&self) -> bool {
        self.occupied().next().is_none()
    }
}

impl Serialize for WeeklySchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Schedule<'a> {
            id: ScheduleId,
            name: &'a str,
            start_date: chrono::NaiveDate,
            meals: Vec<MealSlot<'a>>,
        }

        Schedule {
            id: self.id,
            name: &self.name,
            start_date: self.start_date,
            meals: self.slots().collect(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
fn recipe(id: i32, name: &str) -> Recipe {
    Recipe {
        id: id.into(),
        name: name.into(),
        category: crate::model::RecipeCategory::Breakfast,
        difficulty: crate::model::Difficulty::Easy,
        servings: 1,
        cooking_time: None,
        instructions: None,
        ingredients: vec![],
    }
}

#[cfg(test)]
fn test_schedule() -> WeeklySchedule {
    WeeklySchedule::new(
        ScheduleId::INITIAL,
        "Week 1".into(),
        chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
    )
}

#[test]
fn new_schedule_has_every_slot_empty() {
    let schedule = test_schedule();
    assert_eq!(schedule.slots().count(), 35);
    assert!(schedule.slots().all(|s| s.recipe.is_none()));
    assert!(schedule.is_empty());
}

#[test]
fn slot_overwrite() {
    let mut schedule = test_schedule();
    schedule.assign(Day::Monday, MealType::Breakfast, recipe(1, "A"));
    schedule.assign(Day::Monday, MealType::Breakfast, recipe(2, "B"));

    assert_eq!(
        schedule
            .meal_for_slot(Day::Monday, MealType::Breakfast)
            .map(|r| r.name.as_str()),
        Some("B")
    );
    assert_eq!(schedule.occupied().count(), 1);
}

#[test]
fn same_recipe_in_many_slots() {
    let mut schedule = test_schedule();
    schedule.assign(Day::Monday, MealType::Dinner, recipe(1, "A"));
    schedule.assign(Day::Friday, MealType::Snack2, recipe(1, "A"));

    let occupied: Vec<_> = schedule.occupied().map(|(d, m, _)| (d, m)).collect();
    assert_eq!(
        occupied,
        vec![(Day::Monday, MealType::Dinner), (Day::Friday, MealType::Snack2)]
    );

    assert_eq!(
        schedule.remove(Day::Monday, MealType::Dinner).map(|r| r.id),
        Some(1.into())
    );
    assert_eq!(schedule.meal_for_slot(Day::Monday, MealType::Dinner), None);
    assert_eq!(schedule.remove(Day::Monday, MealType::Dinner), None);
    assert_eq!(schedule.occupied().count(), 1);
}

#[test]
fn schedule_json() {
    let mut schedule = test_schedule();
    schedule.assign(Day::Tuesday, MealType::Snack1, recipe(7, "Toast"));

    let json = serde_json::to_value(&schedule).unwrap();
    assert_eq!(json["startDate"], "2024-06-03");
    let meals = json["meals"].as_array().unwrap();
    assert_eq!(meals.len(), 35);
    assert_eq!(meals[0]["day"], "Monday");
    assert_eq!(meals[0]["mealType"], "Breakfast");
    assert!(meals[0]["recipe"].is_null());
    assert_eq!(meals[6]["mealType"], "Snack 1");
    assert_eq!(meals[6]["recipe"]["name"], "Toast");
}

#[test]
fn meal_type_names() {
    assert_eq!(MealType::Snack2.to_string(), "Snack 2");
    assert_eq!(
        serde_json::from_str::<MealType>("\"Snack 1\"").unwrap(),
        MealType::Snack1
    );
    assert_eq!(Day::iter().count() * MealType::iter().count(), 35);
}

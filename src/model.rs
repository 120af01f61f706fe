// Copyright 2023 Remi Bernotavicius

use crate::error::{Error, Result};
use derive_more::Display;
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel::prelude::{Identifiable, Insertable};
use diesel_derive_enum::DbEnum;
use diesel_derive_newtype::DieselNewType;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            DieselNewType,
            Debug,
            Display,
            Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Copy,
            Clone,
            Serialize,
            Deserialize,
        )]
        pub struct $name(i32);

        impl $name {
            pub const INITIAL: Self = Self(1);

            pub fn next(&self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(IngredientId);
id_type!(RecipeId);
id_type!(ScheduleId);
id_type!(ShoppingListItemId);

#[derive(
    Debug, Display, EnumIter, Hash, Copy, Clone, PartialEq, Eq, DbEnum, Serialize, Deserialize,
)]
pub enum RecipeCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Dessert,
}

#[derive(
    Debug, Display, EnumIter, Hash, Copy, Clone, PartialEq, Eq, DbEnum, Serialize, Deserialize,
)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(
    Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Serialize, Deserialize,
)]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub unit: String,
}

/// A validated ingredient, ready to be inserted or written over an existing one.
#[derive(Insertable, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct NewIngredient {
    pub name: String,
    pub unit: String,
}

impl NewIngredient {
    pub fn new(name: &str, unit: &str) -> Result<Self> {
        Ok(Self {
            name: required("name", name)?,
            unit: required("unit", unit)?,
        })
    }

    pub fn with_id(self, id: IngredientId) -> Ingredient {
        Ingredient {
            id,
            name: self.name,
            unit: self.unit,
        }
    }
}

pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(value.into())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub quantity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub category: RecipeCategory,
    pub difficulty: Difficulty,
    pub servings: i32,
    pub cooking_time: Option<i32>,
    pub instructions: Option<String>,
    pub ingredients: Vec<RecipeIngredient>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipeIngredient {
    pub ingredient_id: IngredientId,
    pub quantity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub category: RecipeCategory,
    pub difficulty: Difficulty,
    pub servings: i32,
    pub cooking_time: Option<i32>,
    pub instructions: Option<String>,
    pub ingredients: Vec<NewRecipeIngredient>,
}

/// Largest quantity one recipe may list for an ingredient. Keeps shopping list sums finite.
pub const MAX_QUANTITY: f64 = 1_000_000.0;

impl NewRecipe {
    /// Trims the text fields and checks the numeric ones.
    pub fn validate(mut self) -> Result<Self> {
        self.name = required("name", &self.name)?;
        if self.servings < 1 {
            return Err(Error::Validation("servings must be a positive integer".into()));
        }
        if matches!(self.cooking_time, Some(t) if t < 1) {
            return Err(Error::Validation(
                "cookingTime must be a positive number of minutes".into(),
            ));
        }
        self.instructions = self
            .instructions
            .map(|i| i.trim().to_owned())
            .filter(|i| !i.is_empty());
        for usage in &self.ingredients {
            if !(usage.quantity > 0.0 && usage.quantity <= MAX_QUANTITY) {
                return Err(Error::Validation(format!(
                    "quantity for ingredient {} must be positive and at most {MAX_QUANTITY}",
                    usage.ingredient_id
                )));
            }
        }
        Ok(self)
    }

    pub fn ingredient_ids(&self) -> Vec<IngredientId> {
        let mut ids: Vec<_> = self.ingredients.iter().map(|i| i.ingredient_id).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
pub fn sample_recipe(name: &str) -> NewRecipe {
    NewRecipe {
        name: name.into(),
        category: RecipeCategory::Dinner,
        difficulty: Difficulty::Easy,
        servings: 2,
        cooking_time: None,
        instructions: None,
        ingredients: vec![],
    }
}

#[test]
fn new_ingredient_trims_and_requires_fields() {
    let i = NewIngredient::new("  Flour ", " cups").unwrap();
    assert_eq!(i.name, "Flour");
    assert_eq!(i.unit, "cups");

    assert!(matches!(
        NewIngredient::new("   ", "cups"),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        NewIngredient::new("Flour", ""),
        Err(Error::Validation(_))
    ));
}

#[test]
fn new_recipe_validation() {
    let recipe = NewRecipe {
        instructions: Some("   ".into()),
        ..sample_recipe(" Pancakes ")
    }
    .validate()
    .unwrap();
    assert_eq!(recipe.name, "Pancakes");
    assert_eq!(recipe.instructions, None);

    let zero_servings = NewRecipe {
        servings: 0,
        ..sample_recipe("Pancakes")
    };
    assert!(matches!(zero_servings.validate(), Err(Error::Validation(_))));

    let zero_time = NewRecipe {
        cooking_time: Some(0),
        ..sample_recipe("Pancakes")
    };
    assert!(matches!(zero_time.validate(), Err(Error::Validation(_))));

    let negative_quantity = NewRecipe {
        ingredients: vec![NewRecipeIngredient {
            ingredient_id: IngredientId::INITIAL,
            quantity: -1.0,
        }],
        ..sample_recipe("Pancakes")
    };
    assert!(matches!(
        negative_quantity.validate(),
        Err(Error::Validation(_))
    ));

    for quantity in [1e308, f64::NAN, MAX_QUANTITY * 2.0] {
        let unusable = NewRecipe {
            ingredients: vec![NewRecipeIngredient {
                ingredient_id: IngredientId::INITIAL,
                quantity,
            }],
            ..sample_recipe("Pancakes")
        };
        match unusable.validate() {
            Err(Error::Validation(message)) => assert_eq!(
                message,
                "quantity for ingredient 1 must be positive and at most 1000000"
            ),
            other => panic!("{quantity}: {other:?}"),
        }
    }

    let largest = NewRecipe {
        ingredients: vec![NewRecipeIngredient {
            ingredient_id: IngredientId::INITIAL,
            quantity: MAX_QUANTITY,
        }],
        ..sample_recipe("Pancakes")
    };
    assert!(largest.validate().is_ok());
}

#[test]
fn enum_json_names() {
    assert_eq!(
        serde_json::to_string(&RecipeCategory::Dessert).unwrap(),
        "\"Dessert\""
    );
    assert_eq!(
        serde_json::from_str::<Difficulty>("\"Hard\"").unwrap(),
        Difficulty::Hard
    );
    use strum::IntoEnumIterator as _;
    assert_eq!(RecipeCategory::iter().count(), 5);
    assert_eq!(Difficulty::iter().count(), 3);
}

// Copyright 2023 Remi Bernotavicius

use crate::error::{Error, Result};

pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod schedules;
pub mod shopping_list;

/// Request bodies keep every field optional so that a missing one is reported by name.
fn required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| Error::Validation(format!("{field} is required")))
}

fn not_found(what: impl std::fmt::Display) -> Error {
    Error::NotFound(what.to_string())
}

// 🌮 Ingredient Entity - the fixed building blocks of every taco
//
// Ingredients are plain values: an id like "FLTO", a display name and a type.
// They are seeded once at startup and never mutated or deleted afterwards.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// INGREDIENT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IngredientType {
    Wrap,
    Protein,
    Veggies,
    Cheese,
    Sauce,
}

impl IngredientType {
    pub const ALL: [IngredientType; 5] = [
        IngredientType::Wrap,
        IngredientType::Protein,
        IngredientType::Veggies,
        IngredientType::Cheese,
        IngredientType::Sauce,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientType::Wrap => "WRAP",
            IngredientType::Protein => "PROTEIN",
            IngredientType::Veggies => "VEGGIES",
            IngredientType::Cheese => "CHEESE",
            IngredientType::Sauce => "SAUCE",
        }
    }
}

impl fmt::Display for IngredientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown ingredient type: {0}")]
pub struct UnknownIngredientType(pub String);

impl FromStr for IngredientType {
    type Err = UnknownIngredientType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IngredientType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownIngredientType(s.to_string()))
    }
}

impl ToSql for IngredientType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for IngredientType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

// ============================================================================
// INGREDIENT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,

    #[serde(rename = "type")]
    pub ingredient_type: IngredientType,
}

impl Ingredient {
    pub fn new(id: &str, name: &str, ingredient_type: IngredientType) -> Self {
        Ingredient {
            id: id.to_string(),
            name: name.to_string(),
            ingredient_type,
        }
    }

    /// The ten ingredients every fresh database starts with.
    pub fn defaults() -> Vec<Ingredient> {
        use IngredientType::*;

        vec![
            Ingredient::new("FLTO", "Flour Tortilla", Wrap),
            Ingredient::new("COTO", "Corn Tortilla", Wrap),
            Ingredient::new("GRBF", "Ground Beef", Protein),
            Ingredient::new("CARN", "Carnitas", Protein),
            Ingredient::new("TMTO", "Diced Tomatoes", Veggies),
            Ingredient::new("LETC", "Lettuce", Veggies),
            Ingredient::new("CHED", "Cheddar", Cheese),
            Ingredient::new("JACK", "Monterrey Jack", Cheese),
            Ingredient::new("SLSA", "Salsa", Sauce),
            Ingredient::new("SRCR", "Sour Cream", Sauce),
        ]
    }
}

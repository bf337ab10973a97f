// 🌮 Taco Entity - a named, timestamped design built from ingredients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Ingredient;

/// A user-composed taco.
///
/// `id` is assigned by the store on first save. `created_at` is stamped on
/// save when the client did not supply one; "recent tacos" are ordered by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taco {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Optional on input: an order only refers to tacos by id
    #[serde(default)]
    pub name: String,

    /// Ingredient references in the order the user picked them
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

impl Taco {
    pub fn new(name: &str, ingredients: Vec<Ingredient>) -> Self {
        Taco {
            id: None,
            created_at: None,
            name: name.to_string(),
            ingredients,
        }
    }
}

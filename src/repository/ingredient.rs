use anyhow::Result;
use rusqlite::{params, Connection};

use crate::entities::Ingredient;

pub struct IngredientRepository<'a> {
    conn: &'a Connection,
}

impl<'a> IngredientRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn find_all(&self) -> Result<Vec<Ingredient>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, type FROM ingredient ORDER BY id")?;

        let ingredients = stmt
            .query_map([], |row| {
                Ok(Ingredient {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    ingredient_type: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    /// Insert a new ingredient. A duplicate id is a constraint failure.
    pub fn save(&self, ingredient: Ingredient) -> rusqlite::Result<Ingredient> {
        self.conn.execute(
            "INSERT INTO ingredient (id, name, type) VALUES (?1, ?2, ?3)",
            params![ingredient.id, ingredient.name, ingredient.ingredient_type],
        )?;
        Ok(ingredient)
    }
}

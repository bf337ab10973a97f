use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::debug;

use super::{insert_record, insert_returning_key};
use crate::db::{format_timestamp, is_storable_timestamp, parse_timestamp};
use crate::entities::{Ingredient, Record, Taco};

/// Page size for "recent tacos"
pub const RECENT_PAGE_SIZE: usize = 12;

#[derive(Debug, Error)]
pub enum TacoError {
    /// Year outside 1..=9999 cannot be stored as fixed-width RFC 3339
    #[error("created_at {0} is out of range")]
    InvalidTimestamp(DateTime<Utc>),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub struct TacoRepository<'a> {
    conn: &'a Connection,
}

impl<'a> TacoRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Persist a taco and its ingredient links.
    ///
    /// `created_at` is stamped when absent. A caller-supplied id is kept, so
    /// a clash surfaces as a constraint failure from the store.
    pub fn save(&self, mut taco: Taco) -> Result<Taco, TacoError> {
        let created_at = *taco.created_at.get_or_insert_with(Utc::now);
        if !is_storable_timestamp(&created_at) {
            return Err(TacoError::InvalidTimestamp(created_at));
        }

        let mut record: Record = Vec::with_capacity(3);
        if let Some(id) = taco.id {
            record.push(("id", Value::Integer(id)));
        }
        record.push(("name", Value::Text(taco.name.clone())));
        record.push(("created_at", Value::Text(format_timestamp(&created_at))));

        let tx = self.conn.unchecked_transaction()?;
        let taco_id = insert_returning_key(&tx, "taco", &record)?;

        for (position, ingredient) in taco.ingredients.iter().enumerate() {
            let link: Record = vec![
                ("taco", Value::Integer(taco_id)),
                ("ingredient", Value::Text(ingredient.id.clone())),
                ("position", Value::Integer(position as i64)),
            ];
            insert_record(&tx, "taco_ingredients", &link)?;
        }
        tx.commit()?;

        debug!(taco_id, ingredients = taco.ingredients.len(), "taco saved");
        taco.id = Some(taco_id);
        Ok(taco)
    }

    /// Newest tacos first, at most `limit` of them.
    pub fn find_recent(&self, limit: usize) -> Result<Vec<Taco>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, created_at FROM taco
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let created_at: String = row.get(2)?;
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    parse_timestamp(2, &created_at)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, created_at)| -> Result<Taco> {
                Ok(Taco {
                    id: Some(id),
                    created_at: Some(created_at),
                    name,
                    ingredients: self.ingredients_for(id)?,
                })
            })
            .collect()
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Taco>> {
        let row = self
            .conn
            .query_row(
                "SELECT name, created_at FROM taco WHERE id = ?1",
                params![id],
                |row| {
                    let created_at: String = row.get(1)?;
                    Ok((row.get::<_, String>(0)?, parse_timestamp(1, &created_at)?))
                },
            )
            .optional()?;

        match row {
            Some((name, created_at)) => Ok(Some(Taco {
                id: Some(id),
                created_at: Some(created_at),
                name,
                ingredients: self.ingredients_for(id)?,
            })),
            None => Ok(None),
        }
    }

    fn ingredients_for(&self, taco_id: i64) -> Result<Vec<Ingredient>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT i.id, i.name, i.type
             FROM taco_ingredients ti
             JOIN ingredient i ON i.id = ti.ingredient
             WHERE ti.taco = ?1
             ORDER BY ti.position",
        )?;

        let ingredients = stmt
            .query_map(params![taco_id], |row| {
                Ok(Ingredient {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    ingredient_type: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_rows, seed_ingredients, setup_database};
    use crate::entities::IngredientType;
    use chrono::Duration;

    fn seeded_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        seed_ingredients(&conn).unwrap();
        conn
    }

    fn ingredient(id: &str) -> Ingredient {
        // only the id is persisted in the link table
        Ingredient::new(id, id, IngredientType::Wrap)
    }

    #[test]
    fn test_save_assigns_id_and_timestamp() {
        let conn = seeded_db();
        let repo = TacoRepository::new(&conn);

        let before = Utc::now();
        let saved = repo
            .save(Taco::new("Veggie", vec![ingredient("FLTO"), ingredient("LETC")]))
            .unwrap();

        assert!(saved.id.unwrap() > 0);
        assert!(saved.created_at.unwrap() >= before);
        assert_eq!(count_rows(&conn, "taco").unwrap(), 1);
        assert_eq!(count_rows(&conn, "taco_ingredients").unwrap(), 2);

        let loaded = repo.find_by_id(saved.id.unwrap()).unwrap().unwrap();
        let ids: Vec<&str> = loaded.ingredients.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["FLTO", "LETC"]);
        assert_eq!(loaded.ingredients[1].name, "Lettuce");
    }

    #[test]
    fn test_supplied_created_at_is_kept() {
        let conn = seeded_db();
        let repo = TacoRepository::new(&conn);

        let when = Utc::now() - Duration::days(3);
        let mut taco = Taco::new("Old", Vec::new());
        taco.created_at = Some(when);

        let saved = repo.save(taco).unwrap();
        let loaded = repo.find_by_id(saved.id.unwrap()).unwrap().unwrap();

        assert_eq!(
            format_timestamp(&loaded.created_at.unwrap()),
            format_timestamp(&when)
        );
    }

    #[test]
    fn test_unknown_ingredient_rolls_back_taco() {
        let conn = seeded_db();
        let repo = TacoRepository::new(&conn);

        let result = repo.save(Taco::new("Bad", vec![ingredient("FLTO"), ingredient("NOPE")]));

        assert!(result.is_err());
        assert_eq!(count_rows(&conn, "taco").unwrap(), 0);
        assert_eq!(count_rows(&conn, "taco_ingredients").unwrap(), 0);
    }

    #[test]
    fn test_out_of_range_created_at_is_rejected() {
        let conn = seeded_db();
        let repo = TacoRepository::new(&conn);

        let mut future = Taco::new("Future", Vec::new());
        future.created_at = Some(
            DateTime::parse_from_rfc3339("9999-12-31T23:59:59Z")
                .unwrap()
                .with_timezone(&Utc)
                + Duration::days(1),
        );

        assert!(matches!(repo.save(future), Err(TacoError::InvalidTimestamp(_))));
        assert_eq!(count_rows(&conn, "taco").unwrap(), 0);

        // the listing keeps working
        repo.save(Taco::new("Now", Vec::new())).unwrap();
        assert_eq!(repo.find_recent(RECENT_PAGE_SIZE).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let conn = seeded_db();
        let repo = TacoRepository::new(&conn);

        let first = repo.save(Taco::new("One", Vec::new())).unwrap();
        let mut clash = Taco::new("Two", Vec::new());
        clash.id = first.id;

        assert!(repo.save(clash).is_err());
        assert_eq!(count_rows(&conn, "taco").unwrap(), 1);
    }

    #[test]
    fn test_find_recent_caps_and_orders_newest_first() {
        let conn = seeded_db();
        let repo = TacoRepository::new(&conn);

        let base = Utc::now() - Duration::hours(1);
        // insert out of chronological order
        for i in [3, 14, 0, 7, 11, 1, 9, 2, 13, 5, 8, 12, 4, 10, 6] {
            let mut taco = Taco::new(&format!("Taco {}", i), vec![ingredient("COTO")]);
            taco.created_at = Some(base + Duration::seconds(i));
            repo.save(taco).unwrap();
        }

        let recent = repo.find_recent(RECENT_PAGE_SIZE).unwrap();
        assert_eq!(recent.len(), RECENT_PAGE_SIZE);
        assert_eq!(recent[0].name, "Taco 14");
        assert_eq!(recent[11].name, "Taco 3");

        for pair in recent.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        assert!(recent.iter().all(|t| t.ingredients.len() == 1));
    }

    #[test]
    fn test_find_recent_ties_break_on_id() {
        let conn = seeded_db();
        let repo = TacoRepository::new(&conn);

        let when = Utc::now();
        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            let mut taco = Taco::new(name, Vec::new());
            taco.created_at = Some(when);
            ids.push(repo.save(taco).unwrap().id.unwrap());
        }

        let recent: Vec<i64> = repo
            .find_recent(RECENT_PAGE_SIZE)
            .unwrap()
            .into_iter()
            .filter_map(|t| t.id)
            .collect();
        ids.reverse();
        assert_eq!(recent, ids);
    }

    #[test]
    fn test_find_by_id_missing() {
        let conn = seeded_db();
        assert!(TacoRepository::new(&conn).find_by_id(99).unwrap().is_none());
    }
}

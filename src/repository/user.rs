use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::entities::User;

pub struct UserRepository<'a> {
    conn: &'a Connection,
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        role: row.get(4)?,
    })
}

impl<'a> UserRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password_hash, full_name, role
                 FROM users WHERE username = ?1",
                params![username],
                user_from_row,
            )
            .optional()?;

        Ok(user)
    }

    /// Store a user whose password is already hashed.
    pub fn save(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
        role: &str,
    ) -> Result<User> {
        self.conn.execute(
            "INSERT INTO users (username, password_hash, full_name, role)
             VALUES (?1, ?2, ?3, ?4)",
            params![username, password_hash, full_name, role],
        )?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            full_name: full_name.to_string(),
            role: role.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;
    use crate::entities::DEFAULT_ROLE;

    #[test]
    fn test_save_and_find() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let repo = UserRepository::new(&conn);
        let saved = repo
            .save("habuma", "$2b$04$notarealhash", "Craig Walls", DEFAULT_ROLE)
            .unwrap();

        let found = repo.find_by_username("habuma").unwrap().unwrap();
        assert_eq!(found, saved);
        assert_eq!(found.role, "USER");
        assert!(repo.find_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_username_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let repo = UserRepository::new(&conn);
        repo.save("habuma", "x", "", DEFAULT_ROLE).unwrap();
        assert!(repo.save("habuma", "y", "", DEFAULT_ROLE).is_err());
    }
}

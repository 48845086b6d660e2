//! User account database operations

use chrono::{DateTime, Utc};
use rand::RngCore;
use rusqlite::{params, OptionalExtension, Result as SqliteResult};
use sha2::{Digest, Sha256};

use super::super::Database;
use crate::models::User;

/// Hex-encoded SHA-256 over salt + password
fn hash_password(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_salt() -> String {
    let mut buf = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

impl Database {
    /// Create a new account with a freshly salted password hash.
    /// Fails on a duplicate email (UNIQUE constraint).
    pub fn create_user(&self, email: &str, password: &str) -> SqliteResult<User> {
        let conn = self.conn.lock().unwrap();
        let salt = generate_salt();
        let password_hash = hash_password(&salt, password);
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO users (email, password_hash, salt, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![email, password_hash, salt, created_at.to_rfc3339()],
        )?;

        let id = conn.last_insert_rowid();

        Ok(User {
            id,
            email: email.to_string(),
            created_at,
        })
    }

    /// Look up an account by email
    pub fn get_user_by_email(&self, email: &str) -> SqliteResult<Option<User>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt =
            conn.prepare("SELECT id, email, created_at FROM users WHERE email = ?1")?;

        stmt.query_row([email], |row| {
            let created_at_str: String = row.get(2)?;
            Ok(User {
                id: row.get(0)?,
                email: row.get(1)?,
                created_at: parse_rfc3339(&created_at_str),
            })
        })
        .optional()
    }

    /// Look up an account by id
    pub fn get_user_by_id(&self, user_id: i64) -> SqliteResult<Option<User>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare("SELECT id, email, created_at FROM users WHERE id = ?1")?;

        stmt.query_row([user_id], |row| {
            let created_at_str: String = row.get(2)?;
            Ok(User {
                id: row.get(0)?,
                email: row.get(1)?,
                created_at: parse_rfc3339(&created_at_str),
            })
        })
        .optional()
    }

    /// Check an email/password pair. `Ok(None)` covers both an unknown
    /// email and a wrong password — callers surface a single generic
    /// message so the two cases are indistinguishable.
    pub fn verify_user_password(
        &self,
        email: &str,
        password: &str,
    ) -> SqliteResult<Option<User>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, email, password_hash, salt, created_at FROM users WHERE email = ?1",
        )?;

        let row = stmt
            .query_row([email], |row| {
                let created_at_str: String = row.get(4)?;
                Ok((
                    User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        created_at: parse_rfc3339(&created_at_str),
                    },
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .optional()?;

        Ok(row.and_then(|(user, stored_hash, salt)| {
            if hash_password(&salt, password) == stored_hash {
                Some(user)
            } else {
                None
            }
        }))
    }
}

fn parse_rfc3339(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

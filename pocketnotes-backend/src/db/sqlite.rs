//! SQLite database wrapper for users and auth sessions.
//!
//! Note data does NOT live here — the notes collection has its own JSON
//! store (see `crate::notes::store`). This database only backs the
//! email/password identity provider and its bearer sessions.

use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database and ensure the schema exists
    pub fn new(db_path: &str) -> SqliteResult<Self> {
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                salt TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS auth_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                token TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_test_db() -> (tempfile::TempDir, Database) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::new(path.to_str().unwrap()).expect("Failed to open database");
        (dir, db)
    }

    #[test]
    fn test_signup_then_login_round_trip() {
        let (_dir, db) = open_test_db();

        let user = db
            .create_user("alice@example.com", "hunter22")
            .expect("Failed to create user");
        assert_eq!(user.email, "alice@example.com");

        let verified = db
            .verify_user_password("alice@example.com", "hunter22")
            .expect("Failed to verify");
        assert_eq!(verified.map(|u| u.id), Some(user.id));
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let (_dir, db) = open_test_db();

        db.create_user("alice@example.com", "hunter22").unwrap();

        assert!(db
            .verify_user_password("alice@example.com", "wrong")
            .unwrap()
            .is_none());
        assert!(db
            .verify_user_password("nobody@example.com", "hunter22")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_duplicate_email_is_rejected() {
        let (_dir, db) = open_test_db();

        db.create_user("alice@example.com", "hunter22").unwrap();
        assert!(db.create_user("alice@example.com", "other-pass").is_err());
    }

    #[test]
    fn test_session_lifecycle() {
        let (_dir, db) = open_test_db();

        let user = db.create_user("alice@example.com", "hunter22").unwrap();
        let session = db.create_session(user.id).expect("Failed to create session");
        assert!(session.expires_at > session.created_at);

        let validated = db
            .validate_session(&session.token)
            .expect("Failed to validate");
        assert_eq!(validated.map(|s| s.user_id), Some(user.id));

        assert!(db.delete_session(&session.token).unwrap());
        assert!(db.validate_session(&session.token).unwrap().is_none());
    }

    #[test]
    fn test_unknown_token_does_not_validate() {
        let (_dir, db) = open_test_db();
        assert!(db.validate_session("not-a-token").unwrap().is_none());
        assert!(!db.delete_session("not-a-token").unwrap());
    }
}

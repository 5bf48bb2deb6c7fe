//! Account storage: email, password hash, and the uid handed out at sign-up.

use anyhow::anyhow;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;

use super::{AuthError, Identity};

pub struct AccountStore {
    connection: Connection,
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Failed to hash password: {e}"))
}

fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

impl AccountStore {
    pub fn open(database_path: &Path) -> anyhow::Result<Self> {
        let connection = Connection::open(database_path)?;
        connection.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                uid TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at_us INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(Self { connection })
    }

    /// Stores a new account. `email` is expected to be normalized already.
    pub fn create(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let uid = uuid::Uuid::new_v4().to_string();
        let hash = hash_password(password)?;

        let inserted = self.connection.execute(
            "INSERT INTO accounts (uid, email, password_hash, created_at_us) VALUES (?1, ?2, ?3, ?4)",
            params![uid, email, hash, Utc::now().timestamp_micros()],
        );
        match inserted {
            Ok(_) => Ok(Identity {
                uid,
                email: Some(email.to_string()),
            }),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(AuthError::EmailInUse)
            }
            Err(e) => Err(AuthError::Storage(e.into())),
        }
    }

    /// Looks up `email` and checks the password against the stored hash.
    pub fn verify(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let row = self
            .connection
            .query_row(
                "SELECT uid, password_hash FROM accounts WHERE email = ?1",
                params![email],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(|e| AuthError::Storage(e.into()))?;

        match row {
            Some((uid, hash)) if verify_password(&hash, password) => Ok(Identity {
                uid,
                email: Some(email.to_string()),
            }),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

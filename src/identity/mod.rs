//! Local identity provider.
//!
//! Accounts (email + Argon2 password hash) live in the shared SQLite database;
//! the signed-in identity is persisted as a small session file. Interested
//! parties call [`IdentityProvider::subscribe`] to be told about every
//! sign-in and sign-out; dropping the receiver unsubscribes.

mod accounts;
mod session;

use std::path::Path;
use thiserror::Error;
use tokio::sync::watch;

use accounts::AccountStore;
use session::SessionFile;

const MIN_PASSWORD_LEN: usize = 6;

/// The authenticated user principal.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Identity {
    /// Opaque identifier, used as the owner of download records
    pub uid: String,
    pub email: Option<String>,
}

impl Identity {
    /// Label for prompts and logs.
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.uid)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("An account with this email already exists")]
    EmailInUse,
    #[error("Wrong email or password")]
    InvalidCredentials,
    #[error("Account storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Normalizes and checks credentials before they reach the account store.
///
/// Emails are trimmed and lower-cased and must look like `local@domain.tld`.
pub fn validate_credentials(email: &str, password: &str) -> Result<String, AuthError> {
    let email = email.trim().to_ascii_lowercase();
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
                && domain
                    .rsplit_once('.')
                    .is_some_and(|(name, tld)| !name.is_empty() && tld.len() >= 2)
        }
        None => false,
    };
    if !valid_email {
        return Err(AuthError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(email)
}

/// Email/password identity provider backed by local storage.
pub struct IdentityProvider {
    accounts: AccountStore,
    session: SessionFile,
    state: watch::Sender<Option<Identity>>,
}

impl IdentityProvider {
    /// Opens the account store and restores any persisted session.
    ///
    /// # Errors
    /// - If the database cannot be opened
    pub fn open(database_path: &Path, data_dir: &Path) -> anyhow::Result<Self> {
        let accounts = AccountStore::open(database_path)?;
        let session = SessionFile::new(data_dir.join("session.toml"));

        let restored = match session.load() {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file: {e}");
                None
            }
        };
        let (state, _) = watch::channel(restored);

        Ok(Self {
            accounts,
            session,
            state,
        })
    }

    /// Creates an account and signs it in.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = validate_credentials(email, password)?;
        let identity = self.accounts.create(&email, password)?;
        tracing::info!("Account created for {}", email);
        self.set_current(Some(identity.clone()))?;
        Ok(identity)
    }

    /// Signs in an existing account.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = validate_credentials(email, password)
            .map_err(|_| AuthError::InvalidCredentials)?;
        let identity = self.accounts.verify(&email, password)?;
        tracing::info!("Signed in as {}", email);
        self.set_current(Some(identity.clone()))?;
        Ok(identity)
    }

    /// Clears the session. Signing out while signed out is a no-op.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        if self.current().is_some() {
            tracing::info!("Signed out");
        }
        self.set_current(None)
    }

    /// The signed-in identity, if any.
    pub fn current(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    /// Receiver that observes the current identity and every later change.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }

    fn set_current(&self, identity: Option<Identity>) -> Result<(), AuthError> {
        match &identity {
            Some(identity) => self.session.save(identity)?,
            None => self.session.clear()?,
        }
        self.state.send_replace(identity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(dir: &Path) -> IdentityProvider {
        IdentityProvider::open(&dir.join("vortex.db"), dir).unwrap()
    }

    #[test]
    fn credential_rules() {
        assert_eq!(
            validate_credentials("  Me@Example.COM ", "secret").unwrap(),
            "me@example.com"
        );
        for email in ["", "me", "me@", "@example.com", "me@example", "me@ex ample.com", "a@b@c.com"] {
            assert!(
                matches!(validate_credentials(email, "secret"), Err(AuthError::InvalidEmail)),
                "{email}"
            );
        }
        assert!(matches!(
            validate_credentials("me@example.com", "12345"),
            Err(AuthError::WeakPassword)
        ));
    }

    #[test]
    fn sign_up_then_sign_in() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(dir.path());

        let created = provider.sign_up("me@example.com", "secret").unwrap();
        assert_eq!(created.email.as_deref(), Some("me@example.com"));
        assert_eq!(provider.current(), Some(created.clone()));

        provider.sign_out().unwrap();
        assert_eq!(provider.current(), None);

        let signed_in = provider.sign_in("ME@example.com", "secret").unwrap();
        assert_eq!(signed_in.uid, created.uid);
    }

    #[test]
    fn rejects_bad_credentials_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(dir.path());
        provider.sign_up("me@example.com", "secret").unwrap();

        assert!(matches!(
            provider.sign_up("me@example.com", "another"),
            Err(AuthError::EmailInUse)
        ));
        assert!(matches!(
            provider.sign_in("me@example.com", "wrong-password"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            provider.sign_in("nobody@example.com", "secret"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let identity = provider(dir.path()).sign_up("me@example.com", "secret").unwrap();

        assert_eq!(provider(dir.path()).current(), Some(identity));
    }

    #[tokio::test]
    async fn subscribers_see_every_change() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(dir.path());
        let mut events = provider.subscribe();
        assert_eq!(*events.borrow_and_update(), None);

        let identity = provider.sign_up("me@example.com", "secret").unwrap();
        events.changed().await.unwrap();
        assert_eq!(*events.borrow_and_update(), Some(identity));

        provider.sign_out().unwrap();
        events.changed().await.unwrap();
        assert_eq!(*events.borrow_and_update(), None);

        drop(provider);
        assert!(events.changed().await.is_err());
    }
}

//! crates/gradebook_core/src/credentials.rs
//!
//! Account registration and login verification.
//!
//! Key stretching is CPU-bound and synchronous. The pure halves
//! ([`Registration::prepare`] and [`verify_login`]) are exposed separately so
//! an async caller can move them onto a blocking thread; [`CredentialManager`]
//! also offers the combined operations.

use std::sync::Arc;
use tracing::{info, warn};

use crate::credential::Credential;
use crate::domain::{AccountCredentials, AccountId};
use crate::error::{AuthError, RegistrationError, ValidationError};
use crate::ports::{PortError, RecordStore};
use crate::values::{DisplayName, Password, Username};

/// A validated registration with its credential already derived.
pub struct Registration {
    username: Username,
    display_name: DisplayName,
    credential: Credential,
}

impl Registration {
    /// Validates every field, then derives the credential. Nothing is
    /// derived when validation fails.
    pub fn prepare(
        username: &str,
        display_name: &str,
        password: &str,
    ) -> Result<Self, ValidationError> {
        let username = Username::parse(username)?;
        let display_name = DisplayName::parse(display_name)?;
        let password = Password::parse(password)?;
        Ok(Self {
            username,
            display_name,
            credential: Credential::derive(&password),
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }
}

/// Checks `password` against a looked-up account.
///
/// A missing account and a wrong password both yield
/// [`AuthError::InvalidCredentials`].
pub fn verify_login(found: Option<AccountCredentials>, password: &str) -> Result<AccountId, AuthError> {
    match found {
        Some(candidate) if candidate.credential.verify(password) => Ok(candidate.account.id),
        Some(_) => Err(AuthError::InvalidCredentials),
        None => {
            // Burn the same KDF work so timing does not reveal whether the
            // username exists.
            Credential::decoy().verify(password);
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[derive(Clone)]
pub struct CredentialManager {
    store: Arc<dyn RecordStore>,
}

impl CredentialManager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Validates input, derives a credential and creates the account.
    pub async fn register(
        &self,
        username: &str,
        display_name: &str,
        password: &str,
    ) -> Result<AccountId, RegistrationError> {
        let registration = Registration::prepare(username, display_name, password)?;
        self.complete_registration(registration).await
    }

    /// Persists a prepared registration.
    pub async fn complete_registration(
        &self,
        registration: Registration,
    ) -> Result<AccountId, RegistrationError> {
        let result = self
            .store
            .insert_account(
                &registration.username,
                &registration.display_name,
                &registration.credential,
            )
            .await;

        match result {
            Ok(id) => {
                info!(account_id = %id, username = registration.username(), "Account registered");
                Ok(id)
            }
            Err(PortError::Conflict(_)) => {
                warn!(username = registration.username(), "Username already taken");
                Err(RegistrationError::DuplicateUsername)
            }
            Err(e) => Err(RegistrationError::Storage(e)),
        }
    }

    /// Fetches the stored credential for `username`, if any. Read-only.
    pub async fn lookup(&self, username: &str) -> Result<Option<AccountCredentials>, AuthError> {
        Ok(self.store.find_account_by_username(username).await?)
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AccountId, AuthError> {
        let found = self.lookup(username).await?;
        verify_login(found, password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn manager() -> CredentialManager {
        CredentialManager::new(Arc::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn register_then_authenticate_returns_same_id() {
        let manager = manager();
        let id = manager.register("alice", "Alice A.", "s3cret!").await.unwrap();
        let logged_in = manager.authenticate("alice", "s3cret!").await.unwrap();
        assert_eq!(id, logged_in);
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let manager = manager();
        manager.register("alice", "Alice", "s3cret!").await.unwrap();
        let err = manager.authenticate("alice", "s3cret?").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_username_is_indistinguishable_from_wrong_password() {
        let manager = manager();
        manager.register("alice", "Alice", "s3cret!").await.unwrap();

        let unknown = manager.authenticate("mallory", "s3cret!").await.unwrap_err();
        let wrong = manager.authenticate("alice", "nope-nope").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_username_keeps_first_account() {
        let manager = manager();
        let first = manager.register("alice", "Alice", "first-pass").await.unwrap();

        let err = manager.register("alice", "Impostor", "second-pass").await.unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateUsername));

        assert_eq!(manager.authenticate("alice", "first-pass").await.unwrap(), first);
        assert!(manager.authenticate("alice", "second-pass").await.is_err());
    }

    #[tokio::test]
    async fn password_length_boundary() {
        let manager = manager();
        let err = manager.register("short", "Short", "12345").await.unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::Validation(ValidationError::PasswordTooShort { .. })
        ));
        assert!(manager.register("exact", "Exact", "123456").await.is_ok());
    }

    #[tokio::test]
    async fn invalid_usernames_never_reach_storage() {
        let store = Arc::new(MemoryStore::default());
        let manager = CredentialManager::new(store.clone());

        for bad in ["bad name", "bad/name", ""] {
            let err = manager.register(bad, "Name", "123456").await.unwrap_err();
            assert!(matches!(err, RegistrationError::Validation(_)), "{bad:?}");
        }
        assert_eq!(store.account_count(), 0);
    }

    #[tokio::test]
    async fn empty_display_name_is_rejected() {
        let err = manager().register("alice", "", "123456").await.unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::Validation(ValidationError::EmptyDisplayName)
        ));
    }

    #[tokio::test]
    async fn stored_credential_is_not_the_raw_password() {
        let store = Arc::new(MemoryStore::default());
        let manager = CredentialManager::new(store.clone());
        manager.register("alice", "Alice", "plaintext").await.unwrap();

        let stored = store
            .find_account_by_username("alice")
            .await
            .unwrap()
            .unwrap()
            .credential
            .to_bytes();
        assert_eq!(stored.len(), crate::credential::CREDENTIAL_LEN);
        assert!(!stored.windows(9).any(|w| w == b"plaintext"));
    }

    #[test]
    fn verify_login_on_missing_account_fails() {
        assert!(matches!(
            verify_login(None, "anything"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}

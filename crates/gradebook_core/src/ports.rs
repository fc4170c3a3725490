//! crates/gradebook_core/src/ports.rs
//!
//! Defines the storage contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete database behind it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::credential::Credential;
use crate::domain::{Account, AccountCredentials, AccountId, CourseRecord, CourseRecordId};
use crate::values::{CourseInput, DisplayName, Username};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports (Traits)
//=========================================================================================

/// Persists accounts and their course records.
///
/// Update and delete calls on course records are scoped to `owner_id` and
/// report `false` when the record is missing or owned by someone else.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // --- Accounts ---

    /// Fails with [`PortError::Conflict`] when the username is taken.
    async fn insert_account(
        &self,
        username: &Username,
        display_name: &DisplayName,
        credential: &Credential,
    ) -> PortResult<AccountId>;

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> PortResult<Option<AccountCredentials>>;

    async fn find_account_by_id(&self, id: AccountId) -> PortResult<Option<Account>>;

    /// Deletes every course owned by `owner_id`, then the account itself, as
    /// one atomic unit. Returns `false` if there was no such account.
    async fn delete_account_cascade(&self, owner_id: AccountId) -> PortResult<bool>;

    // --- Course Records ---

    /// Courses owned by `owner_id`, oldest first.
    async fn list_courses_by_owner(&self, owner_id: AccountId) -> PortResult<Vec<CourseRecord>>;

    /// Fails with [`PortError::NotFound`] when the owner does not exist.
    async fn insert_course(
        &self,
        owner_id: AccountId,
        course: &CourseInput,
    ) -> PortResult<CourseRecordId>;

    async fn update_course(
        &self,
        owner_id: AccountId,
        record_id: CourseRecordId,
        course: &CourseInput,
    ) -> PortResult<bool>;

    async fn delete_course(&self, owner_id: AccountId, record_id: CourseRecordId)
        -> PortResult<bool>;
}

/// Opaque login sessions handed out by a transport layer.
#[async_trait]
pub trait AuthSessionStore: Send + Sync {
    async fn create_auth_session(
        &self,
        session_id: &str,
        account_id: AccountId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Unknown or expired sessions fail with [`PortError::Unauthorized`].
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AccountId>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

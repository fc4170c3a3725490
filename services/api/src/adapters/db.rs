//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `RecordStore` and `AuthSessionStore` ports from the `core` crate. It
//! handles all interactions with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gradebook_core::credential::Credential;
use gradebook_core::domain::{Account, AccountCredentials, AccountId, CourseRecord, CourseRecordId};
use gradebook_core::ports::{AuthSessionStore, PortError, PortResult, RecordStore};
use gradebook_core::values::{CourseInput, Credit, DisplayName, GradePoint, Username};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a private in-memory database with the schema applied.
    ///
    /// Every connection to `sqlite::memory:` sees its own database, so the
    /// pool is pinned to one connection that is never recycled.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let adapter = Self::new(pool);
        adapter.run_migrations().await?;
        Ok(adapter)
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct AccountRecord {
    id: Uuid,
    username: String,
    display_name: String,
    created_at: DateTime<Utc>,
}
impl AccountRecord {
    fn to_domain(self) -> Account {
        Account {
            id: AccountId(self.id),
            username: self.username,
            display_name: self.display_name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialRecord {
    id: Uuid,
    username: String,
    display_name: String,
    credential: Vec<u8>,
    created_at: DateTime<Utc>,
}
impl CredentialRecord {
    fn to_domain(self) -> PortResult<AccountCredentials> {
        let credential = Credential::from_bytes(&self.credential).map_err(|e| {
            warn!(account_id = %self.id, "Stored credential is malformed: {}", e);
            PortError::Unexpected(e.to_string())
        })?;
        Ok(AccountCredentials {
            account: Account {
                id: AccountId(self.id),
                username: self.username,
                display_name: self.display_name,
                created_at: self.created_at,
            },
            credential,
        })
    }
}

#[derive(FromRow)]
struct CourseRow {
    id: Uuid,
    account_id: Uuid,
    course_code: String,
    credit: f64,
    grade: f64,
    created_at: DateTime<Utc>,
}
impl CourseRow {
    fn to_domain(self) -> PortResult<CourseRecord> {
        let credit = Credit::try_from(self.credit)
            .map_err(|e| PortError::Unexpected(format!("Course {}: {}", self.id, e)))?;
        let grade = GradePoint::try_from(self.grade)
            .map_err(|e| PortError::Unexpected(format!("Course {}: {}", self.id, e)))?;
        Ok(CourseRecord {
            id: CourseRecordId(self.id),
            owner_id: AccountId(self.account_id),
            code: self.course_code,
            credit,
            grade,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    account_id: Uuid,
    expires_at: DateTime<Utc>,
}

//=========================================================================================
// `RecordStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecordStore for DbAdapter {
    async fn insert_account(
        &self,
        username: &Username,
        display_name: &DisplayName,
        credential: &Credential,
    ) -> PortResult<AccountId> {
        let id = AccountId::new();
        let result = sqlx::query(
            "INSERT INTO accounts (id, username, display_name, credential, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.0)
        .bind(username.as_str())
        .bind(display_name.as_str())
        .bind(credential.to_bytes())
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                PortError::Conflict(format!("Username {} already exists", username.as_str())),
            ),
            Err(e) => Err(unexpected(e)),
        }
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> PortResult<Option<AccountCredentials>> {
        let record = sqlx::query_as::<_, CredentialRecord>(
            "SELECT id, username, display_name, credential, created_at FROM accounts WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record.map(CredentialRecord::to_domain).transpose()
    }

    async fn find_account_by_id(&self, id: AccountId) -> PortResult<Option<Account>> {
        let record = sqlx::query_as::<_, AccountRecord>(
            "SELECT id, username, display_name, created_at FROM accounts WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(AccountRecord::to_domain))
    }

    async fn delete_account_cascade(&self, owner_id: AccountId) -> PortResult<bool> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("DELETE FROM courses WHERE account_id = ?")
            .bind(owner_id.0)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        sqlx::query("DELETE FROM auth_sessions WHERE account_id = ?")
            .bind(owner_id.0)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        let deleted = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(owner_id.0)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?
            .rows_affected();

        tx.commit().await.map_err(unexpected)?;
        Ok(deleted > 0)
    }

    async fn list_courses_by_owner(&self, owner_id: AccountId) -> PortResult<Vec<CourseRecord>> {
        let records = sqlx::query_as::<_, CourseRow>(
            "SELECT id, account_id, course_code, credit, grade, created_at FROM courses WHERE account_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(owner_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(CourseRow::to_domain).collect()
    }

    async fn insert_course(
        &self,
        owner_id: AccountId,
        course: &CourseInput,
    ) -> PortResult<CourseRecordId> {
        let id = CourseRecordId::new();
        let result = sqlx::query(
            "INSERT INTO courses (id, account_id, course_code, credit, grade, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.0)
        .bind(owner_id.0)
        .bind(course.code.as_str())
        .bind(course.credit.value())
        .bind(course.grade.value())
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => Err(
                PortError::NotFound(format!("Account {} not found", owner_id)),
            ),
            Err(e) => Err(unexpected(e)),
        }
    }

    async fn update_course(
        &self,
        owner_id: AccountId,
        record_id: CourseRecordId,
        course: &CourseInput,
    ) -> PortResult<bool> {
        let result = sqlx::query(
            "UPDATE courses SET course_code = ?, credit = ?, grade = ? WHERE id = ? AND account_id = ?",
        )
        .bind(course.code.as_str())
        .bind(course.credit.value())
        .bind(course.grade.value())
        .bind(record_id.0)
        .bind(owner_id.0)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_course(
        &self,
        owner_id: AccountId,
        record_id: CourseRecordId,
    ) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ? AND account_id = ?")
            .bind(record_id.0)
            .bind(owner_id.0)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }
}

//=========================================================================================
// `AuthSessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthSessionStore for DbAdapter {
    async fn create_auth_session(
        &self,
        session_id: &str,
        account_id: AccountId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, account_id, expires_at) VALUES (?, ?, ?)")
            .bind(session_id)
            .bind(account_id.0)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AccountId> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT account_id, expires_at FROM auth_sessions WHERE id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)?;

        if record.expires_at <= Utc::now() {
            self.delete_auth_session(session_id).await?;
            return Err(PortError::Unauthorized);
        }
        Ok(AccountId(record.account_id))
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

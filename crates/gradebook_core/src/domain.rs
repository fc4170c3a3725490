//! crates/gradebook_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::credential::Credential;
use crate::values::{Credit, GradePoint};

/// Identifies an account. Assigned once at registration and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifies a single course record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseRecordId(pub Uuid);

impl CourseRecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CourseRecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CourseRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// Represents an account - used throughout app
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub account: Account,
    pub credential: Credential,
}

/// A single course entry owned by one account.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRecord {
    pub id: CourseRecordId,
    pub owner_id: AccountId,
    pub code: String,
    pub credit: Credit,
    pub grade: GradePoint,
    /// Only used to keep the display order stable.
    pub created_at: DateTime<Utc>,
}

/// An account together with its courses, in creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountProfile {
    pub account: Account,
    pub courses: Vec<CourseRecord>,
}


//! In-memory `RecordStore` for unit tests.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

use crate::credential::Credential;
use crate::domain::{Account, AccountCredentials, AccountId, CourseRecord, CourseRecordId};
use crate::ports::{PortError, PortResult, RecordStore};
use crate::values::{CourseInput, DisplayName, Username};

#[derive(Default)]
struct Tables {
    accounts: Vec<AccountCredentials>,
    courses: Vec<CourseRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn account_count(&self) -> usize {
        self.lock().accounts.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_account(
        &self,
        username: &Username,
        display_name: &DisplayName,
        credential: &Credential,
    ) -> PortResult<AccountId> {
        let mut tables = self.lock();
        if tables
            .accounts
            .iter()
            .any(|a| a.account.username == username.as_str())
        {
            return Err(PortError::Conflict(username.as_str().to_string()));
        }
        let id = AccountId::new();
        tables.accounts.push(AccountCredentials {
            account: Account {
                id,
                username: username.as_str().to_string(),
                display_name: display_name.as_str().to_string(),
                created_at: Utc::now(),
            },
            credential: credential.clone(),
        });
        Ok(id)
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> PortResult<Option<AccountCredentials>> {
        Ok(self
            .lock()
            .accounts
            .iter()
            .find(|a| a.account.username == username)
            .cloned())
    }

    async fn find_account_by_id(&self, id: AccountId) -> PortResult<Option<Account>> {
        Ok(self
            .lock()
            .accounts
            .iter()
            .find(|a| a.account.id == id)
            .map(|a| a.account.clone()))
    }

    async fn delete_account_cascade(&self, owner_id: AccountId) -> PortResult<bool> {
        let mut tables = self.lock();
        tables.courses.retain(|c| c.owner_id != owner_id);
        let before = tables.accounts.len();
        tables.accounts.retain(|a| a.account.id != owner_id);
        Ok(tables.accounts.len() != before)
    }

    async fn list_courses_by_owner(&self, owner_id: AccountId) -> PortResult<Vec<CourseRecord>> {
        Ok(self
            .lock()
            .courses
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_course(
        &self,
        owner_id: AccountId,
        course: &CourseInput,
    ) -> PortResult<CourseRecordId> {
        let mut tables = self.lock();
        if !tables.accounts.iter().any(|a| a.account.id == owner_id) {
            return Err(PortError::NotFound(format!("Account {owner_id} not found")));
        }
        let id = CourseRecordId::new();
        tables.courses.push(CourseRecord {
            id,
            owner_id,
            code: course.code.as_str().to_string(),
            credit: course.credit,
            grade: course.grade,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn update_course(
        &self,
        owner_id: AccountId,
        record_id: CourseRecordId,
        course: &CourseInput,
    ) -> PortResult<bool> {
        let mut tables = self.lock();
        let Some(record) = tables
            .courses
            .iter_mut()
            .find(|c| c.id == record_id && c.owner_id == owner_id)
        else {
            return Ok(false);
        };
        record.code = course.code.as_str().to_string();
        record.credit = course.credit;
        record.grade = course.grade;
        Ok(true)
    }

    async fn delete_course(
        &self,
        owner_id: AccountId,
        record_id: CourseRecordId,
    ) -> PortResult<bool> {
        let mut tables = self.lock();
        let before = tables.courses.len();
        tables
            .courses
            .retain(|c| !(c.id == record_id && c.owner_id == owner_id));
        Ok(tables.courses.len() != before)
    }
}

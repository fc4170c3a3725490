//! crates/gradebook_core/src/gradebook.rs
//!
//! Owner-scoped course operations. Every call takes the acting account id
//! explicitly; nothing here reads ambient session state.

use std::sync::Arc;
use tracing::{debug, info};

use crate::aggregate::{aggregate, GradeSummary};
use crate::domain::{AccountId, AccountProfile, CourseRecord, CourseRecordId};
use crate::error::CourseError;
use crate::ports::{PortError, PortResult, RecordStore};
use crate::values::{CourseInput, GradingScale};

#[derive(Clone)]
pub struct Gradebook {
    store: Arc<dyn RecordStore>,
}

impl Gradebook {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The credit and grade values a course may take.
    pub fn grading_scale() -> GradingScale {
        GradingScale::standard()
    }

    pub async fn add_course(
        &self,
        owner: AccountId,
        code: &str,
        credit: f64,
        grade: f64,
    ) -> Result<CourseRecordId, CourseError> {
        let course = CourseInput::parse(code, credit, grade)?;

        if self.store.find_account_by_id(owner).await?.is_none() {
            return Err(CourseError::AccountNotFound(owner));
        }

        let id = self
            .store
            .insert_course(owner, &course)
            .await
            .map_err(|e| match e {
                // The owner vanished between the check and the insert.
                PortError::NotFound(_) => CourseError::AccountNotFound(owner),
                other => CourseError::Storage(other),
            })?;
        debug!(account_id = %owner, course_id = %id, code = course.code.as_str(), "Course added");
        Ok(id)
    }

    pub async fn list_courses(&self, owner: AccountId) -> PortResult<Vec<CourseRecord>> {
        self.store.list_courses_by_owner(owner).await
    }

    /// Replaces code, credit and grade. `Ok(false)` means the record does not
    /// exist or belongs to another account; nothing was changed.
    pub async fn update_course(
        &self,
        owner: AccountId,
        record_id: CourseRecordId,
        code: &str,
        credit: f64,
        grade: f64,
    ) -> Result<bool, CourseError> {
        let course = CourseInput::parse(code, credit, grade)?;
        Ok(self.store.update_course(owner, record_id, &course).await?)
    }

    pub async fn delete_course(
        &self,
        owner: AccountId,
        record_id: CourseRecordId,
    ) -> PortResult<bool> {
        self.store.delete_course(owner, record_id).await
    }

    pub async fn profile(&self, owner: AccountId) -> PortResult<Option<AccountProfile>> {
        let Some(account) = self.store.find_account_by_id(owner).await? else {
            return Ok(None);
        };
        let courses = self.store.list_courses_by_owner(owner).await?;
        Ok(Some(AccountProfile { account, courses }))
    }

    pub async fn summary(&self, owner: AccountId) -> PortResult<GradeSummary> {
        let courses = self.store.list_courses_by_owner(owner).await?;
        Ok(aggregate(&courses))
    }

    /// Removes the account and all of its courses. Calling it again for the
    /// same id is a no-op returning `false`.
    pub async fn delete_account(&self, owner: AccountId) -> PortResult<bool> {
        let deleted = self.store.delete_account_cascade(owner).await?;
        if deleted {
            info!(account_id = %owner, "Account deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialManager;
    use crate::error::ValidationError;
    use crate::testing::MemoryStore;

    async fn setup() -> (Gradebook, CredentialManager, AccountId) {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::default());
        let credentials = CredentialManager::new(store.clone());
        let owner = credentials.register("alice", "Alice", "123456").await.unwrap();
        (Gradebook::new(store), credentials, owner)
    }

    #[tokio::test]
    async fn courses_list_in_creation_order() {
        let (book, _, owner) = setup().await;
        for code in ["MAT101", "CSE110", "PHY101"] {
            book.add_course(owner, code, 3.0, 4.0).await.unwrap();
        }

        let codes: Vec<_> = book
            .list_courses(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, ["MAT101", "CSE110", "PHY101"]);
    }

    #[tokio::test]
    async fn summary_matches_added_courses() {
        let (book, _, owner) = setup().await;
        book.add_course(owner, "CSE101", 3.0, 4.0).await.unwrap();
        book.add_course(owner, "MAT101", 2.0, 3.0).await.unwrap();

        let summary = book.summary(owner).await.unwrap();
        assert_eq!(summary.total_points, 18.0);
        assert_eq!(summary.total_credits, 5.0);
        assert!((summary.average_point - 3.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn summary_of_account_without_courses_is_zero() {
        let (book, _, owner) = setup().await;
        assert_eq!(book.summary(owner).await.unwrap(), GradeSummary::default());
    }

    #[tokio::test]
    async fn add_course_validates_scale() {
        let (book, _, owner) = setup().await;
        let err = book.add_course(owner, "CSE101", 5.0, 4.0).await.unwrap_err();
        assert!(matches!(
            err,
            CourseError::Validation(ValidationError::UnsupportedCredit(_))
        ));
        let err = book.add_course(owner, "CSE101", 3.0, 3.9).await.unwrap_err();
        assert!(matches!(
            err,
            CourseError::Validation(ValidationError::UnsupportedGrade(_))
        ));
        let err = book.add_course(owner, "", 3.0, 4.0).await.unwrap_err();
        assert!(matches!(
            err,
            CourseError::Validation(ValidationError::EmptyCourseCode)
        ));
    }

    #[tokio::test]
    async fn add_course_requires_existing_owner() {
        let (book, _, _) = setup().await;
        let stranger = AccountId::new();
        let err = book.add_course(stranger, "CSE101", 3.0, 4.0).await.unwrap_err();
        assert!(matches!(err, CourseError::AccountNotFound(id) if id == stranger));
    }

    #[tokio::test]
    async fn update_replaces_all_three_fields() {
        let (book, _, owner) = setup().await;
        let id = book.add_course(owner, "CSE101", 3.0, 4.0).await.unwrap();

        assert!(book.update_course(owner, id, "CSE102", 4.5, 2.25).await.unwrap());

        let courses = book.list_courses(owner).await.unwrap();
        let course = &courses[0];
        assert_eq!(course.code, "CSE102");
        assert_eq!(course.credit.value(), 4.5);
        assert_eq!(course.grade.value(), 2.25);
    }

    #[tokio::test]
    async fn cross_account_mutation_is_a_no_op() {
        let (book, credentials, owner) = setup().await;
        let other = credentials.register("bob", "Bob", "654321").await.unwrap();
        let id = book.add_course(owner, "CSE101", 3.0, 4.0).await.unwrap();

        assert!(!book.update_course(other, id, "HACKED", 1.0, 0.0).await.unwrap());
        assert!(!book.delete_course(other, id).await.unwrap());

        let courses = book.list_courses(owner).await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].code, "CSE101");
        assert_eq!(courses[0].grade.value(), 4.0);
    }

    #[tokio::test]
    async fn missing_record_update_and_delete_return_false() {
        let (book, _, owner) = setup().await;
        let ghost = CourseRecordId::new();
        assert!(!book.update_course(owner, ghost, "X", 1.0, 1.0).await.unwrap());
        assert!(!book.delete_course(owner, ghost).await.unwrap());
    }

    #[tokio::test]
    async fn delete_course_removes_only_that_record() {
        let (book, _, owner) = setup().await;
        let keep = book.add_course(owner, "KEEP", 3.0, 4.0).await.unwrap();
        let gone = book.add_course(owner, "DROP", 3.0, 4.0).await.unwrap();

        assert!(book.delete_course(owner, gone).await.unwrap());
        let ids: Vec<_> = book
            .list_courses(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![keep]);
    }

    #[tokio::test]
    async fn delete_account_cascades_and_is_idempotent() {
        let (book, credentials, owner) = setup().await;
        book.add_course(owner, "CSE101", 3.0, 4.0).await.unwrap();
        book.add_course(owner, "MAT101", 2.0, 3.0).await.unwrap();

        assert!(book.delete_account(owner).await.unwrap());
        assert!(book.list_courses(owner).await.unwrap().is_empty());
        assert!(book.profile(owner).await.unwrap().is_none());
        assert!(credentials.authenticate("alice", "123456").await.is_err());

        assert!(!book.delete_account(owner).await.unwrap());
    }

    #[tokio::test]
    async fn delete_account_leaves_other_accounts_alone() {
        let (book, credentials, owner) = setup().await;
        let other = credentials.register("bob", "Bob", "654321").await.unwrap();
        book.add_course(other, "BIO101", 1.0, 3.0).await.unwrap();

        book.delete_account(owner).await.unwrap();
        assert_eq!(book.list_courses(other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn profile_bundles_account_and_courses() {
        let (book, _, owner) = setup().await;
        book.add_course(owner, "CSE101", 3.0, 4.0).await.unwrap();

        let profile = book.profile(owner).await.unwrap().unwrap();
        assert_eq!(profile.account.username, "alice");
        assert_eq!(profile.account.display_name, "Alice");
        assert_eq!(profile.courses.len(), 1);
    }

    #[test]
    fn grading_scale_exposes_closed_sets() {
        let scale = Gradebook::grading_scale();
        assert_eq!(scale.credits, vec![1.0, 2.0, 3.0, 4.0, 4.5]);
        assert_eq!(scale.grades.len(), 17);
    }
}

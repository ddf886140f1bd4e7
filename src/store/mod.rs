//! Persistence for student records.
//!
//! [`StudentStore`] is the capability the service depends on. The Postgres
//! backend talks to the `students` table described in `schema.sql`; the
//! in-memory backend keeps the same guarantees (unique email, insertion
//! timestamps) for local runs and tests.

mod memory;
mod postgres;

pub use memory::MemoryStudentStore;
pub use postgres::PgStudentStore;

use async_trait::async_trait;

use crate::models::{NewStudent, Student};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The unique constraint on `email` rejected the write.
    #[error("email already registered")]
    Duplicate,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Inserts a record, letting the store assign `id` and `registrationDate`.
    ///
    /// Returns [`StoreError::Duplicate`] if the email is already taken.
    async fn create(&self, student: &NewStudent) -> StoreResult<Student>;

    /// All records, newest registration first.
    async fn list(&self) -> StoreResult<Vec<Student>>;

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<Student>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Student>>;

    /// Returns `true` when a row was removed.
    async fn delete(&self, id: i64) -> StoreResult<bool>;

    /// Short name used in logs.
    fn kind(&self) -> &'static str;
}

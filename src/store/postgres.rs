use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{StoreError, StoreResult, StudentStore};
use crate::models::{NewStudent, Student};

const UNIQUE_VIOLATION: &str = "23505";

const COLUMNS: &str = r#"id, "studentName", email, course, "registrationDate""#;

/// `students` table in Postgres. Every statement borrows a pooled
/// connection for its own duration only.
#[derive(Debug, Clone)]
pub struct PgStudentStore {
    pool: PgPool,
}

impl PgStudentStore {
    /// Builds the pool without opening a connection; an unreachable database
    /// surfaces on the first request instead of at startup.
    pub fn connect_lazy(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Duplicate
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Query(err.to_string()),
        }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn create(&self, student: &NewStudent) -> StoreResult<Student> {
        let query = format!(
            r#"INSERT INTO students ("studentName", email, course, "registrationDate") VALUES ($1, $2, $3, NOW()) RETURNING {}"#,
            COLUMNS
        );
        let created = sqlx::query_as::<_, Student>(&query)
            .bind(&student.student_name)
            .bind(&student.email)
            .bind(&student.course)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn list(&self) -> StoreResult<Vec<Student>> {
        let query = format!(
            r#"SELECT {} FROM students ORDER BY "registrationDate" DESC, id DESC"#,
            COLUMNS
        );
        let students = sqlx::query_as::<_, Student>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(students)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<Student>> {
        let query = format!("SELECT {} FROM students WHERE id = $1", COLUMNS);
        let student = sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        let query = format!("SELECT {} FROM students WHERE email = $1 LIMIT 1", COLUMNS);
        let student = sqlx::query_as::<_, Student>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() >= 1)
    }

    fn kind(&self) -> &'static str {
        "postgres"
    }
}

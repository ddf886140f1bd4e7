use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{StoreError, StoreResult, StudentStore};
use crate::models::{NewStudent, Student};

#[derive(Debug)]
struct Table {
    next_id: i64,
    rows: Vec<Student>,
}

/// Process-local table used when no database is configured.
#[derive(Debug)]
pub struct MemoryStudentStore {
    table: Mutex<Table>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                next_id: 1,
                rows: Vec::new(),
            }),
        }
    }
}

impl Default for MemoryStudentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn create(&self, student: &NewStudent) -> StoreResult<Student> {
        let mut table = self.table.lock().await;
        // mirrors the UNIQUE constraint on students.email
        if table.rows.iter().any(|row| row.email == student.email) {
            return Err(StoreError::Duplicate);
        }
        let row = Student {
            id: table.next_id,
            student_name: student.student_name.clone(),
            email: student.email.clone(),
            course: student.course.clone(),
            registration_date: Utc::now(),
        };
        table.next_id += 1;
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn list(&self) -> StoreResult<Vec<Student>> {
        let table = self.table.lock().await;
        let mut rows = table.rows.clone();
        rows.sort_by(|a, b| {
            b.registration_date
                .cmp(&a.registration_date)
                .then(b.id.cmp(&a.id))
        });
        Ok(rows)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<Student>> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().find(|row| row.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().find(|row| row.email == email).cloned())
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let mut table = self.table.lock().await;
        let before = table.rows.len();
        table.rows.retain(|row| row.id != id);
        Ok(table.rows.len() < before)
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

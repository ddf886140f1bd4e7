use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `students` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub student_name: String,
    pub email: String,
    pub course: String,
    pub registration_date: DateTime<Utc>,
}

/// Sanitized fields ready for insertion. The store assigns `id` and
/// `registrationDate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub student_name: String,
    pub email: String,
    pub course: String,
}

/// Body of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredStudent {
    pub id: i64,
    pub student_name: String,
    pub email: String,
    pub course: String,
}

impl From<Student> for RegisteredStudent {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            student_name: student.student_name,
            email: student.email,
            course: student.course,
        }
    }
}

/// Raw registration request; every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub student_name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
}

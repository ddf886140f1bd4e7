use std::sync::Arc;

use chrono::Local;
use serde::Serialize;

use crate::models::{RegisteredStudent, RegistrationPayload, Student};
use crate::store::StudentStore;
use crate::{validate, Error};

pub const HEALTH_MESSAGE: &str = "NU Student Registration API is running";

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub message: &'static str,
    pub timestamp: String,
}

/// The registration operations, independent of HTTP.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn StudentStore>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }

    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    pub async fn create(&self, payload: RegistrationPayload) -> Result<RegisteredStudent, Error> {
        let student = validate::validated(payload)?;

        if self.store.find_by_email(&student.email).await?.is_some() {
            log::warn!("registration refused, email already registered");
            return Err(Error::conflict("Email address already registered"));
        }

        // a concurrent insert can still win the race; the store reports it as Duplicate
        let created = self.store.create(&student).await?;
        log::info!("registered student {}", created.id);
        Ok(created.into())
    }

    pub async fn list(&self) -> Result<Vec<Student>, Error> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Student, Error> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Student not found"))
    }

    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        if self.store.delete(id).await? {
            log::info!("removed student {}", id);
            Ok(())
        } else {
            Err(Error::not_found("Student not found"))
        }
    }

    pub fn health(&self) -> Health {
        Health {
            message: HEALTH_MESSAGE,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

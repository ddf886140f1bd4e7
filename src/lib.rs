pub mod api;
pub mod config;
pub mod err;
pub mod models;
pub mod service;
pub mod store;
pub mod validate;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub use crate::config::Config;
pub use crate::err::{Error, Success};
pub use crate::service::RegistrationService;

pub type Payload = Result<Response, Error>;

pub fn proceeds<V>(value: V) -> Payload
where
    V: Serialize,
{
    Ok(Json(Success::of(value)).into_response())
}

pub fn created<V>(value: V) -> Payload
where
    V: Serialize,
{
    Ok((StatusCode::CREATED, Json(Success::of(value))).into_response())
}

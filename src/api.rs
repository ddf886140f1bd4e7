//! The single registration endpoint.
//!
//! Every request on the endpoint path goes through [`select`], which picks an
//! [`Operation`] from the method and query string alone. Failures come back as
//! [`Error`] values and are rendered once, in [`registration_endpoint`].

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::handler::Handler;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Extension, Router};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};

use crate::err::handler404;
use crate::models::{RegisteredStudent, RegistrationPayload, Student};
use crate::service::RegistrationService;
use crate::{created, proceeds, Error, Payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Preflight,
    Create,
    List,
    View(i64),
    Delete(i64),
    Health,
}

#[derive(Debug, Clone, Default)]
pub struct EndpointQuery {
    pub action: Option<String>,
    pub id: Option<String>,
}

impl EndpointQuery {
    /// Repeated keys keep their last value.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "action" => query.action = Some(value),
                "id" => query.id = Some(value),
                _ => {}
            }
        }
        query
    }

    fn student_id(&self) -> Result<i64, Error> {
        self.id
            .as_deref()
            .unwrap_or_default()
            .trim()
            .parse()
            .map_err(|_| Error::malformed("Invalid student id"))
    }
}

pub fn select(method: &Method, query: &EndpointQuery) -> Result<Operation, Error> {
    let action = query.action.as_deref();
    let has_id = query.id.is_some();

    if method == Method::OPTIONS {
        Ok(Operation::Preflight)
    } else if method == Method::POST {
        Ok(Operation::Create)
    } else if method == Method::GET && action == Some("list") {
        Ok(Operation::List)
    } else if method == Method::GET && action == Some("view") && has_id {
        Ok(Operation::View(query.student_id()?))
    } else if method == Method::DELETE && has_id {
        Ok(Operation::Delete(query.student_id()?))
    } else if method == Method::GET {
        Ok(Operation::Health)
    } else {
        Err(Error::method_not_allowed())
    }
}

#[derive(Debug, Serialize)]
struct Registered {
    message: &'static str,
    data: RegisteredStudent,
}

#[derive(Debug, Serialize)]
struct Listing {
    count: usize,
    data: Vec<Student>,
}

#[derive(Debug, Serialize)]
struct Record {
    data: Student,
}

#[derive(Debug, Serialize)]
struct Notice {
    message: &'static str,
}

/// The body must be a JSON object; arrays and scalars are rejected before
/// field extraction.
fn registration_payload(body: &[u8]) -> Result<RegistrationPayload, Error> {
    match serde_json::from_slice(body)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value)?),
        _ => Err(Error::malformed("Invalid JSON data")),
    }
}

async fn perform(service: &RegistrationService, operation: Operation, body: &[u8]) -> Payload {
    match operation {
        Operation::Preflight => Ok(StatusCode::OK.into_response()),
        Operation::Create => {
            let payload = registration_payload(body)?;
            let data = service.create(payload).await?;
            created(Registered {
                message: "Registration Successful",
                data,
            })
        }
        Operation::List => {
            let data = service.list().await?;
            proceeds(Listing {
                count: data.len(),
                data,
            })
        }
        Operation::View(id) => proceeds(Record {
            data: service.get(id).await?,
        }),
        Operation::Delete(id) => {
            service.delete(id).await?;
            proceeds(Notice {
                message: "Student removed successfully",
            })
        }
        Operation::Health => proceeds(service.health()),
    }
}

pub async fn registration_endpoint(
    method: Method,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    Extension(service): Extension<RegistrationService>,
    body: Bytes,
) -> Response {
    let query = match query {
        Ok(Query(pairs)) => EndpointQuery::from_pairs(pairs),
        Err(rejection) => {
            log::debug!("{} with unreadable query string: {}", method, rejection);
            return Error::malformed("Invalid query string").into_response();
        }
    };
    let outcome = match select(&method, &query) {
        Ok(operation) => {
            log::debug!("{} dispatched to {:?}", method, operation);
            perform(&service, operation, &body).await
        }
        Err(err) => Err(err),
    };

    match outcome {
        Ok(response) => {
            log::info!("{} {:?} -> {}", method, query.action, response.status());
            response
        }
        Err(err) => {
            log::info!("{} {:?} -> {} ({})", method, query.action, err.status(), err);
            err.into_response()
        }
    }
}

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn router(service: RegistrationService, endpoint: &str) -> Router {
    let path = if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{}", endpoint)
    };
    Router::new()
        .route(&path, any(registration_endpoint))
        .fallback(handler404.into_service())
        .layer(Extension(service))
        .layer(cors())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(action: Option<&str>, id: Option<&str>) -> EndpointQuery {
        EndpointQuery {
            action: action.map(String::from),
            id: id.map(String::from),
        }
    }

    #[test]
    fn dispatch_table() {
        let cases = [
            (Method::POST, query(None, None), Operation::Create),
            (Method::POST, query(Some("list"), None), Operation::Create),
            (Method::GET, query(Some("list"), None), Operation::List),
            (Method::GET, query(Some("view"), Some("7")), Operation::View(7)),
            (Method::DELETE, query(None, Some("7")), Operation::Delete(7)),
            (Method::GET, query(None, None), Operation::Health),
            (Method::GET, query(Some("view"), None), Operation::Health),
            (Method::GET, query(Some("other"), Some("3")), Operation::Health),
            (Method::OPTIONS, query(None, None), Operation::Preflight),
        ];
        for (method, query, expected) in cases {
            assert_eq!(select(&method, &query).unwrap(), expected, "{} {:?}", method, query);
        }
    }

    #[test]
    fn unsupported_methods_are_rejected() {
        for method in [Method::PUT, Method::PATCH, Method::HEAD] {
            let err = select(&method, &EndpointQuery::default()).unwrap_err();
            assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
        let err = select(&Method::DELETE, &EndpointQuery::default()).unwrap_err();
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn repeated_query_keys_keep_the_last_value() {
        let pairs = [("id", "1"), ("action", "list"), ("id", "2"), ("action", "view")]
            .map(|(k, v)| (k.to_string(), v.to_string()));
        let query = EndpointQuery::from_pairs(pairs);
        assert_eq!(query.id.as_deref(), Some("2"));
        assert_eq!(query.action.as_deref(), Some("view"));
        assert_eq!(select(&Method::GET, &query).unwrap(), Operation::View(2));
    }

    #[test]
    fn payload_must_be_an_object() {
        for body in [r#"["Jane","jane@ex.com","CS101"]"#, "null", "\"jane\"", "42"] {
            let err = registration_payload(body.as_bytes()).unwrap_err();
            assert!(matches!(err, Error::MalformedInput { .. }), "{}", body);
        }
        let payload = registration_payload(br#"{"email":"jane@ex.com"}"#).unwrap();
        assert_eq!(payload.email.as_deref(), Some("jane@ex.com"));
        assert!(payload.student_name.is_none());
    }

    #[test]
    fn non_numeric_id_is_malformed() {
        for id in ["abc", "", "1.5"] {
            let err = select(&Method::GET, &query(Some("view"), Some(id))).unwrap_err();
            assert!(matches!(err, Error::MalformedInput { .. }), "{:?}", id);
        }
        assert_eq!(
            select(&Method::DELETE, &query(None, Some(" 12 "))).unwrap(),
            Operation::Delete(12)
        );
    }
}

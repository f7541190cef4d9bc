//! Validated request extractors.
//!
//! [`ValidatedJson`] and [`ValidatedQuery`] deserialize the request and run
//! its `validator` rules before the handler is called. Any failure rejects
//! with [`AppError::Validation`], rendered as
//! `{"errors": [{"msg", "param", "location"}]}`.

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// Fallback message for rules that do not carry their own.
const DEFAULT_MESSAGE: &str = "Invalid value";

/// Where a rejected input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
    Query,
}

/// One itemized validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub msg: String,
    pub param: String,
    pub location: Location,
}

impl FieldError {
    pub fn new(msg: impl Into<String>, param: impl Into<String>, location: Location) -> Self {
        Self {
            msg: msg.into(),
            param: param.into(),
            location,
        }
    }
}

/// Flatten `validator` output into field errors, ordered by parameter name.
pub fn field_errors(errors: &ValidationErrors, location: Location) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let msg = err
                    .message
                    .as_ref()
                    .map_or_else(|| DEFAULT_MESSAGE.to_string(), |m| m.to_string());
                FieldError::new(msg, field.to_string(), location)
            })
        })
        .collect();
    out.sort_by(|a, b| a.param.cmp(&b.param));
    out
}

/// JSON body extractor that also runs [`Validate::validate`].
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            AppError::Validation(vec![FieldError::new(
                rejection.body_text(),
                "body",
                Location::Body,
            )])
        })?;

        value
            .validate()
            .map_err(|errors| AppError::Validation(field_errors(&errors, Location::Body)))?;

        Ok(Self(value))
    }
}

/// Query string extractor that also runs [`Validate::validate`].
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::Validation(vec![FieldError::new(
                    rejection.body_text(),
                    "query",
                    Location::Query,
                )])
            })?;

        value
            .validate()
            .map_err(|errors| AppError::Validation(field_errors(&errors, Location::Query)))?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use shelf_core::item::{CreateItemRequest, ListItemsQuery};

    use super::*;

    #[test]
    fn missing_name_becomes_single_body_error() {
        let errors = CreateItemRequest::default().validate().unwrap_err();
        let fields = field_errors(&errors, Location::Body);

        assert_eq!(
            fields,
            [FieldError::new("Name is required", "name", Location::Body)]
        );
    }

    #[test]
    fn query_errors_are_sorted_by_param() {
        let query = ListItemsQuery {
            name: None,
            limit: Some("0".into()),
            offset: Some("x".into()),
        };
        let errors = query.validate().unwrap_err();
        let fields = field_errors(&errors, Location::Query);

        let params: Vec<_> = fields.iter().map(|f| f.param.as_str()).collect();
        assert_eq!(params, ["limit", "offset"]);
        assert!(fields.iter().all(|f| f.location == Location::Query));
    }

    #[test]
    fn location_serializes_lowercase() {
        let json = serde_json::to_value(FieldError::new("m", "p", Location::Query)).unwrap();
        assert_eq!(json, serde_json::json!({"msg": "m", "param": "p", "location": "query"}));
    }
}

//! Untyped request parameters.
//!
//! Ledger routes take flat `key=value` pairs from the query string and, for
//! url-encoded POST bodies, from the body as well. Keys may repeat
//! (`backerId=B1&backerId=B2`), which rules out a plain struct extractor.

use axum::{
    extract::{Form, FromRequest, Query, Request},
    http::{Method, header::CONTENT_TYPE},
};
use points_ledger::Points;

use super::errors::ApiError;

/// Query and form pairs in the order they were sent
#[derive(Debug, Clone, Default)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in order
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// First value for `key`; missing or blank is a 422
    pub fn required(&self, key: &str) -> Result<&str, ApiError> {
        match self.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ApiError::unprocessable(format!("missing parameter: {key}"))),
        }
    }

    /// Points amount for `key`, e.g. `points=83.33`
    pub fn points(&self, key: &str) -> Result<Points, ApiError> {
        self.required(key)?
            .parse::<Points>()
            .map_err(|e| ApiError::unprocessable(e.to_string()))
    }
}

impl<S> FromRequest<S> for Params
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(mut pairs) = Query::<Vec<(String, String)>>::try_from_uri(req.uri())
            .map_err(|rejection| ApiError::unprocessable(rejection.body_text()))?;

        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form && *req.method() != Method::GET {
            let Form(body_pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::unprocessable(rejection.body_text()))?;
            pairs.extend(body_pairs);
        }

        Ok(Params(pairs))
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Body extractors that reject with `AppError`, so a malformed request gets
//! the same `{success: false, msg}` reply as every other failure.
//!
//! All fields on the request types are optional, and the client sometimes
//! posts nothing at all; a blank body reads as `T::default()` and the
//! handler reports what is missing.

use crate::error::AppError;
use axum::body::Body;
use axum::extract::{FromRequest, Request};
use axum::{Form, Json};
use serde::de::DeserializeOwned;

/// Largest JSON or form body read by these extractors.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// A JSON body, or `T::default()` when the body is blank.
#[derive(Debug, Default)]
pub struct JsonBody<T>(pub T);

/// A urlencoded form, or `T::default()` when the body is blank.
#[derive(Debug, Default)]
pub struct FormBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match non_blank(req).await? {
            None => Ok(Self(T::default())),
            Some(req) => {
                let Json(value) = Json::<T>::from_request(req, state).await?;
                Ok(Self(value))
            }
        }
    }
}

impl<S, T> FromRequest<S> for FormBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match non_blank(req).await? {
            None => Ok(Self(T::default())),
            Some(req) => {
                let Form(value) = Form::<T>::from_request(req, state).await?;
                Ok(Self(value))
            }
        }
    }
}

/// Buffer the body. `None` when it is empty or only whitespace.
async fn non_blank(req: Request) -> Result<Option<Request>, AppError> {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(Request::from_parts(parts, Body::from(bytes))))
}

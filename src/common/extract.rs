// src/common/extract.rs

use axum::extract::{FromRequest, FromRequestParts};

use crate::common::error::ApiError;

// Mesmo que axum::Json, mas a rejeição sai no nosso formato (400 + JSON).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

// Mesmo que axum::extract::Query, com rejeição em ApiError.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

// Mesmo que axum::extract::Path; id malformado vira 400 no nosso formato.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

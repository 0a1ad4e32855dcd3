//! Product catalog route handlers.

use axum::{
    Json,
    extract::Query,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog;
use crate::error::{AppError, Result};

/// Catalog listing query.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// List the recommendation catalog, optionally filtered to one category.
#[instrument]
pub async fn index(Query(query): Query<ProductsQuery>) -> Result<Response> {
    match query.category {
        None => Ok(Json(catalog::CATALOG).into_response()),
        Some(slug) => catalog::section(&slug)
            .map(|section| Json(section).into_response())
            .ok_or_else(|| AppError::NotFound(format!("unknown category: {slug}"))),
    }
}

//! Preview mode entry and exit
//!
//! `/api/preview` exchanges a CMS preview token for a cookie and redirects to
//! the previewed document; `/api/exit-preview` drops the cookie again.

use axum::extract::{Query, State};
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::sync::Arc;

use super::{AppError, AppState};
use crate::cms::{Client, PreviewContext};
use crate::helpers::link_resolver;

#[derive(Debug, Default, Deserialize)]
pub struct PreviewParams {
    #[serde(rename = "documentId", default)]
    pub document_id: String,
    #[serde(default)]
    pub token: String,
}

pub async fn handle_preview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PreviewParams>,
) -> Result<Response, AppError> {
    if params.token.is_empty() {
        return Ok(invalid_token());
    }

    let client = Client::new(state.api.clone());
    let destination = client
        .preview_resolver(&params.token, &params.document_id)
        .resolve(link_resolver, "/")
        .await?;

    let Some(location) = destination else {
        tracing::debug!("Preview token resolved to no document");
        return Ok(invalid_token());
    };

    tracing::info!("Entering preview mode, redirecting to {}", location);
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        state.cookie_name(),
        utf8_percent_encode(&params.token, NON_ALPHANUMERIC)
    );
    redirect(StatusCode::FOUND, &location, &cookie)
}

pub async fn exit_preview(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        state.cookie_name()
    );
    redirect(StatusCode::TEMPORARY_REDIRECT, "/", &cookie)
}

/// The preview session carried by the request's cookies, if any
pub fn preview_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<PreviewContext> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy().into_owned())
        .filter(|reference| !reference.is_empty())
        .map(PreviewContext::new)
}

fn invalid_token() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "message": "Invalid token" })),
    )
        .into_response()
}

fn redirect(status: StatusCode, location: &str, cookie: &str) -> Result<Response, AppError> {
    let mut response = status.into_response();
    let headers = response.headers_mut();
    headers.insert(LOCATION, HeaderValue::from_str(location)?);
    headers.insert(SET_COOKIE, HeaderValue::from_str(cookie)?);
    Ok(response)
}

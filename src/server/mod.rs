//! Blog server: renders pages on request
//!
//! The home page and post pages are rendered from the CMS for every request,
//! so preview sessions see drafts. Everything else is served from the static
//! directory.

mod preview;

pub use preview::{exit_preview, handle_preview, preview_from_headers, PreviewParams};

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cms::{Client, ContentApi};
use crate::generator::{load_initial_page, resolve_post, PageRenderer, PostResolution};
use crate::Blog;

/// Shared server state
pub struct AppState {
    blog: Blog,
    api: Arc<dyn ContentApi>,
    pages: PageRenderer,
}

impl AppState {
    pub fn new(blog: &Blog, api: Arc<dyn ContentApi>) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            api,
            pages: PageRenderer::new(blog)?,
        })
    }

    fn cookie_name(&self) -> &str {
        &self.blog.config.preview.cookie_name
    }

    /// A client scoped to the request's preview session, if any
    fn client(&self, headers: &HeaderMap) -> Client {
        Client::new(self.api.clone()).with_preview(preview_from_headers(headers, self.cookie_name()))
    }
}

/// Any failure while rendering a page; logged and answered with a 500
pub struct AppError(anyhow::Error);

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.blog.static_dir);

    Router::new()
        .route("/", get(index))
        .route("/post/:slug", get(post))
        .route("/api/preview", get(handle_preview))
        .route("/api/exit-preview", get(exit_preview))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::new(blog, blog.content_api()?)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let client = state.client(&headers);
    let listing = load_initial_page(&client, state.blog.config.cms.page_size).await?;
    let html = state
        .pages
        .render_index(&listing, client.preview().is_some())?;
    Ok(Html(html))
}

async fn post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let client = state.client(&headers);
    match resolve_post(&client, &slug).await? {
        PostResolution::Found(page) => Ok(Html(state.pages.render_post(&page)?).into_response()),
        PostResolution::Redirect(redirect) if redirect.permanent => {
            Ok(Redirect::permanent(&redirect.destination).into_response())
        }
        PostResolution::Redirect(redirect) => {
            Ok(Redirect::temporary(&redirect.destination).into_response())
        }
    }
}

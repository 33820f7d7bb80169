//! Routing.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handlers::{self, AppState};
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

/// The router wrapped so that a trailing slash is ignored before routing.
pub type App = NormalizePath<Router>;

/// Routes relative to the base path.
///
/// A method not listed for a path is answered with a plain-text
/// `405 Method Not Allowed`.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root_status))
        .route(
            "/pages",
            get(handlers::list_pages).post(handlers::create_page),
        )
        .route(
            "/pages/{page_id}",
            get(handlers::get_page).delete(handlers::delete_page),
        )
        .route(
            "/pages/{page_id}/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/pages/{page_id}/items/{item_id}",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .method_not_allowed_fallback(handlers::method_not_allowed)
}

/// Creates the application router.
///
/// Routes are mounted under the configured base path; unmatched requests
/// get a JSON 404 naming the method and URI.
///
/// # Examples
///
/// ```ignore
/// let state = AppState::new(notebook);
/// let router = create_router(&ServerConfig::default(), state)?;
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// axum::serve(listener, router).await?;
/// ```
pub fn create_router(config: &ServerConfig, state: AppState) -> ServerResult<Router> {
    config.validate()?;

    let router = match config.mount_path()? {
        Some(path) => Router::new().nest(&path, api_routes()),
        None => Router::new().merge(api_routes()),
    };

    Ok(router
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Creates the application service: [`create_router`] behind trailing-slash
/// normalization, so `/pages/` routes like `/pages`.
pub fn create_app(config: &ServerConfig, state: AppState) -> ServerResult<App> {
    Ok(NormalizePath::trim_trailing_slash(create_router(config, state)?))
}

//! Request handlers.
//!
//! Every handler validates its path parameters (and body, where there is
//! one) first, then hands the store work to a blocking task. Page existence
//! is checked before item reachability inside the [`Notebook`] calls.

use crate::error::ApiError;
use crate::validate::Validation;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::Json;
use todo_store::{Item, Notebook, Page, StoreResult};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    notebook: Notebook,
}

impl AppState {
    /// Creates handler state over a notebook.
    pub fn new(notebook: Notebook) -> Self {
        Self { notebook }
    }

    /// Returns the notebook.
    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    /// Runs store work off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Notebook) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let notebook = self.notebook.clone();
        tokio::task::spawn_blocking(move || f(&notebook))
            .await
            .map_err(|e| ApiError::internal(format!("store task failed: {e}")))?
            .map_err(ApiError::from)
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// `GET /`
pub async fn root_status() -> StatusCode {
    StatusCode::OK
}

// ---- pages ----

/// `GET /pages`
pub async fn list_pages(State(state): State<AppState>) -> ApiResult<Json<Vec<Page>>> {
    state.run(|nb| nb.list_pages()).await.map(Json)
}

/// `POST /pages`
pub async fn create_page(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<Page>)> {
    let page = state.run(|nb| nb.create_page()).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// `GET /pages/{pageId}`
pub async fn get_page(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> ApiResult<Json<Page>> {
    let mut v = Validation::new();
    let page_id = v.param_id("pageId", &page_id);
    let page_id = v.finish(page_id)?;

    state.run(move |nb| nb.get_page(page_id)).await.map(Json)
}

/// `DELETE /pages/{pageId}`
pub async fn delete_page(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> ApiResult<Json<Page>> {
    let mut v = Validation::new();
    let page_id = v.param_id("pageId", &page_id);
    let page_id = v.finish(page_id)?;

    state.run(move |nb| nb.delete_page(page_id)).await.map(Json)
}

// ---- items ----

/// `GET /pages/{pageId}/items`
pub async fn list_items(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> ApiResult<Json<Vec<Item>>> {
    let mut v = Validation::new();
    let page_id = v.param_id("pageId", &page_id);
    let page_id = v.finish(page_id)?;

    state
        .run(move |nb| nb.list_items_in_page(page_id))
        .await
        .map(Json)
}

/// `POST /pages/{pageId}/items`
pub async fn create_item(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let mut v = Validation::new();
    let page_id = v.param_id("pageId", &page_id);
    let data = v.item_payload(&body);
    let (page_id, data) = v.finish(page_id.zip(data))?;

    let item = state
        .run(move |nb| nb.add_item_to_page(page_id, data))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /pages/{pageId}/items/{itemId}`
pub async fn get_item(
    State(state): State<AppState>,
    Path((page_id, item_id)): Path<(String, String)>,
) -> ApiResult<Json<Item>> {
    let mut v = Validation::new();
    let page_id = v.param_id("pageId", &page_id);
    let item_id = v.param_id("itemId", &item_id);
    let (page_id, item_id) = v.finish(page_id.zip(item_id))?;

    state
        .run(move |nb| nb.get_item_in_page(page_id, item_id))
        .await
        .map(Json)
}

/// `PUT /pages/{pageId}/items/{itemId}`
pub async fn update_item(
    State(state): State<AppState>,
    Path((page_id, item_id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<Item>> {
    let mut v = Validation::new();
    let page_id = v.param_id("pageId", &page_id);
    let item_id = v.param_id("itemId", &item_id);
    let data = v.item_payload(&body);
    let ((page_id, item_id), data) = v.finish(page_id.zip(item_id).zip(data))?;

    state
        .run(move |nb| nb.update_item_in_page(page_id, item_id, data))
        .await
        .map(Json)
}

/// `DELETE /pages/{pageId}/items/{itemId}`
pub async fn delete_item(
    State(state): State<AppState>,
    Path((page_id, item_id)): Path<(String, String)>,
) -> ApiResult<Json<Item>> {
    let mut v = Validation::new();
    let page_id = v.param_id("pageId", &page_id);
    let item_id = v.param_id("itemId", &item_id);
    let (page_id, item_id) = v.finish(page_id.zip(item_id))?;

    state
        .run(move |nb| nb.remove_item_from_page(page_id, item_id))
        .await
        .map(Json)
}

/// Fallback for a known path requested with an unsupported method.
pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Fallback for unmatched routes.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::RouteNotFound { method, uri }
}

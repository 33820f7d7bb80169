//! # Todo Server
//!
//! HTTP API for to-do pages and items.
//!
//! This crate provides:
//! - Page endpoints (list, create, get, cascading delete)
//! - Item endpoints scoped to their page (list, create, get, replace, delete)
//! - Request validation that reports every rejected field at once
//! - Graceful shutdown on a caller-supplied signal
//!
//! # Routes
//!
//! All routes are mounted under [`ServerConfig::base_path`]:
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/` | 200 |
//! | GET, POST | `/pages` | 200, 201 |
//! | GET, DELETE | `/pages/{pageId}` | 200 |
//! | GET, POST | `/pages/{pageId}/items` | 200, 201 |
//! | GET, PUT, DELETE | `/pages/{pageId}/items/{itemId}` | 200 |
//!
//! Any other method on these paths gets a plain-text `405 Method Not
//! Allowed`. A trailing slash is ignored. Unknown paths get a JSON `404` of
//! the form `{"error":{"message":"GET /x Not Found"}}`.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handlers;
mod routes;
mod server;
mod validate;

pub use config::{ServerConfig, DEFAULT_BODY_LIMIT};
pub use error::{ApiError, FieldError, Location, ServerError, ServerResult};
pub use handlers::AppState;
pub use routes::{create_app, create_router, App};
pub use server::TodoServer;
pub use validate::{escape_html, validate_id, validate_item_payload, Validation};

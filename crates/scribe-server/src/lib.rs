//! Scribe Server - HTTP API for the document processing workflow.
//!
//! Exposes a single processing endpoint plus a health check:
//!
//! - `POST /process-document`: multipart form (`text_input` or `file`)
//! - `GET /health`

pub mod logging;
pub mod routes;
pub mod state;

pub use routes::app;
pub use state::AppState;

//! HTTP transport shell around the allocation engine.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, tracing, timeout, body limit)
//!     → request.rs (content-type checked JSON / form extraction)
//!     → handlers.rs (one SharedEngine call per request)
//!     → response.rs (PoolingError → status code)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};

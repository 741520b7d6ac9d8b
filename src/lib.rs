//! Car pooling service library.
//!
//! An allocation engine that seats passenger groups in cars, and the HTTP
//! shell that exposes it.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pooling;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pooling::{Engine, PoolingError, SharedEngine};

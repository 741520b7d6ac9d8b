//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! engine + http shell produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request span
//! - Metric calls are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;

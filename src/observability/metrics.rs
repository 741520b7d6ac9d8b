//! Metrics collection and exposition.
//!
//! # Metrics
//! - `carpool_requests_total` (counter): requests by endpoint, status
//! - `carpool_request_duration_seconds` (histogram): handler latency by endpoint
//! - `carpool_journeys_assigned_total` (counter): seatings by path
//!   (`direct`, `pending`, `reassign`)
//! - `carpool_pending_journeys` (gauge): journeys waiting for a car
//! - `carpool_active_journeys` (gauge): journeys riding a car
//! - `carpool_fleet_cars` (gauge): registered cars
//! - `carpool_free_seats` (gauge): free seats across the fleet

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::pooling::EngineStats;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(endpoint: String, status: u16, start: Instant) {
    counter!(
        "carpool_requests_total",
        "endpoint" => endpoint.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("carpool_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record a journey being seated.
pub fn record_assignment(path: &'static str) {
    counter!("carpool_journeys_assigned_total", "path" => path).increment(1);
}

/// Publish engine occupancy gauges.
pub fn record_engine_stats(stats: &EngineStats) {
    gauge!("carpool_fleet_cars").set(stats.cars as f64);
    gauge!("carpool_active_journeys").set(stats.active_journeys as f64);
    gauge!("carpool_pending_journeys").set(stats.pending_journeys as f64);
    gauge!("carpool_free_seats").set(stats.free_seats as f64);
}

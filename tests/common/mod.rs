//! Shared utilities for integration tests.

use car_pooling::config::ServiceConfig;
use car_pooling::lifecycle::{self, RunningService, Shutdown};

/// A service running on an ephemeral loopback port.
pub struct TestService {
    pub service: RunningService,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestService {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.service.local_addr)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.service.handle.await;
    }
}

/// Start the service with default settings on `127.0.0.1:0`.
pub async fn start_service() -> TestService {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.observability.metrics_enabled = false;
    start_service_with(config).await
}

pub async fn start_service_with(config: ServiceConfig) -> TestService {
    let shutdown = Shutdown::new();
    let service = lifecycle::start(config, &shutdown)
        .await
        .expect("service failed to start");
    TestService { service, shutdown }
}

/// Client that bypasses any system proxy.
#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

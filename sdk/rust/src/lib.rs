use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub seats: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Journey {
    pub id: i64,
    pub people: i64,
}

/// Car state as reported by `/locate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarState {
    pub id: i64,
    pub max_seats: i64,
    pub available_seats: i64,
}

/// Outcome of a locate call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Riding(CarState),
    Waiting,
}

/// Failure of an SDK call.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an unexpected status.
    #[error("service returned {0}: {1}")]
    Status(StatusCode, String),
}

impl SdkError {
    /// Status code the service answered with, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SdkError::Http(e) => e.status(),
            SdkError::Status(status, _) => Some(*status),
        }
    }
}

pub struct CarPoolClient {
    client: Client,
    base_url: String,
}

impl CarPoolClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder().no_proxy().build().unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn status(&self) -> Result<(), SdkError> {
        let resp = self.client.get(format!("{}/status", self.base_url)).send().await?;
        expect(resp, StatusCode::OK).await.map(drop)
    }

    /// Replace the fleet.
    pub async fn put_cars(&self, cars: &[Car]) -> Result<(), SdkError> {
        let resp = self
            .client
            .put(format!("{}/cars", self.base_url))
            .json(cars)
            .send()
            .await?;
        expect(resp, StatusCode::OK).await.map(drop)
    }

    pub async fn request_journey(&self, journey: Journey) -> Result<(), SdkError> {
        let resp = self
            .client
            .post(format!("{}/journey", self.base_url))
            .json(&journey)
            .send()
            .await?;
        expect(resp, StatusCode::ACCEPTED).await.map(drop)
    }

    pub async fn dropoff(&self, id: i64) -> Result<(), SdkError> {
        let resp = self
            .client
            .post(format!("{}/dropoff", self.base_url))
            .form(&[("ID", id)])
            .send()
            .await?;
        expect(resp, StatusCode::OK).await.map(drop)
    }

    pub async fn locate(&self, id: i64) -> Result<Location, SdkError> {
        let resp = self
            .client
            .post(format!("{}/locate", self.base_url))
            .form(&[("ID", id)])
            .send()
            .await?;

        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(Location::Waiting);
        }
        let resp = expect(resp, StatusCode::OK).await?;
        Ok(Location::Riding(resp.json().await?))
    }
}

async fn expect(resp: reqwest::Response, wanted: StatusCode) -> Result<reqwest::Response, SdkError> {
    let status = resp.status();
    if status == wanted {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(SdkError::Status(status, text))
}

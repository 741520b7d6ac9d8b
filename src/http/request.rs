//! Request handling and extraction.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Extract JSON and form bodies, rejecting the wrong content type with 415
//!   before any engine call
//! - Decode the `ID=<n>` form used by dropoff and locate

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        FromRequest, Request,
    },
    http::{HeaderName, HeaderValue},
    Form, Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::ApiError;

/// Header carrying the request ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Issues a fresh UUID v4 for each request lacking an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// JSON body extractor whose rejections go through [`ApiError`].
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(JsonRejection::MissingJsonContentType(rejection)) => {
                Err(ApiError::UnsupportedMediaType(rejection.body_text()))
            }
            Err(rejection @ (JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_))) => {
                Err(ApiError::BadRequest(rejection.body_text()))
            }
            Err(rejection) => Err(ApiError::Rejected(rejection.status(), rejection.body_text())),
        }
    }
}

/// URL-encoded form extractor whose rejections go through [`ApiError`].
#[derive(Debug)]
pub struct FormBody<T>(pub T);

impl<S, T> FromRequest<S> for FormBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(Self(value)),
            Err(FormRejection::InvalidFormContentType(rejection)) => {
                Err(ApiError::UnsupportedMediaType(rejection.body_text()))
            }
            Err(
                rejection @ (FormRejection::FailedToDeserializeForm(_)
                | FormRejection::FailedToDeserializeFormBody(_)),
            ) => Err(ApiError::BadRequest(rejection.body_text())),
            Err(rejection) => Err(ApiError::Rejected(rejection.status(), rejection.body_text())),
        }
    }
}

/// `ID=<journey id>` form body.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct JourneyIdForm {
    #[serde(rename = "ID", alias = "id")]
    pub id: i64,
}

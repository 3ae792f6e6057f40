use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use hubwire_api::{CONTENT_TYPE, Message};

use crate::errors::HubError;

/// Largest accepted request body in bytes.
pub const MAX_BODY_LEN: usize = 256;

/// Protobuf request body extractor and response body, the binary
/// counterpart of `axum::Json`.
#[derive(Debug, Clone, Default)]
pub struct Protobuf<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Protobuf<T>
where
    T: Message + Send,
    S: Send + Sync,
{
    type Rejection = HubError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|_| HubError::UnreadableBody)?;

        if body.len() > MAX_BODY_LEN {
            return Err(HubError::PayloadTooLarge(body.len()));
        }

        Ok(Protobuf(T::decode(&body)?))
    }
}

impl<T: Message> IntoResponse for Protobuf<T> {
    fn into_response(self) -> Response {
        (
            [(header::CONTENT_TYPE, CONTENT_TYPE)],
            self.0.encode_to_vec(),
        )
            .into_response()
    }
}

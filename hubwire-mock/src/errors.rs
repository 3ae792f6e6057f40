use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hubwire_api::wire::WireError;

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Invalid protobuf body: {0}")]
    InvalidProtobuf(#[from] WireError),

    #[error("Unreadable request body")]
    UnreadableBody,

    #[error("Request body too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Invalid device type")]
    InvalidDeviceType,

    #[error("Device name is required")]
    MissingName,

    #[error("Nothing to set: neither has_on nor has_level")]
    EmptySet,

    #[error("Device not found: {0}")]
    DeviceNotFound(u32),

    #[error("Scene not found: {0}")]
    SceneNotFound(u32),

    #[error("Registry full")]
    RegistryFull,
}

impl HubError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HubError::InvalidProtobuf(_) => StatusCode::BAD_REQUEST,
            HubError::UnreadableBody => StatusCode::BAD_REQUEST,
            HubError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            HubError::InvalidDeviceType => StatusCode::BAD_REQUEST,
            HubError::MissingName => StatusCode::BAD_REQUEST,
            HubError::EmptySet => StatusCode::BAD_REQUEST,
            HubError::DeviceNotFound(_) => StatusCode::NOT_FOUND,
            HubError::SceneNotFound(_) => StatusCode::NOT_FOUND,
            HubError::RegistryFull => StatusCode::INSUFFICIENT_STORAGE,
        }
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("{}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status, format!("{}\n", self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            HubError::from(WireError::MalformedVarint).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(HubError::DeviceNotFound(4).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(HubError::PayloadTooLarge(300).status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(HubError::RegistryFull.status_code().as_u16(), 507);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            HubError::InvalidProtobuf(WireError::UnsupportedWireType(3)).to_string(),
            "Invalid protobuf body: Unsupported wire type: 3"
        );
        assert_eq!(HubError::SceneNotFound(9).to_string(), "Scene not found: 9");
    }
}

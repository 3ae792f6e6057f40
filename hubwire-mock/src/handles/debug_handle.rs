use axum::extract::State;

use super::HubState;
use crate::errors::HubError;

const INDEX: &str = "\
hubwire mock hub

GET  /v1/health
GET  /v1/devices
POST /v1/devices                  CmdDeviceAdd -> Device
GET  /v1/devices/:id              Device
POST /v1/devices/:id/set          CmdDeviceSet -> ReplyStatus
POST /v1/devices/:id/interview    ReplyStatus
POST /v1/scenes/:id/trigger       ReplyStatus
POST /v1/debug/seed
WS   /v1/events/ws                binary HubEvent frames
";

pub async fn index() -> &'static str {
    INDEX
}

pub async fn health(State(state): State<HubState>) -> String {
    format!("ok uptime_ms={}\n", state.bus.uptime_ms())
}

pub async fn seed(State(state): State<HubState>) -> Result<&'static str, HubError> {
    let devices = state.bus.seed()?;
    tracing::info!("Seeded {} devices", devices.len());
    Ok("ok\n")
}

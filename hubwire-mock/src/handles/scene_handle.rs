use axum::extract::{Path, State};
use hubwire_api::models::ReplyStatus;

use super::HubState;
use crate::errors::HubError;
use crate::protobuf::Protobuf;

pub async fn trigger_scene(
    State(state): State<HubState>,
    Path(scene_id): Path<u32>,
) -> Result<Protobuf<ReplyStatus>, HubError> {
    state.bus.trigger_scene(scene_id)?;
    Ok(Protobuf(ReplyStatus::ok()))
}

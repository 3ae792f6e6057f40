use axum::extract::{Path, State};
use hubwire_api::models::{CmdDeviceAdd, CmdDeviceSet, Device, DeviceList, ReplyStatus};

use super::HubState;
use crate::errors::HubError;
use crate::protobuf::Protobuf;

pub async fn list_devices(State(state): State<HubState>) -> Protobuf<DeviceList> {
    Protobuf(DeviceList {
        devices: state.bus.list(),
    })
}

pub async fn get_device(
    State(state): State<HubState>,
    Path(device_id): Path<u32>,
) -> Result<Protobuf<Device>, HubError> {
    state.bus.get(device_id).map(Protobuf)
}

pub async fn add_device(
    State(state): State<HubState>,
    Protobuf(cmd): Protobuf<CmdDeviceAdd>,
) -> Result<Protobuf<Device>, HubError> {
    state.bus.add(cmd).map(Protobuf)
}

/// The path id wins over any `device_id` in the body.
pub async fn set_device(
    State(state): State<HubState>,
    Path(device_id): Path<u32>,
    Protobuf(cmd): Protobuf<CmdDeviceSet>,
) -> Result<Protobuf<ReplyStatus>, HubError> {
    state.bus.set(device_id, cmd)?;
    Ok(Protobuf(ReplyStatus::ok()))
}

pub async fn interview_device(
    State(state): State<HubState>,
    Path(device_id): Path<u32>,
) -> Result<Protobuf<ReplyStatus>, HubError> {
    state.bus.interview(device_id)?;
    Ok(Protobuf(ReplyStatus::ok()))
}

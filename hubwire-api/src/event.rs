//! `HubEvent` envelope: common metadata plus one tagged payload.

use alloc::borrow::Cow;
use alloc::format;
use core::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::SCHEMA_VERSION;
use crate::models::{
    CmdDeviceAdd, CmdDeviceInterview, CmdDeviceSet, CmdSceneTrigger, Device, DeviceReport,
    DeviceState, Message,
};
use crate::wire::{Result, Tag, WireError, WireReader, WireWriter};

mod field {
    pub const SCHEMA_VERSION: u32 = 1;
    pub const EVENT_ID: u32 = 2;
    pub const TIMESTAMP_US: u32 = 3;

    pub const DEVICE: u32 = 10;
    pub const DEVICE_STATE: u32 = 11;
    pub const DEVICE_REPORT: u32 = 12;

    pub const CMD_DEVICE_ADD: u32 = 20;
    pub const CMD_DEVICE_SET: u32 = 21;
    pub const CMD_DEVICE_INTERVIEW: u32 = 22;
    pub const CMD_SCENE_TRIGGER: u32 = 23;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventId {
    #[default]
    Unspecified,
    CmdDeviceAdd,
    CmdDeviceRemove,
    CmdDeviceInterview,
    CmdDeviceSet,
    CmdSceneTrigger,
    EvtDeviceAdded,
    EvtDeviceRemoved,
    EvtDeviceInterviewed,
    EvtDeviceState,
    EvtDeviceReport,
    Unknown(u32),
}

impl EventId {
    pub fn from_raw(value: u32) -> Self {
        match value {
            0 => Self::Unspecified,
            1 => Self::CmdDeviceAdd,
            2 => Self::CmdDeviceRemove,
            3 => Self::CmdDeviceInterview,
            4 => Self::CmdDeviceSet,
            5 => Self::CmdSceneTrigger,
            6 => Self::EvtDeviceAdded,
            7 => Self::EvtDeviceRemoved,
            8 => Self::EvtDeviceInterviewed,
            9 => Self::EvtDeviceState,
            10 => Self::EvtDeviceReport,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u32 {
        match self {
            Self::Unspecified => 0,
            Self::CmdDeviceAdd => 1,
            Self::CmdDeviceRemove => 2,
            Self::CmdDeviceInterview => 3,
            Self::CmdDeviceSet => 4,
            Self::CmdSceneTrigger => 5,
            Self::EvtDeviceAdded => 6,
            Self::EvtDeviceRemoved => 7,
            Self::EvtDeviceInterviewed => 8,
            Self::EvtDeviceState => 9,
            Self::EvtDeviceReport => 10,
            Self::Unknown(other) => *other,
        }
    }

    /// Table name, or `UNKNOWN_<n>` for codes outside the table.
    pub fn name(&self) -> Cow<'static, str> {
        let name = match self {
            Self::Unspecified => "EVENT_ID_UNSPECIFIED",
            Self::CmdDeviceAdd => "HUB_CMD_DEVICE_ADD",
            Self::CmdDeviceRemove => "HUB_CMD_DEVICE_REMOVE",
            Self::CmdDeviceInterview => "HUB_CMD_DEVICE_INTERVIEW",
            Self::CmdDeviceSet => "HUB_CMD_DEVICE_SET",
            Self::CmdSceneTrigger => "HUB_CMD_SCENE_TRIGGER",
            Self::EvtDeviceAdded => "HUB_EVT_DEVICE_ADDED",
            Self::EvtDeviceRemoved => "HUB_EVT_DEVICE_REMOVED",
            Self::EvtDeviceInterviewed => "HUB_EVT_DEVICE_INTERVIEWED",
            Self::EvtDeviceState => "HUB_EVT_DEVICE_STATE",
            Self::EvtDeviceReport => "HUB_EVT_DEVICE_REPORT",
            Self::Unknown(other) => return Cow::Owned(format!("UNKNOWN_{}", other)),
        };
        Cow::Borrowed(name)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadType {
    Device,
    DeviceState,
    DeviceReport,
    CmdDeviceAdd,
    CmdDeviceSet,
    CmdDeviceInterview,
    CmdSceneTrigger,
}

impl PayloadType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::DeviceState => "device_state",
            Self::DeviceReport => "device_report",
            Self::CmdDeviceAdd => "cmd_device_add",
            Self::CmdDeviceSet => "cmd_device_set",
            Self::CmdDeviceInterview => "cmd_device_interview",
            Self::CmdSceneTrigger => "cmd_scene_trigger",
        }
    }

    /// Envelope field that carries this payload.
    pub fn field_number(&self) -> u32 {
        match self {
            Self::Device => field::DEVICE,
            Self::DeviceState => field::DEVICE_STATE,
            Self::DeviceReport => field::DEVICE_REPORT,
            Self::CmdDeviceAdd => field::CMD_DEVICE_ADD,
            Self::CmdDeviceSet => field::CMD_DEVICE_SET,
            Self::CmdDeviceInterview => field::CMD_DEVICE_INTERVIEW,
            Self::CmdSceneTrigger => field::CMD_SCENE_TRIGGER,
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Device(Device),
    DeviceState(DeviceState),
    DeviceReport(DeviceReport),
    CmdDeviceAdd(CmdDeviceAdd),
    CmdDeviceSet(CmdDeviceSet),
    CmdDeviceInterview(CmdDeviceInterview),
    CmdSceneTrigger(CmdSceneTrigger),
}

impl Payload {
    pub fn payload_type(&self) -> PayloadType {
        match self {
            Self::Device(_) => PayloadType::Device,
            Self::DeviceState(_) => PayloadType::DeviceState,
            Self::DeviceReport(_) => PayloadType::DeviceReport,
            Self::CmdDeviceAdd(_) => PayloadType::CmdDeviceAdd,
            Self::CmdDeviceSet(_) => PayloadType::CmdDeviceSet,
            Self::CmdDeviceInterview(_) => PayloadType::CmdDeviceInterview,
            Self::CmdSceneTrigger(_) => PayloadType::CmdSceneTrigger,
        }
    }

    fn encode(&self, writer: &mut WireWriter) {
        let number = self.payload_type().field_number();
        match self {
            Self::Device(msg) => writer.message_field(number, msg),
            Self::DeviceState(msg) => writer.message_field(number, msg),
            Self::DeviceReport(msg) => writer.message_field(number, msg),
            Self::CmdDeviceAdd(msg) => writer.message_field(number, msg),
            Self::CmdDeviceSet(msg) => writer.message_field(number, msg),
            Self::CmdDeviceInterview(msg) => writer.message_field(number, msg),
            Self::CmdSceneTrigger(msg) => writer.message_field(number, msg),
        }
    }

    fn serialize_entry<M: SerializeMap>(&self, map: &mut M) -> core::result::Result<(), M::Error> {
        let key = self.payload_type().name();
        match self {
            Self::Device(msg) => map.serialize_entry(key, msg),
            Self::DeviceState(msg) => map.serialize_entry(key, msg),
            Self::DeviceReport(msg) => map.serialize_entry(key, msg),
            Self::CmdDeviceAdd(msg) => map.serialize_entry(key, msg),
            Self::CmdDeviceSet(msg) => map.serialize_entry(key, msg),
            Self::CmdDeviceInterview(msg) => map.serialize_entry(key, msg),
            Self::CmdSceneTrigger(msg) => map.serialize_entry(key, msg),
        }
    }
}

/// Top-level record carried by every binary frame on the event stream.
///
/// At most one payload is kept. A frame that populates several payload
/// fields decodes to the one that appears last on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HubEvent {
    pub schema_version: Option<u32>,
    pub event_id: Option<EventId>,
    pub timestamp_us: Option<u64>,
    pub payload: Option<Payload>,
}

impl HubEvent {
    pub fn new(event_id: EventId, timestamp_us: u64, payload: Payload) -> Self {
        Self {
            schema_version: Some(SCHEMA_VERSION),
            event_id: Some(event_id),
            timestamp_us: Some(timestamp_us),
            payload: Some(payload),
        }
    }

    pub fn payload_type(&self) -> Option<PayloadType> {
        self.payload.as_ref().map(Payload::payload_type)
    }
}

impl Message for HubEvent {
    fn merge_field(&mut self, tag: Tag, reader: &mut WireReader<'_>) -> Result<()> {
        match tag.field_number {
            field::SCHEMA_VERSION => self.schema_version = Some(reader.varint()? as u32),
            field::EVENT_ID => self.event_id = Some(EventId::from_raw(reader.varint()? as u32)),
            field::TIMESTAMP_US => self.timestamp_us = Some(reader.varint()?),
            field::DEVICE => self.payload = Some(Payload::Device(reader.message()?)),
            field::DEVICE_STATE => self.payload = Some(Payload::DeviceState(reader.message()?)),
            field::DEVICE_REPORT => self.payload = Some(Payload::DeviceReport(reader.message()?)),
            field::CMD_DEVICE_ADD => self.payload = Some(Payload::CmdDeviceAdd(reader.message()?)),
            field::CMD_DEVICE_SET => self.payload = Some(Payload::CmdDeviceSet(reader.message()?)),
            field::CMD_DEVICE_INTERVIEW => {
                self.payload = Some(Payload::CmdDeviceInterview(reader.message()?))
            }
            field::CMD_SCENE_TRIGGER => {
                self.payload = Some(Payload::CmdSceneTrigger(reader.message()?))
            }
            _ => reader.skip(tag.wire_type)?,
        }
        Ok(())
    }

    fn encode_fields(&self, writer: &mut WireWriter) {
        if let Some(schema_version) = self.schema_version {
            writer.uint32_field(field::SCHEMA_VERSION, schema_version);
        }
        if let Some(event_id) = self.event_id {
            writer.uint32_field(field::EVENT_ID, event_id.raw());
        }
        if let Some(timestamp_us) = self.timestamp_us {
            writer.uint64_field(field::TIMESTAMP_US, timestamp_us);
        }
        if let Some(payload) = &self.payload {
            payload.encode(writer);
        }
    }
}

impl Serialize for HubEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(schema_version) = self.schema_version {
            map.serialize_entry("schema_version", &schema_version)?;
        }
        if let Some(event_id) = self.event_id {
            map.serialize_entry("id", &event_id.raw())?;
            map.serialize_entry("event_id", &*event_id.name())?;
        }
        if let Some(timestamp_us) = self.timestamp_us {
            map.serialize_entry("ts_us", &timestamp_us)?;
        }
        if let Some(payload) = &self.payload {
            map.serialize_entry("payload_type", payload.payload_type().name())?;
            payload.serialize_entry(&mut map)?;
        }
        map.end()
    }
}

/// A frame that could not be decoded, with the size of the frame it came
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeFailure {
    pub error: WireError,
    pub frame_len: usize,
}

impl DecodeFailure {
    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (frame of {} bytes)", self.error, self.frame_len)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Decodes one complete binary frame into a `HubEvent`.
///
/// Any failure discards the whole frame; no partially decoded record is ever
/// returned.
pub fn decode_frame(frame: &[u8]) -> core::result::Result<HubEvent, DecodeFailure> {
    HubEvent::decode(frame).map_err(|error| DecodeFailure {
        error,
        frame_len: frame.len(),
    })
}

use alloc::string::String;

use serde::Serialize;

use super::{Caps, DeviceType, Message};
use crate::wire::{Result, Tag, WireReader, WireWriter};

mod field {
    pub const REQ_ID: u32 = 1;

    pub const ADD_TYPE: u32 = 2;
    pub const ADD_CAPS: u32 = 3;
    pub const ADD_NAME: u32 = 4;

    pub const SET_DEVICE_ID: u32 = 2;
    pub const SET_HAS_ON: u32 = 3;
    pub const SET_ON: u32 = 4;
    pub const SET_HAS_LEVEL: u32 = 5;
    pub const SET_LEVEL: u32 = 6;

    pub const INTERVIEW_DEVICE_ID: u32 = 2;

    pub const SCENE_ID: u32 = 2;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CmdDeviceAdd {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub req_id: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caps: Option<Caps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CmdDeviceAdd {
    pub fn new(device_type: DeviceType, caps: Caps, name: impl Into<String>) -> Self {
        Self {
            req_id: None,
            device_type: Some(device_type),
            caps: Some(caps),
            name: Some(name.into()),
        }
    }
}

impl Message for CmdDeviceAdd {
    fn merge_field(&mut self, tag: Tag, reader: &mut WireReader<'_>) -> Result<()> {
        match tag.field_number {
            field::REQ_ID => self.req_id = Some(reader.varint()? as u32),
            field::ADD_TYPE => self.device_type = Some(DeviceType::from_raw(reader.varint()? as u32)),
            field::ADD_CAPS => self.caps = Some(Caps::from_bits(reader.varint()? as u32)),
            field::ADD_NAME => self.name = Some(reader.length_delimited_string()?),
            _ => reader.skip(tag.wire_type)?,
        }
        Ok(())
    }

    fn encode_fields(&self, writer: &mut WireWriter) {
        if let Some(req_id) = self.req_id {
            writer.uint32_field(field::REQ_ID, req_id);
        }
        if let Some(device_type) = self.device_type {
            writer.uint32_field(field::ADD_TYPE, device_type.raw());
        }
        if let Some(caps) = self.caps {
            writer.uint32_field(field::ADD_CAPS, caps.bits());
        }
        if let Some(name) = &self.name {
            writer.string_field(field::ADD_NAME, name);
        }
    }
}

/// Partial update of a device. `on` and `level` only apply when the
/// matching `has_*` flag is true.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CmdDeviceSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub req_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_level: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl CmdDeviceSet {
    pub fn new(device_id: u32) -> Self {
        Self {
            device_id: Some(device_id),
            ..Default::default()
        }
    }

    pub fn with_on(mut self, on: bool) -> Self {
        self.has_on = Some(true);
        self.on = Some(on);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.has_level = Some(true);
        self.level = Some(level);
        self
    }

    /// Requested on/off value, if the command sets one.
    pub fn requested_on(&self) -> Option<bool> {
        match self.has_on {
            Some(true) => Some(self.on.unwrap_or(false)),
            _ => None,
        }
    }

    /// Requested level, if the command sets one.
    pub fn requested_level(&self) -> Option<u32> {
        match self.has_level {
            Some(true) => Some(self.level.unwrap_or(0)),
            _ => None,
        }
    }
}

impl Message for CmdDeviceSet {
    fn merge_field(&mut self, tag: Tag, reader: &mut WireReader<'_>) -> Result<()> {
        match tag.field_number {
            field::REQ_ID => self.req_id = Some(reader.varint()? as u32),
            field::SET_DEVICE_ID => self.device_id = Some(reader.varint()? as u32),
            field::SET_HAS_ON => self.has_on = Some(reader.bool()?),
            field::SET_ON => self.on = Some(reader.bool()?),
            field::SET_HAS_LEVEL => self.has_level = Some(reader.bool()?),
            field::SET_LEVEL => self.level = Some(reader.varint()? as u32),
            _ => reader.skip(tag.wire_type)?,
        }
        Ok(())
    }

    fn encode_fields(&self, writer: &mut WireWriter) {
        if let Some(req_id) = self.req_id {
            writer.uint32_field(field::REQ_ID, req_id);
        }
        if let Some(device_id) = self.device_id {
            writer.uint32_field(field::SET_DEVICE_ID, device_id);
        }
        if let Some(has_on) = self.has_on {
            writer.bool_field(field::SET_HAS_ON, has_on);
        }
        if let Some(on) = self.on {
            writer.bool_field(field::SET_ON, on);
        }
        if let Some(has_level) = self.has_level {
            writer.bool_field(field::SET_HAS_LEVEL, has_level);
        }
        if let Some(level) = self.level {
            writer.uint32_field(field::SET_LEVEL, level);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CmdDeviceInterview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub req_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u32>,
}

impl CmdDeviceInterview {
    pub fn new(device_id: u32) -> Self {
        Self {
            req_id: None,
            device_id: Some(device_id),
        }
    }
}

impl Message for CmdDeviceInterview {
    fn merge_field(&mut self, tag: Tag, reader: &mut WireReader<'_>) -> Result<()> {
        match tag.field_number {
            field::REQ_ID => self.req_id = Some(reader.varint()? as u32),
            field::INTERVIEW_DEVICE_ID => self.device_id = Some(reader.varint()? as u32),
            _ => reader.skip(tag.wire_type)?,
        }
        Ok(())
    }

    fn encode_fields(&self, writer: &mut WireWriter) {
        if let Some(req_id) = self.req_id {
            writer.uint32_field(field::REQ_ID, req_id);
        }
        if let Some(device_id) = self.device_id {
            writer.uint32_field(field::INTERVIEW_DEVICE_ID, device_id);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CmdSceneTrigger {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub req_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<u32>,
}

impl CmdSceneTrigger {
    pub fn new(scene_id: u32) -> Self {
        Self {
            req_id: None,
            scene_id: Some(scene_id),
        }
    }
}

impl Message for CmdSceneTrigger {
    fn merge_field(&mut self, tag: Tag, reader: &mut WireReader<'_>) -> Result<()> {
        match tag.field_number {
            field::REQ_ID => self.req_id = Some(reader.varint()? as u32),
            field::SCENE_ID => self.scene_id = Some(reader.varint()? as u32),
            _ => reader.skip(tag.wire_type)?,
        }
        Ok(())
    }

    fn encode_fields(&self, writer: &mut WireWriter) {
        if let Some(req_id) = self.req_id {
            writer.uint32_field(field::REQ_ID, req_id);
        }
        if let Some(scene_id) = self.scene_id {
            writer.uint32_field(field::SCENE_ID, scene_id);
        }
    }
}

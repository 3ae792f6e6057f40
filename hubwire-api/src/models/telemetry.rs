use serde::Serialize;

use super::Message;
use crate::wire::{Result, Tag, WireReader, WireWriter};

mod field {
    pub const TS_US: u32 = 1;
    pub const DEVICE_ID: u32 = 2;

    pub const STATE_ON: u32 = 3;
    pub const STATE_LEVEL: u32 = 4;

    pub const REPORT_HAS_POWER: u32 = 3;
    pub const REPORT_POWER_W: u32 = 4;
    pub const REPORT_HAS_TEMPERATURE: u32 = 5;
    pub const REPORT_TEMPERATURE_C: u32 = 6;
}

/// On/off and level snapshot, published whenever either changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_us: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl Message for DeviceState {
    fn merge_field(&mut self, tag: Tag, reader: &mut WireReader<'_>) -> Result<()> {
        match tag.field_number {
            field::TS_US => self.ts_us = Some(reader.varint()?),
            field::DEVICE_ID => self.device_id = Some(reader.varint()? as u32),
            field::STATE_ON => self.on = Some(reader.bool()?),
            field::STATE_LEVEL => self.level = Some(reader.varint()? as u32),
            _ => reader.skip(tag.wire_type)?,
        }
        Ok(())
    }

    fn encode_fields(&self, writer: &mut WireWriter) {
        if let Some(ts_us) = self.ts_us {
            writer.uint64_field(field::TS_US, ts_us);
        }
        if let Some(device_id) = self.device_id {
            writer.uint32_field(field::DEVICE_ID, device_id);
        }
        if let Some(on) = self.on {
            writer.bool_field(field::STATE_ON, on);
        }
        if let Some(level) = self.level {
            writer.uint32_field(field::STATE_LEVEL, level);
        }
    }
}

/// Periodic measurement. The `has_*` flags say which readings are meaningful
/// for the reporting device.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_us: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_power: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_w: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_temperature: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f32>,
}

impl DeviceReport {
    /// Power reading, if the report carries one.
    pub fn power(&self) -> Option<f32> {
        if self.has_power == Some(true) {
            self.power_w
        } else {
            None
        }
    }

    /// Temperature reading, if the report carries one.
    pub fn temperature(&self) -> Option<f32> {
        if self.has_temperature == Some(true) {
            self.temperature_c
        } else {
            None
        }
    }
}

impl Message for DeviceReport {
    fn merge_field(&mut self, tag: Tag, reader: &mut WireReader<'_>) -> Result<()> {
        match tag.field_number {
            field::TS_US => self.ts_us = Some(reader.varint()?),
            field::DEVICE_ID => self.device_id = Some(reader.varint()? as u32),
            field::REPORT_HAS_POWER => self.has_power = Some(reader.bool()?),
            field::REPORT_POWER_W => self.power_w = Some(reader.fixed32_float()?),
            field::REPORT_HAS_TEMPERATURE => self.has_temperature = Some(reader.bool()?),
            field::REPORT_TEMPERATURE_C => self.temperature_c = Some(reader.fixed32_float()?),
            _ => reader.skip(tag.wire_type)?,
        }
        Ok(())
    }

    fn encode_fields(&self, writer: &mut WireWriter) {
        if let Some(ts_us) = self.ts_us {
            writer.uint64_field(field::TS_US, ts_us);
        }
        if let Some(device_id) = self.device_id {
            writer.uint32_field(field::DEVICE_ID, device_id);
        }
        if let Some(has_power) = self.has_power {
            writer.bool_field(field::REPORT_HAS_POWER, has_power);
        }
        if let Some(power_w) = self.power_w {
            writer.float_field(field::REPORT_POWER_W, power_w);
        }
        if let Some(has_temperature) = self.has_temperature {
            writer.bool_field(field::REPORT_HAS_TEMPERATURE, has_temperature);
        }
        if let Some(temperature_c) = self.temperature_c {
            writer.float_field(field::REPORT_TEMPERATURE_C, temperature_c);
        }
    }
}

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use serde::{Serialize, Serializer};

use super::Message;
use crate::wire::{Result, Tag, WireReader, WireWriter};

mod field {
    pub const ID: u32 = 1;
    pub const TYPE: u32 = 2;
    pub const CAPS: u32 = 3;
    pub const NAME: u32 = 4;
    pub const ON: u32 = 10;
    pub const LEVEL: u32 = 11;
    pub const POWER_W: u32 = 12;
    pub const TEMPERATURE_C: u32 = 13;

    pub const LIST_DEVICES: u32 = 1;
}

/// Device category. Codes outside the known table are kept as `Unknown`
/// rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceType {
    #[default]
    Unspecified,
    Plug,
    Bulb,
    TempSensor,
    Unknown(u32),
}

impl DeviceType {
    pub fn from_raw(value: u32) -> Self {
        match value {
            0 => Self::Unspecified,
            1 => Self::Plug,
            2 => Self::Bulb,
            3 => Self::TempSensor,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u32 {
        match self {
            Self::Unspecified => 0,
            Self::Plug => 1,
            Self::Bulb => 2,
            Self::TempSensor => 3,
            Self::Unknown(other) => *other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unspecified => "DEVICE_TYPE_UNSPECIFIED",
            Self::Plug => "HUB_DEVICE_PLUG",
            Self::Bulb => "HUB_DEVICE_BULB",
            Self::TempSensor => "HUB_DEVICE_TEMP_SENSOR",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Capabilities an interview discovers for this kind of device.
    pub fn typical_caps(&self) -> Caps {
        match self {
            Self::Plug => Caps::ONOFF | Caps::POWER,
            Self::Bulb => Caps::ONOFF | Caps::LEVEL,
            Self::TempSensor => Caps::TEMPERATURE,
            Self::Unspecified | Self::Unknown(_) => Caps::empty(),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DeviceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDeviceType(pub String);

impl fmt::Display for UnknownDeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown device type: {} (expected plug, bulb or temp_sensor)",
            self.0
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownDeviceType {}

impl FromStr for DeviceType {
    type Err = UnknownDeviceType;

    /// Parses the short names used on the command line.
    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.trim() {
            "plug" => Ok(Self::Plug),
            "bulb" => Ok(Self::Bulb),
            "temp_sensor" => Ok(Self::TempSensor),
            other => Err(UnknownDeviceType(other.into())),
        }
    }
}

/// Capability bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Caps(u32);

impl Caps {
    pub const ONOFF: Caps = Caps(1 << 0);
    pub const LEVEL: Caps = Caps(1 << 1);
    pub const POWER: Caps = Caps(1 << 2);
    pub const TEMPERATURE: Caps = Caps(1 << 3);

    const NAMED: [(Caps, &'static str); 4] = [
        (Self::ONOFF, "onoff"),
        (Self::LEVEL, "level"),
        (Self::POWER, "power"),
        (Self::TEMPERATURE, "temperature"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn union(self, other: Caps) -> Caps {
        Caps(self.0 | other.0)
    }

    pub fn contains(&self, other: Caps) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn insert(&mut self, other: Caps) {
        self.0 |= other.0;
    }

    /// Names of the known bits that are set, in bit order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        Self::NAMED
            .iter()
            .filter(|(cap, _)| self.contains(*cap))
            .map(|(_, name)| *name)
    }
}

impl core::ops::BitOr for Caps {
    type Output = Caps;

    fn bitor(self, rhs: Caps) -> Caps {
        self.union(rhs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCap(pub String);

impl fmt::Display for UnknownCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown cap: {}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownCap {}

impl FromStr for Caps {
    type Err = UnknownCap;

    /// Parses a comma separated list such as `onoff,power`. Empty input is
    /// the empty mask.
    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let mut caps = Caps::empty();
        for part in s.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let (cap, _) = Self::NAMED
                .iter()
                .find(|(_, name)| *name == part)
                .ok_or_else(|| UnknownCap(part.into()))?;
            caps.insert(*cap);
        }
        Ok(caps)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Device {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caps: Option<Caps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_w: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f32>,
}

impl Message for Device {
    fn merge_field(&mut self, tag: Tag, reader: &mut WireReader<'_>) -> Result<()> {
        match tag.field_number {
            field::ID => self.id = Some(reader.varint()? as u32),
            field::TYPE => self.device_type = Some(DeviceType::from_raw(reader.varint()? as u32)),
            field::CAPS => self.caps = Some(Caps::from_bits(reader.varint()? as u32)),
            field::NAME => self.name = Some(reader.length_delimited_string()?),
            field::ON => self.on = Some(reader.bool()?),
            field::LEVEL => self.level = Some(reader.varint()? as u32),
            field::POWER_W => self.power_w = Some(reader.fixed32_float()?),
            field::TEMPERATURE_C => self.temperature_c = Some(reader.fixed32_float()?),
            _ => reader.skip(tag.wire_type)?,
        }
        Ok(())
    }

    fn encode_fields(&self, writer: &mut WireWriter) {
        if let Some(id) = self.id {
            writer.uint32_field(field::ID, id);
        }
        if let Some(device_type) = self.device_type {
            writer.uint32_field(field::TYPE, device_type.raw());
        }
        if let Some(caps) = self.caps {
            writer.uint32_field(field::CAPS, caps.bits());
        }
        if let Some(name) = &self.name {
            writer.string_field(field::NAME, name);
        }
        if let Some(on) = self.on {
            writer.bool_field(field::ON, on);
        }
        if let Some(level) = self.level {
            writer.uint32_field(field::LEVEL, level);
        }
        if let Some(power_w) = self.power_w {
            writer.float_field(field::POWER_W, power_w);
        }
        if let Some(temperature_c) = self.temperature_c {
            writer.float_field(field::TEMPERATURE_C, temperature_c);
        }
    }
}

/// Response body of `GET /v1/devices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceList {
    pub devices: Vec<Device>,
}

impl Message for DeviceList {
    fn merge_field(&mut self, tag: Tag, reader: &mut WireReader<'_>) -> Result<()> {
        match tag.field_number {
            field::LIST_DEVICES => self.devices.push(reader.message()?),
            _ => reader.skip(tag.wire_type)?,
        }
        Ok(())
    }

    fn encode_fields(&self, writer: &mut WireWriter) {
        for device in &self.devices {
            writer.message_field(field::LIST_DEVICES, device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::wire::WireError;
    use alloc::vec;

    fn sample_device() -> Device {
        Device {
            id: Some(7),
            device_type: Some(DeviceType::Plug),
            caps: Some(Caps::ONOFF | Caps::POWER),
            name: Some("desk".into()),
            on: Some(true),
            level: Some(0),
            power_w: Some(23.5),
            temperature_c: Some(22.0),
        }
    }

    #[test]
    fn test_device_roundtrip() {
        let device = sample_device();
        let encoded = device.encode_to_vec();
        assert_eq!(Device::decode(&encoded).unwrap(), device);
    }

    #[test]
    fn test_device_field_bytes() {
        let device = Device {
            id: Some(1),
            name: Some("t1".into()),
            temperature_c: Some(0.0),
            ..Default::default()
        };
        assert_eq!(
            device.encode_to_vec(),
            vec![0x08, 0x01, 0x22, 0x02, b't', b'1', 0x6D, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_unknown_device_type_is_kept() {
        // type = 99
        let data = [0x10, 99];
        let device = Device::decode(&data).unwrap();
        assert_eq!(device.device_type, Some(DeviceType::Unknown(99)));
        assert_eq!(device.device_type.unwrap().label(), "UNKNOWN");
        assert_ne!(device.device_type, Some(DeviceType::Plug));
    }

    #[test]
    fn test_unknown_field_is_skipped() {
        let device = sample_device();
        let encoded = device.encode_to_vec();

        // field 99, wire type 2, three payload bytes
        let mut unknown = Vec::new();
        crate::wire::encode_varint((99 << 3) | 2, &mut unknown);
        unknown.extend_from_slice(&[3, 0xDE, 0xAD, 0xBE]);

        let mut before = unknown.clone();
        before.extend_from_slice(&encoded);
        assert_eq!(Device::decode(&before).unwrap(), device);

        let mut after = encoded.clone();
        after.extend_from_slice(&unknown);
        assert_eq!(Device::decode(&after).unwrap(), device);
    }

    #[test]
    fn test_truncated_device_never_decodes() {
        let encoded = sample_device().encode_to_vec();
        for cut in 1..encoded.len() {
            let result = Device::decode(&encoded[..cut]);
            match result {
                Err(WireError::TruncatedMessage { .. }) | Err(WireError::MalformedVarint) => {}
                Ok(device) => {
                    // A cut that lands exactly between two fields yields a valid
                    // prefix; every field it carries must match the original.
                    let original = sample_device();
                    assert!(device.id.is_none() || device.id == original.id);
                    assert!(device.name.is_none() || device.name == original.name);
                    assert!(device.power_w.is_none() || device.power_w == original.power_w);
                    assert!(device.temperature_c.is_none());
                }
                Err(other) => panic!("unexpected error at cut {}: {:?}", cut, other),
            }
        }
    }

    #[test]
    fn test_truncation_inside_last_field() {
        let encoded = sample_device().encode_to_vec();
        // The final field is temperature_c: one tag byte and four float bytes.
        let last_field_start = encoded.len() - 5;
        for cut in last_field_start + 1..encoded.len() {
            assert!(matches!(
                Device::decode(&encoded[..cut]),
                Err(WireError::TruncatedMessage { .. })
            ));
        }
    }

    #[test]
    fn test_device_type_parsing() {
        assert_eq!("plug".parse::<DeviceType>().unwrap(), DeviceType::Plug);
        assert_eq!("temp_sensor".parse::<DeviceType>().unwrap(), DeviceType::TempSensor);
        assert!("toaster".parse::<DeviceType>().is_err());
        assert_eq!(DeviceType::from_raw(2), DeviceType::Bulb);
        assert_eq!(DeviceType::Unknown(42).raw(), 42);
    }

    #[test]
    fn test_caps_parsing() {
        let caps: Caps = "onoff, power".parse().unwrap();
        assert_eq!(caps, Caps::ONOFF | Caps::POWER);
        assert_eq!(caps.bits(), 0b0101);
        assert_eq!(caps.names().collect::<Vec<_>>(), vec!["onoff", "power"]);

        assert_eq!("".parse::<Caps>().unwrap(), Caps::empty());
        assert_eq!(
            "onoff,laser".parse::<Caps>(),
            Err(UnknownCap("laser".into()))
        );
    }

    #[test]
    fn test_device_list_roundtrip() {
        let list = DeviceList {
            devices: vec![
                sample_device(),
                Device {
                    id: Some(8),
                    device_type: Some(DeviceType::Bulb),
                    name: Some("lamp".into()),
                    level: Some(42),
                    ..Default::default()
                },
            ],
        };
        let decoded = DeviceList::decode(&list.encode_to_vec()).unwrap();
        assert_eq!(decoded, list);
        assert!(DeviceList::decode(&[]).unwrap().devices.is_empty());
    }

    #[test]
    fn test_device_serializes_present_fields_only() {
        let device = Device {
            id: Some(3),
            device_type: Some(DeviceType::Unknown(99)),
            ..Default::default()
        };
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 3, "type": "UNKNOWN" }));
    }
}

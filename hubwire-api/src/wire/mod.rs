pub mod error;
pub mod reader;
pub mod writer;

pub use error::{Result, WireError};
pub use reader::WireReader;
pub use writer::{WireWriter, encode_varint};

/// Upper bound on the encoded size of a varint
pub const MAX_VARINT_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Integers, booleans and enums
    Varint = 0,
    /// 8 raw bytes, only ever skipped
    Fixed64 = 1,
    /// Varint length followed by that many bytes
    LengthDelimited = 2,
    /// 4 raw bytes, little-endian float
    Fixed32 = 5,
}

impl WireType {
    /// Creates wire type from the low three bits of a tag
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Fixed32),
            other => Err(WireError::UnsupportedWireType(other)),
        }
    }
}

/// Field key preceding every value on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub field_number: u32,
    pub wire_type: u8,
}

impl Tag {
    pub fn new(field_number: u32, wire_type: WireType) -> Self {
        Self {
            field_number,
            wire_type: wire_type as u8,
        }
    }

    pub fn from_raw(raw: u32) -> Self {
        Self {
            field_number: raw >> 3,
            wire_type: (raw & 0x7) as u8,
        }
    }

    pub fn raw(&self) -> u32 {
        (self.field_number << 3) | u32::from(self.wire_type & 0x7)
    }
}

use alloc::vec::Vec;

use super::{Tag, WireType};
use crate::models::Message;

/// Appends `value` as a base-128 varint.
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Byte sink for outbound messages.
///
/// Field helpers emit the tag followed by the value; callers are expected to
/// write fields in ascending field-number order.
#[derive(Debug, Default, Clone)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn varint(&mut self, value: u64) {
        encode_varint(value, &mut self.buf);
    }

    pub fn tag(&mut self, field_number: u32, wire_type: WireType) {
        self.varint(u64::from(Tag::new(field_number, wire_type).raw()));
    }

    pub fn uint64_field(&mut self, field_number: u32, value: u64) {
        self.tag(field_number, WireType::Varint);
        self.varint(value);
    }

    pub fn uint32_field(&mut self, field_number: u32, value: u32) {
        self.uint64_field(field_number, u64::from(value));
    }

    /// Negative values are sign-extended and always take 10 bytes.
    pub fn int32_field(&mut self, field_number: u32, value: i32) {
        self.uint64_field(field_number, i64::from(value) as u64);
    }

    pub fn bool_field(&mut self, field_number: u32, value: bool) {
        self.uint64_field(field_number, u64::from(value));
    }

    pub fn bytes_field(&mut self, field_number: u32, value: &[u8]) {
        self.tag(field_number, WireType::LengthDelimited);
        self.varint(value.len() as u64);
        self.buf.extend_from_slice(value);
    }

    pub fn string_field(&mut self, field_number: u32, value: &str) {
        self.bytes_field(field_number, value.as_bytes());
    }

    pub fn float_field(&mut self, field_number: u32, value: f32) {
        self.tag(field_number, WireType::Fixed32);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn message_field<M: Message>(&mut self, field_number: u32, message: &M) {
        let nested = message.encode_to_vec();
        self.bytes_field(field_number, &nested);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

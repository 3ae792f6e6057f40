use serde::Serialize;

use super::Message;
use crate::wire::{Result, Tag, WireReader, WireWriter};

mod field {
    pub const OK: u32 = 1;
    pub const STATUS: u32 = 2;
}

/// Outcome of a mutating request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplyStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

impl ReplyStatus {
    pub fn ok() -> Self {
        Self {
            ok: Some(true),
            status: Some(0),
        }
    }

    pub fn failed(status: i32) -> Self {
        Self {
            ok: Some(false),
            status: Some(status),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok == Some(true)
    }
}

impl Message for ReplyStatus {
    fn merge_field(&mut self, tag: Tag, reader: &mut WireReader<'_>) -> Result<()> {
        match tag.field_number {
            field::OK => self.ok = Some(reader.bool()?),
            // int32 travels sign-extended; keep the low 32 bits.
            field::STATUS => self.status = Some(reader.varint()? as i64 as i32),
            _ => reader.skip(tag.wire_type)?,
        }
        Ok(())
    }

    fn encode_fields(&self, writer: &mut WireWriter) {
        if let Some(ok) = self.ok {
            writer.bool_field(field::OK, ok);
        }
        if let Some(status) = self.status {
            writer.int32_field(field::STATUS, status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloc::vec;

    #[test]
    fn test_ok_reply_bytes() {
        assert_eq!(ReplyStatus::ok().encode_to_vec(), vec![0x08, 0x01, 0x10, 0x00]);
        assert!(ReplyStatus::decode(&[0x08, 0x01]).unwrap().is_ok());
    }

    #[test]
    fn test_negative_status_roundtrip() {
        let reply = ReplyStatus::failed(-2);
        let encoded = reply.encode_to_vec();
        // ok (2 bytes) + status tag (1 byte) + 10-byte varint
        assert_eq!(encoded.len(), 13);

        let decoded = ReplyStatus::decode(&encoded).unwrap();
        assert_eq!(decoded.status, Some(-2));
        assert!(!decoded.is_ok());
    }
}

mod command;
mod device;
mod reply;
mod telemetry;

pub use command::{CmdDeviceAdd, CmdDeviceInterview, CmdDeviceSet, CmdSceneTrigger};
pub use device::{Caps, Device, DeviceList, DeviceType, UnknownCap, UnknownDeviceType};
pub use reply::ReplyStatus;
pub use telemetry::{DeviceReport, DeviceState};

use alloc::vec::Vec;

use crate::wire::{Result, Tag, WireReader, WireWriter};

/// A record with a fixed field-number table.
///
/// Decoding is one loop shared by every message: read a tag, hand it to
/// [`Message::merge_field`], repeat until the buffer is exhausted. Fields a
/// message does not know are skipped by its `merge_field` fallback.
pub trait Message: Default {
    /// Applies one field whose tag has already been read.
    fn merge_field(&mut self, tag: Tag, reader: &mut WireReader<'_>) -> Result<()>;

    /// Writes every populated field in ascending field-number order.
    fn encode_fields(&self, writer: &mut WireWriter);

    fn decode(buf: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(buf);
        Self::decode_from(&mut reader)
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self> {
        let mut message = Self::default();
        while !reader.eof() {
            let tag = reader.tag()?;
            message.merge_field(tag, reader)?;
        }
        Ok(message)
    }

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut writer = WireWriter::new();
        self.encode_fields(&mut writer);
        writer.into_bytes()
    }
}

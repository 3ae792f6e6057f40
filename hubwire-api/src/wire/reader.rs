use alloc::string::String;

use super::error::{Result, WireError};
use super::{MAX_VARINT_LEN, Tag, WireType};
use crate::models::Message;

/// Cursor over one complete, already-framed buffer.
///
/// The cursor never moves past the end of the buffer: a read either consumes
/// exactly the bytes it decodes or fails.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn eof(&self) -> bool {
        self.pos == self.buf.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Reads a base-128 varint of at most 10 bytes.
    pub fn varint(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let Some(&byte) = self.buf.get(self.pos) else {
                return Err(WireError::MalformedVarint);
            };
            self.pos += 1;

            // The 10th group only carries bit 63; the rest falls off the top.
            value |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(WireError::MalformedVarint)
    }

    pub fn tag(&mut self) -> Result<Tag> {
        let raw = self.varint()?;
        Ok(Tag::from_raw(raw as u32))
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(WireError::TruncatedMessage {
                needed: n,
                remaining,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Reads a varint length and returns exactly that many bytes.
    pub fn length_delimited(&mut self) -> Result<&'a [u8]> {
        let len = self.varint()?;
        let n = usize::try_from(len).map_err(|_| WireError::TruncatedMessage {
            needed: usize::MAX,
            remaining: self.remaining(),
        })?;
        self.bytes(n)
    }

    /// Invalid UTF-8 is replaced, never rejected.
    pub fn string(&mut self, n: usize) -> Result<String> {
        let raw = self.bytes(n)?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    pub fn length_delimited_string(&mut self) -> Result<String> {
        let raw = self.length_delimited()?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    pub fn fixed32_float(&mut self) -> Result<f32> {
        let raw = self.bytes(4)?;
        Ok(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn bool(&mut self) -> Result<bool> {
        Ok(self.varint()? != 0)
    }

    /// Decodes a nested message over exactly its length-prefixed sub-slice,
    /// so a bad inner length can never move this reader's cursor.
    pub fn message<M: Message>(&mut self) -> Result<M> {
        let raw = self.length_delimited()?;
        M::decode(raw)
    }

    /// Consumes and discards one value of the given wire type.
    pub fn skip(&mut self, wire_type: u8) -> Result<()> {
        match WireType::from_u8(wire_type)? {
            WireType::Varint => {
                self.varint()?;
            }
            WireType::Fixed64 => {
                self.bytes(8)?;
            }
            WireType::LengthDelimited => {
                self.length_delimited()?;
            }
            WireType::Fixed32 => {
                self.bytes(4)?;
            }
        }
        Ok(())
    }
}

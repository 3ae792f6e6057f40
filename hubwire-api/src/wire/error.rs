use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// Varint ran past 10 bytes or past the end of the buffer
    MalformedVarint,
    /// Read of `needed` bytes with only `remaining` left
    TruncatedMessage { needed: usize, remaining: usize },
    /// Skip of a wire type outside {0, 1, 2, 5}
    UnsupportedWireType(u8),
}

impl WireError {
    /// Stable snake_case identifier of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedVarint => "malformed_varint",
            Self::TruncatedMessage { .. } => "truncated_message",
            Self::UnsupportedWireType(_) => "unsupported_wire_type",
        }
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedVarint => write!(f, "Malformed varint"),
            Self::TruncatedMessage { needed, remaining } => write!(
                f,
                "Truncated message: needed {} bytes, {} remaining",
                needed, remaining
            ),
            Self::UnsupportedWireType(wt) => write!(f, "Unsupported wire type: {}", wt),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WireError {}

pub type Result<T> = core::result::Result<T, WireError>;

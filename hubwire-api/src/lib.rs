#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod event;
pub mod models;
pub mod wire;

pub use event::{DecodeFailure, EventId, HubEvent, Payload, PayloadType, decode_frame};
pub use models::Message;

/// Content type used for protobuf request and response bodies.
pub const CONTENT_TYPE: &str = "application/x-protobuf";

/// Envelope schema version produced by the hub.
pub const SCHEMA_VERSION: u32 = 1;

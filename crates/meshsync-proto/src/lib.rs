//! Message schemas and wire codec for the mesh companion sync protocol.
//!
//! This crate defines the records exchanged between a mesh-radio device and
//! its companion application, together with their compact little-endian wire
//! encodings. It is pure data: no I/O, no channel state. The channel protocol
//! that carries these messages lives in `meshsync-gatt`.
//!
//! # Message Overview
//!
//! - [`MeshPacket`] / [`PacketBody`]: traffic produced by the mesh layer.
//! - [`FromRadio`] / [`ToRadio`]: envelopes for the packet channels.
//! - [`User`], [`MyNodeInfo`], [`NodeInfo`], [`RadioConfig`], [`Position`]:
//!   record channels.
//!
//! Every message implements [`WireCodec`]. A zero-length payload is never a
//! valid encoding; the service layer reserves it as the "empty / exhausted"
//! sentinel.

mod envelope;
mod error;
mod packet;
mod types;
mod wire;

pub use envelope::*;
pub use error::*;
pub use packet::*;
pub use types::*;
pub use wire::{WireCodec, MAX_CHANNEL_PAYLOAD, MAX_STRING_LEN};

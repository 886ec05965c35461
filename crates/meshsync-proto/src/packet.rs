//! Mesh packets and their payload bodies.
//!
//! ## Packet Format
//!
//! | Field   | Size (bytes) | Description                           |
//! |---------|--------------|---------------------------------------|
//! | from    | 4            | Origin node number (little-endian).   |
//! | to      | 4            | Destination node number.              |
//! | id      | 4            | Per-origin packet id.                 |
//! | rx_time | 4            | Unix timestamp of reception.          |
//! | tag     | 1            | Body variant tag (`BODY_*`).          |
//! | body    | variable     | Variant-specific encoding.            |

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::types::{NodeNum, Position, User};
use crate::wire::{take_u32, take_u8, WireCodec};

// ============================================================================
// Body Tags
// ============================================================================

/// Position report body.
pub const BODY_POSITION: u8 = 1;
/// User identity body.
pub const BODY_USER: u8 = 2;
/// Opaque application data body.
pub const BODY_DATA: u8 = 3;
/// Node number allocation request.
pub const BODY_WANT_NODE_NUM: u8 = 4;
/// Node number allocation denial.
pub const BODY_DENY_NODE_NUM: u8 = 5;
/// Uninterpreted raw body.
pub const BODY_RAW: u8 = 6;

/// Broadcast destination node number.
pub const BROADCAST_ADDR: NodeNum = 0xFFFF_FFFF;

// ============================================================================
// Packet Types
// ============================================================================

/// The payload carried by a mesh packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PacketBody {
    /// A position report.
    Position(Position),
    /// A user identity broadcast.
    User(User),
    /// Opaque application data on a numbered port.
    Data {
        /// Application port number.
        port: u8,
        /// Opaque payload bytes.
        payload: Vec<u8>,
    },
    /// Node number allocation request (mesh management, never relayed).
    WantNodeNum,
    /// Node number allocation denial (mesh management, never relayed).
    DenyNodeNum,
    /// Uninterpreted bytes.
    Raw(Vec<u8>),
}

impl PacketBody {
    /// Get the wire tag for this body variant.
    pub fn tag(&self) -> u8 {
        match self {
            PacketBody::Position(_) => BODY_POSITION,
            PacketBody::User(_) => BODY_USER,
            PacketBody::Data { .. } => BODY_DATA,
            PacketBody::WantNodeNum => BODY_WANT_NODE_NUM,
            PacketBody::DenyNodeNum => BODY_DENY_NODE_NUM,
            PacketBody::Raw(_) => BODY_RAW,
        }
    }
}

/// A packet produced by the mesh layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshPacket {
    /// Origin node number.
    pub from: NodeNum,
    /// Destination node number ([`BROADCAST_ADDR`] for broadcast).
    pub to: NodeNum,
    /// Per-origin packet id.
    pub id: u32,
    /// Unix timestamp of reception.
    pub rx_time: u32,
    /// The payload body.
    pub body: PacketBody,
}

impl MeshPacket {
    /// Check whether this is mesh-management traffic that must never be
    /// relayed to the companion app.
    pub fn is_node_num_management(&self) -> bool {
        matches!(
            self.body,
            PacketBody::WantNodeNum | PacketBody::DenyNodeNum
        )
    }
}

impl WireCodec for MeshPacket {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32);
        buf.extend_from_slice(&self.from.to_le_bytes());
        buf.extend_from_slice(&self.to.to_le_bytes());
        buf.extend_from_slice(&self.id.to_le_bytes());
        buf.extend_from_slice(&self.rx_time.to_le_bytes());
        buf.push(self.body.tag());
        match &self.body {
            PacketBody::Position(pos) => buf.extend_from_slice(&pos.encode()),
            PacketBody::User(user) => buf.extend_from_slice(&user.encode()),
            PacketBody::Data { port, payload } => {
                buf.push(*port);
                buf.extend_from_slice(payload);
            }
            PacketBody::WantNodeNum | PacketBody::DenyNodeNum => {}
            PacketBody::Raw(data) => buf.extend_from_slice(data),
        }
        buf
    }

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut i = 0;
        let from = take_u32(data, &mut i)?;
        let to = take_u32(data, &mut i)?;
        let id = take_u32(data, &mut i)?;
        let rx_time = take_u32(data, &mut i)?;
        let tag = take_u8(data, &mut i)?;
        let body = match tag {
            BODY_POSITION => PacketBody::Position(Position::decode(&data[i..])?),
            BODY_USER => PacketBody::User(User::decode(&data[i..])?),
            BODY_DATA => {
                let port = take_u8(data, &mut i)?;
                PacketBody::Data {
                    port,
                    payload: data[i..].to_vec(),
                }
            }
            BODY_WANT_NODE_NUM => PacketBody::WantNodeNum,
            BODY_DENY_NODE_NUM => PacketBody::DenyNodeNum,
            BODY_RAW => PacketBody::Raw(data[i..].to_vec()),
            other => return Err(CodecError::UnknownBody(other)),
        };
        Ok(MeshPacket {
            from,
            to,
            id,
            rx_time,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_packet(from: NodeNum, payload: &[u8]) -> MeshPacket {
        MeshPacket {
            from,
            to: BROADCAST_ADDR,
            id: 7,
            rx_time: 1_700_000_123,
            body: PacketBody::Data {
                port: 1,
                payload: payload.to_vec(),
            },
        }
    }

    #[test]
    fn data_packet_roundtrip() {
        let packet = data_packet(0x11, b"hello mesh");
        let decoded = MeshPacket::decode(&packet.encode()).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn tagless_bodies_roundtrip() {
        let packet = MeshPacket {
            from: 3,
            to: 1,
            id: 99,
            rx_time: 0,
            body: PacketBody::WantNodeNum,
        };
        let decoded = MeshPacket::decode(&packet.encode()).unwrap();
        assert!(decoded.is_node_num_management());
    }

    #[test]
    fn unknown_body_tag_rejected() {
        let mut bytes = data_packet(1, b"x").encode();
        bytes[16] = 0xEE;
        assert_eq!(
            MeshPacket::decode(&bytes).unwrap_err(),
            CodecError::UnknownBody(0xEE)
        );
    }

    #[test]
    fn truncated_header_rejected() {
        let bytes = data_packet(1, b"x").encode();
        assert!(MeshPacket::decode(&bytes[..10]).is_err());
    }
}

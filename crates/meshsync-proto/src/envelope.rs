//! Envelopes exchanged on the fromRadio and toRadio channels.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::packet::MeshPacket;
use crate::wire::{take_u8, WireCodec};

/// Envelope tag: a live mesh packet.
pub const ENVELOPE_PACKET: u8 = 1;

/// A message delivered to the companion app on the fromRadio channel.
///
/// The service layer never encodes an empty FromRadio; an empty mailbox is
/// signalled by a zero-length channel payload instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FromRadio {
    /// A packet received from the mesh.
    Packet(MeshPacket),
}

impl WireCodec for FromRadio {
    fn encode(&self) -> Vec<u8> {
        match self {
            FromRadio::Packet(packet) => {
                let body = packet.encode();
                let mut buf = Vec::with_capacity(1 + body.len());
                buf.push(ENVELOPE_PACKET);
                buf.extend_from_slice(&body);
                buf
            }
        }
    }

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut i = 0;
        match take_u8(data, &mut i)? {
            ENVELOPE_PACKET => Ok(FromRadio::Packet(MeshPacket::decode(&data[i..])?)),
            other => Err(CodecError::UnknownEnvelope(other)),
        }
    }
}

/// A command written by the companion app on the toRadio channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToRadio {
    /// A packet to transmit on the mesh.
    Packet(MeshPacket),
}

impl WireCodec for ToRadio {
    fn encode(&self) -> Vec<u8> {
        match self {
            ToRadio::Packet(packet) => {
                let body = packet.encode();
                let mut buf = Vec::with_capacity(1 + body.len());
                buf.push(ENVELOPE_PACKET);
                buf.extend_from_slice(&body);
                buf
            }
        }
    }

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut i = 0;
        match take_u8(data, &mut i)? {
            ENVELOPE_PACKET => Ok(ToRadio::Packet(MeshPacket::decode(&data[i..])?)),
            other => Err(CodecError::UnknownEnvelope(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{PacketBody, BROADCAST_ADDR};

    #[test]
    fn from_radio_wraps_packet() {
        let packet = MeshPacket {
            from: 5,
            to: BROADCAST_ADDR,
            id: 1,
            rx_time: 0,
            body: PacketBody::Raw(vec![1, 2, 3]),
        };
        let envelope = FromRadio::Packet(packet.clone());
        let bytes = envelope.encode();
        assert_eq!(bytes[0], ENVELOPE_PACKET);
        let FromRadio::Packet(decoded) = FromRadio::decode(&bytes).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn empty_envelope_rejected() {
        assert!(ToRadio::decode(&[]).is_err());
        assert_eq!(
            ToRadio::decode(&[0x42]).unwrap_err(),
            CodecError::UnknownEnvelope(0x42)
        );
    }
}

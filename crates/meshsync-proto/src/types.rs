//! Record types carried over the sync channels.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::wire::{put_string, take_i32, take_i8, take_string, take_u32, take_u8, WireCodec};

/// Node identifier on the mesh.
pub type NodeNum = u32;

/// User identity record (the "owner" of a node).
///
/// All three fields are independently settable; an empty field on the wire
/// means "no change" under the owner merge policy.
///
/// String fields longer than [`crate::MAX_STRING_LEN`] bytes are truncated at
/// a character boundary when encoded; decode never accepts more.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable opaque id, e.g. "!aabbccdd".
    pub id: String,
    /// Full display name.
    pub long_name: String,
    /// Short display name (a few characters).
    pub short_name: String,
}

impl User {
    /// Check whether every field is empty.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.long_name.is_empty() && self.short_name.is_empty()
    }
}

impl WireCodec for User {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(3 + self.id.len() + self.long_name.len() + self.short_name.len());
        put_string(&mut buf, &self.id);
        put_string(&mut buf, &self.long_name);
        put_string(&mut buf, &self.short_name);
        buf
    }

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut i = 0;
        let id = take_string(data, &mut i)?;
        let long_name = take_string(data, &mut i)?;
        let short_name = take_string(data, &mut i)?;
        Ok(User {
            id,
            long_name,
            short_name,
        })
    }
}

/// Geographic position fix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees scaled by 1e7.
    pub latitude_i: i32,
    /// Longitude in degrees scaled by 1e7.
    pub longitude_i: i32,
    /// Altitude in meters.
    pub altitude: i32,
    /// Unix timestamp of the fix.
    pub time: u32,
}

impl Position {
    /// Get latitude as a floating point value.
    pub fn latitude(&self) -> f64 {
        self.latitude_i as f64 / 1e7
    }

    /// Get longitude as a floating point value.
    pub fn longitude(&self) -> f64 {
        self.longitude_i as f64 / 1e7
    }
}

impl WireCodec for Position {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16);
        buf.extend_from_slice(&self.latitude_i.to_le_bytes());
        buf.extend_from_slice(&self.longitude_i.to_le_bytes());
        buf.extend_from_slice(&self.altitude.to_le_bytes());
        buf.extend_from_slice(&self.time.to_le_bytes());
        buf
    }

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut i = 0;
        Ok(Position {
            latitude_i: take_i32(data, &mut i)?,
            longitude_i: take_i32(data, &mut i)?,
            altitude: take_i32(data, &mut i)?,
            time: take_u32(data, &mut i)?,
        })
    }
}

/// Static identity record for the local node, read-only to the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MyNodeInfo {
    /// This node's number on the mesh.
    pub node_num: NodeNum,
    /// Oldest companion app protocol version this firmware supports.
    pub min_app_version: u32,
    /// Firmware version string, truncated to [`crate::MAX_STRING_LEN`] bytes
    /// on encode.
    pub firmware_version: String,
}

impl WireCodec for MyNodeInfo {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(9 + self.firmware_version.len());
        buf.extend_from_slice(&self.node_num.to_le_bytes());
        buf.extend_from_slice(&self.min_app_version.to_le_bytes());
        put_string(&mut buf, &self.firmware_version);
        buf
    }

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut i = 0;
        Ok(MyNodeInfo {
            node_num: take_u32(data, &mut i)?,
            min_app_version: take_u32(data, &mut i)?,
            firmware_version: take_string(data, &mut i)?,
        })
    }
}

/// One entry of the node directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// The node's number on the mesh.
    pub num: NodeNum,
    /// Unix timestamp the node was last heard.
    pub last_heard: u32,
    /// SNR of the last reception, scaled by 4.
    pub snr_x4: i8,
    /// The node's user identity.
    pub user: User,
    /// Last known position.
    pub position: Position,
}

impl NodeInfo {
    /// Get the last SNR as a float.
    pub fn snr(&self) -> f32 {
        self.snr_x4 as f32 / 4.0
    }
}

impl WireCodec for NodeInfo {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&self.num.to_le_bytes());
        buf.extend_from_slice(&self.last_heard.to_le_bytes());
        buf.push(self.snr_x4 as u8);
        buf.extend_from_slice(&self.user.encode());
        buf.extend_from_slice(&self.position.encode());
        buf
    }

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut i = 0;
        let num = take_u32(data, &mut i)?;
        let last_heard = take_u32(data, &mut i)?;
        let snr_x4 = take_i8(data, &mut i)?;
        let id = take_string(data, &mut i)?;
        let long_name = take_string(data, &mut i)?;
        let short_name = take_string(data, &mut i)?;
        let position = Position::decode(&data[i..])?;
        Ok(NodeInfo {
            num,
            last_heard,
            snr_x4,
            user: User {
                id,
                long_name,
                short_name,
            },
            position,
        })
    }
}

/// Radio configuration record, replaced wholesale on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioConfig {
    /// Frequency in kHz.
    pub freq_khz: u32,
    /// Bandwidth in Hz.
    pub bandwidth_hz: u32,
    /// Spreading factor (5-12).
    pub spreading_factor: u8,
    /// Coding rate (5-8).
    pub coding_rate: u8,
    /// TX power in dBm.
    pub tx_power_dbm: u8,
    /// Seconds between automatic position broadcasts.
    pub position_broadcast_secs: u32,
    /// Diagnostic capture mode: admit every packet to the outbound queue
    /// verbatim, bypassing dedup and drop rules.
    pub keep_all_packets: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        RadioConfig {
            freq_khz: 910_525,
            bandwidth_hz: 62_500,
            spreading_factor: 7,
            coding_rate: 5,
            tx_power_dbm: 17,
            position_broadcast_secs: 900,
            keep_all_packets: false,
        }
    }
}

impl RadioConfig {
    /// Get frequency in MHz.
    pub fn frequency_mhz(&self) -> f64 {
        self.freq_khz as f64 / 1000.0
    }
}

impl WireCodec for RadioConfig {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16);
        buf.extend_from_slice(&self.freq_khz.to_le_bytes());
        buf.extend_from_slice(&self.bandwidth_hz.to_le_bytes());
        buf.push(self.spreading_factor);
        buf.push(self.coding_rate);
        buf.push(self.tx_power_dbm);
        buf.extend_from_slice(&self.position_broadcast_secs.to_le_bytes());
        buf.push(self.keep_all_packets as u8);
        buf
    }

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut i = 0;
        Ok(RadioConfig {
            freq_khz: take_u32(data, &mut i)?,
            bandwidth_hz: take_u32(data, &mut i)?,
            spreading_factor: take_u8(data, &mut i)?,
            coding_rate: take_u8(data, &mut i)?,
            tx_power_dbm: take_u8(data, &mut i)?,
            position_broadcast_secs: take_u32(data, &mut i)?,
            keep_all_packets: take_u8(data, &mut i)? != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_roundtrip() {
        let user = User {
            id: "!a1b2c3d4".to_string(),
            long_name: "Base Camp".to_string(),
            short_name: "BC".to_string(),
        };
        let decoded = User::decode(&user.encode()).unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn user_decode_truncated() {
        let user = User {
            id: "!a1b2c3d4".to_string(),
            long_name: "Base Camp".to_string(),
            short_name: "BC".to_string(),
        };
        let bytes = user.encode();
        assert!(User::decode(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn oversized_string_clamped_on_encode() {
        let user = User {
            id: "!a1b2c3d4".to_string(),
            long_name: "x".repeat(crate::MAX_STRING_LEN + 10),
            short_name: String::new(),
        };
        // The encoding stays decodable; the long name comes back truncated
        // to the wire limit.
        let decoded = User::decode(&user.encode()).unwrap();
        assert_eq!(decoded.long_name.len(), crate::MAX_STRING_LEN);
        assert_eq!(decoded.id, user.id);
    }

    #[test]
    fn node_info_roundtrip() {
        let info = NodeInfo {
            num: 0x0a0b0c0d,
            last_heard: 1_700_000_000,
            snr_x4: -10,
            user: User {
                id: "!0a0b0c0d".to_string(),
                long_name: "Ridge Repeater".to_string(),
                short_name: "RR".to_string(),
            },
            position: Position {
                latitude_i: 474_000_000,
                longitude_i: -1_223_000_000,
                altitude: 82,
                time: 1_700_000_000,
            },
        };
        let decoded = NodeInfo::decode(&info.encode()).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.snr(), -2.5);
    }

    #[test]
    fn radio_config_roundtrip() {
        let config = RadioConfig {
            keep_all_packets: true,
            ..RadioConfig::default()
        };
        let decoded = RadioConfig::decode(&config.encode()).unwrap();
        assert_eq!(decoded, config);
    }
}

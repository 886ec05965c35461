//! Logical channels and the generic record channel.
//!
//! Each channel is a read/write/notify-capable endpoint identified by a
//! 128-bit UUID. The UUIDs are the observed wire identity and must not change,
//! or existing companion apps will fail to find the service.

use meshsync_proto::{CodecError, WireCodec};

/// UUID of the sync service itself, for host registration.
pub const SERVICE_UUID: &str = "6ba1b218-15a8-461f-9fa8-5dcae273eafd";

/// The logical channels exposed to the companion app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    /// Outbound packet mailbox: pop-on-read, zero-length when empty.
    FromRadio,
    /// Write-only send path into the mesh.
    ToRadio,
    /// Sequence counter: read, notify, and rewind-on-write.
    FromNum,
    /// Static local node identity, read-only.
    MyNode,
    /// Radio configuration with a post-write reload trigger.
    Radio,
    /// Owner identity with selective per-field merge on write.
    Owner,
    /// Node directory cursor: advance-on-read, reset-on-write.
    NodeInfo,
}

impl ChannelId {
    /// All channels, in registration order.
    pub const ALL: [ChannelId; 7] = [
        ChannelId::FromRadio,
        ChannelId::ToRadio,
        ChannelId::FromNum,
        ChannelId::MyNode,
        ChannelId::Radio,
        ChannelId::Owner,
        ChannelId::NodeInfo,
    ];

    /// The channel's 128-bit UUID.
    pub fn uuid(&self) -> &'static str {
        match self {
            ChannelId::FromRadio => "8ba2bcc2-ee02-4a55-a531-c525c5e454d5",
            ChannelId::ToRadio => "f75c76d2-129e-4dad-a1dd-7866124401e7",
            ChannelId::FromNum => "ed9da18c-a800-4f66-a670-aa7547e34453",
            ChannelId::MyNode => "ea9f3f82-8dc4-4733-9452-1f6da28892a2",
            ChannelId::Radio => "b56786c8-839a-44a1-b98e-a1724c4a0262",
            ChannelId::Owner => "6ff1d8b6-e2de-41e3-8c0b-8fa384f64eb6",
            ChannelId::NodeInfo => "d31e02e0-c8ab-4d3f-9cc9-0b8466bdabe8",
        }
    }

    /// Short descriptive name for host registration.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelId::FromRadio => "fromRadio",
            ChannelId::ToRadio => "toRadio",
            ChannelId::FromNum => "fromNum",
            ChannelId::MyNode => "myNode",
            ChannelId::Radio => "radio",
            ChannelId::Owner => "owner",
            ChannelId::NodeInfo => "nodeinfo",
        }
    }

    /// Look up a channel by its UUID.
    pub fn from_uuid(uuid: &str) -> Option<ChannelId> {
        ChannelId::ALL.into_iter().find(|c| c.uuid() == uuid)
    }

    /// Whether the channel supports reads.
    pub fn readable(&self) -> bool {
        !matches!(self, ChannelId::ToRadio)
    }

    /// Whether the channel supports writes.
    pub fn writable(&self) -> bool {
        matches!(
            self,
            ChannelId::ToRadio
                | ChannelId::FromNum
                | ChannelId::Radio
                | ChannelId::Owner
                | ChannelId::NodeInfo
        )
    }

    /// Whether the channel emits notifications.
    pub fn notifies(&self) -> bool {
        matches!(self, ChannelId::FromNum)
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A channel backed by a single canonical record.
///
/// Reads serialize the current record into a caller-supplied buffer. Writes
/// decode into a staged value first and replace the record only on success, so
/// malformed input never leaves the canonical record partially mutated.
#[derive(Debug, Default)]
pub struct RecordChannel<T> {
    record: T,
}

impl<T: WireCodec> RecordChannel<T> {
    /// Create a channel over an initial record.
    pub fn new(record: T) -> Self {
        RecordChannel { record }
    }

    /// Borrow the canonical record.
    pub fn record(&self) -> &T {
        &self.record
    }

    /// Mutably borrow the canonical record.
    pub fn record_mut(&mut self) -> &mut T {
        &mut self.record
    }

    /// Serialize the record into `buf`, returning the byte count.
    pub fn read_into(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        self.record.encode_into(buf)
    }

    /// Decode `data` and replace the record wholesale. Stage-then-commit: the
    /// record is untouched if decoding fails.
    pub fn write(&mut self, data: &[u8]) -> Result<(), CodecError> {
        let staged = T::decode(data)?;
        self.record = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshsync_proto::RadioConfig;

    #[test]
    fn uuid_lookup_roundtrip() {
        for channel in ChannelId::ALL {
            assert_eq!(ChannelId::from_uuid(channel.uuid()), Some(channel));
        }
        assert_eq!(ChannelId::from_uuid("not-a-uuid"), None);
    }

    #[test]
    fn access_properties() {
        assert!(!ChannelId::ToRadio.readable());
        assert!(!ChannelId::FromRadio.writable());
        assert!(!ChannelId::MyNode.writable());
        assert!(ChannelId::FromNum.readable());
        assert!(ChannelId::FromNum.writable());
        assert!(ChannelId::FromNum.notifies());
        assert!(!ChannelId::Owner.notifies());
    }

    #[test]
    fn record_untouched_on_bad_write() {
        let mut channel = RecordChannel::new(RadioConfig::default());
        let before = channel.record().clone();
        assert!(channel.write(&[1, 2, 3]).is_err());
        assert_eq!(channel.record(), &before);
    }

    #[test]
    fn read_write_roundtrip() {
        let mut channel = RecordChannel::new(RadioConfig::default());
        let mut updated = RadioConfig::default();
        updated.tx_power_dbm = 20;
        channel.write(&updated.encode()).unwrap();
        assert_eq!(channel.record(), &updated);

        let mut buf = [0u8; meshsync_proto::MAX_CHANNEL_PAYLOAD];
        let n = channel.read_into(&mut buf).unwrap();
        assert_eq!(RadioConfig::decode(&buf[..n]).unwrap(), updated);
    }
}

//! The synchronization service: channel dispatch and lifecycle.
//!
//! Single-threaded and callback-driven: each read or write arrives as one
//! discrete event handled to completion before the next is dispatched, and no
//! handler blocks. The only deferred behavior is the sequence counter's
//! debounced notification, driven by [`SyncService::poll`].

use log::{debug, info};
use meshsync_proto::{
    CodecError, FromRadio, MeshPacket, MyNodeInfo, NodeInfo, RadioConfig, ToRadio, User, WireCodec,
};

use crate::channel::{ChannelId, RecordChannel};
use crate::cursor::DirectoryCursor;
use crate::error::ChannelError;
use crate::filter::{admission, Admission};
use crate::mailbox::Mailbox;
use crate::seqnum::SequenceCounter;

/// Collaborators the service drives.
///
/// One implementation per deployment: the mesh layer's send path and packet
/// pool, the configuration consumers, and the storage layer's node table.
pub trait ServiceHost {
    /// Hand a decoded toRadio envelope to the outbound mesh send path.
    fn send_to_mesh(&mut self, envelope: ToRadio);

    /// The radio configuration was replaced; consumers must reload before
    /// this returns.
    fn reload_config(&mut self, config: &RadioConfig);

    /// The owner identity changed: broadcast it on the mesh and persist it.
    fn owner_changed(&mut self, owner: &User);

    /// Ownership of a packet ends here; return it to the reuse pool.
    fn release_packet(&mut self, packet: MeshPacket);

    /// Deliver a debounced sequence counter notification to the consumer.
    fn notify_sequence(&mut self, value: u32);

    /// Fetch entry `index` of the ordered node table, if it exists.
    fn node_entry(&self, index: usize) -> Option<NodeInfo>;
}

/// The sync service over all seven channels.
///
/// Reads serialize into a caller-supplied buffer of at least
/// [`meshsync_proto::MAX_CHANNEL_PAYLOAD`] bytes; a return of zero bytes is
/// the universal "nothing pending / exhausted" sentinel and only the service
/// layer produces it.
pub struct SyncService<H: ServiceHost> {
    host: H,
    my_node: RecordChannel<MyNodeInfo>,
    radio: RecordChannel<RadioConfig>,
    owner: RecordChannel<User>,
    mailbox: Mailbox,
    seq: SequenceCounter,
    cursor: DirectoryCursor,
}

impl<H: ServiceHost> SyncService<H> {
    /// Create a service over its collaborators and initial records.
    pub fn new(host: H, my_node: MyNodeInfo, radio: RadioConfig, owner: User) -> Self {
        SyncService {
            host,
            my_node: RecordChannel::new(my_node),
            radio: RecordChannel::new(radio),
            owner: RecordChannel::new(owner),
            mailbox: Mailbox::default(),
            seq: SequenceCounter::new(),
            cursor: DirectoryCursor::new(),
        }
    }

    /// Borrow the host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutably borrow the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Current sequence counter value.
    pub fn sequence(&self) -> u32 {
        self.seq.value()
    }

    /// Number of packets awaiting the consumer.
    pub fn pending_packets(&self) -> usize {
        self.mailbox.len()
    }

    /// Canonical owner identity.
    pub fn owner(&self) -> &User {
        self.owner.record()
    }

    /// Canonical radio configuration.
    pub fn radio_config(&self) -> &RadioConfig {
        self.radio.record()
    }

    /// Offer a packet produced by the mesh layer to the outbound queue.
    ///
    /// The admission policy decides whether it is queued, replaces a stale
    /// unread entry from the same origin, or is dropped. Every new queue
    /// entry bumps the sequence counter and (re)arms the debounced
    /// notification; replacements keep the prior entry's sequence number, so
    /// the counter stays equal to the total of admitted entries.
    pub fn enqueue_from_mesh(&mut self, packet: MeshPacket, now_ms: u64) {
        let keep_all = self.radio.record().keep_all_packets;
        match admission(&self.mailbox, &packet, keep_all) {
            Admission::Drop => {
                self.host.release_packet(packet);
            }
            Admission::Replace(index) => {
                let stale = self.mailbox.replace_at(index, packet);
                self.host.release_packet(stale);
            }
            Admission::Enqueue => {
                let seq = self.seq.admit(now_ms);
                if let Some(dropped) = self.mailbox.push(seq, packet) {
                    self.host.release_packet(dropped);
                }
            }
        }
    }

    /// Drive the debounce timer; call whenever time advances.
    ///
    /// Fires at most one pending notification, carrying the latest counter
    /// value, once its window has elapsed.
    pub fn poll(&mut self, now_ms: u64) {
        if let Some(value) = self.seq.poll(now_ms) {
            self.host.notify_sequence(value);
        }
    }

    /// Reset all session state, as after a device reboot.
    ///
    /// The counter returns to zero; the consumer detects the decrease and
    /// must discard its cached state and re-read the directory and config
    /// channels.
    pub fn restart(&mut self) {
        info!("sync service restarting, session state cleared");
        self.seq.restart();
        self.mailbox.clear();
        self.cursor.reset();
    }

    /// Stop delivering notifications, ahead of service teardown.
    pub fn shutdown(&mut self) {
        self.seq.disarm();
    }

    /// Handle a read on `channel`, serializing into `buf`.
    ///
    /// Returns the number of bytes produced; zero means "nothing pending".
    pub fn handle_read(
        &mut self,
        channel: ChannelId,
        buf: &mut [u8],
    ) -> Result<usize, ChannelError> {
        if !channel.readable() {
            return Err(ChannelError::NotReadable(channel));
        }
        let numbytes = match channel {
            ChannelId::FromRadio => self.read_mailbox(buf)?,
            ChannelId::FromNum => encode_counter(self.seq.value(), buf)?,
            ChannelId::MyNode => self.my_node.read_into(buf)?,
            ChannelId::Radio => self.radio.read_into(buf)?,
            ChannelId::Owner => self.owner.read_into(buf)?,
            ChannelId::NodeInfo => self.read_directory(buf)?,
            ChannelId::ToRadio => unreachable!("toRadio is write-only"),
        };
        debug!("read from {} returns {} bytes", channel, numbytes);
        Ok(numbytes)
    }

    /// Handle a write of `data` to `channel`.
    ///
    /// Decode failures are local: canonical state is untouched and the
    /// consumer recovers by re-issuing the write.
    pub fn handle_write(&mut self, channel: ChannelId, data: &[u8]) -> Result<(), ChannelError> {
        if !channel.writable() {
            return Err(ChannelError::NotWritable(channel));
        }
        debug!("write to {} of {} bytes", channel, data.len());
        match channel {
            ChannelId::ToRadio => {
                let envelope = ToRadio::decode(data)?;
                self.host.send_to_mesh(envelope);
            }
            ChannelId::FromNum => {
                let target = decode_counter(data)?;
                for packet in self.mailbox.rewind(target) {
                    self.host.release_packet(packet);
                }
            }
            ChannelId::Radio => {
                self.radio.write(data)?;
                self.host.reload_config(self.radio.record());
            }
            ChannelId::Owner => {
                let staged = User::decode(data)?;
                if crate::owner::merge_owner(self.owner.record_mut(), &staged) {
                    self.host.owner_changed(self.owner.record());
                }
            }
            ChannelId::NodeInfo => {
                // Payload ignored; any write restarts the directory dump.
                self.cursor.reset();
            }
            ChannelId::FromRadio | ChannelId::MyNode => {
                unreachable!("read-only channels rejected above")
            }
        }
        Ok(())
    }

    fn read_mailbox(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError> {
        match self.mailbox.pop() {
            None => {
                debug!("toPhone queue is empty");
                Ok(0)
            }
            Some(entry) => {
                let envelope = FromRadio::Packet(entry.packet);
                let result = envelope.encode_into(buf);
                // Bytes are copied out (or the read failed); either way the
                // packet goes back to the pool.
                let FromRadio::Packet(packet) = envelope;
                self.host.release_packet(packet);
                Ok(result?)
            }
        }
    }

    fn read_directory(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError> {
        let host = &self.host;
        match self.cursor.next(|index| host.node_entry(index)) {
            Some(info) => Ok(info.encode_into(buf)?),
            None => Ok(0),
        }
    }
}

fn encode_counter(value: u32, buf: &mut [u8]) -> Result<usize, CodecError> {
    if buf.len() < 4 {
        return Err(CodecError::BufferTooSmall {
            needed: 4,
            available: buf.len(),
        });
    }
    buf[..4].copy_from_slice(&value.to_le_bytes());
    Ok(4)
}

fn decode_counter(data: &[u8]) -> Result<u32, CodecError> {
    if data.len() < 4 {
        return Err(CodecError::Truncated {
            expected: 4,
            actual: data.len(),
        });
    }
    Ok(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
}

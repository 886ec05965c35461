//! Outbound packet mailbox.
//!
//! A bounded FIFO of packets awaiting the companion app, exposed to the
//! consumer as a single pop-on-read slot. There is no transport-level ack:
//! a packet leaves the queue the moment it is read. To cover the rare case
//! where a read response is lost in flight, the last
//! [`REWIND_HISTORY_DEPTH`] delivered packets are retained and can be
//! requeued by a rewind request on the fromNum channel.

use std::collections::VecDeque;

use log::{debug, warn};
use meshsync_proto::MeshPacket;

/// Default bound on the number of unread packets.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Delivered packets retained for rewind. Rewinds reaching further back than
/// this are best-effort and clamp to the oldest retained entry.
pub const REWIND_HISTORY_DEPTH: usize = 32;

/// A packet together with the sequence number assigned at admission.
#[derive(Debug, Clone)]
pub struct QueuedPacket {
    /// Sequence number assigned when the packet was admitted.
    pub seq: u32,
    /// The packet itself.
    pub packet: MeshPacket,
}

/// Bounded outbound queue with rewind history.
///
/// Overflow policy is drop-oldest: the consumer is behind anyway and the
/// newest traffic is the most useful. A dropped entry is recorded in the
/// rewind history as if it had been delivered, so the sequence counter stays
/// consistent with the queue length.
#[derive(Debug)]
pub struct Mailbox {
    queue: VecDeque<QueuedPacket>,
    /// Delivered (or overflow-dropped) entries, oldest first, bounded by
    /// [`REWIND_HISTORY_DEPTH`].
    history: VecDeque<QueuedPacket>,
    capacity: usize,
}

impl Mailbox {
    /// Create a mailbox with the given queue capacity.
    pub fn new(capacity: usize) -> Self {
        Mailbox {
            queue: VecDeque::with_capacity(capacity),
            history: VecDeque::with_capacity(REWIND_HISTORY_DEPTH),
            capacity,
        }
    }

    /// Number of unread packets.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterate the unread packets, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedPacket> {
        self.queue.iter()
    }

    /// Append a packet admitted with sequence number `seq`.
    ///
    /// On overflow the oldest unread entry is discarded (retained in the
    /// rewind history) and its packet is returned so the caller can release
    /// it to the pool.
    pub fn push(&mut self, seq: u32, packet: MeshPacket) -> Option<MeshPacket> {
        let mut dropped = None;
        if self.queue.len() >= self.capacity {
            if let Some(old) = self.queue.pop_front() {
                warn!(
                    "toPhone queue full, dropping oldest entry seq={} from=0x{:x}",
                    old.seq, old.packet.from
                );
                self.retain(old.clone());
                dropped = Some(old.packet);
            }
        }
        self.queue.push_back(QueuedPacket { seq, packet });
        dropped
    }

    /// Replace the packet at queue position `index`, keeping its position and
    /// sequence number. Returns the replaced packet for pool release.
    pub fn replace_at(&mut self, index: usize, packet: MeshPacket) -> MeshPacket {
        let slot = &mut self.queue[index];
        std::mem::replace(&mut slot.packet, packet)
    }

    /// Pop the head of the queue for delivery.
    ///
    /// The entry is retained in the rewind history; the returned packet is
    /// the caller's to serialize and then release to the pool.
    pub fn pop(&mut self) -> Option<QueuedPacket> {
        let entry = self.queue.pop_front()?;
        self.retain(entry.clone());
        Some(entry)
    }

    /// Reposition delivery at sequence number `target`.
    ///
    /// Unread queued entries below `target` are discarded (the consumer has
    /// declared them seen) and returned so the caller can release them to the
    /// pool; retained history entries at or after `target` are requeued ahead
    /// of the live queue. The next pop yields the first packet with
    /// `seq >= target` that still exists.
    ///
    /// A target older than the retained window clamps to the oldest retained
    /// entry; the packets before it are gone for good.
    pub fn rewind(&mut self, target: u32) -> Vec<MeshPacket> {
        if let Some(oldest) = self.history.front() {
            if target < oldest.seq {
                warn!(
                    "rewind to seq {} is beyond retained history, clamping to {}",
                    target, oldest.seq
                );
            }
        }

        // Skip forward: drop unread entries the consumer already has. They
        // join the history like delivered packets, so a later rewind can
        // still recover them.
        let mut discarded = Vec::new();
        while self.queue.front().map_or(false, |front| front.seq < target) {
            if let Some(entry) = self.queue.pop_front() {
                self.retain(entry.clone());
                discarded.push(entry.packet);
            }
        }

        // Skip backward: replay retained deliveries at or after the target.
        let mut requeued = 0;
        while let Some(entry) = self.history.pop_back() {
            if entry.seq < target {
                self.history.push_back(entry);
                break;
            }
            self.queue.push_front(entry);
            requeued += 1;
        }

        debug!(
            "rewind to seq {} requeued {} and discarded {} packets",
            target,
            requeued,
            discarded.len()
        );
        discarded
    }

    /// Discard all queued packets and rewind history, as on service restart.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.history.clear();
    }

    fn retain(&mut self, entry: QueuedPacket) {
        if self.history.len() >= REWIND_HISTORY_DEPTH {
            self.history.pop_front();
        }
        self.history.push_back(entry);
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Mailbox::new(DEFAULT_QUEUE_CAPACITY)
    }
}

//! Admission policy for the outbound queue.
//!
//! Not everything the mesh produces is worth relaying to the phone:
//! - only the most recent Position and User packet per origin node is kept,
//!   replacing any unread prior one in place;
//! - Data packets are always kept;
//! - node-number management packets never reach the phone.
//!
//! The keep-all override disables all of this for diagnostic capture.

use log::debug;
use meshsync_proto::{MeshPacket, PacketBody};

use crate::mailbox::Mailbox;

/// Decision for one produced packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Append as a new queue entry.
    Enqueue,
    /// Replace the unread entry at this queue position, keeping its position
    /// and sequence number.
    Replace(usize),
    /// Discard without queueing.
    Drop,
}

/// Decide what to do with `packet` given the current queue contents.
pub fn admission(mailbox: &Mailbox, packet: &MeshPacket, keep_all: bool) -> Admission {
    if keep_all {
        return Admission::Enqueue;
    }

    if packet.is_node_num_management() {
        debug!("dropping node-num management packet from 0x{:x}", packet.from);
        return Admission::Drop;
    }

    match packet.body {
        PacketBody::Position(_) | PacketBody::User(_) => {
            let stale = mailbox.iter().position(|queued| {
                queued.packet.from == packet.from && queued.packet.body.tag() == packet.body.tag()
            });
            match stale {
                Some(index) => {
                    debug!(
                        "replacing stale queued packet from 0x{:x} at position {}",
                        packet.from, index
                    );
                    Admission::Replace(index)
                }
                None => Admission::Enqueue,
            }
        }
        _ => Admission::Enqueue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshsync_proto::{Position, User, BROADCAST_ADDR};

    fn position_packet(from: u32, time: u32) -> MeshPacket {
        MeshPacket {
            from,
            to: BROADCAST_ADDR,
            id: time,
            rx_time: time,
            body: PacketBody::Position(Position {
                latitude_i: 0,
                longitude_i: 0,
                altitude: 0,
                time,
            }),
        }
    }

    fn user_packet(from: u32) -> MeshPacket {
        MeshPacket {
            from,
            to: BROADCAST_ADDR,
            id: 1,
            rx_time: 0,
            body: PacketBody::User(User::default()),
        }
    }

    fn data_packet(from: u32) -> MeshPacket {
        MeshPacket {
            from,
            to: BROADCAST_ADDR,
            id: 1,
            rx_time: 0,
            body: PacketBody::Data {
                port: 1,
                payload: vec![1],
            },
        }
    }

    #[test]
    fn position_deduplicates_per_origin() {
        let mut mailbox = Mailbox::default();
        let first = position_packet(0xA, 1);
        assert_eq!(admission(&mailbox, &first, false), Admission::Enqueue);
        mailbox.push(1, first);

        // Same origin, fresher fix: replace in place.
        let second = position_packet(0xA, 2);
        assert_eq!(admission(&mailbox, &second, false), Admission::Replace(0));

        // Different origin: new entry.
        let other = position_packet(0xB, 2);
        assert_eq!(admission(&mailbox, &other, false), Admission::Enqueue);
    }

    #[test]
    fn position_does_not_replace_user_from_same_origin() {
        let mut mailbox = Mailbox::default();
        mailbox.push(1, user_packet(0xA));
        assert_eq!(
            admission(&mailbox, &position_packet(0xA, 1), false),
            Admission::Enqueue
        );
    }

    #[test]
    fn data_never_deduplicated() {
        let mut mailbox = Mailbox::default();
        mailbox.push(1, data_packet(0xA));
        assert_eq!(
            admission(&mailbox, &data_packet(0xA), false),
            Admission::Enqueue
        );
    }

    #[test]
    fn node_num_management_dropped() {
        let mailbox = Mailbox::default();
        let want = MeshPacket {
            body: PacketBody::WantNodeNum,
            ..data_packet(0xA)
        };
        let deny = MeshPacket {
            body: PacketBody::DenyNodeNum,
            ..data_packet(0xA)
        };
        assert_eq!(admission(&mailbox, &want, false), Admission::Drop);
        assert_eq!(admission(&mailbox, &deny, false), Admission::Drop);
    }

    #[test]
    fn keep_all_bypasses_every_rule() {
        let mut mailbox = Mailbox::default();
        mailbox.push(1, position_packet(0xA, 1));
        assert_eq!(
            admission(&mailbox, &position_packet(0xA, 2), true),
            Admission::Enqueue
        );
        let want = MeshPacket {
            body: PacketBody::WantNodeNum,
            ..data_packet(0xA)
        };
        assert_eq!(admission(&mailbox, &want, true), Admission::Enqueue);
    }
}

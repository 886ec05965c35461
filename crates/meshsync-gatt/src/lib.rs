//! GATT-facing synchronization service for a mesh radio.
//!
//! This crate implements the protocol a companion app speaks to a mesh-radio
//! device over a byte-oriented, request/response transport with strict
//! message-size limits. The transport itself (connections, advertising, MTU)
//! is owned by an external BLE stack; what lives here is the layer on top:
//!
//! - **fromRadio**: a pop-on-read mailbox delivering the outbound packet
//!   queue one message at a time; zero-length means empty.
//! - **fromNum**: a sequence counter that increments per admitted packet and
//!   notifies the consumer after a 100 ms debounce; writing to it requests a
//!   rewind over the retained delivery history.
//! - **toRadio**: write-only send path into the mesh.
//! - **nodeinfo**: a stateful cursor dumping the node directory one entry per
//!   read, reset by any write.
//! - **owner**: selective per-field identity merge with change detection.
//! - **radio**: configuration with a synchronous post-write reload trigger.
//! - **myNode**: static local identity, read-only.
//!
//! The model is single-threaded and cooperative: each operation runs to
//! completion, never blocks, and serializes into a caller-supplied buffer of
//! at least [`meshsync_proto::MAX_CHANNEL_PAYLOAD`] bytes. Exactly one active
//! consumer is assumed; this is not a pub/sub fan-out.
//!
//! # Example
//!
//! ```rust,ignore
//! use meshsync_gatt::{ChannelId, SyncService};
//!
//! let mut service = SyncService::new(host, my_node, config, owner);
//! service.enqueue_from_mesh(packet, now_ms);
//! service.poll(now_ms + 100); // fires the debounced fromNum notify
//!
//! let mut buf = [0u8; meshsync_proto::MAX_CHANNEL_PAYLOAD];
//! let n = service.handle_read(ChannelId::FromRadio, &mut buf)?;
//! ```

mod channel;
mod cursor;
mod error;
mod filter;
mod mailbox;
mod owner;
mod seqnum;
mod service;

pub use channel::{ChannelId, RecordChannel, SERVICE_UUID};
pub use cursor::DirectoryCursor;
pub use error::ChannelError;
pub use filter::{admission, Admission};
pub use mailbox::{Mailbox, QueuedPacket, DEFAULT_QUEUE_CAPACITY, REWIND_HISTORY_DEPTH};
pub use owner::merge_owner;
pub use seqnum::{SequenceCounter, NOTIFY_DEBOUNCE_MS};
pub use service::{ServiceHost, SyncService};

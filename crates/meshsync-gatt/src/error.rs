//! Service error types.

use thiserror::Error;

use crate::channel::ChannelId;

/// Errors reported by channel operations.
///
/// No variant is fatal: every failure is local to the operation that raised it
/// and recovery is the consumer's job (typically by re-issuing the write).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel does not support reads.
    #[error("channel {0} is not readable")]
    NotReadable(ChannelId),

    /// The channel does not support writes.
    #[error("channel {0} is not writable")]
    NotWritable(ChannelId),

    /// Encoding or decoding a message failed.
    #[error(transparent)]
    Codec(#[from] meshsync_proto::CodecError),
}

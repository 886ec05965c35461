//! Read cursor over the node directory.
//!
//! The directory channel dumps an externally-owned, ordered node table
//! through a stateless read primitive: each read returns the next entry and a
//! zero-length terminator once the table is exhausted. Any write to the
//! channel resets the cursor to the start.
//!
//! Exactly one logical consumer is assumed. Two consumers iterating at the
//! same time share this cursor and will interleave entries; that is a known
//! limitation of the channel design, not something this type works around.

use log::debug;
use meshsync_proto::NodeInfo;

/// Position of the directory cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    /// Freshly created or reset; the next read returns entry 0.
    Start,
    /// The next read returns this entry index.
    Iterating(usize),
    /// The table ran out; every read returns the terminator until a reset.
    Exhausted,
}

/// Stateful iterator over the node table.
#[derive(Debug)]
pub struct DirectoryCursor {
    state: CursorState,
}

impl DirectoryCursor {
    /// Create a cursor at the start of the table.
    pub fn new() -> Self {
        DirectoryCursor {
            state: CursorState::Start,
        }
    }

    /// Move back to the start of the table. Triggered by any write to the
    /// directory channel; the write payload is ignored.
    pub fn reset(&mut self) {
        debug!("nodeinfo cursor reset");
        self.state = CursorState::Start;
    }

    /// Check whether the cursor has hit the end of the table.
    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }

    /// Fetch the next entry via `lookup` and advance.
    ///
    /// Returns `None` once the table is exhausted; the exhausted state is
    /// sticky until [`reset`](Self::reset).
    pub fn next(
        &mut self,
        lookup: impl FnOnce(usize) -> Option<NodeInfo>,
    ) -> Option<NodeInfo> {
        let index = match self.state {
            CursorState::Start => 0,
            CursorState::Iterating(k) => k,
            CursorState::Exhausted => return None,
        };
        match lookup(index) {
            Some(info) => {
                self.state = CursorState::Iterating(index + 1);
                Some(info)
            }
            None => {
                debug!("nodeinfo cursor exhausted after {} entries", index);
                self.state = CursorState::Exhausted;
                None
            }
        }
    }
}

impl Default for DirectoryCursor {
    fn default() -> Self {
        DirectoryCursor::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshsync_proto::User;

    fn table(len: usize) -> Vec<NodeInfo> {
        (0..len)
            .map(|i| NodeInfo {
                num: i as u32,
                user: User {
                    id: format!("!{:08x}", i),
                    ..User::default()
                },
                ..NodeInfo::default()
            })
            .collect()
    }

    #[test]
    fn walks_table_then_terminates_sticky() {
        let nodes = table(3);
        let mut cursor = DirectoryCursor::new();

        for expected in 0..3u32 {
            let info = cursor.next(|i| nodes.get(i).cloned()).unwrap();
            assert_eq!(info.num, expected);
        }

        // Fourth read terminates; further reads stay terminated.
        assert!(cursor.next(|i| nodes.get(i).cloned()).is_none());
        assert!(cursor.is_exhausted());
        assert!(cursor.next(|i| nodes.get(i).cloned()).is_none());
    }

    #[test]
    fn reset_restarts_from_zero() {
        let nodes = table(2);
        let mut cursor = DirectoryCursor::new();
        cursor.next(|i| nodes.get(i).cloned()).unwrap();
        cursor.reset();
        let info = cursor.next(|i| nodes.get(i).cloned()).unwrap();
        assert_eq!(info.num, 0);
    }

    #[test]
    fn reset_clears_exhaustion() {
        let nodes = table(1);
        let mut cursor = DirectoryCursor::new();
        cursor.next(|i| nodes.get(i).cloned()).unwrap();
        assert!(cursor.next(|i| nodes.get(i).cloned()).is_none());
        cursor.reset();
        assert!(!cursor.is_exhausted());
        assert!(cursor.next(|i| nodes.get(i).cloned()).is_some());
    }

    #[test]
    fn empty_table_terminates_immediately() {
        let mut cursor = DirectoryCursor::new();
        assert!(cursor.next(|_| None).is_none());
        assert!(cursor.is_exhausted());
    }
}

//! Forward/backward traversal over an account's stored snapshot list.
//!
//! Stored order is trusted as chronological; the navigator never re-sorts.

use crate::logging::{log, obj, v_num, Domain, Level};
use crate::state::{NavigationCursor, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub previous: bool,
    pub next: bool,
}

pub struct SnapshotNavigator {
    snapshots: Vec<Snapshot>,
    index: usize,
}

impl SnapshotNavigator {
    /// Position on `current_id`, or on the most recent snapshot when the
    /// detail view was opened without one. `None` when the list is empty
    /// or the id is not in it.
    pub fn new(snapshots: Vec<Snapshot>, current_id: Option<u64>) -> Option<Self> {
        let index = match current_id {
            Some(id) => snapshots.iter().position(|s| s.id == id)?,
            None => snapshots.len().checked_sub(1)?,
        };
        log(
            Level::Debug,
            Domain::Nav,
            "navigator_opened",
            obj(&[
                ("snapshots", v_num(snapshots.len() as f64)),
                ("index", v_num(index as f64)),
            ]),
        );
        Some(Self { snapshots, index })
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.index]
    }

    pub fn cursor(&self) -> NavigationCursor {
        let current = self.current();
        NavigationCursor { account_id: current.account_id, snapshot_id: current.id }
    }

    /// Which directions are currently valid, without moving.
    pub fn availability(&self) -> Availability {
        Availability {
            previous: self.index > 0,
            next: self.index + 1 < self.snapshots.len(),
        }
    }

    /// Step to the next snapshot, or report unavailable at the boundary.
    pub fn next(&mut self) -> Option<&Snapshot> {
        if !self.availability().next {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    /// Step to the previous snapshot, or report unavailable at the boundary.
    pub fn previous(&mut self) -> Option<&Snapshot> {
        if !self.availability().previous {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }
}

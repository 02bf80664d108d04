//! Linear undo history of full raster snapshots.
//!
//! The log is seeded with the pristine capture and receives one snapshot per
//! completed drag gesture. Undo drops the newest snapshot and copies the one
//! below it back into the live buffer. There is no redo.

use crate::draw::{Dimensions, RasterBuffer};
use thiserror::Error;

/// Errors reported by [`UndoLog`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// Only the base snapshot is left.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// A buffer with different geometry was pushed or restored.
    #[error("Snapshot dimensions {found:?} do not match history dimensions {expected:?}")]
    DimensionMismatch {
        expected: Dimensions,
        found: Dimensions,
    },
}

/// A full copy of the raster buffer at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSnapshot {
    dims: Dimensions,
    pix: Vec<u8>,
}

impl RasterSnapshot {
    pub fn capture(buffer: &RasterBuffer) -> Self {
        Self {
            dims: buffer.dimensions(),
            pix: buffer.as_bytes().to_vec(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Copies the snapshot back into `buffer`.
    pub fn restore_into(&self, buffer: &mut RasterBuffer) -> Result<(), HistoryError> {
        if buffer.dimensions() != self.dims {
            return Err(HistoryError::DimensionMismatch {
                expected: self.dims,
                found: buffer.dimensions(),
            });
        }
        buffer.as_bytes_mut().copy_from_slice(&self.pix);
        Ok(())
    }
}

/// Ordered stack of snapshots, oldest first.
#[derive(Debug, Default)]
pub struct UndoLog {
    snapshots: Vec<RasterSnapshot>,
    /// Maximum number of snapshots kept (0 = unlimited)
    max_depth: usize,
}

impl UndoLog {
    /// Creates an empty log. `max_depth` of 0 keeps every snapshot.
    pub fn new(max_depth: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            max_depth,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The most recent snapshot, i.e. the state the buffer should be in
    /// between gestures.
    pub fn top(&self) -> Option<&RasterSnapshot> {
        self.snapshots.last()
    }

    /// Appends a copy of `buffer`.
    ///
    /// All snapshots share one geometry; a buffer with different dimensions
    /// is rejected. When the depth limit is exceeded the oldest snapshot is
    /// evicted, but the log never shrinks below one entry.
    pub fn push(&mut self, buffer: &RasterBuffer) -> Result<(), HistoryError> {
        if let Some(first) = self.snapshots.first() {
            if first.dims != buffer.dimensions() {
                return Err(HistoryError::DimensionMismatch {
                    expected: first.dims,
                    found: buffer.dimensions(),
                });
            }
        }
        self.snapshots.push(RasterSnapshot::capture(buffer));
        if self.max_depth > 0 && self.snapshots.len() > self.max_depth {
            let excess = self.snapshots.len() - self.max_depth;
            self.snapshots.drain(..excess);
            log::debug!("Undo history trimmed by {excess} snapshot(s)");
        }
        Ok(())
    }

    /// Removes the newest snapshot and restores `buffer` to the new top.
    ///
    /// With one snapshot or fewer this is a no-op returning
    /// [`HistoryError::NothingToUndo`].
    pub fn pop(&mut self, buffer: &mut RasterBuffer) -> Result<(), HistoryError> {
        if self.snapshots.len() <= 1 {
            return Err(HistoryError::NothingToUndo);
        }
        let previous = &self.snapshots[self.snapshots.len() - 2];
        previous.restore_into(buffer)?;
        self.snapshots.pop();
        Ok(())
    }

    /// Copies the top snapshot into `buffer` without changing the log.
    pub fn restore_top(&self, buffer: &mut RasterBuffer) -> Result<(), HistoryError> {
        match self.top() {
            Some(top) => top.restore_into(buffer),
            None => Err(HistoryError::NothingToUndo),
        }
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

//! Session state shared by the brush, the undo history and the transfer engine.

use crate::config::{Config, MIN_BRUSH_SIZE};
use crate::draw::{Brush, Color, DirtyTracker, EqualizeStrategy, RasterBuffer};
use crate::history::{HistoryError, UndoLog};
use crate::transfer::TransferEngine;
use crate::util::Rect;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

/// Pointer gesture currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    /// Freehand drag; `last` is the previous pointer sample
    Painting { last: (i32, i32) },
    /// Crop drag from `start` to the latest pointer position
    Cropping { start: (i32, i32), current: (i32, i32) },
}

/// Mutable context for one capture session.
///
/// Every handler receives the session explicitly; nothing is global. The
/// session is not internally synchronized: events must be delivered from one
/// loop, one at a time.
pub struct Session {
    /// Side of the square brush tip in pixels
    pub brush_size: i32,
    pub(super) max_brush_size: i32,
    pub(super) brush_color: Color,
    pub(super) strategy: EqualizeStrategy,
    pub(super) outline_color: Color,
    pub(super) outline_width: i32,
    /// The captured image with annotations applied
    pub(super) buffer: RasterBuffer,
    pub(super) undo: UndoLog,
    pub(super) dirty: DirtyTracker,
    /// Bytes served to selection requestors; replaced wholesale on export
    pub(super) clipboard: Arc<[u8]>,
    pub(super) transfer: TransferEngine,
    pub(super) rng: StdRng,
    pub(super) gesture: GestureState,
    pub(super) active: bool,
}

impl Session {
    /// Starts a session on `capture`, seeding the undo history with it.
    pub fn new(config: &Config, capture: RasterBuffer) -> Self {
        Self::with_rng(config, capture, StdRng::from_entropy())
    }

    /// Like [`Session::new`] with a fixed random source (useful for deterministic tests).
    pub fn with_rng(config: &Config, capture: RasterBuffer, rng: StdRng) -> Self {
        let mut undo = UndoLog::new(config.history.max_depth);
        if let Err(err) = undo.push(&capture) {
            log::error!("Failed to seed undo history: {err}");
        }
        let brush_color = config
            .brush
            .color
            .to_color(crate::draw::color::BLUE)
            .with_alpha(config.brush.opacity);
        let outline_color = config
            .selection
            .outline_color
            .to_color(crate::draw::color::GREEN)
            .with_alpha(config.selection.outline_opacity);

        log::debug!(
            "Session started on {}x{} capture",
            capture.width(),
            capture.height()
        );

        Self {
            brush_size: config.brush.size,
            max_brush_size: config.brush.max_size,
            brush_color,
            strategy: config.brush.interpolation,
            outline_color,
            outline_width: config.selection.outline_width,
            buffer: capture,
            undo,
            dirty: DirtyTracker::new(),
            clipboard: Arc::from(Vec::new()),
            transfer: TransferEngine::new(config.transfer.clone()),
            rng,
            gesture: GestureState::Idle,
            active: true,
        }
    }

    pub fn buffer(&self) -> &RasterBuffer {
        &self.buffer
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    pub fn transfer(&self) -> &TransferEngine {
        &self.transfer
    }

    pub fn clipboard_payload(&self) -> &Arc<[u8]> {
        &self.clipboard
    }

    /// Returns `false` once the session has been shut down.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(super) fn brush(&self) -> Brush {
        Brush {
            size: self.brush_size,
            color: self.brush_color,
            strategy: self.strategy,
        }
    }

    /// Grows the brush by one pixel, up to the configured maximum.
    pub fn grow_brush(&mut self) {
        if self.brush_size < self.max_brush_size {
            self.brush_size += 1;
        }
        log::debug!("Brush size: {}", self.brush_size);
    }

    /// Shrinks the brush by one pixel. A 1 px brush is invisible, so 2 is the floor.
    pub fn shrink_brush(&mut self) {
        if self.brush_size > MIN_BRUSH_SIZE {
            self.brush_size -= 1;
        }
        log::debug!("Brush size: {}", self.brush_size);
    }

    /// Undoes the last completed gesture.
    ///
    /// Returns `false` (and logs "Nothing to undo") when only the original
    /// capture is left. Ignored while a drag is in progress, since ending the
    /// drag records its own snapshot.
    pub fn request_undo(&mut self) -> bool {
        if self.gesture != GestureState::Idle {
            log::debug!("Ignoring undo during {:?}", self.gesture);
            return false;
        }
        match self.undo.pop(&mut self.buffer) {
            Ok(()) => {
                self.dirty.mark_full();
                log::debug!("Undo applied, {} snapshot(s) left", self.undo.len());
                true
            }
            Err(HistoryError::NothingToUndo) => {
                log::info!("Nothing to undo");
                false
            }
            Err(err) => {
                log::error!("Undo failed: {err}");
                false
            }
        }
    }

    /// Replaces the clipboard payload.
    ///
    /// A chunked transfer already in flight keeps serving the payload it started with.
    pub fn set_clipboard_payload(&mut self, bytes: Vec<u8>) {
        log::debug!("Clipboard payload set ({} bytes)", bytes.len());
        self.clipboard = Arc::from(bytes);
    }

    /// Drains the regions repainted since the last call.
    pub fn take_dirty_regions(&mut self) -> Vec<Rect> {
        self.dirty
            .take_regions(self.buffer.width(), self.buffer.height())
    }
}

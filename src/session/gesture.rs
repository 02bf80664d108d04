use crate::capture::{ExportError, ExportResult, export_region};
use crate::draw::{StrokeOutcome, draw_selection_outline, paint_segment};

use super::{GestureState, Session};

impl Session {
    /// Paints the segment from the previous pointer sample to the current one.
    pub fn submit_stroke_segment(
        &mut self,
        prev_x: i32,
        prev_y: i32,
        x: i32,
        y: i32,
    ) -> StrokeOutcome {
        let brush = self.brush();
        paint_segment(
            &mut self.buffer,
            &mut self.dirty,
            &brush,
            (prev_x, prev_y),
            (x, y),
            &mut self.rng,
        )
    }

    /// Starts a freehand drag at `(x, y)`.
    pub fn begin_gesture(&mut self, x: i32, y: i32) {
        log::debug!("Painting from ({x}, {y})");
        self.gesture = GestureState::Painting { last: (x, y) };
    }

    /// Pointer moved during a drag.
    pub fn continue_gesture(&mut self, x: i32, y: i32) {
        match self.gesture {
            GestureState::Painting { last } => {
                self.submit_stroke_segment(last.0, last.1, x, y);
                self.gesture = GestureState::Painting { last: (x, y) };
            }
            GestureState::Cropping { start, .. } => self.update_crop(start, (x, y)),
            GestureState::Idle => {}
        }
    }

    /// Ends a freehand drag and records the result in the undo history.
    pub fn end_gesture(&mut self) {
        if !matches!(self.gesture, GestureState::Painting { .. }) {
            return;
        }
        self.gesture = GestureState::Idle;
        if let Err(err) = self.undo.push(&self.buffer) {
            log::error!("Failed to record undo snapshot: {err}");
        }
    }

    /// Starts a crop drag at `(x, y)`.
    pub fn begin_crop(&mut self, x: i32, y: i32) {
        log::debug!("Cropping from ({x}, {y})");
        self.gesture = GestureState::Cropping {
            start: (x, y),
            current: (x, y),
        };
    }

    /// Redraws the selection outline for the current crop drag.
    fn update_crop(&mut self, start: (i32, i32), current: (i32, i32)) {
        self.gesture = GestureState::Cropping { start, current };
        self.restore_committed();
        draw_selection_outline(
            &mut self.buffer,
            &mut self.dirty,
            start,
            current,
            self.outline_width,
            self.outline_color,
        );
    }

    /// Ends a crop drag at `(x, y)`: removes the outline, encodes the region
    /// and makes it the clipboard payload.
    ///
    /// On success the caller should claim ownership of the clipboard selection.
    pub fn finish_crop(&mut self, x: i32, y: i32) -> Option<Result<ExportResult, ExportError>> {
        let GestureState::Cropping { start, .. } = self.gesture else {
            return None;
        };
        self.gesture = GestureState::Idle;
        self.restore_committed();

        let result = export_region(&self.buffer, start, (x, y));
        match &result {
            Ok(export) => self.set_clipboard_payload(export.image_data.clone()),
            Err(err) => log::warn!("Crop export failed: {err}"),
        }
        Some(result)
    }

    /// Puts the buffer back to the last committed snapshot, dropping any preview.
    fn restore_committed(&mut self) {
        match self.undo.restore_top(&mut self.buffer) {
            Ok(()) => self.dirty.mark_full(),
            Err(err) => log::error!("Failed to restore committed image: {err}"),
        }
    }
}

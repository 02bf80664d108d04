//! Capture session state and event handling.
//!
//! A [`Session`] owns everything one annotation session needs: the captured
//! image, the undo history, the brush and the clipboard transfer engine.
//! Handlers are split by concern:
//! - `state`: construction, brush size, undo, clipboard payload
//! - `gesture`: freehand strokes and the crop drag
//! - `protocol`: selection requests and transfer pacing
//! - `events`: the event dispatcher

mod events;
mod gesture;
mod protocol;
mod state;

pub use events::{DragMode, InputEvent, Response};
pub use state::{GestureState, Session};

#[cfg(test)]
mod tests;

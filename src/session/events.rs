//! Inbound events and the dispatcher that routes them to session handlers.

use crate::transfer::{PropertyNotify, ProtocolAction, SelectionRequest, SelectionTransport};
use crate::util::Rect;
use std::time::Instant;

use super::Session;

/// What a pointer drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Freehand painting with the brush
    Paint,
    /// Selecting a region to copy to the clipboard
    Crop,
}

/// Events delivered to the session by the windowing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Button pressed; starts a drag
    PointerDown { mode: DragMode, x: i32, y: i32 },
    /// Pointer moved while a button is held
    PointerMotion { x: i32, y: i32 },
    /// Button released; ends the drag
    PointerUp { x: i32, y: i32 },
    /// Undo key
    Undo,
    /// Brush size up
    GrowBrush,
    /// Brush size down
    ShrinkBrush,
    /// Another client asked for the clipboard contents
    SelectionRequest(SelectionRequest),
    /// A property on a watched window changed
    PropertyNotify(PropertyNotify),
    /// Periodic timer
    Tick(Instant),
    /// Close the session
    Quit,
}

/// What the windowing layer should do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Repaint these regions of the window
    Redraw(Vec<Rect>),
    /// The transfer engine acted on the selection protocol
    Protocol(ProtocolAction),
    /// Result of an undo request (`false` when there was nothing to undo)
    Undo(bool),
    /// The clipboard payload changed; become the selection owner
    TakeSelectionOwnership,
    /// The session has ended
    Quit,
}

impl Session {
    /// Routes one event to its handler.
    ///
    /// # Arguments
    /// * `transport` - Selection transport used for protocol events
    /// * `event` - The inbound event
    ///
    /// # Behavior
    /// - Pointer events paint or preview a crop; releasing a crop exports it
    /// - Protocol events drive the transfer engine; when a transfer ends,
    ///   requests queued behind it are answered
    /// - Every event that repainted something yields a `Redraw`
    /// - Events after `Quit` are ignored
    pub fn dispatch<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        event: InputEvent,
    ) -> Vec<Response> {
        if !self.active {
            log::debug!("Ignoring {event:?} after quit");
            return Vec::new();
        }

        let mut responses = Vec::new();
        match event {
            InputEvent::PointerDown { mode, x, y } => match mode {
                DragMode::Paint => self.begin_gesture(x, y),
                DragMode::Crop => self.begin_crop(x, y),
            },
            InputEvent::PointerMotion { x, y } => self.continue_gesture(x, y),
            InputEvent::PointerUp { x, y } => {
                if let Some(Ok(_)) = self.finish_crop(x, y) {
                    responses.push(Response::TakeSelectionOwnership);
                } else {
                    self.end_gesture();
                }
            }
            InputEvent::Undo => responses.push(Response::Undo(self.request_undo())),
            InputEvent::GrowBrush => self.grow_brush(),
            InputEvent::ShrinkBrush => self.shrink_brush(),
            InputEvent::SelectionRequest(request) => {
                let now = Instant::now();
                let action = self.on_selection_request(transport, request, now);
                self.push_protocol(transport, action, now, &mut responses);
            }
            InputEvent::PropertyNotify(notify) => {
                let now = Instant::now();
                let action = self.on_property_delete_notification(transport, notify, now);
                self.push_protocol(transport, action, now, &mut responses);
            }
            InputEvent::Tick(now) => {
                let action = self.on_tick(transport, now);
                self.push_protocol(transport, action, now, &mut responses);
            }
            InputEvent::Quit => {
                self.quit(transport);
                responses.push(Response::Quit);
                return responses;
            }
        }

        let dirty = self.take_dirty_regions();
        if !dirty.is_empty() {
            responses.insert(0, Response::Redraw(dirty));
        }
        responses
    }

    fn push_protocol<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        action: ProtocolAction,
        now: Instant,
        responses: &mut Vec<Response>,
    ) {
        let finished = matches!(
            action,
            ProtocolAction::WriteTerminal | ProtocolAction::Aborted(_)
        );
        if action != ProtocolAction::Noop {
            responses.push(Response::Protocol(action));
        }
        if finished {
            responses.extend(
                self.serve_queued(transport, now)
                    .into_iter()
                    .map(Response::Protocol),
            );
        }
    }
}

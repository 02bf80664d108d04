use crate::transfer::{PropertyNotify, ProtocolAction, SelectionRequest, SelectionTransport};
use std::sync::Arc;
use std::time::Instant;

use super::Session;

impl Session {
    /// Answers a selection request with the current clipboard payload.
    pub fn on_selection_request<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        request: SelectionRequest,
        now: Instant,
    ) -> ProtocolAction {
        let payload = Arc::clone(&self.clipboard);
        self.transfer
            .on_selection_request(transport, request, &payload, now)
    }

    /// Feeds a property-change notification to the running transfer.
    pub fn on_property_delete_notification<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        event: PropertyNotify,
        now: Instant,
    ) -> ProtocolAction {
        self.transfer.on_property_notify(transport, event, now)
    }

    /// Stall detection and retries for the running transfer.
    pub fn on_tick<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        now: Instant,
    ) -> ProtocolAction {
        self.transfer.on_tick(transport, now)
    }

    /// Answers requests that were queued behind a finished transfer.
    ///
    /// Stops early when one of them starts a new chunked transfer; the rest
    /// stay queued until that one ends.
    pub fn serve_queued<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        now: Instant,
    ) -> Vec<ProtocolAction> {
        let mut actions = Vec::new();
        while let Some(request) = self.transfer.pop_queued() {
            log::debug!("Serving queued request from {:?}", request.requestor);
            actions.push(self.on_selection_request(transport, request, now));
        }
        actions
    }

    /// Ends the session: cancels any transfer and releases the undo history.
    pub fn quit<T: SelectionTransport + ?Sized>(&mut self, transport: &mut T) {
        if !self.active {
            return;
        }
        self.transfer.shutdown(transport);
        self.undo.clear();
        self.gesture = super::GestureState::Idle;
        self.active = false;
        log::info!("Session closed");
    }
}

//! Selection transfer state machine.
//!
//! The engine is either idle or in the middle of one chunked (`INCR`) transfer.
//! Small payloads are answered with a single property write. Payloads larger
//! than the chunk size are announced with a zero-length `INCR` marker; each
//! time the requestor deletes the property the next chunk is written, and a
//! final zero-length write ends the transfer.

use super::transport::{Atoms, SelectionTransport, encode_atom_list};
use super::types::{
    Atom, PropertyFormat, PropertyNotify, PropertyState, PropertyWrite, ProtocolAction,
    SelectionNotify, SelectionRequest, Severity, TransferError, WindowId,
};
use crate::config::{BusyPolicy, TransferConfig};
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Requests parked behind a running transfer before further ones are refused.
pub const MAX_QUEUED_REQUESTS: usize = 8;

/// Bookkeeping for the chunked transfer in flight.
#[derive(Debug, Clone)]
pub struct TransferSession {
    pub requestor: WindowId,
    pub property: Atom,
    pub selection: Atom,
    pub target: Atom,
    /// Timestamp of the request that started the transfer
    pub time: u32,
    /// Bytes already written; always `<= payload.len()`
    pub cursor: usize,
    pub chunk_size: usize,
    /// Set once the chunk reaching the end of the payload has been written
    pub last_round: bool,
    /// Payload captured when the transfer began
    payload: Arc<[u8]>,
    payload_type: Atom,
    /// A recoverable failure left the current step unsent
    pending_retry: bool,
    last_activity: Instant,
}

impl TransferSession {
    pub fn total(&self) -> usize {
        self.payload.len()
    }

    pub fn is_retry_pending(&self) -> bool {
        self.pending_retry
    }

    /// Byte range of the chunk that follows the cursor.
    fn next_chunk(&self) -> Range<usize> {
        let end = (self.cursor + self.chunk_size).min(self.payload.len());
        self.cursor..end
    }
}

#[derive(Debug)]
enum EngineState {
    Idle,
    Chunking(TransferSession),
}

/// Serves selection requests for the clipboard payload.
#[derive(Debug)]
pub struct TransferEngine {
    config: TransferConfig,
    atoms: Option<Atoms>,
    state: EngineState,
    queued: VecDeque<SelectionRequest>,
}

impl TransferEngine {
    pub fn new(config: TransferConfig) -> Self {
        Self {
            config,
            atoms: None,
            state: EngineState::Idle,
            queued: VecDeque::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, EngineState::Idle)
    }

    /// The chunked transfer in flight, if any.
    pub fn session(&self) -> Option<&TransferSession> {
        match &self.state {
            EngineState::Chunking(session) => Some(session),
            EngineState::Idle => None,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Next parked request, once the engine is idle again.
    pub fn pop_queued(&mut self) -> Option<SelectionRequest> {
        if self.is_idle() {
            self.queued.pop_front()
        } else {
            None
        }
    }

    fn atoms<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
    ) -> Result<Atoms, TransferError> {
        if let Some(atoms) = self.atoms {
            return Ok(atoms);
        }
        let atoms = Atoms::resolve(transport, &self.config.payload_type)?;
        self.atoms = Some(atoms);
        Ok(atoms)
    }

    /// Answers a selection request for `payload`.
    ///
    /// From idle this writes the target list, the whole payload, or the `INCR`
    /// marker. While a chunked transfer runs, the request is refused or queued
    /// according to the busy policy.
    pub fn on_selection_request<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        request: SelectionRequest,
        payload: &Arc<[u8]>,
        now: Instant,
    ) -> ProtocolAction {
        if let EngineState::Chunking(session) = &self.state {
            let busy_with = session.requestor;
            return match self.config.busy_policy {
                BusyPolicy::Reject => refuse(transport, &request, TransferError::Busy(busy_with)),
                BusyPolicy::Queue if self.queued.len() >= MAX_QUEUED_REQUESTS => {
                    refuse(transport, &request, TransferError::Busy(busy_with))
                }
                BusyPolicy::Queue => {
                    log::debug!(
                        "Queueing selection request from {:?} behind transfer to {:?}",
                        request.requestor,
                        busy_with
                    );
                    self.queued.push_back(request);
                    ProtocolAction::Queued
                }
            };
        }

        let atoms = match self.atoms(transport) {
            Ok(atoms) => atoms,
            Err(err) => return refuse(transport, &request, err),
        };
        let property = request.reply_property();

        if request.target == atoms.targets {
            let targets = atoms.supported_targets();
            let data = encode_atom_list(&targets);
            let write = PropertyWrite {
                window: request.requestor,
                property,
                kind: Atom::ATOM,
                format: PropertyFormat::Bits32,
                data: &data,
            };
            if let Err(err) = transport.change_property(&write) {
                return refuse(transport, &request, TransferError::PropertyWrite(err));
            }
            notify_success(transport, &request, property);
            return ProtocolAction::WriteTargets(targets);
        }

        if payload.len() <= self.config.chunk_size {
            let write = PropertyWrite {
                window: request.requestor,
                property,
                kind: atoms.payload_type,
                format: PropertyFormat::Bits8,
                data: &payload[..],
            };
            if let Err(err) = transport.change_property(&write) {
                return refuse(transport, &request, TransferError::PropertyWrite(err));
            }
            log::debug!(
                "Wrote {} byte payload to {:?} in one property",
                payload.len(),
                request.requestor
            );
            notify_success(transport, &request, property);
            return ProtocolAction::WriteProperty {
                bytes: payload.len(),
            };
        }

        let marker = PropertyWrite {
            window: request.requestor,
            property,
            kind: atoms.incr,
            format: PropertyFormat::Bits32,
            data: &[],
        };
        if let Err(err) = transport.change_property(&marker) {
            return refuse(transport, &request, TransferError::PropertyWrite(err));
        }
        if let Err(err) = transport.watch_property_changes(request.requestor, true) {
            return refuse(transport, &request, TransferError::PropertyWrite(err));
        }

        log::debug!(
            "Starting chunked transfer of {} bytes to {:?} ({} byte chunks)",
            payload.len(),
            request.requestor,
            self.config.chunk_size
        );
        self.state = EngineState::Chunking(TransferSession {
            requestor: request.requestor,
            property,
            selection: request.selection,
            target: request.target,
            time: request.time,
            cursor: 0,
            chunk_size: self.config.chunk_size,
            last_round: false,
            payload: Arc::clone(payload),
            payload_type: atoms.payload_type,
            pending_retry: false,
            last_activity: now,
        });
        notify_success(transport, &request, property);
        ProtocolAction::BeginChunked {
            total: payload.len(),
        }
    }

    /// Advances the chunked transfer when the requestor deletes the property.
    ///
    /// New-value notifications, other windows and other properties are ignored.
    pub fn on_property_notify<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        event: PropertyNotify,
        now: Instant,
    ) -> ProtocolAction {
        let EngineState::Chunking(session) = &mut self.state else {
            return ProtocolAction::Noop;
        };
        if event.state != PropertyState::Deleted
            || event.window != session.requestor
            || event.property != session.property
        {
            return ProtocolAction::Noop;
        }
        session.last_activity = now;
        self.advance(transport)
    }

    /// Periodic housekeeping: aborts stalled transfers and retries steps that
    /// failed with a recoverable error.
    pub fn on_tick<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        now: Instant,
    ) -> ProtocolAction {
        let EngineState::Chunking(session) = &self.state else {
            return ProtocolAction::Noop;
        };
        let idle = now.saturating_duration_since(session.last_activity);
        if let Some(timeout) = self.stall_timeout() {
            if idle >= timeout {
                let err = TransferError::Stalled {
                    window: session.requestor,
                    idle,
                };
                return self.abort(transport, err);
            }
        }
        if session.pending_retry {
            return self.advance(transport);
        }
        ProtocolAction::Noop
    }

    /// Cancels the transfer in flight and every queued request.
    ///
    /// Used when the session ends; each affected requestor is told its
    /// conversion failed.
    pub fn shutdown<T: SelectionTransport + ?Sized>(&mut self, transport: &mut T) {
        while let Some(request) = self.queued.pop_front() {
            refuse(transport, &request, TransferError::Cancelled(request.requestor));
        }
        if let EngineState::Chunking(session) = &self.state {
            let err = TransferError::Cancelled(session.requestor);
            self.abort(transport, err);
        }
    }

    fn stall_timeout(&self) -> Option<Duration> {
        match self.config.stall_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Writes the next chunk, or the terminal marker after the last chunk.
    fn advance<T: SelectionTransport + ?Sized>(&mut self, transport: &mut T) -> ProtocolAction {
        let EngineState::Chunking(session) = &mut self.state else {
            return ProtocolAction::Noop;
        };

        if session.last_round {
            let terminal = PropertyWrite {
                window: session.requestor,
                property: session.property,
                kind: session.payload_type,
                format: PropertyFormat::Bits8,
                data: &[],
            };
            return match transport.change_property(&terminal) {
                Ok(()) => {
                    let requestor = session.requestor;
                    log::debug!(
                        "Chunked transfer of {} bytes to {:?} complete",
                        session.total(),
                        requestor
                    );
                    self.state = EngineState::Idle;
                    stop_watching(transport, requestor);
                    ProtocolAction::WriteTerminal
                }
                Err(err) => self.write_failed(transport, TransferError::PropertyWrite(err)),
            };
        }

        let range = session.next_chunk();
        let chunk = PropertyWrite {
            window: session.requestor,
            property: session.property,
            kind: session.payload_type,
            format: PropertyFormat::Bits8,
            data: &session.payload[range.clone()],
        };
        match transport.change_property(&chunk) {
            Ok(()) => {
                session.cursor = range.end;
                session.pending_retry = false;
                if session.cursor >= session.total() {
                    session.last_round = true;
                }
                log::debug!(
                    "Wrote chunk {}..{} of {} to {:?}",
                    range.start,
                    range.end,
                    session.total(),
                    session.requestor
                );
                ProtocolAction::WriteChunk { range }
            }
            Err(err) => self.write_failed(transport, TransferError::PropertyWrite(err)),
        }
    }

    fn write_failed<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        err: TransferError,
    ) -> ProtocolAction {
        match err.severity() {
            Severity::Recoverable => {
                if let EngineState::Chunking(session) = &mut self.state {
                    session.pending_retry = true;
                }
                log::warn!("{err}; retrying on next event");
                ProtocolAction::Retry(err)
            }
            Severity::Fatal => self.abort(transport, err),
        }
    }

    /// Tears down the running transfer and tells the requestor it failed.
    fn abort<T: SelectionTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        err: TransferError,
    ) -> ProtocolAction {
        let state = std::mem::replace(&mut self.state, EngineState::Idle);
        if let EngineState::Chunking(session) = state {
            log::error!(
                "Aborting transfer to {:?} at {}/{} bytes: {err}",
                session.requestor,
                session.cursor,
                session.total()
            );
            stop_watching(transport, session.requestor);
            let notify = SelectionNotify {
                requestor: session.requestor,
                selection: session.selection,
                target: session.target,
                property: None,
                time: session.time,
            };
            if let Err(notify_err) = transport.send_notify(&notify) {
                log::warn!("Failed to report aborted transfer: {notify_err}");
            }
        }
        ProtocolAction::Aborted(err)
    }
}

fn notify_success<T: SelectionTransport + ?Sized>(
    transport: &mut T,
    request: &SelectionRequest,
    property: Atom,
) {
    let notify = SelectionNotify {
        requestor: request.requestor,
        selection: request.selection,
        target: request.target,
        property: Some(property),
        time: request.time,
    };
    if let Err(err) = transport.send_notify(&notify) {
        let err = TransferError::Notify(err);
        log::warn!("{err}");
    }
}

/// Answers `request` with a failure notification.
fn refuse<T: SelectionTransport + ?Sized>(
    transport: &mut T,
    request: &SelectionRequest,
    err: TransferError,
) -> ProtocolAction {
    match err.severity() {
        Severity::Fatal => {
            log::error!("Refusing selection request from {:?}: {err}", request.requestor)
        }
        Severity::Recoverable => {
            log::warn!("Refusing selection request from {:?}: {err}", request.requestor)
        }
    }
    let notify = SelectionNotify {
        requestor: request.requestor,
        selection: request.selection,
        target: request.target,
        property: None,
        time: request.time,
    };
    if let Err(notify_err) = transport.send_notify(&notify) {
        log::warn!("Failed to send refusal: {notify_err}");
    }
    ProtocolAction::Refused(err)
}

fn stop_watching<T: SelectionTransport + ?Sized>(transport: &mut T, window: WindowId) {
    if let Err(err) = transport.watch_property_changes(window, false) {
        log::warn!("Failed to stop watching {window:?}: {err}");
    }
}

//! In-memory transport that plays both the display server and the requestor.
//!
//! [`LoopbackTransport`] stores properties and notifications instead of sending
//! them anywhere, and can be told to fail specific operations. [`fetch`] drives
//! a complete request the way a well-behaved client would: ask, read the
//! property, delete it, and keep reading while an incremental transfer runs.

use super::engine::TransferEngine;
use super::transport::{INCR, SelectionTransport};
use super::types::{
    Atom, PropertyFormat, PropertyNotify, PropertyState, PropertyWrite, ProtocolAction,
    SelectionNotify, SelectionRequest, TransferError, TransportError, TransportErrorKind,
    WindowId,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// A property as stored on a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProperty {
    pub kind: Atom,
    pub format: PropertyFormat,
    pub data: Vec<u8>,
}

/// One call made against the transport, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Write {
        window: WindowId,
        property: Atom,
        kind: Atom,
        /// Declared length in elements
        length: u32,
    },
    Notify(SelectionNotify),
    Watch(WindowId, bool),
}

/// Recording transport with fault injection.
#[derive(Debug)]
pub struct LoopbackTransport {
    atoms: HashMap<String, Atom>,
    next_atom: u32,
    properties: HashMap<(WindowId, Atom), StoredProperty>,
    watched: HashSet<WindowId>,
    calls: Vec<TransportCall>,
    /// Names that fail to intern
    pub unresolvable: HashSet<String>,
    /// Errors returned by upcoming property writes, one per write
    pub write_failures: VecDeque<TransportErrorKind>,
    /// Fail every notification
    pub fail_notify: bool,
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackTransport {
    pub fn new() -> Self {
        let mut atoms = HashMap::new();
        atoms.insert("ATOM".to_string(), Atom::ATOM);
        Self {
            atoms,
            // Leave room below for predefined atoms.
            next_atom: 100,
            properties: HashMap::new(),
            watched: HashSet::new(),
            calls: Vec::new(),
            unresolvable: HashSet::new(),
            write_failures: VecDeque::new(),
            fail_notify: false,
        }
    }

    /// Interns `name`, bypassing fault injection.
    pub fn atom(&mut self, name: &str) -> Atom {
        if let Some(atom) = self.atoms.get(name) {
            return *atom;
        }
        let atom = Atom(self.next_atom);
        self.next_atom += 1;
        self.atoms.insert(name.to_string(), atom);
        atom
    }

    pub fn calls(&self) -> &[TransportCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Notifications sent so far.
    pub fn notifications(&self) -> Vec<SelectionNotify> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::Notify(notify) => Some(*notify),
                _ => None,
            })
            .collect()
    }

    pub fn is_watching(&self, window: WindowId) -> bool {
        self.watched.contains(&window)
    }

    pub fn property(&self, window: WindowId, property: Atom) -> Option<&StoredProperty> {
        self.properties.get(&(window, property))
    }

    /// Reads and deletes a property, as a requestor does after each read.
    ///
    /// Returns the value and, if the owner watches the window, the deletion
    /// notification that the server would deliver to it.
    pub fn take_property(
        &mut self,
        window: WindowId,
        property: Atom,
    ) -> Option<(StoredProperty, Option<PropertyNotify>)> {
        let value = self.properties.remove(&(window, property))?;
        let notify = self.watched.contains(&window).then_some(PropertyNotify {
            window,
            property,
            state: PropertyState::Deleted,
        });
        Some((value, notify))
    }
}

impl SelectionTransport for LoopbackTransport {
    fn intern_atom(&mut self, name: &str) -> Result<Atom, TransportError> {
        if self.unresolvable.contains(name) {
            return Err(TransportError::new(
                TransportErrorKind::BadAtom,
                format!("cannot intern {name}"),
            ));
        }
        Ok(self.atom(name))
    }

    fn change_property(&mut self, write: &PropertyWrite<'_>) -> Result<(), TransportError> {
        if let Some(kind) = self.write_failures.pop_front() {
            return Err(TransportError::new(kind, "injected write failure"));
        }
        self.calls.push(TransportCall::Write {
            window: write.window,
            property: write.property,
            kind: write.kind,
            length: write.element_count(),
        });
        self.properties.insert(
            (write.window, write.property),
            StoredProperty {
                kind: write.kind,
                format: write.format,
                data: write.data.to_vec(),
            },
        );
        Ok(())
    }

    fn send_notify(&mut self, notify: &SelectionNotify) -> Result<(), TransportError> {
        if self.fail_notify {
            return Err(TransportError::new(TransportErrorKind::Io, "injected notify failure"));
        }
        self.calls.push(TransportCall::Notify(*notify));
        Ok(())
    }

    fn watch_property_changes(
        &mut self,
        window: WindowId,
        watch: bool,
    ) -> Result<(), TransportError> {
        self.calls.push(TransportCall::Watch(window, watch));
        if watch {
            self.watched.insert(window);
        } else {
            self.watched.remove(&window);
        }
        Ok(())
    }
}

/// Outcome of a complete loopback fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Every action the engine reported, in order
    pub actions: Vec<ProtocolAction>,
    /// Bytes the requestor reassembled
    pub received: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Selection owner refused the request: {0}")]
    Refused(TransferError),

    #[error("Transfer aborted: {0}")]
    Aborted(TransferError),

    #[error("Owner did not write the announced property")]
    MissingProperty,

    #[error("Transfer did not finish after {0} rounds")]
    TooManyRounds(usize),
}

/// Requests `target` from `engine` as window `requestor` and collects the reply.
pub fn fetch(
    engine: &mut TransferEngine,
    transport: &mut LoopbackTransport,
    payload: &Arc<[u8]>,
    requestor: WindowId,
    target: &str,
) -> Result<Transcript, FetchError> {
    let request = SelectionRequest {
        requestor,
        selection: transport.atom("CLIPBOARD"),
        target: transport.atom(target),
        property: transport.atom("SNIPMARK_SELECTION"),
        time: 0,
    };
    let incr = transport.atom(INCR);
    let mut actions = Vec::new();

    let first = engine.on_selection_request(transport, request, payload, Instant::now());
    actions.push(first.clone());
    if let ProtocolAction::Refused(err) = first {
        return Err(FetchError::Refused(err));
    }

    let (value, mut pending) = transport
        .take_property(requestor, request.property)
        .ok_or(FetchError::MissingProperty)?;
    if value.kind != incr {
        return Ok(Transcript {
            actions,
            received: value.data,
        });
    }

    let mut received = Vec::new();
    // A chunk size of one byte is the worst case; leave headroom for retries.
    let max_rounds = payload.len() + 16;
    for _ in 0..max_rounds {
        let action = match pending.take() {
            Some(notify) => engine.on_property_notify(transport, notify, Instant::now()),
            None => engine.on_tick(transport, Instant::now()),
        };
        actions.push(action.clone());
        match action {
            ProtocolAction::WriteChunk { .. } => {
                let (chunk, notify) = transport
                    .take_property(requestor, request.property)
                    .ok_or(FetchError::MissingProperty)?;
                received.extend_from_slice(&chunk.data);
                pending = notify;
            }
            ProtocolAction::WriteTerminal => {
                transport.take_property(requestor, request.property);
                return Ok(Transcript { actions, received });
            }
            ProtocolAction::Aborted(err) => return Err(FetchError::Aborted(err)),
            _ => {}
        }
    }
    Err(FetchError::TooManyRounds(max_rounds))
}

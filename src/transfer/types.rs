//! Data types for the selection transfer protocol.

use std::ops::Range;
use std::time::Duration;
use thiserror::Error;

/// Window handle on the display server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

/// Interned type/selection/property identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(pub u32);

impl Atom {
    /// The "no property" value.
    pub const NONE: Atom = Atom(0);
    /// Predefined `ATOM` type used for target lists.
    pub const ATOM: Atom = Atom(4);

    pub fn to_ne_bytes(self) -> [u8; 4] {
        self.0.to_ne_bytes()
    }
}

/// Bits per property element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyFormat {
    Bits8,
    Bits32,
}

impl PropertyFormat {
    pub fn bytes_per_element(self) -> usize {
        match self {
            PropertyFormat::Bits8 => 1,
            PropertyFormat::Bits32 => 4,
        }
    }
}

/// A property replacement on a window.
#[derive(Debug, Clone, Copy)]
pub struct PropertyWrite<'a> {
    pub window: WindowId,
    pub property: Atom,
    /// Type of the stored data (payload type, `ATOM`, `INCR`)
    pub kind: Atom,
    pub format: PropertyFormat,
    pub data: &'a [u8],
}

impl PropertyWrite<'_> {
    /// Declared length in elements of `format`.
    pub fn element_count(&self) -> u32 {
        (self.data.len() / self.format.bytes_per_element()) as u32
    }
}

/// An inbound request for the selection contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRequest {
    pub requestor: WindowId,
    pub selection: Atom,
    pub target: Atom,
    pub property: Atom,
    pub time: u32,
}

impl SelectionRequest {
    /// Property to reply on. Obsolete clients send `None`, in which case the
    /// target atom doubles as the property name.
    pub fn reply_property(&self) -> Atom {
        if self.property == Atom::NONE {
            self.target
        } else {
            self.property
        }
    }
}

/// Reply telling the requestor where its data is (or that there is none).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionNotify {
    pub requestor: WindowId,
    pub selection: Atom,
    pub target: Atom,
    /// `None` signals that the conversion failed
    pub property: Option<Atom>,
    pub time: u32,
}

/// What happened to a watched property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyState {
    NewValue,
    Deleted,
}

/// Property change notification delivered for a watched window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyNotify {
    pub window: WindowId,
    pub property: Atom,
    pub state: PropertyState,
}

/// Failure reported by the display transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The window no longer exists.
    BadWindow,
    BadAtom,
    /// The server could not allocate the property.
    BadAlloc,
    BadMatch,
    /// Transient congestion; the same request may succeed later.
    Busy,
    /// Connection-level I/O hiccup.
    Io,
}

impl TransportErrorKind {
    pub fn is_transient(self) -> bool {
        matches!(self, TransportErrorKind::Busy | TransportErrorKind::Io)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind:?}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// How an error affects the transfer it occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Log, keep the session and retry on the next event.
    Recoverable,
    /// Abort the session, tell the requestor, go back to idle.
    Fatal,
}

/// Errors raised while serving a selection request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("Failed to resolve identifier '{name}': {source}")]
    IdentifierResolution {
        name: String,
        #[source]
        source: TransportError,
    },

    #[error("Property write failed: {0}")]
    PropertyWrite(#[source] TransportError),

    #[error("Selection notify failed: {0}")]
    Notify(#[source] TransportError),

    #[error("Transfer to window {window:?} stalled for {idle:?}")]
    Stalled { window: WindowId, idle: Duration },

    #[error("Transfer to window {0:?} already in progress")]
    Busy(WindowId),

    #[error("Transfer to window {0:?} cancelled by shutdown")]
    Cancelled(WindowId),
}

impl TransferError {
    /// Intrinsic classification of the error.
    ///
    /// A recoverable error only keeps something alive when there is an active
    /// chunked session to keep; a failing single-shot reply is refused either way.
    pub fn severity(&self) -> Severity {
        match self {
            TransferError::IdentifierResolution { .. } => Severity::Fatal,
            TransferError::PropertyWrite(err) if err.kind.is_transient() => Severity::Recoverable,
            TransferError::PropertyWrite(_) => Severity::Fatal,
            TransferError::Notify(_) => Severity::Recoverable,
            TransferError::Stalled { .. } => Severity::Fatal,
            TransferError::Busy(_) => Severity::Recoverable,
            TransferError::Cancelled(_) => Severity::Fatal,
        }
    }
}

/// What the engine did in response to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolAction {
    /// The supported target list was written and the requestor notified.
    WriteTargets(Vec<Atom>),
    /// The whole payload was written as one property and the requestor notified.
    WriteProperty { bytes: usize },
    /// A zero-length `INCR` marker was written; chunks follow on deletion.
    BeginChunked { total: usize },
    /// The payload bytes in `range` were written as the next chunk.
    WriteChunk { range: Range<usize> },
    /// The zero-length terminal property was written; the transfer is complete.
    WriteTerminal,
    /// The request was parked until the running transfer completes.
    Queued,
    /// The request was answered with a failure notification.
    Refused(TransferError),
    /// A recoverable error; the same step is retried on the next event.
    Retry(TransferError),
    /// A fatal error tore down the running transfer.
    Aborted(TransferError),
    /// The event was not relevant to the engine.
    Noop,
}

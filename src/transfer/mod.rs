//! Clipboard selection transfer.
//!
//! This module answers selection requests for the clipboard payload:
//! - Target list replies (`TARGETS`)
//! - Single-property replies for payloads up to the chunk size
//! - Incremental (`INCR`) transfers paced by property deletion
//! - Error classification into recoverable and fatal outcomes

pub mod engine;
pub mod loopback;
pub mod transport;
pub mod types;


pub use engine::{MAX_QUEUED_REQUESTS, TransferEngine, TransferSession};
pub use transport::{Atoms, SelectionTransport};
pub use types::{
    Atom, PropertyFormat, PropertyNotify, PropertyState, PropertyWrite, ProtocolAction,
    SelectionNotify, SelectionRequest, Severity, TransferError, TransportError,
    TransportErrorKind, WindowId,
};

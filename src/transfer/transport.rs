//! Abstraction over the display connection used by the transfer engine.
//!
//! The engine never talks to a window system directly; the host backend
//! implements [`SelectionTransport`] and tests substitute an in-memory one.

use super::types::{Atom, PropertyWrite, SelectionNotify, TransferError, TransportError, WindowId};

/// Display operations needed to answer selection requests.
pub trait SelectionTransport {
    /// Resolves a type/selection name to its identifier.
    fn intern_atom(&mut self, name: &str) -> Result<Atom, TransportError>;

    /// Replaces a property on `write.window`.
    fn change_property(&mut self, write: &PropertyWrite<'_>) -> Result<(), TransportError>;

    /// Sends a selection notification to the requestor.
    fn send_notify(&mut self, notify: &SelectionNotify) -> Result<(), TransportError>;

    /// Starts or stops delivery of property change notifications for `window`.
    fn watch_property_changes(&mut self, window: WindowId, watch: bool)
    -> Result<(), TransportError>;
}

/// Name of the target asking for the supported target list.
pub const TARGETS: &str = "TARGETS";
/// Name of the type announcing an incremental transfer.
pub const INCR: &str = "INCR";

/// Identifiers the engine needs, resolved once per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atoms {
    pub targets: Atom,
    pub payload_type: Atom,
    pub incr: Atom,
}

impl Atoms {
    /// Resolves all identifiers, failing on the first one that cannot be interned.
    pub fn resolve<T: SelectionTransport + ?Sized>(
        transport: &mut T,
        payload_type: &str,
    ) -> Result<Self, TransferError> {
        let mut intern = |name: &str| {
            transport
                .intern_atom(name)
                .map_err(|source| TransferError::IdentifierResolution {
                    name: name.to_string(),
                    source,
                })
        };
        Ok(Self {
            targets: intern(TARGETS)?,
            payload_type: intern(payload_type)?,
            incr: intern(INCR)?,
        })
    }

    /// Targets advertised in reply to a `TARGETS` request.
    pub fn supported_targets(&self) -> Vec<Atom> {
        vec![self.targets, self.payload_type]
    }
}

/// Packs atoms as 32-bit property elements.
pub fn encode_atom_list(atoms: &[Atom]) -> Vec<u8> {
    atoms.iter().flat_map(|atom| atom.to_ne_bytes()).collect()
}

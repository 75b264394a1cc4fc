use tracing::debug;

use crate::error::{Error, Result};
use crate::process::ReadMemory;

/// Outcome of re-reading the RecordInfo pointer while idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Unchanged(u32),
    Moved { from: u32, to: u32 },
    /// Pointer went back to NULL (helper destroyed)
    Lost,
}

/// Resolves the well-known pointer to the helper's RecordInfo block
#[derive(Debug, Clone)]
pub struct RecordLocator {
    pointer_address: u32,
    resolved: Option<u32>,
}

impl RecordLocator {
    pub fn new(pointer_address: u32) -> Self {
        Self {
            pointer_address,
            resolved: None,
        }
    }

    pub fn pointer_address(&self) -> u32 {
        self.pointer_address
    }

    /// Last resolved RecordInfo address
    pub fn resolved(&self) -> Option<u32> {
        self.resolved
    }

    /// Follow the pointer once.
    ///
    /// A NULL pointer is the normal state before the helper object has been
    /// placed and yields `UnresolvedPointer`.
    pub fn resolve<R: ReadMemory + ?Sized>(&mut self, reader: &R) -> Result<u32> {
        match reader.read_u32(self.pointer_address)? {
            0 => {
                self.resolved = None;
                Err(Error::UnresolvedPointer {
                    address: self.pointer_address,
                })
            }
            address => {
                debug!(
                    "RecordInfo* at {:#010X} -> {:#010X}",
                    self.pointer_address, address
                );
                self.resolved = Some(address);
                Ok(address)
            }
        }
    }

    /// Re-read the pointer and report whether the helper moved or vanished
    pub fn refresh<R: ReadMemory + ?Sized>(&mut self, reader: &R) -> Result<Refresh> {
        let previous = self.resolved;
        match (self.resolve(reader), previous) {
            (Ok(address), Some(from)) if address != from => {
                Ok(Refresh::Moved { from, to: address })
            }
            (Ok(address), _) => Ok(Refresh::Unchanged(address)),
            (Err(Error::UnresolvedPointer { .. }), _) => Ok(Refresh::Lost),
            (Err(e), _) => Err(e),
        }
    }

    /// Forget the resolved address (after a reconnect)
    pub fn reset(&mut self) {
        self.resolved = None;
    }
}

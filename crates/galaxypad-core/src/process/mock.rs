//! Mock emulator memory for testing
//!
//! Provides an in-memory implementation of `MemoryAccessor` so the capture
//! state machine can be driven poll by poll without a running emulator.
//! Tests mutate the memory between polls to script the helper's behavior.

use crate::error::{Error, Result};
use crate::process::layout::emu;
use crate::process::{MemoryAccessor, ReadMemory};

/// Mock emulator memory
///
/// A flat buffer mapped at `0x80000000` (MEM1). The emulator can be made
/// unavailable to simulate the process exiting; reads then fail with a
/// `ReadFault` until a later `connect` succeeds.
#[derive(Debug, Clone)]
pub struct MockMemory {
    data: Vec<u8>,
    base: u32,
    available: bool,
    connected: bool,
    connects: u32,
}

impl MockMemory {
    /// Make the emulator (dis)appear. Going away also drops the connection.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
        if !available {
            self.connected = false;
        }
    }

    /// Number of successful `connect` calls so far
    pub fn connect_count(&self) -> u32 {
        self.connects
    }

    pub fn set_u32(&mut self, address: u32, value: u32) {
        self.set_bytes(address, &value.to_be_bytes());
    }

    pub fn set_bytes(&mut self, address: u32, bytes: &[u8]) {
        let offset = (address - self.base) as usize;
        if self.data.len() < offset + bytes.len() {
            self.data.resize(offset + bytes.len(), 0);
        }
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

impl ReadMemory for MockMemory {
    fn read_bytes(&self, address: u32, size: usize) -> Result<Vec<u8>> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if address < self.base {
            return Err(Error::ReadFault {
                address,
                message: format!("Address below base (base={:#010X})", self.base),
            });
        }
        let offset = (address - self.base) as usize;
        if offset + size > self.data.len() {
            return Err(Error::ReadFault {
                address,
                message: format!(
                    "Out of bounds: offset={}, size={}, len={}",
                    offset,
                    size,
                    self.data.len()
                ),
            });
        }
        Ok(self.data[offset..offset + size].to_vec())
    }
}

impl MemoryAccessor for MockMemory {
    fn connect(&mut self) -> bool {
        if self.available && !self.connected {
            self.connected = true;
            self.connects += 1;
        }
        self.connected
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Builder for mock emulator memory
///
/// Addresses are absolute effective addresses inside MEM1.
#[derive(Debug, Clone)]
pub struct MockMemoryBuilder {
    memory: MockMemory,
}

impl Default for MockMemoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMemoryBuilder {
    /// Create a builder for an available, already connected emulator
    pub fn new() -> Self {
        Self {
            memory: MockMemory {
                data: Vec::new(),
                base: emu::MEM1_START,
                available: true,
                connected: true,
                connects: 0,
            },
        }
    }

    /// Pre-allocate the buffer with zeros
    pub fn with_size(mut self, size: usize) -> Self {
        if self.memory.data.len() < size {
            self.memory.data.resize(size, 0);
        }
        self
    }

    /// Start without a connection (the first `connect` opens it)
    pub fn disconnected(mut self) -> Self {
        self.memory.connected = false;
        self
    }

    /// Start with the emulator not running
    pub fn unavailable(mut self) -> Self {
        self.memory.set_available(false);
        self
    }

    /// Write the 4-character game ID at the start of MEM1
    pub fn game_id(self, id: &str) -> Self {
        self.write_bytes(emu::GAME_ID_ADDRESS, id.as_bytes())
    }

    pub fn write_u32(mut self, address: u32, value: u32) -> Self {
        self.memory.set_u32(address, value);
        self
    }

    pub fn write_bytes(mut self, address: u32, bytes: &[u8]) -> Self {
        self.memory.set_bytes(address, bytes);
        self
    }

    /// Write a NUL-terminated ASCII string
    pub fn write_cstring(mut self, address: u32, text: &str) -> Self {
        self.memory.set_bytes(address, text.as_bytes());
        self.memory.set_bytes(address + text.len() as u32, &[0]);
        self
    }

    pub fn build(self) -> MockMemory {
        self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_reader_basic() {
        let mem = MockMemoryBuilder::new().write_u32(0x80000010, 0xDEADBEEF).build();

        assert_eq!(mem.read_u32(0x80000010).unwrap(), 0xDEADBEEF);
        assert_eq!(mem.read_bytes(0x80000010, 2).unwrap(), vec![0xDE, 0xAD]);
    }

    #[test]
    fn test_mock_reader_out_of_bounds() {
        let mem = MockMemoryBuilder::new().with_size(8).build();

        assert!(mem.read_u32(0x80000006).is_err());
        assert!(mem.read_u32(0x7FFFFFFC).is_err());
    }

    #[test]
    fn test_mock_unavailable_cannot_connect() {
        let mut mem = MockMemoryBuilder::new().with_size(16).unavailable().build();

        assert!(!mem.connect());
        assert!(matches!(mem.read_u32(0x80000000), Err(Error::NotConnected)));

        mem.set_available(true);
        assert!(mem.connect());
        assert_eq!(mem.connect_count(), 1);
        assert_eq!(mem.read_u32(0x80000000).unwrap(), 0);
    }

    #[test]
    fn test_mock_process_exit_faults_reads() {
        let mut mem = MockMemoryBuilder::new().with_size(16).build();
        assert!(mem.read_u32(0x80000000).is_ok());

        mem.set_available(false);
        assert!(!mem.is_connected());
        assert!(mem.read_u32(0x80000000).unwrap_err().is_read_fault());
    }

    #[test]
    fn test_mock_set_between_reads() {
        let mut mem = MockMemoryBuilder::new().with_size(16).build();
        mem.set_u32(0x80000004, 7);
        assert_eq!(mem.read_u32(0x80000004).unwrap(), 7);
        mem.set_u32(0x80000004, 8);
        assert_eq!(mem.read_u32(0x80000004).unwrap(), 8);
    }
}

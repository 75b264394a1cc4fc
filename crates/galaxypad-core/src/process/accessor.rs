//! Dolphin-backed memory accessor.
//!
//! Owns the connection to the emulator process. The connection is opened by
//! `connect`, translated effective addresses are read through it, and it is
//! dropped on `disconnect` or when the process goes away.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::process::handle::{DolphinProcess, EmulatedRam};
use crate::process::layout::emu;
use crate::process::{MemoryAccessor, ReadMemory};

#[derive(Default)]
pub struct DolphinAccessor {
    process: Option<DolphinProcess>,
}

impl DolphinAccessor {
    pub fn new() -> Self {
        Self { process: None }
    }

    /// PID of the hooked Dolphin process
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(|p| p.pid)
    }
}

/// Translate an effective console address to a host address inside Dolphin.
///
/// Cached (`0x8…`/`0x9…`) and uncached (`0xC…`/`0xD…`) mirrors map to the
/// same physical RAM. The whole `[address, address + size)` range must lie in
/// one region.
pub fn translate(ram: &EmulatedRam, address: u32, size: usize) -> Option<u64> {
    let physical = address & emu::PHYSICAL_MASK;
    let end = physical as u64 + size as u64;

    if end <= emu::MEM1_SIZE as u64 {
        return Some(ram.mem1 + physical as u64);
    }

    let mem2_start = emu::MEM2_PHYSICAL_START as u64;
    let mem2_end = mem2_start + emu::MEM2_SIZE as u64;
    match ram.mem2 {
        Some(mem2) if physical as u64 >= mem2_start && end <= mem2_end => {
            Some(mem2 + (physical as u64 - mem2_start))
        }
        _ => None,
    }
}

impl ReadMemory for DolphinAccessor {
    fn read_bytes(&self, address: u32, size: usize) -> Result<Vec<u8>> {
        let process = self.process.as_ref().ok_or(Error::NotConnected)?;

        let host = translate(&process.ram, address, size).ok_or_else(|| Error::ReadFault {
            address,
            message: format!("{} bytes are outside emulated RAM", size),
        })?;

        let mut buffer = vec![0u8; size];
        process
            .read_host(host, &mut buffer)
            .map_err(|message| Error::ReadFault { address, message })?;

        Ok(buffer)
    }
}

impl MemoryAccessor for DolphinAccessor {
    fn connect(&mut self) -> bool {
        if let Some(process) = &self.process {
            if process.is_alive() {
                return true;
            }
            debug!("Dolphin (PID {}) exited", process.pid);
            self.process = None;
        }

        match DolphinProcess::find_and_open() {
            Ok(process) => {
                info!("Hooked Dolphin (PID {})", process.pid);
                self.process = Some(process);
                true
            }
            Err(e) => {
                debug!("Dolphin not available: {}", e);
                false
            }
        }
    }

    fn disconnect(&mut self) {
        if let Some(process) = self.process.take() {
            debug!("Releasing Dolphin (PID {})", process.pid);
        }
    }

    fn is_connected(&self) -> bool {
        self.process.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAM: EmulatedRam = EmulatedRam {
        mem1: 0x7f10_0000_0000,
        mem2: Some(0x7f20_0000_0000),
    };

    #[test]
    fn test_translate_mem1_cached_and_uncached() {
        assert_eq!(translate(&RAM, 0x80003FFC, 4), Some(0x7f10_0000_3FFC));
        assert_eq!(translate(&RAM, 0xC0003FFC, 4), Some(0x7f10_0000_3FFC));
    }

    #[test]
    fn test_translate_mem2() {
        assert_eq!(translate(&RAM, 0x90001000, 0xF0), Some(0x7f20_0000_1000));
        assert_eq!(translate(&RAM, 0xD0001000, 4), Some(0x7f20_0000_1000));
    }

    #[test]
    fn test_translate_rejects_unmapped() {
        // Straddles the end of MEM1
        assert_eq!(translate(&RAM, 0x81FFFFFE, 4), None);
        // Between MEM1 and MEM2
        assert_eq!(translate(&RAM, 0x88000000, 4), None);
        // Past the end of MEM2
        assert_eq!(translate(&RAM, 0x94000000, 4), None);
    }

    #[test]
    fn test_translate_without_mem2() {
        let ram = EmulatedRam {
            mem1: 0x1000,
            mem2: None,
        };
        assert_eq!(translate(&ram, 0x90000000, 4), None);
        assert_eq!(translate(&ram, 0x80000000, 4), Some(0x1000));
    }

    #[test]
    fn test_disconnected_accessor_reports_not_connected() {
        let accessor = DolphinAccessor::new();
        assert!(!accessor.is_connected());
        assert!(matches!(
            accessor.read_u32(0x80003FFC),
            Err(Error::NotConnected)
        ));
    }
}

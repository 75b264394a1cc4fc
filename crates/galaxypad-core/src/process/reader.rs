use crate::error::{Error, Result};
use crate::game::GameId;
use crate::process::bytes::decode_shift_jis_to_string;
use crate::process::layout::emu;

/// Add an offset to an address taken from emulated memory.
///
/// Pointers come from the game and may be garbage; running past the top of
/// the address space is a protocol violation rather than a wrap into MEM1.
pub fn offset_address(base: u32, offset: u32) -> Result<u32> {
    base.checked_add(offset).ok_or_else(|| {
        Error::ProtocolViolation(format!(
            "address {:#010X} + {:#X} overflows the address space",
            base, offset
        ))
    })
}

/// Trait for reading emulated console memory
///
/// Addresses are effective addresses as the game sees them (e.g. `0x80003FFC`).
/// All multi-byte values are big-endian.
pub trait ReadMemory {
    /// Read exactly `size` raw bytes at the given address
    fn read_bytes(&self, address: u32, size: usize) -> Result<Vec<u8>>;

    fn read_u8(&self, address: u32) -> Result<u8> {
        let bytes = self.read_bytes(address, 1)?;
        Ok(bytes[0])
    }

    fn read_u16(&self, address: u32) -> Result<u16> {
        let bytes = self.read_bytes(address, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&self, address: u32) -> Result<u32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a pointer and reject NULL, naming the pointee in the error
    fn read_pointer(&self, address: u32, what: &'static str) -> Result<u32> {
        match self.read_u32(address)? {
            0 => Err(Error::NullPointer(what)),
            ptr => Ok(ptr),
        }
    }

    /// Read a NUL-terminated Shift-JIS string of at most `max_len` bytes
    fn read_cstring(&self, address: u32, max_len: usize) -> Result<String> {
        if address == 0 {
            return Err(Error::NullPointer("char*"));
        }

        let mut bytes = Vec::new();
        for i in 0..max_len as u32 {
            let byte = self.read_u8(address.wrapping_add(i))?;
            if byte == 0 {
                return Ok(decode_shift_jis_to_string(&bytes));
            }
            bytes.push(byte);
        }

        Err(Error::EncodingError(format!(
            "String at {:#010X} is not terminated within {} bytes",
            address, max_len
        )))
    }
}

/// A connection to an emulator that can come and go.
///
/// `connect` is polled by the capture loop and never fails for the expected
/// "not running yet" case. Any `ReadFault` means the connection must be
/// dropped with `disconnect` and re-established.
pub trait MemoryAccessor: ReadMemory {
    /// Try to attach to the emulator. Returns whether a connection is open.
    fn connect(&mut self) -> bool;

    /// Drop the connection, if any.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Read the game ID of the currently booted title
    fn game_id(&self) -> Result<GameId> {
        let bytes = self.read_bytes(emu::GAME_ID_ADDRESS, emu::GAME_ID_LEN)?;
        Ok(GameId::from_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Check the booted title against a list of expected game IDs
    fn is_target_process(&self, expected: &[&str]) -> Result<bool> {
        Ok(self.game_id()?.is_one_of(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::mock::MockMemoryBuilder;

    #[test]
    fn test_read_u32_big_endian() {
        let mem = MockMemoryBuilder::new()
            .write_bytes(0x80001000, &[0x12, 0x34, 0x56, 0x78])
            .build();

        assert_eq!(mem.read_u32(0x80001000).unwrap(), 0x12345678);
        assert_eq!(mem.read_u16(0x80001002).unwrap(), 0x5678);
        assert_eq!(mem.read_u8(0x80001003).unwrap(), 0x78);
    }

    #[test]
    fn test_read_pointer_null() {
        let mem = MockMemoryBuilder::new().write_u32(0x80003FFC, 0).build();

        let err = mem.read_pointer(0x80003FFC, "RecordInfo*").unwrap_err();
        assert!(matches!(err, Error::NullPointer("RecordInfo*")));
    }

    #[test]
    fn test_read_cstring() {
        let mem = MockMemoryBuilder::new()
            .write_cstring(0x80002000, "RedBlueExGalaxy")
            .build();

        let value = mem.read_cstring(0x80002000, 64).unwrap();
        assert_eq!(value, "RedBlueExGalaxy");
    }

    #[test]
    fn test_read_cstring_unterminated() {
        let mem = MockMemoryBuilder::new()
            .write_bytes(0x80002000, b"AAAAAAAA")
            .build();

        assert!(mem.read_cstring(0x80002000, 4).is_err());
    }

    #[test]
    fn test_read_cstring_null_pointer() {
        let mem = MockMemoryBuilder::new().build();
        assert!(matches!(
            mem.read_cstring(0, 8),
            Err(Error::NullPointer("char*"))
        ));
    }

    #[test]
    fn test_offset_address() {
        assert_eq!(offset_address(0x80500000, 4).unwrap(), 0x80500004);
        assert_eq!(offset_address(0xFFFF_FFFB, 4).unwrap(), 0xFFFF_FFFF);
        assert!(matches!(
            offset_address(0xFFFF_FFFE, 4),
            Err(Error::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_game_id_and_target_check() {
        let mut mem = MockMemoryBuilder::new().game_id("SB4E").build();
        assert!(mem.connect());

        assert_eq!(mem.game_id().unwrap().as_str(), Some("SB4E"));
        assert!(mem.is_target_process(&["SB4P", "SB4E"]).unwrap());
        assert!(!mem.is_target_process(&["RMGE"]).unwrap());
    }
}

//! PAD file layout constants and the packet header word.
//!
//! ```text
//! Offset   Field              Size    Description
//! ──────────────────────────────────────────────────────
//! 0x00     HeaderSize         4       Always 0x40
//! 0x04     Reserved           60      Zero
//! 0x40     GameDataLength     4       Length L of the embedded game data
//! 0x44     GameData           L       Extracted save-slot block
//! ...      Packets                    Two per frame (player 1, empty player 2)
//! ...      Terminator         4       Packet header with size 192, no states
//! ...      Padding                    Zero up to a 32-byte boundary
//! ```

/// Value of the first header word
pub const HEADER_SIZE: u32 = 0x40;

/// Zero bytes following the header size
pub const HEADER_RESERVED: usize = 60;

/// Packet index distance between the last packet and the terminator
pub const TERMINATOR_INDEX_OFFSET: u32 = 32;

/// Size field of the terminator packet header
pub const TERMINATOR_SIZE: u16 = 192;

/// Files are zero-padded to this alignment
pub const ALIGNMENT: usize = 32;

/// Change bitmask written in front of every compressed status
pub const BITMASK_LEN: usize = 33;

/// Packed packet header: `index | size << 8 | states << 24`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub index: u8,
    pub size: u16,
    pub states: u8,
}

impl PacketHeader {
    /// Build a header from an unbounded packet counter (only the low byte is kept)
    pub fn new(index: u32, size: u16, states: u8) -> Self {
        Self {
            index: (index & 0xFF) as u8,
            size,
            states,
        }
    }

    /// Terminator following the packet at `next_index - 1`
    pub fn terminator(next_index: u32) -> Self {
        Self::new(next_index + TERMINATOR_INDEX_OFFSET, TERMINATOR_SIZE, 0)
    }

    /// The terminator is the only packet with a size but no states
    pub fn is_terminator(&self) -> bool {
        self.size == TERMINATOR_SIZE && self.states == 0
    }

    pub fn to_word(self) -> u32 {
        self.index as u32 | (self.size as u32) << 8 | (self.states as u32) << 24
    }

    pub fn from_word(word: u32) -> Self {
        Self {
            index: (word & 0xFF) as u8,
            size: ((word >> 8) & 0xFFFF) as u16,
            states: (word >> 24) as u8,
        }
    }
}

/// Bytes needed to pad `len` up to the next 32-byte boundary
pub fn padding_for(len: usize) -> usize {
    len.next_multiple_of(ALIGNMENT) - len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_header_packing() {
        let header = PacketHeader::new(0x1_02, 0x0123, 3);
        assert_eq!(header.index, 0x02);
        assert_eq!(header.to_word(), 0x0301_2302);
        assert_eq!(PacketHeader::from_word(0x0301_2302), header);
    }

    #[test]
    fn test_terminator() {
        let header = PacketHeader::terminator(1258);
        assert!(header.is_terminator());
        assert_eq!(header.index, ((1258 + 32) & 0xFF) as u8);
        assert_eq!(header.to_word(), 0x0000_C000 | ((1258 + 32) & 0xFF));
        assert!(!PacketHeader::new(0, 0, 0).is_terminator());
    }

    #[test]
    fn test_padding() {
        assert_eq!(padding_for(0), 0);
        assert_eq!(padding_for(1), 31);
        assert_eq!(padding_for(32), 0);
        assert_eq!(padding_for(0x4C), 20);
    }
}

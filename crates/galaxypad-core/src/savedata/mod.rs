//! GameData.bin reader.
//!
//! The save container starts with a checksummed header and a table of named
//! blocks. Player slot `n` lives in block `user<n>`; its header and sections
//! are embedded verbatim in PAD files so playback starts from that player's
//! progress.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::process::ByteBuffer;

/// Size of the container header
pub const HEADER_SIZE: usize = 0x10;

/// Block table entry: 12-byte name plus offset
pub const BLOCK_ENTRY_SIZE: usize = 0x10;
const BLOCK_NAME_LEN: usize = 12;

/// Game data header: byte 1 holds the section count
const GAME_DATA_HEADER_SIZE: usize = 4;
const SECTION_HEADER_SIZE: usize = 12;
const SECTION_LENGTH_OFFSET: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveHeader {
    pub checksum: u32,
    pub user_file_count: u32,
    pub block_count: u32,
    pub data_size: u32,
}

/// Sum over big-endian 16-bit words: high half adds the words, low half
/// adds their complements. A trailing odd byte is ignored.
pub fn memory_checksum(data: &[u8]) -> u32 {
    let (hi, lo) = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .fold((0u16, 0u16), |(hi, lo), word| {
            (hi.wrapping_add(word), lo.wrapping_add(!word))
        });
    (hi as u32) << 16 | lo as u32
}

fn corrupt(message: impl Into<String>) -> Error {
    Error::SaveData(message.into())
}

/// A parsed, checksum-verified save container
#[derive(Debug, Clone)]
pub struct SaveData {
    header: SaveHeader,
    blocks: Vec<(String, u32)>,
    bytes: Vec<u8>,
}

impl SaveData {
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(corrupt(format!("save file '{}' doesn't exist", path.display())));
        }
        if !path.is_file() {
            return Err(corrupt(format!("path '{}' is not a file", path.display())));
        }
        info!("Loading save data from {}", path.display());
        Self::parse(fs::read(path)?)
    }

    pub fn parse(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(corrupt("save data is too small"));
        }

        let mut buf = ByteBuffer::new(&bytes);
        let header = SaveHeader {
            checksum: buf.read_u32()?,
            user_file_count: buf.read_u32()?,
            block_count: buf.read_u32()?,
            data_size: buf.read_u32()?,
        };

        let calculated = memory_checksum(&bytes[4..]);
        if calculated != header.checksum {
            debug!(
                "Checksum mismatch: stored {:#010X}, calculated {:#010X}",
                header.checksum, calculated
            );
            return Err(corrupt("save data appears to be corrupted"));
        }

        let mut blocks = Vec::new();
        for _ in 0..header.block_count {
            let name = buf
                .read_padded_name(BLOCK_NAME_LEN)
                .map_err(|_| corrupt("block table is truncated"))?;
            let offset = buf.read_u32().map_err(|_| corrupt("block table is truncated"))?;
            blocks.push((name, offset));
        }

        Ok(Self {
            header,
            blocks,
            bytes,
        })
    }

    pub fn header(&self) -> &SaveHeader {
        &self.header
    }

    pub fn block_offset(&self, name: &str) -> Option<u32> {
        self.blocks
            .iter()
            .find(|(block, _)| block == name)
            .map(|&(_, offset)| offset)
    }

    /// Extract the game data block of a 1-based player slot
    pub fn extract_game_data(&self, slot: u32) -> Result<Vec<u8>> {
        if slot < 1 || slot > self.header.user_file_count {
            return Err(corrupt(format!(
                "save data does not contain data for player #{}",
                slot
            )));
        }

        let offset = self
            .block_offset(&format!("user{}", slot))
            .ok_or_else(|| {
                corrupt(format!(
                    "save data does not contain a GameData block for player #{}",
                    slot
                ))
            })?;

        let truncated = |_| corrupt(format!("GameData block for player #{} is truncated", slot));

        let mut buf = ByteBuffer::new(&self.bytes);
        buf.set_position(offset as usize).map_err(truncated)?;

        let header = buf.read_bytes(GAME_DATA_HEADER_SIZE).map_err(truncated)?;
        let section_count = header[1];
        let mut out = header.to_vec();

        for _ in 0..section_count {
            let section = buf.read_bytes(SECTION_HEADER_SIZE).map_err(truncated)?;
            let length = ByteBuffer::new(section)
                .read_u32_at(SECTION_LENGTH_OFFSET)
                .map_err(truncated)? as usize;
            let body_len = length.checked_sub(SECTION_HEADER_SIZE).ok_or_else(|| {
                corrupt(format!("section length {} is shorter than its header", length))
            })?;
            let body = buf.read_bytes(body_len).map_err(truncated)?;

            out.extend_from_slice(section);
            out.extend_from_slice(body);
        }

        info!(
            "Extracted game data for player #{} ({} sections, {} bytes)",
            slot,
            section_count,
            out.len()
        );
        Ok(out)
    }
}

/// Read a save container and extract one player slot
pub fn extract_game_data(path: &Path, slot: u32) -> Result<Vec<u8>> {
    SaveData::read(path)?.extract_game_data(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn section(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&((body.len() + SECTION_HEADER_SIZE) as u32).to_be_bytes());
        out.extend_from_slice(body);
        out
    }

    fn game_data(sections: &[Vec<u8>]) -> Vec<u8> {
        let mut out = vec![2, sections.len() as u8, 0, 0];
        for s in sections {
            out.extend_from_slice(s);
        }
        out
    }

    /// Build a container with the given named blocks and a valid checksum
    fn container(user_files: u32, blocks: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let table_end = HEADER_SIZE + blocks.len() * BLOCK_ENTRY_SIZE;
        let mut table = Vec::new();
        let mut payload = Vec::new();
        for (name, data) in blocks {
            let mut raw_name = [0u8; BLOCK_NAME_LEN];
            raw_name[..name.len()].copy_from_slice(name.as_bytes());
            table.extend_from_slice(&raw_name);
            table.extend_from_slice(&((table_end + payload.len()) as u32).to_be_bytes());
            payload.extend_from_slice(data);
        }

        let mut bytes = vec![0; 4];
        bytes.extend_from_slice(&user_files.to_be_bytes());
        bytes.extend_from_slice(&(blocks.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&((table_end + payload.len()) as u32).to_be_bytes());
        bytes.extend_from_slice(&table);
        bytes.extend_from_slice(&payload);

        let checksum = memory_checksum(&bytes[4..]);
        bytes[..4].copy_from_slice(&checksum.to_be_bytes());
        bytes
    }

    #[test]
    fn test_checksum() {
        assert_eq!(memory_checksum(&[]), 0);
        // hi = 0x0001, lo = !0x0001 = 0xFFFE
        assert_eq!(memory_checksum(&[0x00, 0x01]), 0x0001_FFFE);
        // wrapping in both halves, odd byte ignored
        assert_eq!(memory_checksum(&[0xFF, 0xFF, 0x00, 0x02, 0x7F]), 0x0001_FFFD);
    }

    #[test]
    fn test_extract_slot() {
        let user2 = game_data(&[section(b"PLAY", &[1, 2, 3, 4]), section(b"FLG1", &[9; 8])]);
        let bytes = container(
            3,
            &[
                ("user1", game_data(&[section(b"PLAY", &[7])])),
                ("user2", user2.clone()),
                ("config1", vec![0; 8]),
            ],
        );

        let save = SaveData::parse(bytes).unwrap();
        assert_eq!(save.header().user_file_count, 3);
        assert_eq!(save.header().block_count, 3);
        assert_eq!(save.extract_game_data(2).unwrap(), user2);
    }

    #[test]
    fn test_extract_ignores_trailing_data() {
        let mut block = game_data(&[section(b"PLAY", &[5; 3])]);
        let expected = block.clone();
        block.extend_from_slice(&[0xEE; 16]);

        let save = SaveData::parse(container(1, &[("user1", block)])).unwrap();
        assert_eq!(save.extract_game_data(1).unwrap(), expected);
    }

    #[test]
    fn test_rejects_bad_checksum() {
        let mut bytes = container(1, &[("user1", game_data(&[]))]);
        bytes[0] ^= 0xFF;
        let err = SaveData::parse(bytes).unwrap_err();
        assert!(err.to_string().contains("corrupted"));
    }

    #[test]
    fn test_rejects_small_file() {
        assert!(matches!(
            SaveData::parse(vec![0; 8]),
            Err(Error::SaveData(_))
        ));
    }

    #[test]
    fn test_rejects_slot_out_of_range() {
        let save = SaveData::parse(container(1, &[("user1", game_data(&[]))])).unwrap();
        assert!(save.extract_game_data(0).is_err());
        assert!(save.extract_game_data(2).is_err());
    }

    #[test]
    fn test_rejects_missing_block() {
        let save = SaveData::parse(container(2, &[("user1", game_data(&[]))])).unwrap();
        let err = save.extract_game_data(2).unwrap_err();
        assert!(err.to_string().contains("GameData block"));
    }

    #[test]
    fn test_rejects_truncated_section() {
        let mut block = game_data(&[section(b"PLAY", &[1; 20])]);
        block.truncate(block.len() - 5);
        let save = SaveData::parse(container(1, &[("user1", block)])).unwrap();
        assert!(save.extract_game_data(1).is_err());
    }

    #[test]
    fn test_extract_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("GameData.bin");
        let block = game_data(&[section(b"PLAY", &[3; 4])]);
        fs::write(&path, container(1, &[("user1", block.clone())])).unwrap();

        assert_eq!(extract_game_data(&path, 1).unwrap(), block);
        assert!(extract_game_data(temp_dir.path(), 1).is_err());
        assert!(extract_game_data(&temp_dir.path().join("missing.bin"), 1).is_err());
    }
}

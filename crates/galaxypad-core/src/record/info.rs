use strum::{Display, FromRepr};

use crate::error::Result;
use crate::process::layout::record;
use crate::process::{ByteBuffer, ReadMemory};

/// Recorder mode published by the in-game helper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr)]
#[repr(u32)]
pub enum RecorderMode {
    /// Helper placed, nothing armed
    Waiting = 0,
    /// Armed, waiting for the scene to reload at the spawn point
    Preparing = 1,
    Recording = 2,
    Stopped = 3,
}

impl RecorderMode {
    /// Modes in which no session exists yet
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Waiting | Self::Preparing)
    }
}

/// Decoded snapshot of the helper's RecordInfo block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordInfo {
    pub update_frame: u32,
    pub read_data_info: u32,
    pub raw_mode: u32,
    pub stage_name: u32,
    pub restart_id: u32,
    pub restart_zone_id: u32,
}

impl RecordInfo {
    /// Decode a RecordInfo from its raw bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let buf = ByteBuffer::new(bytes);
        let field = |offset: u32| buf.read_u32_at(offset as usize);
        Ok(Self {
            update_frame: field(record::UPDATE_FRAME)?,
            read_data_info: field(record::READ_DATA_INFO)?,
            raw_mode: field(record::RECORDER_MODE)?,
            stage_name: field(record::STAGE_NAME)?,
            restart_id: field(record::RESTART_ID)?,
            restart_zone_id: field(record::RESTART_ZONE_ID)?,
        })
    }

    /// Read the whole block in one go so all fields belong to the same frame
    pub fn read<R: ReadMemory + ?Sized>(reader: &R, address: u32) -> Result<Self> {
        let bytes = reader.read_bytes(address, record::SIZE)?;
        Self::decode(&bytes)
    }

    /// `None` for values the helper is not known to publish
    pub fn mode(&self) -> Option<RecorderMode> {
        RecorderMode::from_repr(self.raw_mode)
    }

    /// Read the galaxy name the helper points at
    pub fn read_stage_name<R: ReadMemory + ?Sized>(&self, reader: &R) -> Result<String> {
        reader.read_cstring(self.stage_name, record::MAX_STAGE_NAME_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::process::MockMemoryBuilder;

    fn record_bytes(values: [u32; 6]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    #[test]
    fn test_decode_fields() {
        let bytes = record_bytes([120, 0x80500000, 2, 0x80600000, 7, 1]);
        let info = RecordInfo::decode(&bytes).unwrap();

        assert_eq!(info.update_frame, 120);
        assert_eq!(info.read_data_info, 0x80500000);
        assert_eq!(info.mode(), Some(RecorderMode::Recording));
        assert_eq!(info.stage_name, 0x80600000);
        assert_eq!(info.restart_id, 7);
        assert_eq!(info.restart_zone_id, 1);
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = record_bytes([1, 2, 3, 4, 5, 6]);
        assert!(matches!(
            RecordInfo::decode(&bytes[..20]),
            Err(Error::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_unknown_mode() {
        let bytes = record_bytes([0, 0, 9, 0, 0, 0]);
        let info = RecordInfo::decode(&bytes).unwrap();
        assert_eq!(info.mode(), None);
        assert_eq!(info.raw_mode, 9);
    }

    #[test]
    fn test_mode_values() {
        assert_eq!(RecorderMode::from_repr(0), Some(RecorderMode::Waiting));
        assert_eq!(RecorderMode::from_repr(1), Some(RecorderMode::Preparing));
        assert_eq!(RecorderMode::from_repr(3), Some(RecorderMode::Stopped));
        assert!(RecorderMode::Preparing.is_idle());
        assert!(!RecorderMode::Stopped.is_idle());
        assert_eq!(RecorderMode::Recording.to_string(), "Recording");
    }

    #[test]
    fn test_read_with_stage_name() {
        let mem = MockMemoryBuilder::new()
            .write_bytes(0x80400000, &record_bytes([5, 0, 2, 0x80400100, 3, 0]))
            .write_cstring(0x80400100, "RedBlueExGalaxy")
            .build();

        let info = RecordInfo::read(&mem, 0x80400000).unwrap();
        assert_eq!(info.update_frame, 5);
        assert_eq!(info.read_stage_name(&mem).unwrap(), "RedBlueExGalaxy");
    }
}

//! Captured controller frames.
//!
//! A frame is whatever `KPADRead` returned for one game frame: between zero
//! and sixteen KPADStatus samples, each a fixed 240-byte record that is
//! stored verbatim.

use std::fmt;

use crate::error::{Error, Result};
use crate::process::layout::{kpad, read_data};
use crate::process::{ReadMemory, offset_address};

/// One raw KPADStatus sample
#[derive(Clone, PartialEq, Eq)]
pub struct KpadStatus([u8; kpad::STATUS_SIZE]);

impl KpadStatus {
    pub fn zeroed() -> Self {
        Self([0; kpad::STATUS_SIZE])
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; kpad::STATUS_SIZE] = bytes.try_into().map_err(|_| {
            Error::ProtocolViolation(format!(
                "KPADStatus must be {} bytes, got {}",
                kpad::STATUS_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; kpad::STATUS_SIZE] {
        &self.0
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; kpad::STATUS_SIZE] {
        &mut self.0
    }
}

impl fmt::Debug for KpadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KpadStatus({:02X?}..)", &self.0[..8])
    }
}

/// All samples read during one game frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    statuses: Vec<KpadStatus>,
}

impl Frame {
    pub fn new(statuses: Vec<KpadStatus>) -> Result<Self> {
        if statuses.len() > kpad::MAX_STATUSES_PER_FRAME {
            return Err(Error::ProtocolViolation(format!(
                "{} KPADStatus samples in one frame (max {})",
                statuses.len(),
                kpad::MAX_STATUSES_PER_FRAME
            )));
        }
        Ok(Self { statuses })
    }

    pub fn statuses(&self) -> &[KpadStatus] {
        &self.statuses
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

/// Read the frame described by a WPAD read-data info block
///
/// The block holds a pointer to the first KPADStatus and the sample count.
/// Counts above the KPAD buffer size mean the block is not what we think it
/// is and are reported as a protocol violation.
pub fn read_frame<R: ReadMemory + ?Sized>(reader: &R, read_data_info: u32) -> Result<Frame> {
    if read_data_info == 0 {
        return Err(Error::NullPointer("ReadDataInfo*"));
    }

    let array_field = offset_address(read_data_info, read_data::STATUS_ARRAY)?;
    let count_field = offset_address(read_data_info, read_data::STATUS_COUNT)?;
    let status_array = reader.read_u32(array_field)?;
    let count = reader.read_u32(count_field)? as usize;

    if count > kpad::MAX_STATUSES_PER_FRAME {
        return Err(Error::ProtocolViolation(format!(
            "ReadDataInfo at {:#010X} reports {} samples (max {})",
            read_data_info,
            count,
            kpad::MAX_STATUSES_PER_FRAME
        )));
    }
    if count == 0 {
        return Ok(Frame::default());
    }
    if status_array == 0 {
        return Err(Error::NullPointer("KPADStatus*"));
    }

    let bytes = reader.read_bytes(status_array, count * kpad::STATUS_SIZE)?;
    let statuses = bytes
        .chunks_exact(kpad::STATUS_SIZE)
        .map(KpadStatus::from_slice)
        .collect::<Result<Vec<_>>>()?;

    Frame::new(statuses)
}

/// Append-only sequence of frames for one session
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    frames: Vec<Frame>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Total number of KPADStatus samples across all frames
    pub fn status_count(&self) -> usize {
        self.frames.iter().map(Frame::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockMemoryBuilder;

    fn status(fill: u8) -> Vec<u8> {
        vec![fill; kpad::STATUS_SIZE]
    }

    #[test]
    fn test_read_frame() {
        let mut statuses = status(0x11);
        statuses.extend(status(0x22));
        let mem = MockMemoryBuilder::new()
            .write_u32(0x80500000, 0x80501000)
            .write_u32(0x80500004, 2)
            .write_bytes(0x80501000, &statuses)
            .build();

        let frame = read_frame(&mem, 0x80500000).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.statuses()[0].as_bytes()[0], 0x11);
        assert_eq!(frame.statuses()[1].as_bytes()[239], 0x22);
    }

    #[test]
    fn test_read_empty_frame() {
        let mem = MockMemoryBuilder::new()
            .write_u32(0x80500000, 0)
            .write_u32(0x80500004, 0)
            .build();

        let frame = read_frame(&mem, 0x80500000).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_read_frame_rejects_too_many_samples() {
        let mem = MockMemoryBuilder::new()
            .write_u32(0x80500000, 0x80501000)
            .write_u32(0x80500004, 17)
            .build();

        assert!(matches!(
            read_frame(&mem, 0x80500000),
            Err(Error::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_read_frame_rejects_info_at_top_of_memory() {
        let mem = MockMemoryBuilder::new().with_size(16).build();
        assert!(matches!(
            read_frame(&mem, 0xFFFF_FFFE),
            Err(Error::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_read_frame_null_info() {
        let mem = MockMemoryBuilder::new().with_size(16).build();
        assert!(matches!(
            read_frame(&mem, 0),
            Err(Error::NullPointer("ReadDataInfo*"))
        ));
    }

    #[test]
    fn test_frame_buffer_keeps_order() {
        let mut buffer = FrameBuffer::new();
        for fill in 1..=3u8 {
            let status = KpadStatus::from_slice(&status(fill)).unwrap();
            buffer.push(Frame::new(vec![status.clone(), status]).unwrap());
        }

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.status_count(), 6);
        let firsts: Vec<u8> = buffer
            .iter()
            .map(|f| f.statuses()[0].as_bytes()[0])
            .collect();
        assert_eq!(firsts, vec![1, 2, 3]);
    }

    #[test]
    fn test_status_size_enforced() {
        assert!(KpadStatus::from_slice(&[0; 10]).is_err());
    }
}

//! Optional frame-history ring.
//!
//! Some helper builds keep the read-data info of the last few frames in a
//! ring so a poller that wakes up late can still collect every frame. The
//! ring pointer lives inside RecordInfo at a build-specific offset and each
//! entry has the same shape as a read-data info block.

use crate::error::{Error, Result};
use crate::process::layout::{read_data, record, timing};
use crate::process::{ReadMemory, offset_address};
use crate::record::frame::{Frame, read_frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLayout {
    /// Offset of the ring pointer from the start of RecordInfo
    pub pointer_offset: u32,
    /// Number of entries in the ring
    pub capacity: u32,
}

impl HistoryLayout {
    pub fn new(pointer_offset: u32, capacity: u32) -> Result<Self> {
        if capacity == 0 || capacity > timing::MAX_FRAME_JUMP {
            return Err(Error::InvalidConfig(format!(
                "history ring capacity must be between 1 and {}",
                timing::MAX_FRAME_JUMP
            )));
        }
        if pointer_offset < record::SIZE as u32 || pointer_offset % record::WORD != 0 {
            return Err(Error::InvalidConfig(format!(
                "history pointer offset {:#X} must be word aligned and past the RecordInfo fields",
                pointer_offset
            )));
        }
        Ok(Self {
            pointer_offset,
            capacity,
        })
    }

    /// Whether a jump of `advance` frames still fits in the ring.
    ///
    /// The newest frame occupies one slot, so the ring covers at most
    /// `capacity` frames including it.
    pub fn covers(&self, advance: u32) -> bool {
        advance <= self.capacity
    }

    /// Address of the ring entry for a frame counter value
    pub fn entry_address(&self, ring: u32, frame: u32) -> Result<u32> {
        // capacity is bounded in `new`, so the slot offset itself cannot overflow
        let slot_offset = (frame % self.capacity) * read_data::SIZE as u32;
        offset_address(ring, slot_offset)
    }

    /// Read one historic frame out of the ring
    pub fn read_frame<R: ReadMemory + ?Sized>(
        &self,
        reader: &R,
        record_info: u32,
        frame: u32,
    ) -> Result<Frame> {
        let ring_field = offset_address(record_info, self.pointer_offset)?;
        let ring = reader.read_pointer(ring_field, "history ring")?;
        read_frame(reader, self.entry_address(ring, frame)?)
    }
}

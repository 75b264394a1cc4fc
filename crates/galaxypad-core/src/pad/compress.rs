//! Delta compression of KPADStatus records.
//!
//! Each status is stored as a change bitmask followed by the bytes that
//! differ from the previously stored status. The previous status is shared
//! across every frame of a file and starts out zeroed.

use crate::error::{Error, Result};
use crate::pad::format::BITMASK_LEN;
use crate::process::ByteBuffer;
use crate::process::layout::kpad::STATUS_SIZE;
use crate::record::KpadStatus;

#[derive(Debug, Clone)]
pub struct StatusCompressor {
    previous: KpadStatus,
}

impl Default for StatusCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCompressor {
    pub fn new() -> Self {
        Self {
            previous: KpadStatus::zeroed(),
        }
    }

    /// Compress one frame's statuses, appending to `out`
    pub fn compress(&mut self, statuses: &[KpadStatus], out: &mut Vec<u8>) {
        for status in statuses {
            let mut mask = [0u8; BITMASK_LEN];
            let mut changed = Vec::new();
            let previous = self.previous.as_bytes_mut();

            for (i, &byte) in status.as_bytes().iter().enumerate() {
                if byte != previous[i] {
                    previous[i] = byte;
                    changed.push(byte);
                    mask[i / 8] |= 1 << (i % 8);
                }
            }

            out.extend_from_slice(&mask);
            out.extend_from_slice(&changed);
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusDecompressor {
    previous: KpadStatus,
}

impl Default for StatusDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusDecompressor {
    pub fn new() -> Self {
        Self {
            previous: KpadStatus::zeroed(),
        }
    }

    /// Decompress exactly `count` statuses from `payload`.
    ///
    /// The payload must be consumed completely. Mask bits beyond the status
    /// size and bytes marked as changed without a change are rejected, so a
    /// decoded file always compresses back to the same bytes.
    pub fn decompress(&mut self, payload: &[u8], count: usize) -> Result<Vec<KpadStatus>> {
        let mut buf = ByteBuffer::new(payload);
        let mut statuses = Vec::with_capacity(count);

        for _ in 0..count {
            let mask = buf.read_bytes(BITMASK_LEN).map_err(|_| {
                Error::InvalidPad("compressed status is missing its change mask".to_string())
            })?;

            if mask[STATUS_SIZE / 8..].iter().any(|&b| b != 0) {
                return Err(Error::InvalidPad(
                    "change mask marks bytes past the end of a status".to_string(),
                ));
            }

            let previous = self.previous.as_bytes_mut();
            for i in 0..STATUS_SIZE {
                if mask[i / 8] & (1 << (i % 8)) == 0 {
                    continue;
                }
                let byte = buf.read_u8().map_err(|_| {
                    Error::InvalidPad("compressed status overruns its packet".to_string())
                })?;
                if byte == previous[i] {
                    return Err(Error::InvalidPad(format!(
                        "byte {} marked as changed but equals the previous value",
                        i
                    )));
                }
                previous[i] = byte;
            }

            statuses.push(self.previous.clone());
        }

        if buf.remaining() != 0 {
            return Err(Error::InvalidPad(format!(
                "{} trailing bytes in packet payload",
                buf.remaining()
            )));
        }

        Ok(statuses)
    }
}

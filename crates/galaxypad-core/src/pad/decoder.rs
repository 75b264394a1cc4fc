//! PAD file parsing.
//!
//! The decoder is strict: anything the encoder would not have produced is
//! rejected, which makes `decode` followed by `encode` the identity on valid
//! files.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::pad::compress::StatusDecompressor;
use crate::pad::encoder::encode_pad;
use crate::pad::format::{HEADER_RESERVED, HEADER_SIZE, PacketHeader, padding_for};
use crate::process::ByteBuffer;
use crate::process::layout::{kpad, timing};
use crate::record::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadHeader {
    pub header_size: u32,
    /// Number of frames, derived from the packet stream
    pub frame_count: u32,
}

/// Figures reported by `galaxypad inspect`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PadSummary {
    pub header_size: u32,
    pub frame_count: u32,
    pub status_count: usize,
    pub game_data_len: usize,
    pub approx_seconds: u64,
    /// Most statuses seen in a single frame
    pub max_statuses_per_frame: usize,
}

/// A decoded PAD file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadFile {
    pub header: PadHeader,
    pub game_data: Vec<u8>,
    pub frames: Vec<Frame>,
}

fn truncated(what: &'static str) -> impl FnOnce(Error) -> Error {
    move |_| Error::InvalidPad(format!("file ends inside {}", what))
}

impl PadFile {
    pub fn new(game_data: Vec<u8>, frames: Vec<Frame>) -> Self {
        Self {
            header: PadHeader {
                header_size: HEADER_SIZE,
                frame_count: frames.len() as u32,
            },
            game_data,
            frames,
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::decode(&bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut buf = ByteBuffer::new(bytes);

        let header_size = buf.read_u32().map_err(truncated("the header"))?;
        if header_size != HEADER_SIZE {
            return Err(Error::InvalidPad(format!(
                "header size is {:#X}, expected {:#X}",
                header_size, HEADER_SIZE
            )));
        }
        let reserved = buf
            .read_bytes(HEADER_RESERVED)
            .map_err(truncated("the header"))?;
        if reserved.iter().any(|&b| b != 0) {
            return Err(Error::InvalidPad("reserved header bytes are not zero".to_string()));
        }

        let game_data_len = buf.read_u32().map_err(truncated("the game data length"))?;
        let game_data = buf
            .read_bytes(game_data_len as usize)
            .map_err(truncated("the game data"))?
            .to_vec();

        let mut decompressor = StatusDecompressor::new();
        let mut frames = Vec::new();
        let mut index: u32 = 0;

        loop {
            let word = buf.read_u32().map_err(truncated("the packet stream"))?;
            let header = PacketHeader::from_word(word);

            if header.is_terminator() {
                let expected = PacketHeader::terminator(index);
                if header != expected {
                    return Err(Error::InvalidPad(format!(
                        "terminator index is {}, expected {} after {} frames",
                        header.index,
                        expected.index,
                        frames.len()
                    )));
                }
                break;
            }

            let player1 = PacketHeader::new(index, header.size, header.states);
            if header != player1 {
                return Err(Error::InvalidPad(format!(
                    "packet index is {}, expected {}",
                    header.index, player1.index
                )));
            }
            if header.states as usize > kpad::MAX_STATUSES_PER_FRAME {
                return Err(Error::InvalidPad(format!(
                    "frame {} holds {} statuses",
                    frames.len(),
                    header.states
                )));
            }

            let payload = buf
                .read_bytes(header.size as usize)
                .map_err(truncated("a packet"))?;
            let statuses = decompressor.decompress(payload, header.states as usize)?;
            frames.push(Frame::new(statuses)?);

            let word = buf.read_u32().map_err(truncated("the packet stream"))?;
            let player2 = PacketHeader::new(index.wrapping_add(1), 0, 0);
            if PacketHeader::from_word(word) != player2 {
                return Err(Error::InvalidPad(format!(
                    "expected an empty player 2 packet with index {}, got {:#010X}",
                    player2.index, word
                )));
            }

            index = index.wrapping_add(2);
        }

        let padding = buf.rest();
        if padding.len() != padding_for(buf.position()) || padding.iter().any(|&b| b != 0) {
            return Err(Error::InvalidPad(format!(
                "{} bytes after the terminator, expected {} bytes of zero padding",
                padding.len(),
                padding_for(buf.position())
            )));
        }

        Ok(Self::new(game_data, frames))
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_pad(&self.game_data, &self.frames)
    }

    pub fn frame_count(&self) -> u32 {
        self.header.frame_count
    }

    /// Total KPADStatus samples over all frames
    pub fn status_count(&self) -> usize {
        self.frames.iter().map(Frame::len).sum()
    }

    /// Whole seconds of input at 60 frames per second
    pub fn approx_seconds(&self) -> u64 {
        self.frame_count() as u64 / timing::FRAMES_PER_SECOND
    }

    pub fn summary(&self) -> PadSummary {
        PadSummary {
            header_size: self.header.header_size,
            frame_count: self.frame_count(),
            status_count: self.status_count(),
            game_data_len: self.game_data.len(),
            approx_seconds: self.approx_seconds(),
            max_statuses_per_frame: self.frames.iter().map(Frame::len).max().unwrap_or(0),
        }
    }
}

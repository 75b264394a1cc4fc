//! # galaxypad-core
//!
//! Core library for recording Super Mario Galaxy 2 controller input from
//! Dolphin into PAD files.
//!
//! This crate provides:
//! - Read-only access to the emulated console's memory
//! - Decoding of the `PadRecordHelper` control block and KPAD frames
//! - The capture state machine and its polling loop
//! - PAD file encoding, decoding and collision-free atomic writes
//! - GameData.bin save-slot extraction

pub mod capture;
pub mod config;
pub mod error;
pub mod game;
pub mod pad;
pub mod process;
pub mod record;
pub mod savedata;
pub mod shutdown;

// Re-export from capture module
pub use capture::{CaptureEvent, CaptureMachine, CaptureState, Session};

// Re-export from config module
pub use config::{CaptureConfig, CaptureConfigBuilder};

// Re-export from error module
pub use error::{Error, Result};

// Re-export from game module
pub use game::{GameId, SUPPORTED_GAME_IDS};

// Re-export from pad module
pub use pad::{PadFile, PadHeader, PadSummary, SessionNamer, encode_pad};

// Re-export from process module
pub use process::{ByteBuffer, DolphinAccessor, MemoryAccessor, ReadMemory};

// Re-export from record module
pub use record::{Frame, FrameBuffer, HistoryLayout, KpadStatus, RecordInfo, RecorderMode};

// Re-export from savedata module
pub use savedata::{SaveData, extract_game_data};

// Re-export from shutdown module
pub use shutdown::ShutdownSignal;

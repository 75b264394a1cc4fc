//! Memory layout constants for the emulated console and the recorder helper
//!
//! This module centralizes every address, offset and size the capture code
//! relies on. The RecordInfo layout mirrors the `PadRecordHelper`
//! instrumentation compiled into the game; the emulator constants describe
//! how Dolphin exposes the console's RAM.
//!
//! # Memory Structure Overview
//!
//! - **RecordInfo**: control block published by the helper, found through a
//!   pointer at a fixed address in low MEM1
//! - **ReadDataInfo**: the current frame's WPAD read result (status array + count)
//! - **KPADStatus**: one controller sample, copied verbatim into PAD files

/// Emulated console memory regions
pub mod emu {
    /// Start of cached MEM1 as seen by the game
    pub const MEM1_START: u32 = 0x8000_0000;

    /// Size of the MEM1 mapping Dolphin exposes (24 MiB used, 32 MiB mapped)
    pub const MEM1_SIZE: usize = 0x0200_0000;

    /// Physical start of MEM2 (cached mirror at 0x90000000)
    pub const MEM2_PHYSICAL_START: u32 = 0x1000_0000;

    /// Size of MEM2 on the Wii
    pub const MEM2_SIZE: usize = 0x0400_0000;

    /// Mask stripping the cached/uncached segment bits from an effective address
    pub const PHYSICAL_MASK: u32 = 0x3FFF_FFFF;

    /// File offset of MEM2 inside Dolphin's shared memory object (Linux)
    pub const MEM2_SHM_OFFSET: u64 = 0x0204_0000;

    /// Game ID lives in the first four bytes of MEM1
    pub const GAME_ID_ADDRESS: u32 = MEM1_START;

    /// Length of the game ID
    pub const GAME_ID_LEN: usize = 4;
}

/// Memory layout constants for the RecordInfo structure
///
/// # Structure Layout
///
/// ```text
/// Offset   Field              Size    Description
/// ──────────────────────────────────────────────────────
/// 0x00     UpdateFrame        4       Frame counter, advances once per game frame
/// 0x04     ReadDataInfo*      4       Current frame's WPAD read result
/// 0x08     RecorderMode       4       0 waiting, 1 preparing, 2 recording, 3 stopped
/// 0x0C     StageName*         4       NUL-terminated galaxy name
/// 0x10     RestartId          4       Spawn ID that started the recording
/// 0x14     RestartZoneId      4       Zone the spawn belongs to
/// ```
pub mod record {
    /// Default address of the `RecordInfo*` published by the helper
    pub const DEFAULT_POINTER_ADDRESS: u32 = 0x8000_3FFC;

    pub const WORD: u32 = 4;

    pub const UPDATE_FRAME: u32 = 0;
    pub const READ_DATA_INFO: u32 = WORD;
    pub const RECORDER_MODE: u32 = WORD * 2;
    pub const STAGE_NAME: u32 = WORD * 3;
    pub const RESTART_ID: u32 = WORD * 4;
    pub const RESTART_ZONE_ID: u32 = WORD * 5;

    /// Bytes read per poll
    pub const SIZE: usize = (WORD * 6) as usize;

    /// Longest stage name accepted before the string is considered garbage
    pub const MAX_STAGE_NAME_LEN: usize = 64;
}

/// Memory layout constants for the WPAD read-data info block
pub mod read_data {
    pub const STATUS_ARRAY: u32 = 0;
    pub const STATUS_COUNT: u32 = 4;

    /// Size of one entry (also the size of a history ring entry)
    pub const SIZE: usize = 8;
}

/// KPADStatus record constants
pub mod kpad {
    /// Size of one KPADStatus in bytes
    pub const STATUS_SIZE: usize = 0xF0;

    /// KPADRead never returns more samples than its ring buffer holds
    pub const MAX_STATUSES_PER_FRAME: usize = 16;
}

/// Timing constants for polling
pub mod timing {
    /// Interval between RecordInfo polls (ms), about a quarter of a 60 Hz frame
    pub const POLL_INTERVAL_MS: u64 = 4;

    /// Frames per second used for the duration estimate in summaries
    pub const FRAMES_PER_SECOND: u64 = 60;

    /// Largest counter advance between two polls accepted as real (one
    /// minute of frames). Anything larger means RecordInfo holds garbage.
    pub const MAX_FRAME_JUMP: u32 = 3600;
}

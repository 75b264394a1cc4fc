use std::fmt;
use std::path::PathBuf;

use crate::game::GameId;
use crate::process::layout::timing;

/// Something the capture machine wants the user to know about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    WaitingForDolphin,
    Hooked { game_id: GameId },
    UnsupportedGame { game_id: GameId },
    SearchingPointer { address: u32 },
    WaitingForRecording,
    HelperMoved { from: u32, to: u32 },
    HelperLost,
    /// Recording was already running when the helper was first seen
    AlreadyRecording,
    RecordingStarted { spawn_id: u32, level: String },
    FrameGap { from: u32, to: u32, missing: u32 },
    RecordingStopped { frames: usize },
    /// Stopped without ever recording; an empty file is written
    EmptyRecording { spawn_id: u32, level: String },
    RecordingAborted { frames: usize, reason: String },
    RecordingDiscarded { frames: usize, reason: String },
    ConnectionLost { reason: String },
    Dumped { frames: usize, gaps: u32, path: PathBuf },
}

impl CaptureEvent {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            CaptureEvent::UnsupportedGame { .. }
                | CaptureEvent::HelperLost
                | CaptureEvent::AlreadyRecording
                | CaptureEvent::FrameGap { .. }
                | CaptureEvent::EmptyRecording { .. }
                | CaptureEvent::RecordingAborted { .. }
                | CaptureEvent::RecordingDiscarded { .. }
                | CaptureEvent::ConnectionLost { .. }
        )
    }
}

impl fmt::Display for CaptureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureEvent::WaitingForDolphin => write!(f, "Waiting for Dolphin..."),
            CaptureEvent::Hooked { game_id } => {
                write!(f, "Hooked to Dolphin, game ID is {}!", game_id)
            }
            CaptureEvent::UnsupportedGame { game_id } => write!(
                f,
                "WARNING! Detected game's ID {} does not appear to be SMG2, tool may fail!",
                game_id
            ),
            CaptureEvent::SearchingPointer { address } => {
                write!(f, "Searching for PadRecorderInfo* at 0x{:08X}...", address)
            }
            CaptureEvent::WaitingForRecording => write!(f, "Waiting for PadRecordHelper..."),
            CaptureEvent::HelperMoved { from, to } => write!(
                f,
                "PadRecorderInfo moved from 0x{:08X} to 0x{:08X}",
                from, to
            ),
            CaptureEvent::HelperLost => {
                write!(f, "PadRecorderInfo* was cleared, searching again...")
            }
            CaptureEvent::AlreadyRecording => write!(
                f,
                "Recording is already in progress! Wait for scene to reset, then start again!"
            ),
            CaptureEvent::RecordingStarted { spawn_id, level } => {
                write!(f, "Started recording for spawn ID {} in {}!", spawn_id, level)
            }
            CaptureEvent::FrameGap { from, to, missing } => write!(
                f,
                "Missed {} frame(s) between frame {} and frame {}!",
                missing, from, to
            ),
            CaptureEvent::RecordingStopped { .. } => write!(f, "Stopped recording!"),
            CaptureEvent::EmptyRecording { spawn_id, level } => write!(
                f,
                "Recording for spawn ID {} in {} stopped before the first frame, writing an empty file!",
                spawn_id, level
            ),
            CaptureEvent::RecordingAborted { frames, reason } => {
                write!(f, "Aborted recording after {} frames: {}", frames, reason)
            }
            CaptureEvent::RecordingDiscarded { frames, reason } => {
                write!(f, "Discarded recording of {} frames: {}", frames, reason)
            }
            CaptureEvent::ConnectionLost { reason } => {
                write!(f, "Lost connection to Dolphin: {}", reason)
            }
            CaptureEvent::Dumped { frames, gaps, path } => {
                write!(
                    f,
                    "Dumped {} KPAD frames (approx. {} seconds) to '{}'.",
                    frames,
                    *frames as u64 / timing::FRAMES_PER_SECOND,
                    path.display()
                )?;
                if *gaps > 0 {
                    write!(f, " {} frame(s) could not be captured.", gaps)?;
                }
                Ok(())
            }
        }
    }
}

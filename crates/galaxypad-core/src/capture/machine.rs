//! Capture state machine.
//!
//! Every `poll` performs the single action of the current state and returns
//! the status events it produced. Expected conditions (no emulator, NULL
//! pointer, helper not recording) never surface as errors; a read fault drops
//! the connection and any session in flight. Only fatal conditions are
//! returned as `Err`.

use std::path::PathBuf;

use tracing::{debug, info, trace, warn};

use crate::capture::event::CaptureEvent;
use crate::capture::session::Session;
use crate::capture::state::CaptureState;
use crate::config::CaptureConfig;
use crate::error::{Error, Result};
use crate::game::SUPPORTED_GAME_IDS;
use crate::pad::{SessionNamer, encode_pad, write_pad_atomic};
use crate::process::MemoryAccessor;
use crate::process::layout::timing;
use crate::record::{Frame, RecordInfo, RecordLocator, RecorderMode, Refresh, read_frame};

pub struct CaptureMachine<A: MemoryAccessor> {
    accessor: A,
    config: CaptureConfig,
    namer: SessionNamer,
    locator: RecordLocator,
    state: CaptureState,
    /// Mode seen on the previous poll; `None` right after (re)resolving
    last_mode: Option<RecorderMode>,
    session: Option<Session>,
    written: Vec<PathBuf>,
    started: bool,
}

impl<A: MemoryAccessor> CaptureMachine<A> {
    pub fn new(accessor: A, config: CaptureConfig) -> Self {
        Self {
            namer: config.namer(),
            locator: RecordLocator::new(config.pointer_address),
            accessor,
            config,
            state: CaptureState::Disconnected,
            last_mode: None,
            session: None,
            written: Vec::new(),
            started: false,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    pub fn accessor_mut(&mut self) -> &mut A {
        &mut self.accessor
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Files written so far, in order
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }

    /// Run one poll of the current state
    pub fn poll(&mut self) -> Result<Vec<CaptureEvent>> {
        let mut events = Vec::new();

        if !self.started {
            self.started = true;
            events.push(CaptureEvent::WaitingForDolphin);
        }

        let result = match self.state {
            CaptureState::Disconnected => self.poll_disconnected(),
            CaptureState::Connecting => self.poll_connecting(&mut events),
            CaptureState::WaitingForHelper => self.poll_waiting_for_helper(&mut events),
            CaptureState::Idle => self.poll_idle(&mut events),
            CaptureState::Recording => self.poll_recording(&mut events),
            CaptureState::Finalizing => self.finalize(&mut events),
        };

        match result {
            Ok(()) => Ok(events),
            Err(e) if e.is_read_fault() => {
                self.handle_connection_loss(&e, &mut events);
                Ok(events)
            }
            Err(e) => Err(e),
        }
    }

    /// Stop capturing. A finished session is still written, one in progress
    /// is discarded.
    pub fn shutdown(&mut self) -> Result<Vec<CaptureEvent>> {
        let mut events = Vec::new();

        match self.state {
            CaptureState::Finalizing => self.finalize(&mut events)?,
            CaptureState::Recording => {
                if let Some(session) = self.session.take() {
                    events.push(CaptureEvent::RecordingDiscarded {
                        frames: session.frame_count(),
                        reason: "capture cancelled".to_string(),
                    });
                }
            }
            _ => {}
        }

        self.accessor.disconnect();
        self.locator.reset();
        self.last_mode = None;
        self.transition(CaptureState::Disconnected);
        Ok(events)
    }

    fn transition(&mut self, to: CaptureState) {
        if !CaptureState::is_valid_transition(self.state, to) {
            warn!(
                "Invalid state transition: {} -> {}, keeping {}",
                self.state, to, self.state
            );
            return;
        }
        if self.state != to {
            debug!("State changed: {} -> {}", self.state, to);
        }
        self.state = to;
    }

    fn poll_disconnected(&mut self) -> Result<()> {
        if self.accessor.connect() {
            self.transition(CaptureState::Connecting);
        }
        Ok(())
    }

    fn poll_connecting(&mut self, events: &mut Vec<CaptureEvent>) -> Result<()> {
        let game_id = self.accessor.game_id()?;
        if game_id.is_uninitialized() {
            trace!("Game ID not initialized yet");
            return Ok(());
        }

        info!("Game ID {} ({})", game_id, game_id.region());
        events.push(CaptureEvent::Hooked { game_id });

        if !self.accessor.is_target_process(SUPPORTED_GAME_IDS)? {
            if self.config.strict_game_check {
                return Err(Error::UnsupportedGame(game_id.to_string()));
            }
            events.push(CaptureEvent::UnsupportedGame { game_id });
        }

        self.locator.reset();
        events.push(CaptureEvent::SearchingPointer {
            address: self.locator.pointer_address(),
        });
        self.transition(CaptureState::WaitingForHelper);
        Ok(())
    }

    fn poll_waiting_for_helper(&mut self, events: &mut Vec<CaptureEvent>) -> Result<()> {
        match self.locator.resolve(&self.accessor) {
            Ok(address) => {
                info!("Found RecordInfo at {:#010X}", address);
                self.last_mode = None;
                events.push(CaptureEvent::WaitingForRecording);
                self.transition(CaptureState::Idle);
                Ok(())
            }
            Err(e) if e.is_transient() => {
                trace!("{}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn poll_idle(&mut self, events: &mut Vec<CaptureEvent>) -> Result<()> {
        let address = match self.locator.refresh(&self.accessor)? {
            Refresh::Unchanged(address) => address,
            Refresh::Moved { from, to } => {
                events.push(CaptureEvent::HelperMoved { from, to });
                self.last_mode = None;
                to
            }
            Refresh::Lost => {
                self.last_mode = None;
                events.push(CaptureEvent::HelperLost);
                events.push(CaptureEvent::SearchingPointer {
                    address: self.locator.pointer_address(),
                });
                self.transition(CaptureState::WaitingForHelper);
                return Ok(());
            }
        };

        let info = RecordInfo::read(&self.accessor, address)?;
        let Some(mode) = info.mode() else {
            trace!("Unknown recorder mode {}", info.raw_mode);
            return Ok(());
        };

        match (self.last_mode.replace(mode), mode) {
            (None, RecorderMode::Recording) => events.push(CaptureEvent::AlreadyRecording),
            (None, _) => {}
            (Some(previous), RecorderMode::Recording) if previous != RecorderMode::Recording => {
                self.open_session(&info, events)?;
                if self.session.is_some() {
                    self.transition(CaptureState::Recording);
                }
            }
            (Some(previous), RecorderMode::Stopped) if previous.is_idle() => {
                self.open_session(&info, events)?;
                if let Some(session) = &self.session {
                    events.push(CaptureEvent::EmptyRecording {
                        spawn_id: session.spawn_id,
                        level: session.level_name.clone(),
                    });
                    self.transition(CaptureState::Finalizing);
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Start a session for the current RecordInfo. A stage name that cannot
    /// be read skips the session instead of guessing where to write it.
    fn open_session(&mut self, info: &RecordInfo, events: &mut Vec<CaptureEvent>) -> Result<()> {
        let level = match info.read_stage_name(&self.accessor) {
            Ok(level) => level,
            Err(e) if e.is_read_fault() => return Err(e),
            Err(e) => {
                warn!("Cannot read stage name: {}", e);
                events.push(CaptureEvent::RecordingAborted {
                    frames: 0,
                    reason: format!("stage name unreadable ({})", e),
                });
                return Ok(());
            }
        };

        info!(
            "Recording spawn {} (zone {}) in {} from frame {}",
            info.restart_id, info.restart_zone_id, level, info.update_frame
        );
        events.push(CaptureEvent::RecordingStarted {
            spawn_id: info.restart_id,
            level: level.clone(),
        });
        self.session = Some(Session::new(
            level,
            info.restart_id,
            info.restart_zone_id,
            info.update_frame,
        ));
        Ok(())
    }

    fn poll_recording(&mut self, events: &mut Vec<CaptureEvent>) -> Result<()> {
        let Some(address) = self.locator.resolved() else {
            self.abort_session("RecordInfo address lost", events);
            return Ok(());
        };

        let info = RecordInfo::read(&self.accessor, address)?;
        self.last_mode = info.mode();

        match info.mode() {
            Some(RecorderMode::Recording) => self.ingest(address, &info, events),
            Some(RecorderMode::Stopped) => {
                let frames = self.session.as_ref().map_or(0, Session::frame_count);
                events.push(CaptureEvent::RecordingStopped { frames });
                self.transition(CaptureState::Finalizing);
                Ok(())
            }
            Some(mode) => {
                self.abort_session(&format!("helper went back to {}", mode), events);
                Ok(())
            }
            None => {
                self.abort_session(&format!("unknown recorder mode {}", info.raw_mode), events);
                Ok(())
            }
        }
    }

    /// Append every frame between the last consumed counter and the current one
    fn ingest(
        &mut self,
        address: u32,
        info: &RecordInfo,
        events: &mut Vec<CaptureEvent>,
    ) -> Result<()> {
        let Some(last) = self.session.as_ref().map(Session::last_counter) else {
            return Ok(());
        };

        let current = info.update_frame;
        let delta = current.wrapping_sub(last) as i32;
        if delta < 0 {
            self.abort_session(
                &format!("frame counter went back from {} to {}", last, current),
                events,
            );
            return Ok(());
        }
        if delta == 0 {
            return Ok(());
        }
        let advance = delta as u32;

        match self.collect_frames(address, info, last, advance, events) {
            Ok((frames, missing)) => {
                if let Some(session) = self.session.as_mut() {
                    if missing > 0 {
                        session.record_gap(missing);
                    }
                    session.extend(frames, current);
                }
                Ok(())
            }
            Err(e) if e.is_read_fault() => Err(e),
            Err(e) => {
                self.abort_session(&e.to_string(), events);
                Ok(())
            }
        }
    }

    /// Read the frames for `last + 1 ..= last + advance`.
    ///
    /// The newest frame always comes from the current read-data info; older
    /// ones only exist in the history ring. Returns the frames plus the
    /// number that could not be recovered.
    fn collect_frames(
        &self,
        address: u32,
        info: &RecordInfo,
        last: u32,
        advance: u32,
        events: &mut Vec<CaptureEvent>,
    ) -> Result<(Vec<Frame>, u32)> {
        if advance > timing::MAX_FRAME_JUMP {
            return Err(Error::ProtocolViolation(format!(
                "frame counter jumped from {} to {} ({} frames, max {})",
                last,
                info.update_frame,
                advance,
                timing::MAX_FRAME_JUMP
            )));
        }

        let mut missing = 0;
        let mut frames = Vec::new();

        if advance > 1 {
            match self.config.history {
                Some(history) if history.covers(advance) => {
                    frames.reserve(advance as usize);
                    for k in 1..advance {
                        let counter = last.wrapping_add(k);
                        frames.push(history.read_frame(&self.accessor, address, counter)?);
                    }
                    debug!("Back-filled {} frame(s) from the history ring", advance - 1);
                }
                _ => {
                    missing = advance - 1;
                    warn!(
                        "Frame counter jumped from {} to {}, {} frame(s) lost",
                        last, info.update_frame, missing
                    );
                    events.push(CaptureEvent::FrameGap {
                        from: last,
                        to: info.update_frame,
                        missing,
                    });
                }
            }
        }

        frames.push(read_frame(&self.accessor, info.read_data_info)?);
        Ok((frames, missing))
    }

    fn abort_session(&mut self, reason: &str, events: &mut Vec<CaptureEvent>) {
        warn!("Aborting recording: {}", reason);
        if let Some(session) = self.session.take() {
            events.push(CaptureEvent::RecordingAborted {
                frames: session.frame_count(),
                reason: reason.to_string(),
            });
        }
        self.transition(CaptureState::Idle);
    }

    fn finalize(&mut self, events: &mut Vec<CaptureEvent>) -> Result<()> {
        if let Some(session) = &self.session {
            let bytes = encode_pad(&self.config.game_data, session.frames().as_slice());
            let path =
                write_pad_atomic(&self.namer, &session.level_name, session.spawn_id, &bytes)?;

            info!(
                "Wrote {} frames ({} bytes) recorded since {} to {}",
                session.frame_count(),
                bytes.len(),
                session.started_at.format("%H:%M:%S"),
                path.display()
            );
            events.push(CaptureEvent::Dumped {
                frames: session.frame_count(),
                gaps: session.gap_count(),
                path: path.clone(),
            });
            self.written.push(path);
        }

        self.session = None;
        self.transition(CaptureState::Idle);
        Ok(())
    }

    fn handle_connection_loss(&mut self, error: &Error, events: &mut Vec<CaptureEvent>) {
        info!("Connection lost in state {}: {}", self.state, error);

        if let Some(session) = self.session.take() {
            events.push(CaptureEvent::RecordingDiscarded {
                frames: session.frame_count(),
                reason: "connection lost".to_string(),
            });
        }

        self.accessor.disconnect();
        self.locator.reset();
        self.last_mode = None;
        events.push(CaptureEvent::ConnectionLost {
            reason: error.to_string(),
        });
        events.push(CaptureEvent::WaitingForDolphin);
        self.transition(CaptureState::Disconnected);
    }
}

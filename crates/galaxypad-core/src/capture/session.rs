use chrono::{DateTime, Local};

use crate::record::{Frame, FrameBuffer};

/// One recording, from the edge into Recording until it is written or dropped
#[derive(Debug, Clone)]
pub struct Session {
    pub level_name: String,
    pub spawn_id: u32,
    pub zone_id: u32,
    pub started_at: DateTime<Local>,
    /// Counter value of the last consumed frame
    last_counter: u32,
    frames: FrameBuffer,
    gaps: u32,
}

impl Session {
    pub fn new(level_name: String, spawn_id: u32, zone_id: u32, baseline: u32) -> Self {
        Self {
            level_name,
            spawn_id,
            zone_id,
            started_at: Local::now(),
            last_counter: baseline,
            frames: FrameBuffer::new(),
            gaps: 0,
        }
    }

    pub fn last_counter(&self) -> u32 {
        self.last_counter
    }

    /// Append the frames collected up to `counter`
    pub fn extend(&mut self, frames: Vec<Frame>, counter: u32) {
        for frame in frames {
            self.frames.push(frame);
        }
        self.last_counter = counter;
    }

    pub fn record_gap(&mut self, missing: u32) {
        self.gaps += missing;
    }

    pub fn frames(&self) -> &FrameBuffer {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frames that could not be captured
    pub fn gap_count(&self) -> u32 {
        self.gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_moves_counter() {
        let mut session = Session::new("Level".to_string(), 2, 0, 100);
        assert_eq!(session.last_counter(), 100);
        assert_eq!(session.frame_count(), 0);

        session.extend(vec![Frame::default(), Frame::default()], 102);
        assert_eq!(session.last_counter(), 102);
        assert_eq!(session.frame_count(), 2);

        session.record_gap(3);
        session.record_gap(1);
        assert_eq!(session.gap_count(), 4);
    }
}

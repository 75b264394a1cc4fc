use strum::Display;

/// State of the capture machine
///
/// ## State Transition Rules
///
/// Valid transitions:
/// - Disconnected -> Connecting (hooked the emulator)
/// - Connecting -> WaitingForHelper (game ID accepted)
/// - WaitingForHelper -> Idle (RecordInfo pointer resolved)
/// - Idle -> Recording | Finalizing (recording started, or stopped before the first frame)
/// - Idle -> WaitingForHelper (pointer cleared)
/// - Recording -> Finalizing (recording stopped)
/// - Recording -> Idle (session aborted)
/// - Finalizing -> Idle (file written)
/// - any -> Disconnected (connection lost)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CaptureState {
    Disconnected,
    Connecting,
    WaitingForHelper,
    Idle,
    Recording,
    Finalizing,
}

impl CaptureState {
    /// Check if a state transition is valid
    pub fn is_valid_transition(from: CaptureState, to: CaptureState) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (_, CaptureState::Disconnected)
                | (CaptureState::Disconnected, CaptureState::Connecting)
                | (CaptureState::Connecting, CaptureState::WaitingForHelper)
                | (CaptureState::WaitingForHelper, CaptureState::Idle)
                | (CaptureState::Idle, CaptureState::Recording)
                | (CaptureState::Idle, CaptureState::Finalizing)
                | (CaptureState::Idle, CaptureState::WaitingForHelper)
                | (CaptureState::Recording, CaptureState::Finalizing)
                | (CaptureState::Recording, CaptureState::Idle)
                | (CaptureState::Finalizing, CaptureState::Idle)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        use CaptureState::*;

        assert!(CaptureState::is_valid_transition(Disconnected, Connecting));
        assert!(CaptureState::is_valid_transition(Connecting, WaitingForHelper));
        assert!(CaptureState::is_valid_transition(WaitingForHelper, Idle));
        assert!(CaptureState::is_valid_transition(Idle, Recording));
        assert!(CaptureState::is_valid_transition(Idle, Finalizing));
        assert!(CaptureState::is_valid_transition(Recording, Finalizing));
        assert!(CaptureState::is_valid_transition(Recording, Idle));
        assert!(CaptureState::is_valid_transition(Finalizing, Idle));
    }

    #[test]
    fn test_any_state_can_disconnect() {
        use CaptureState::*;

        for state in [Connecting, WaitingForHelper, Idle, Recording, Finalizing] {
            assert!(CaptureState::is_valid_transition(state, Disconnected));
        }
    }

    #[test]
    fn test_invalid_transitions() {
        use CaptureState::*;

        // Cannot skip the handshake
        assert!(!CaptureState::is_valid_transition(Disconnected, Idle));
        assert!(!CaptureState::is_valid_transition(Connecting, Recording));
        // Finalizing always writes before anything else
        assert!(!CaptureState::is_valid_transition(Finalizing, Recording));
        assert!(!CaptureState::is_valid_transition(WaitingForHelper, Recording));
    }

    #[test]
    fn test_display() {
        assert_eq!(CaptureState::WaitingForHelper.to_string(), "WaitingForHelper");
    }
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Not connected to Dolphin")]
    NotConnected,

    #[error("Failed to read emulated memory at address {address:#010X}: {message}")]
    ReadFault { address: u32, message: String },

    #[error("{0} is NULL")]
    NullPointer(&'static str),

    #[error("RecordInfo pointer at {address:#010X} is not initialized yet")]
    UnresolvedPointer { address: u32 },

    #[error("Unsupported game ID: {0}")]
    UnsupportedGame(String),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Invalid PAD file: {0}")]
    InvalidPad(String),

    #[error("Save data error: {0}")]
    SaveData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Output folder {path:?} is not usable: {message}")]
    OutputFolder { path: PathBuf, message: String },

    #[error("Unexpected end of data: {needed} bytes at position {position}, length {len}")]
    UnexpectedEof {
        position: usize,
        needed: usize,
        len: usize,
    },

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the connection to the emulator is gone.
    pub fn is_read_fault(&self) -> bool {
        matches!(self, Error::ReadFault { .. } | Error::NotConnected)
    }

    /// Expected conditions that only mean "keep polling".
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::ProcessNotFound(_) | Error::UnresolvedPointer { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_fault_classification() {
        let fault = Error::ReadFault {
            address: 0x80003FFC,
            message: "gone".to_string(),
        };
        assert!(fault.is_read_fault());
        assert!(!fault.is_transient());
        assert!(Error::NotConnected.is_read_fault());
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::UnresolvedPointer { address: 0x80003FFC }.is_transient());
        assert!(Error::ProcessNotFound("Dolphin".to_string()).is_transient());
        assert!(!Error::ProtocolViolation("x".to_string()).is_transient());
    }

    #[test]
    fn test_display_formats_address() {
        let fault = Error::ReadFault {
            address: 0x80003FFC,
            message: "unmapped".to_string(),
        };
        assert_eq!(
            fault.to_string(),
            "Failed to read emulated memory at address 0x80003FFC: unmapped"
        );
    }
}

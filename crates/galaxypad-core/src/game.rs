use std::fmt;

/// Game IDs of Super Mario Galaxy 2 releases
pub const SUPPORTED_GAME_IDS: &[&str] = &["SB4P", "SB4E", "SB4J", "SB4K", "SB4W"];

/// Four-character disc ID read from the start of MEM1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameId([u8; 4]);

impl GameId {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// All zero while Dolphin is running but no disc has booted yet
    pub fn is_uninitialized(&self) -> bool {
        self.0 == [0; 4]
    }

    /// The ID as text, if it is printable ASCII
    pub fn as_str(&self) -> Option<&str> {
        if self.0.iter().all(|b| b.is_ascii_alphanumeric()) {
            std::str::from_utf8(&self.0).ok()
        } else {
            None
        }
    }

    /// Whether the ID is one of `expected`
    pub fn is_one_of(&self, expected: &[&str]) -> bool {
        self.as_str().is_some_and(|id| expected.contains(&id))
    }

    /// Release region encoded in the last character
    pub fn region(&self) -> &'static str {
        match self.0[3] {
            b'P' => "PAL",
            b'E' => "NTSC-U",
            b'J' => "NTSC-J",
            b'K' => "Korea",
            b'W' => "Taiwan",
            _ => "unknown region",
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(id) => f.write_str(id),
            None => write!(
                f,
                "{:02X}{:02X}{:02X}{:02X}",
                self.0[0], self.0[1], self.0[2], self.0[3]
            ),
        }
    }
}

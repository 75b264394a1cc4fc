mod accessor;
mod bytes;
mod handle;
pub mod layout;
mod reader;

// Mock emulator memory for testing (always available for unit and integration tests)
#[doc(hidden)]
pub mod mock;

pub use accessor::{DolphinAccessor, translate};
pub use bytes::{ByteBuffer, decode_shift_jis_to_string};
pub use handle::{DolphinProcess, EmulatedRam};
pub use reader::{MemoryAccessor, ReadMemory, offset_address};

// Re-export mock for convenient access in tests
#[doc(hidden)]
pub use mock::{MockMemory, MockMemoryBuilder};

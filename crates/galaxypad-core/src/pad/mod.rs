mod compress;
mod decoder;
mod encoder;
pub mod format;
mod namer;
mod writer;

pub use compress::{StatusCompressor, StatusDecompressor};
pub use decoder::{PadFile, PadHeader, PadSummary};
pub use encoder::encode_pad;
pub use format::PacketHeader;
pub use namer::{DEFAULT_BASE_NAME, SessionNamer, sanitize_level_name};
pub use writer::{probe_output_folder, write_pad_atomic};

mod frame;
mod history;
mod info;
mod locator;

pub use frame::{Frame, FrameBuffer, KpadStatus, read_frame};
pub use history::HistoryLayout;
pub use info::{RecordInfo, RecorderMode};
pub use locator::{RecordLocator, Refresh};

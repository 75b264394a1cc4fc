mod event;
mod game_loop;
mod machine;
mod session;
mod state;

pub use event::CaptureEvent;
pub use machine::CaptureMachine;
pub use session::Session;
pub use state::CaptureState;

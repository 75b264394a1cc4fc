//! Polling loop driving the capture machine

use tracing::{debug, info};

use crate::capture::event::CaptureEvent;
use crate::capture::machine::CaptureMachine;
use crate::error::Result;
use crate::process::MemoryAccessor;
use crate::shutdown::ShutdownSignal;

impl<A: MemoryAccessor> CaptureMachine<A> {
    /// Poll until shutdown is requested or a fatal error occurs.
    ///
    /// The shutdown signal's timed wait is the only suspension point, so a
    /// trigger is observed within one poll interval.
    pub fn run<F>(&mut self, shutdown: &ShutdownSignal, mut on_event: F) -> Result<()>
    where
        F: FnMut(&CaptureEvent),
    {
        info!(
            "Starting capture loop (poll interval {:?})",
            self.config().poll_interval
        );

        while !shutdown.is_shutdown() {
            for event in self.poll()? {
                debug!("[{}] {}", self.state(), event);
                on_event(&event);
            }

            if shutdown.wait(self.config().poll_interval) {
                break;
            }
        }

        info!("Shutdown requested in state {}", self.state());
        for event in self.shutdown()? {
            on_event(&event);
        }
        Ok(())
    }
}

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::pad::{DEFAULT_BASE_NAME, SessionNamer};
use crate::process::layout::{record, timing};
use crate::record::HistoryLayout;

/// Settings for a capture run
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub output_folder: PathBuf,
    /// Address of the `RecordInfo*` published by the helper
    pub pointer_address: u32,
    pub base_name: String,
    pub poll_interval: Duration,
    /// Treat a game ID that is not a known SMG2 build as fatal
    pub strict_game_check: bool,
    pub history: Option<HistoryLayout>,
    /// Game data block embedded in every written file
    pub game_data: Vec<u8>,
}

impl CaptureConfig {
    pub fn builder(output_folder: impl Into<PathBuf>) -> CaptureConfigBuilder {
        CaptureConfigBuilder::new(output_folder)
    }

    pub fn namer(&self) -> SessionNamer {
        SessionNamer::new(&self.output_folder, &self.base_name)
    }
}

/// Builder for [`CaptureConfig`]
#[derive(Debug, Clone)]
pub struct CaptureConfigBuilder {
    config: CaptureConfig,
}

impl CaptureConfigBuilder {
    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self {
            config: CaptureConfig {
                output_folder: output_folder.into(),
                pointer_address: record::DEFAULT_POINTER_ADDRESS,
                base_name: DEFAULT_BASE_NAME.to_string(),
                poll_interval: Duration::from_millis(timing::POLL_INTERVAL_MS),
                strict_game_check: false,
                history: None,
                game_data: Vec::new(),
            },
        }
    }

    pub fn pointer_address(mut self, address: u32) -> Self {
        self.config.pointer_address = address;
        self
    }

    pub fn base_name(mut self, name: impl Into<String>) -> Self {
        self.config.base_name = name.into();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn strict_game_check(mut self, strict: bool) -> Self {
        self.config.strict_game_check = strict;
        self
    }

    pub fn history(mut self, history: Option<HistoryLayout>) -> Self {
        self.config.history = history;
        self
    }

    pub fn game_data(mut self, game_data: Vec<u8>) -> Self {
        self.config.game_data = game_data;
        self
    }

    pub fn build(self) -> Result<CaptureConfig> {
        let config = self.config;

        if config.base_name.is_empty()
            || config
                .base_name
                .chars()
                .any(|c| matches!(c, '/' | '\\' | ':') || c.is_control())
        {
            return Err(Error::InvalidConfig(format!(
                "base name {:?} cannot be used in a file name",
                config.base_name
            )));
        }
        if config.poll_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if config.pointer_address % record::WORD != 0 {
            return Err(Error::InvalidConfig(format!(
                "pointer address {:#010X} is not word aligned",
                config.pointer_address
            )));
        }

        Ok(config)
    }
}

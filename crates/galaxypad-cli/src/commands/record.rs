//! Capture mode: poll Dolphin and write a PAD file per recording.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use galaxypad_core::pad::probe_output_folder;
use galaxypad_core::{
    CaptureConfig, CaptureEvent, CaptureMachine, DolphinAccessor, HistoryLayout, ShutdownSignal,
    extract_game_data,
};
use owo_colors::OwoColorize;
use tracing::{debug, info};

use crate::cli::Args;
use crate::cli_utils::parse_hex_address;

/// Run the capture loop until Ctrl+C
pub fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;
    let shutdown = setup_shutdown_handler()?;

    println!("galaxypad v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Writing PAD files to '{}' (Press Ctrl+C to quit)",
        config.output_folder.display()
    );

    let mut machine = CaptureMachine::new(DolphinAccessor::new(), config);
    machine.run(&shutdown, print_event)?;

    let written = machine.written_files().len();
    info!("{} file(s) written this run", written);
    println!("Shutdown complete.");
    Ok(())
}

/// Validate every input before the first poll
fn build_config(args: &Args) -> Result<CaptureConfig> {
    let output_folder = args
        .output_folder
        .clone()
        .context("An output folder is required")?;
    probe_output_folder(&output_folder)?;

    let pointer_address = parse_hex_address(&args.address)?;

    let mut builder = CaptureConfig::builder(output_folder)
        .pointer_address(pointer_address)
        .base_name(args.base_name.as_str())
        .poll_interval(Duration::from_millis(args.poll_interval_ms))
        .strict_game_check(args.strict);

    if let Some(path) = &args.save_data {
        let slot = args.save_index.unwrap_or(1);
        let game_data = extract_game_data(path, slot)
            .with_context(|| format!("Failed to load slot {} of '{}'", slot, path.display()))?;
        debug!("Loaded {} bytes of game data", game_data.len());
        builder = builder.game_data(game_data);
    }

    if let (Some(offset), Some(capacity)) = (&args.history_offset, args.history_capacity) {
        let history = HistoryLayout::new(parse_hex_address(offset)?, capacity)?;
        builder = builder.history(Some(history));
    }

    Ok(builder.build()?)
}

/// Setup graceful shutdown handler with Ctrl+C
fn setup_shutdown_handler() -> Result<Arc<ShutdownSignal>> {
    let shutdown = Arc::new(ShutdownSignal::new());

    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        println!("\nShutting down...");
        shutdown_ctrlc.trigger();
    })?;

    Ok(shutdown)
}

fn print_event(event: &CaptureEvent) {
    match event {
        CaptureEvent::Dumped { .. } => println!("{}", event.to_string().green()),
        CaptureEvent::RecordingStarted { .. } => println!("{}", event.to_string().bold()),
        _ if event.is_warning() => println!("{}", event.to_string().yellow()),
        _ => println!("{}", event),
    }
}

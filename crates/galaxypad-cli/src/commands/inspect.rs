//! Inspect command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use galaxypad_core::PadFile;

/// Decode a PAD file and print what it holds
pub fn run(file: &Path, json: bool) -> Result<()> {
    let pad = PadFile::read(file).with_context(|| format!("Failed to read '{}'", file.display()))?;
    let summary = pad.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("File:         {}", file.display());
    println!("Header size:  {:#X}", summary.header_size);
    println!("Game data:    {} bytes", summary.game_data_len);
    println!(
        "Frames:       {} (approx. {} seconds)",
        summary.frame_count, summary.approx_seconds
    );
    println!(
        "KPAD samples: {} (at most {} per frame)",
        summary.status_count, summary.max_statuses_per_frame
    );
    Ok(())
}

//! CLI argument parsing tests.
//!
//! These tests verify that command-line arguments are parsed correctly
//! without actually executing the commands (which would require Dolphin).

use std::path::PathBuf;

use clap::Parser;

// Re-create Args structure for testing since it's not publicly exported
#[derive(Parser)]
#[command(name = "galaxypad")]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Args {
    #[arg(required = true)]
    output_folder: Option<PathBuf>,

    #[arg(short, long, default_value = "0x80003FFC", env = "GALAXYPAD_ADDRESS")]
    address: String,

    #[arg(long)]
    save_data: Option<PathBuf>,

    #[arg(long, requires = "save_data", value_parser = clap::value_parser!(u32).range(1..))]
    save_index: Option<u32>,

    #[arg(long, default_value = "Dreamer")]
    base_name: String,

    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_ms: u64,

    #[arg(long)]
    strict: bool,

    #[arg(long, requires = "history_capacity")]
    history_offset: Option<String>,

    #[arg(long, requires = "history_offset")]
    history_capacity: Option<u32>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    Inspect {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[test]
fn test_parse_output_folder_only() {
    let args = Args::try_parse_from(["galaxypad", "pads"]).unwrap();
    assert_eq!(args.output_folder, Some(PathBuf::from("pads")));
    assert_eq!(args.base_name, "Dreamer");
    assert_eq!(args.poll_interval_ms, 4);
    assert!(!args.strict);
    assert!(args.save_data.is_none());
    assert!(args.history_offset.is_none());
    assert!(args.command.is_none());
}

#[test]
fn test_output_folder_required() {
    assert!(Args::try_parse_from(["galaxypad"]).is_err());
    assert!(Args::try_parse_from(["galaxypad", "--strict"]).is_err());
}

#[test]
fn test_parse_all_options() {
    let args = Args::try_parse_from([
        "galaxypad",
        "out",
        "-a",
        "0x80004000",
        "--save-data",
        "GameData.bin",
        "--save-index",
        "3",
        "--base-name",
        "Ghost",
        "--poll-interval-ms",
        "16",
        "--strict",
        "--history-offset",
        "0x18",
        "--history-capacity",
        "32",
    ])
    .unwrap();

    assert_eq!(args.address, "0x80004000");
    assert_eq!(args.save_data, Some(PathBuf::from("GameData.bin")));
    assert_eq!(args.save_index, Some(3));
    assert_eq!(args.base_name, "Ghost");
    assert_eq!(args.poll_interval_ms, 16);
    assert!(args.strict);
    assert_eq!(args.history_offset.as_deref(), Some("0x18"));
    assert_eq!(args.history_capacity, Some(32));
}

#[test]
fn test_save_index_requires_save_data() {
    assert!(Args::try_parse_from(["galaxypad", "out", "--save-index", "1"]).is_err());
}

#[test]
fn test_save_index_is_one_based() {
    let result = Args::try_parse_from([
        "galaxypad",
        "out",
        "--save-data",
        "GameData.bin",
        "--save-index",
        "0",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_zero_poll_interval_rejected() {
    assert!(Args::try_parse_from(["galaxypad", "out", "--poll-interval-ms", "0"]).is_err());
}

#[test]
fn test_history_options_come_together() {
    assert!(Args::try_parse_from(["galaxypad", "out", "--history-offset", "0x18"]).is_err());
    assert!(Args::try_parse_from(["galaxypad", "out", "--history-capacity", "8"]).is_err());
}

#[test]
fn test_parse_inspect() {
    let args = Args::try_parse_from(["galaxypad", "inspect", "Dreamer2.pad"]).unwrap();
    match args.command {
        Some(Command::Inspect { file, json }) => {
            assert_eq!(file, PathBuf::from("Dreamer2.pad"));
            assert!(!json);
        }
        _ => panic!("Expected Inspect command"),
    }
    assert!(args.output_folder.is_none());
}

#[test]
fn test_parse_inspect_json() {
    let args = Args::try_parse_from(["galaxypad", "inspect", "a.pad", "--json"]).unwrap();
    assert!(matches!(args.command, Some(Command::Inspect { json: true, .. })));
}

#[test]
fn test_inspect_requires_file() {
    assert!(Args::try_parse_from(["galaxypad", "inspect"]).is_err());
}

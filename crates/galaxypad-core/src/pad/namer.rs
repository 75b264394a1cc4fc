use std::path::{Path, PathBuf};

/// Default file base name (the in-game actor that plays PAD files back)
pub const DEFAULT_BASE_NAME: &str = "Dreamer";

const UNKNOWN_LEVEL: &str = "Unknown";

/// Make a level name safe to use as a single directory component
pub fn sanitize_level_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        UNKNOWN_LEVEL.to_string()
    } else {
        sanitized
    }
}

/// Derives `<output>/<level>/<base><spawn>.pad` paths
#[derive(Debug, Clone)]
pub struct SessionNamer {
    output_folder: PathBuf,
    base_name: String,
}

impl SessionNamer {
    pub fn new(output_folder: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            output_folder: output_folder.into(),
            base_name: base_name.into(),
        }
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    pub fn level_folder(&self, level: &str) -> PathBuf {
        self.output_folder.join(sanitize_level_name(level))
    }

    /// Candidate path for a collision counter; 0 is the unsuffixed name
    pub fn candidate(&self, level: &str, spawn_id: u32, n: u32) -> PathBuf {
        let file_name = match n {
            0 => format!("{}{}.pad", self.base_name, spawn_id),
            n => format!("{}{}_{}.pad", self.base_name, spawn_id, n),
        };
        self.level_folder(level).join(file_name)
    }
}

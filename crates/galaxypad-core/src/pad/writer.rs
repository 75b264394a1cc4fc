use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;
use tracing::debug;

use crate::error::{Error, Result};
use crate::pad::namer::SessionNamer;

/// Make sure the output folder exists and files can be created in it
pub fn probe_output_folder(path: &Path) -> Result<()> {
    let folder_error = |message: String| Error::OutputFolder {
        path: path.to_path_buf(),
        message,
    };

    if path.exists() && !path.is_dir() {
        return Err(folder_error("path is not a folder".to_string()));
    }
    fs::create_dir_all(path).map_err(|e| folder_error(e.to_string()))?;
    tempfile::tempfile_in(path).map_err(|e| folder_error(format!("not writable: {}", e)))?;

    Ok(())
}

/// Write a PAD file without ever exposing a partial file or replacing an
/// existing one.
///
/// The bytes go to a temporary file next to the target first, which is then
/// linked into place under the first free name the namer hands out.
pub fn write_pad_atomic(
    namer: &SessionNamer,
    level: &str,
    spawn_id: u32,
    bytes: &[u8],
) -> Result<PathBuf> {
    let folder = namer.level_folder(level);
    fs::create_dir_all(&folder)?;

    let mut temp = Builder::new()
        .prefix(".galaxypad-")
        .suffix(".tmp")
        .tempfile_in(&folder)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;

    let mut n = 0u32;
    loop {
        let path = namer.candidate(level, spawn_id, n);
        if !path.exists() {
            match temp.persist_noclobber(&path) {
                Ok(_) => {
                    debug!("Persisted {} bytes to {}", bytes.len(), path.display());
                    return Ok(path);
                }
                // Lost a race against another writer; try the next name
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => temp = e.file,
                Err(e) => return Err(e.error.into()),
            }
        }

        n = n.checked_add(1).ok_or_else(|| Error::OutputFolder {
            path: folder.clone(),
            message: "no free file name left".to_string(),
        })?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_probe_creates_folder() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("out");

        probe_output_folder(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_probe_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(
            probe_output_folder(&file),
            Err(Error::OutputFolder { .. })
        ));
    }

    #[test]
    fn test_write_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let namer = SessionNamer::new(temp_dir.path(), "Dreamer");

        let first = write_pad_atomic(&namer, "Level", 4, b"first").unwrap();
        let second = write_pad_atomic(&namer, "Level", 4, b"second").unwrap();

        assert_eq!(first, temp_dir.path().join("Level").join("Dreamer4.pad"));
        assert_eq!(second, temp_dir.path().join("Level").join("Dreamer4_1.pad"));
        assert_eq!(fs::read(&first).unwrap(), b"first");
        assert_eq!(fs::read(&second).unwrap(), b"second");
    }

    #[test]
    fn test_no_temp_files_left() {
        let temp_dir = TempDir::new().unwrap();
        let namer = SessionNamer::new(temp_dir.path(), "Dreamer");
        write_pad_atomic(&namer, "Level", 1, b"data").unwrap();

        let names: Vec<_> = fs::read_dir(temp_dir.path().join("Level"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["Dreamer1.pad".to_string()]);
    }
}

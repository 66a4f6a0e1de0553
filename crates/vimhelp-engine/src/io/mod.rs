use crate::tags::Registry;
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid help directory: {0}")]
    InvalidHelpDir(String),
}

/// Read a text file as lines, without line terminators.
///
/// Bytes that are not UTF-8 are replaced rather than rejected; help files
/// in the wild are mostly Latin-1.
pub fn read_lines(path: &Path) -> Result<Vec<String>, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

/// Load the tag registry from a `tags` file.
pub fn read_tags(path: &Path) -> Result<Registry, IoError> {
    let lines = read_lines(path)?;
    Ok(Registry::load(lines))
}

/// The `*.txt` help files directly inside `help_dir`, sorted by name.
///
/// Names like `intro.txt.txt` are earlier text output and are skipped.
pub fn help_files(help_dir: &Path) -> Result<Vec<RelativePathBuf>, IoError> {
    if !help_dir.is_dir() {
        return Err(IoError::InvalidHelpDir(format!(
            "{} is not a directory",
            help_dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(help_dir)? {
        let path = entry?.path();
        if path.is_file()
            && let Some(ext) = path.extension()
            && ext == "txt"
            && !is_text_output(&path)
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
        {
            files.push(RelativePathBuf::from(name));
        }
    }
    files.sort();
    Ok(files)
}

fn is_text_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| Path::new(stem).extension())
        .is_some_and(|ext| ext == "txt")
}

/// Write rendered output under `output_root`, creating missing directories.
pub fn write_output(
    relative_path: &RelativePath,
    output_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(output_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

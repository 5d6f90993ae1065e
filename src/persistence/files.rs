use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Get the taskdeck directory - honors TASKDECK_DIR, otherwise ~/.taskdeck
pub fn get_app_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("TASKDECK_DIR") {
        return Ok(PathBuf::from(dir));
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".taskdeck"))
}

/// Ensure the taskdeck directory exists
pub fn ensure_app_dir() -> Result<PathBuf> {
    let dir = get_app_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Get path to the persisted task blob (tasks.json)
pub fn tasks_file() -> Result<PathBuf> {
    Ok(ensure_app_dir()?.join("tasks.json"))
}

/// Get path to config.json
pub fn config_file() -> Result<PathBuf> {
    Ok(ensure_app_dir()?.join("config.json"))
}

/// Get path to the log file (stderr belongs to the TUI)
pub fn log_file() -> Result<PathBuf> {
    Ok(ensure_app_dir()?.join("taskdeck.log"))
}

/// Default export path for today (~/.taskdeck/tasks-YYYY-MM-DD.json)
pub fn default_export_file() -> Result<PathBuf> {
    let today = chrono::Local::now().format("%Y-%m-%d");
    Ok(ensure_app_dir()?.join(format!("tasks-{}.json", today)))
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .context("File path has no parent directory")?;

    // Create temp file in the same directory
    let mut temp_file = NamedTempFile::new_in(dir)
        .context("Failed to create temporary file")?;

    // Write content
    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temporary file")?;

    // Sync to disk
    temp_file
        .as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;

    // Atomically rename temp file to target
    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.txt");

        let content = "Hello, world!";
        atomic_write(&test_file, content).unwrap();

        assert_eq!(fs::read_to_string(&test_file).unwrap(), content);
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.txt");

        atomic_write(&test_file, "first").unwrap();
        atomic_write(&test_file, "second").unwrap();

        assert_eq!(fs::read_to_string(&test_file).unwrap(), "second");
    }

    #[test]
    fn test_default_export_file_is_dated() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("TASKDECK_DIR", dir.path());
        let path = default_export_file().unwrap();
        std::env::remove_var("TASKDECK_DIR");

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("tasks-"));
        assert!(name.ends_with(".json"));
    }
}

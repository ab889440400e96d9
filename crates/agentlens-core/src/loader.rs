//! Loading agent logs from disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::log::AgentLog;
use crate::LogError;

/// Parses an agent log document from a JSON string.
pub fn parse_log(input: &str) -> Result<AgentLog, LogError> {
    Ok(serde_json::from_str(input)?)
}

/// Reads and parses an agent log file.
pub fn load_log_file(path: impl AsRef<Path>) -> Result<AgentLog, LogError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let log = parse_log(&content)?;
    debug!(path = %path.display(), entries = log.log.len(), "Loaded agent log");
    Ok(log)
}

/// Lists `*.json` files in `dir`, most recently modified first.
///
/// A directory that does not exist yields an empty list.
pub fn list_log_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, LogError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files: Vec<(SystemTime, PathBuf)> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect();

    files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_load_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(
            &path,
            r#"{"id": "a_1", "log": [{"step_number": 1, "step_type": "llm_call"}]}"#,
        )
        .unwrap();

        let log = load_log_file(&path).unwrap();
        assert_eq!(log.log.len(), 1);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_log_file(&path), Err(LogError::Parse(_))));
        assert!(matches!(
            load_log_file(dir.path().join("missing.json")),
            Err(LogError::Io(_))
        ));
    }

    #[test]
    fn test_list_log_files_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let older = dir.path().join("older.json");
        let newer = dir.path().join("newer.json");
        fs::write(&older, "{}").unwrap();
        fs::write(&newer, "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let past = SystemTime::now() - Duration::from_secs(3600);
        fs::File::options()
            .write(true)
            .open(&older)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let files = list_log_files(dir.path()).unwrap();
        assert_eq!(files, vec![newer, older]);
    }

    #[test]
    fn test_list_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let files = list_log_files(dir.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }
}

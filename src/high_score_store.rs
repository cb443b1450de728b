use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const SCORE_BYTES: usize = std::mem::size_of::<i32>();

#[derive(Debug)]
pub enum HighScoreError {
    Io(io::Error),
    /// File exists but is shorter than one stored integer.
    Truncated { len: usize },
}

impl fmt::Display for HighScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighScoreError::Io(error) => write!(f, "high score i/o failed: {error}"),
            HighScoreError::Truncated { len } => {
                write!(f, "high score file holds {len} bytes, expected {SCORE_BYTES}")
            }
        }
    }
}

impl std::error::Error for HighScoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HighScoreError::Io(error) => Some(error),
            HighScoreError::Truncated { .. } => None,
        }
    }
}

impl From<io::Error> for HighScoreError {
    fn from(error: io::Error) -> Self {
        HighScoreError::Io(error)
    }
}

/// Reads the raw native-endian integer. Extra trailing bytes are ignored.
pub fn load_high_score(path: &Path) -> Result<i32, HighScoreError> {
    let bytes = fs::read(path)?;
    let Some(head) = bytes.get(..SCORE_BYTES) else {
        return Err(HighScoreError::Truncated { len: bytes.len() });
    };
    let mut raw = [0u8; SCORE_BYTES];
    raw.copy_from_slice(head);
    Ok(i32::from_ne_bytes(raw))
}

pub fn save_high_score(path: &Path, score: i32) -> Result<(), HighScoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, score.to_ne_bytes())?;
    Ok(())
}

pub struct HighScoreStore {
    file_path: PathBuf,
    best: i32,
}

impl HighScoreStore {
    /// Opens the store, treating a missing or unreadable file as a best of 0.
    pub fn new(file_path: PathBuf) -> Self {
        let best = match load_high_score(&file_path) {
            Ok(value) => value.max(0),
            Err(HighScoreError::Io(error)) if error.kind() == io::ErrorKind::NotFound => 0,
            Err(error) => {
                eprintln!(
                    "[high-score] failed to load {}: {error}",
                    file_path.display()
                );
                0
            }
        };
        Self { file_path, best }
    }

    pub fn best(&self) -> i32 {
        self.best
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Persists `score` when it beats the stored best. Returns whether it did.
    pub fn record(&mut self, score: i32) -> Result<bool, HighScoreError> {
        if score <= self.best {
            return Ok(false);
        }
        save_high_score(&self.file_path, score)?;
        self.best = score;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let unique = format!(
            "{}-{}-{}",
            name,
            std::process::id(),
            rand::random::<u32>()
        );
        std::env::temp_dir().join(unique).join("highscore.dat")
    }

    fn cleanup(path: &Path) {
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn missing_file_defaults_to_zero() {
        let path = temp_file("high-score-missing");
        assert!(matches!(
            load_high_score(&path),
            Err(HighScoreError::Io(ref error)) if error.kind() == io::ErrorKind::NotFound
        ));
        let store = HighScoreStore::new(path.clone());
        assert_eq!(store.best(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn save_then_load_round_trips_raw_bytes() {
        let path = temp_file("high-score-round-trip");
        save_high_score(&path, 1_234).expect("save");
        assert_eq!(fs::read(&path).expect("read"), 1_234i32.to_ne_bytes().to_vec());
        assert_eq!(load_high_score(&path).expect("load"), 1_234);
        cleanup(&path);
    }

    #[test]
    fn truncated_file_is_reported_and_store_falls_back() {
        let path = temp_file("high-score-truncated");
        fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
        fs::write(&path, [7u8, 1]).expect("write");
        assert!(matches!(
            load_high_score(&path),
            Err(HighScoreError::Truncated { len: 2 })
        ));
        assert_eq!(HighScoreStore::new(path.clone()).best(), 0);
        cleanup(&path);
    }

    #[test]
    fn record_only_persists_improvements() {
        let path = temp_file("high-score-record");
        let mut store = HighScoreStore::new(path.clone());
        assert!(store.record(900).expect("first record"));
        assert!(!store.record(500).expect("lower score"));
        assert!(!store.record(900).expect("equal score"));
        assert_eq!(load_high_score(&path).expect("load"), 900);

        let reopened = HighScoreStore::new(path.clone());
        assert_eq!(reopened.best(), 900);
        cleanup(&path);
    }

    #[test]
    fn negative_stored_value_is_clamped() {
        let path = temp_file("high-score-negative");
        save_high_score(&path, -40).expect("save");
        assert_eq!(HighScoreStore::new(path.clone()).best(), 0);
        cleanup(&path);
    }
}

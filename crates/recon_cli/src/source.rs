//! Turn source backed by a directory of JSON documents.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use recon_core::source::{SourceError, TurnSource};
use recon_core::wire::TurnDocument;

/// Reads `<root>/<match_id>/turn_<n>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Source for one match stored under `root`.
    pub fn new(root: &Path, match_id: &str) -> Self {
        Self {
            dir: root.join(match_id),
        }
    }

    /// Directory holding this match's documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one turn's document.
    pub fn turn_path(&self, turn: u32) -> PathBuf {
        self.dir.join(format!("turn_{turn}.json"))
    }
}

impl TurnSource for DirectorySource {
    fn load_turn(&mut self, turn: u32) -> Result<TurnDocument, SourceError> {
        let path = self.turn_path(turn);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(SourceError::Missing(turn)),
            Err(e) => {
                return Err(SourceError::Transport(format!(
                    "{}: {e}",
                    path.display()
                )))
            }
        };
        tracing::debug!(turn, path = %path.display(), bytes = text.len(), "Read turn document");
        TurnDocument::from_json(turn, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_path_layout() {
        let source = DirectorySource::new(Path::new("replays"), "42");
        assert_eq!(
            source.turn_path(3),
            Path::new("replays").join("42").join("turn_3.json")
        );
    }

    #[test]
    fn test_missing_directory_is_missing_turn() {
        let mut source = DirectorySource::new(Path::new("/nonexistent/replays"), "1");
        assert_eq!(source.load_turn(0).unwrap_err(), SourceError::Missing(0));
    }
}

//! Records interactions into a cassette file.
//!
//! The file is written incrementally: the header goes out when the recorder
//! is created and each interaction is appended as soon as it is recorded, so
//! nothing accumulates in memory and a killed process keeps what it recorded.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::format::{Cassette, Interaction};

/// Appends interactions to a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    file: File,
    next_seq: u64,
}

impl CassetteRecorder {
    /// Creates (or truncates) the cassette at `path` and writes its header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn create(path: impl Into<PathBuf>, name: impl Into<String>) -> io::Result<Self> {
        let path = path.into();
        let header = Cassette { name: name.into(), recorded_at: Utc::now(), interactions: vec![] };
        let yaml = serde_yaml::to_string(&header).map_err(io::Error::other)?;

        let mut file = File::create(&path)?;
        file.write_all(yaml.as_bytes())?;
        file.flush()?;
        Ok(Self { path, file, next_seq: 0 })
    }

    /// Records an interaction and appends it to the file. The `seq` field is
    /// assigned automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the interaction cannot be serialized or written.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) -> io::Result<()> {
        let interaction = Interaction {
            seq: self.next_seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        };
        let mut chunk = String::new();
        if self.next_seq == 0 {
            chunk.push_str("interactions:\n");
        }
        chunk.push_str(&serde_yaml::to_string(&[interaction]).map_err(io::Error::other)?);

        self.file.write_all(chunk.as_bytes())?;
        self.file.flush()?;
        self.next_seq += 1;
        Ok(())
    }

    /// Number of interactions recorded so far.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.next_seq
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next_seq == 0
    }

    /// Path of the cassette being written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn each_interaction_is_on_disk_once_recorded() {
        let dir = std::env::temp_dir().join("chatrelay_recorder_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.cassette.yaml");

        let mut recorder = CassetteRecorder::create(&path, "test-recording").unwrap();
        assert!(recorder.is_empty());
        let cassette = Cassette::load(&path).unwrap();
        assert_eq!(cassette.name, "test-recording");
        assert!(cassette.interactions.is_empty());

        recorder
            .record("completion", "complete", json!({"model": "m"}), json!({"Ok": "hi"}))
            .unwrap();
        assert_eq!(Cassette::load(&path).unwrap().interactions.len(), 1);

        recorder
            .record("completion", "complete", json!({"model": "m"}), json!({"Err": "boom"}))
            .unwrap();
        assert_eq!(recorder.len(), 2);

        // Read back while the recorder is still alive.
        let cassette = Cassette::load(&path).unwrap();
        assert_eq!(cassette.interactions.len(), 2);
        assert_eq!(cassette.interactions[0].seq, 0);
        assert_eq!(cassette.interactions[1].seq, 1);
        assert_eq!(cassette.interactions[0].input, json!({"model": "m"}));
        assert_eq!(cassette.interactions[1].output, json!({"Err": "boom"}));
        drop(recorder);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn multiline_text_survives_appending() {
        let dir = std::env::temp_dir().join("chatrelay_recorder_multiline_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("multi.cassette.yaml");

        let mut recorder = CassetteRecorder::create(&path, "multi").unwrap();
        let text = "line one\nline two: with colon\n- dash";
        recorder.record("completion", "complete", json!({}), json!({"Ok": text})).unwrap();
        recorder.record("completion", "complete", json!({}), json!({"Ok": "second"})).unwrap();

        let cassette = Cassette::load(&path).unwrap();
        assert_eq!(cassette.interactions[0].output, json!({"Ok": text}));
        assert_eq!(cassette.interactions[1].output, json!({"Ok": "second"}));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn create_fails_for_unwritable_path() {
        let path = std::env::temp_dir().join("chatrelay_no_such_dir").join("x.cassette.yaml");
        assert!(CassetteRecorder::create(&path, "x").is_err());
    }
}

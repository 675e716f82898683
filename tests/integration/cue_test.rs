//! Integration tests for cue-sheet track lookup by path

use crate::test_utils::FlacFixture;
use flac_bridge::audio::BridgeError;
use flac_bridge::metadata::{cue_track, track_filename, track_index_from_filename};
use std::error::Error;
use tempfile::tempdir;

#[cfg(test)]
mod cue_integration_tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let result = cue_track(&dir.path().join("missing.flac"), 1, "flac");
        assert!(matches!(result, Err(BridgeError::IoError(_))));
        Ok(())
    }

    #[test]
    fn test_unrecognised_file_is_error() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("noise.flac");
        std::fs::write(&path, b"definitely not an audio stream")?;

        assert!(cue_track(&path, 1, "flac").is_err());
        Ok(())
    }

    #[test]
    fn test_names_tracks_of_embedded_cue_sheet() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("album.flac");
        FlacFixture::new(3)
            .with_cue_track(0, 1)
            .with_cue_track(16, 2)
            .with_cue_track(48, 170)
            .write_to(&path)?;

        assert_eq!(cue_track(&path, 1, "flac")?.as_deref(), Some("track_001.flac"));
        assert_eq!(cue_track(&path, 2, "ogg")?.as_deref(), Some("track_002.ogg"));
        // The last entry is the lead-out.
        assert_eq!(cue_track(&path, 3, "flac")?, None);
        assert_eq!(cue_track(&path, 0, "flac")?, None);
        Ok(())
    }

    #[test]
    fn test_single_track_and_missing_cue_sheet_have_no_names() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let plain = dir.path().join("plain.flac");
        FlacFixture::new(1).write_to(&plain)?;
        assert_eq!(cue_track(&plain, 1, "flac")?, None);

        let single = dir.path().join("single.flac");
        FlacFixture::new(1).with_cue_track(0, 170).write_to(&single)?;
        assert_eq!(cue_track(&single, 1, "flac")?, None);
        Ok(())
    }

    /// Names produced for a cue sheet parse back to their track number
    #[test]
    fn test_names_parse_back() {
        for index in 1..12 {
            let name = track_filename(12, index, "flac").unwrap();
            assert_eq!(track_index_from_filename(&name), index);
        }
    }
}

//! Integration tests driving real FLAC streams through the decoder
//!
//! Streams are written to a temporary directory by [`FlacFixture`].

use crate::test_utils::{
    ClientEvent, FlacFixture, RecordingClient, FIXTURE_BLOCK_SIZE, FIXTURE_FRAME_BYTES, FIXTURE_MD5,
    FIXTURE_SAMPLE_RATE,
};
use flac_bridge::audio::{
    estimate_bit_rate, scan_tag, AudioFormat, Command, DecodeErrorStatus, DecodeOutcome, DecoderClient,
    FlacBridge, FlacEventHandler, FlacStreamDecoder, Frame, SampleFormat, Session, WriteStatus,
};
use flac_bridge::metadata::{CueTrack, MetadataBlock, MetadataBlockType, Tag, TagType};
use std::error::Error;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

#[cfg(test)]
mod decoder_integration_tests {
    use super::*;

    fn write_fixture(fixture: &FlacFixture) -> Result<(TempDir, PathBuf), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("fixture.flac");
        fixture.write_to(&path)?;
        Ok((dir, path))
    }

    fn decode(
        fixture: &FlacFixture,
        verify: bool,
        client: RecordingClient,
    ) -> Result<(DecodeOutcome, FlacBridge<RecordingClient>), Box<dyn Error>> {
        let (_dir, path) = write_fixture(fixture)?;
        let mut decoder = FlacStreamDecoder::open(&path, verify)?;
        let mut bridge = FlacBridge::new("flac", Session::new(), client);
        let outcome = decoder.run(&mut bridge)?;
        Ok((outcome, bridge))
    }

    /// Handler recording the kinds of metadata block it is given.
    #[derive(Default)]
    struct BlockRecorder {
        blocks: Vec<MetadataBlockType>,
    }

    impl FlacEventHandler for BlockRecorder {
        fn on_metadata(&mut self, block: MetadataBlock) {
            self.blocks.push(block.block_type());
        }

        fn on_write(&mut self, _frame: &Frame, _compressed_bytes: u64) -> WriteStatus {
            WriteStatus::Continue
        }

        fn on_error(&mut self, _status: DecodeErrorStatus) {}
    }

    /// Every sample comes back at its native width, interleaved
    #[test]
    fn test_decodes_stream_to_pcm() -> Result<(), Box<dyn Error>> {
        let fixture = FlacFixture::new(3).with_comment("REPLAYGAIN_TRACK_GAIN=-2.50 dB");
        let (outcome, bridge) = decode(&fixture, false, RecordingClient::new())?;

        assert_eq!(outcome, DecodeOutcome::Finished);
        let client = bridge.client();
        assert_eq!(client.pcm, fixture.pcm());
        assert_eq!(bridge.session().next_frame(), fixture.total_samples());

        let cd = AudioFormat::new_checked(FIXTURE_SAMPLE_RATE, SampleFormat::S16, 2)?;
        assert!(matches!(client.events[0], ClientEvent::ReplayGain(rg) if rg.track.gain == -2.5));
        assert_eq!(client.events[1], ClientEvent::Initialized(cd));

        let bit_rate = estimate_bit_rate(FIXTURE_FRAME_BYTES, FIXTURE_SAMPLE_RATE, FIXTURE_BLOCK_SIZE);
        let audio: Vec<_> = client.events[2..].to_vec();
        assert_eq!(
            audio,
            vec![
                ClientEvent::Audio {
                    bytes: FIXTURE_BLOCK_SIZE as usize * 4,
                    bit_rate,
                };
                3
            ]
        );
        assert_eq!(client.warnings(), 0);
        Ok(())
    }

    #[test]
    fn test_stop_ends_run_early() -> Result<(), Box<dyn Error>> {
        let fixture = FlacFixture::new(3);
        let client = RecordingClient::answering(&[Command::None, Command::Stop]);
        let (outcome, bridge) = decode(&fixture, false, client)?;

        assert_eq!(outcome, DecodeOutcome::Stopped);
        assert_eq!(bridge.session().next_frame(), 2 * u64::from(FIXTURE_BLOCK_SIZE));
        assert!(bridge.session().stop_requested());
        assert_eq!(bridge.client().pcm.len(), 2 * FIXTURE_BLOCK_SIZE as usize * 4);
        Ok(())
    }

    /// A `Seek` answer repositions the stream and opens a new segment
    #[test]
    fn test_seek_handshake() -> Result<(), Box<dyn Error>> {
        let fixture = FlacFixture::new(3);
        let target = 2 * u64::from(FIXTURE_BLOCK_SIZE);
        let client = RecordingClient::answering(&[Command::Seek]).seeking_to(target);
        let (outcome, bridge) = decode(&fixture, false, client)?;

        assert_eq!(outcome, DecodeOutcome::Finished);
        let client = bridge.client();
        assert_eq!(client.seeks_finished, 1);
        assert_eq!(client.seek_errors, 0);
        assert_eq!(client.command(), Command::None);

        assert_eq!(bridge.session().first_frame(), target);
        assert_eq!(bridge.session().next_frame(), fixture.total_samples());

        let mut expected = fixture.frame_pcm(0);
        expected.extend(fixture.frame_pcm(2));
        assert_eq!(client.pcm, expected);
        Ok(())
    }

    #[test]
    fn test_seek_past_end_reports_seek_error() -> Result<(), Box<dyn Error>> {
        let fixture = FlacFixture::new(2);
        let client = RecordingClient::answering(&[Command::Seek]).seeking_to(10_000);
        let (outcome, bridge) = decode(&fixture, false, client)?;

        assert_eq!(outcome, DecodeOutcome::Finished);
        assert_eq!(bridge.client().seek_errors, 1);
        assert_eq!(bridge.client().seeks_finished, 0);
        assert_eq!(bridge.session().first_frame(), 0);
        assert_eq!(bridge.client().pcm, fixture.pcm());
        Ok(())
    }

    #[test]
    fn test_verification_flags_wrong_signature() -> Result<(), Box<dyn Error>> {
        let fixture = FlacFixture::new(3).with_md5([0xab; 16]);
        let (outcome, bridge) = decode(&fixture, true, RecordingClient::new())?;

        assert_eq!(outcome, DecodeOutcome::Finished);
        assert_eq!(bridge.client().pcm, fixture.pcm());
        assert_eq!(
            bridge.client().events.last(),
            Some(&ClientEvent::Warning("flac".to_string(), DecodeErrorStatus::CrcMismatch))
        );
        Ok(())
    }

    #[test]
    fn test_verification_accepts_matching_signature() -> Result<(), Box<dyn Error>> {
        let fixture = FlacFixture::new(3).with_md5(FIXTURE_MD5);
        let (_, bridge) = decode(&fixture, true, RecordingClient::new())?;
        assert_eq!(bridge.client().warnings(), 0);

        // Without a signature there is nothing to check against.
        let (_, bridge) = decode(&FlacFixture::new(3), true, RecordingClient::new())?;
        assert_eq!(bridge.client().warnings(), 0);
        Ok(())
    }

    #[test]
    fn test_signature_ignored_unless_verifying() -> Result<(), Box<dyn Error>> {
        let fixture = FlacFixture::new(3).with_md5([0xab; 16]);
        let (_, bridge) = decode(&fixture, false, RecordingClient::new())?;
        assert_eq!(bridge.client().warnings(), 0);
        Ok(())
    }

    /// Skipped frames would never match the signature
    #[test]
    fn test_no_verification_after_seek() -> Result<(), Box<dyn Error>> {
        let fixture = FlacFixture::new(3).with_md5(FIXTURE_MD5);
        let target = 2 * u64::from(FIXTURE_BLOCK_SIZE);
        let client = RecordingClient::answering(&[Command::Seek]).seeking_to(target);
        let (_, bridge) = decode(&fixture, true, client)?;

        assert_eq!(bridge.client().seeks_finished, 1);
        assert_eq!(bridge.client().warnings(), 0);
        Ok(())
    }

    #[test]
    fn test_metadata_replay_order() -> Result<(), Box<dyn Error>> {
        let fixture = FlacFixture::new(1)
            .with_comment("TITLE=Fixture")
            .with_cue_track(0, 1)
            .with_cue_track(16, 170)
            .with_picture();
        let (_dir, path) = write_fixture(&fixture)?;
        let decoder = FlacStreamDecoder::open(&path, false)?;

        let mut recorder = BlockRecorder::default();
        decoder.emit_metadata(&mut recorder);
        assert_eq!(
            recorder.blocks,
            vec![
                MetadataBlockType::StreamInfo,
                MetadataBlockType::VorbisComment,
                MetadataBlockType::CueSheet,
                MetadataBlockType::Picture,
            ]
        );

        assert_eq!(decoder.stream_info().total_samples, fixture.total_samples());
        assert!(decoder.is_seekable());
        let cue_sheet = decoder.cue_sheet().unwrap();
        assert_eq!(cue_sheet.tracks[1], CueTrack { number: 170, offset: 16 });
        Ok(())
    }

    #[test]
    fn test_scan_tag_reads_comments_and_duration() -> Result<(), Box<dyn Error>> {
        let fixture = FlacFixture::new(3)
            .with_comment("TITLE=Fixture")
            .with_comment("artist=Someone")
            .with_comment("REPLAYGAIN_ALBUM_GAIN=-1.00 dB");
        let (_dir, path) = write_fixture(&fixture)?;

        let tag = scan_tag(&path)?;
        assert_eq!(tag.get(TagType::Title), Some("Fixture"));
        assert_eq!(tag.get(TagType::Artist), Some("Someone"));
        assert_eq!(
            tag.duration_seconds,
            Some(fixture.total_samples() as f64 / f64::from(FIXTURE_SAMPLE_RATE))
        );
        assert_eq!(tag.items.len(), 2);
        Ok(())
    }

    #[test]
    fn test_scan_tag_without_comments() -> Result<(), Box<dyn Error>> {
        let (_dir, path) = write_fixture(&FlacFixture::new(1))?;
        let tag = scan_tag(&path)?;
        assert!(tag.is_empty());
        assert!(tag.duration_seconds.is_some());
        assert_ne!(tag, Tag::new());
        Ok(())
    }
}

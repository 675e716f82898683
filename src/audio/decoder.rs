use crate::audio::{
    bridge::{FlacBridge, FlacEventHandler, Frame, FrameHeader, WriteStatus},
    client::{Command, DecoderClient},
    diagnostics::DecodeErrorStatus,
    error::BridgeError,
    session::Session,
};
use crate::metadata::{CueSheet, CueTrack, MetadataBlock, MetadataBlockType, StreamInfo, Tag, VorbisComment};
use std::fs::File;
use std::io;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::{MetadataOptions, MetadataRevision};
use symphonia::core::probe::Hint;
use symphonia::core::sample::i24;
use tracing::{debug, error, info, trace, warn};

const LOG_TARGET: &str = "flac_bridge::audio::decoder";

/// How a decode loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The stream was decoded to its end.
    Finished,
    /// The consumer answered a frame with `Stop`.
    Stopped,
}

/// Drives Symphonia's format reader and decoder, replaying what it
/// produces as metadata, frame and error events.
pub struct FlacStreamDecoder {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    stream_info: StreamInfo,
    comments: Option<VorbisComment>,
    cue_sheet: Option<CueSheet>,
    pictures: usize,
    seekable: bool,
    /// Cleared once a seek skips audio, since the MD5 signature then
    /// covers frames that were never decoded.
    verifiable: bool,
    frame: Frame,
}

impl FlacStreamDecoder {
    /// Opens a file, using its extension as a probe hint.
    pub fn open(path: &Path, verify: bool) -> Result<Self, BridgeError> {
        let file = File::open(path)?;
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }
        Self::from_source(Box::new(file), hint, verify)
    }

    /// Creates and initializes a decoder over any media source.
    pub fn from_source(source: Box<dyn MediaSource>, hint: Hint, verify: bool) -> Result<Self, BridgeError> {
        debug!(target: LOG_TARGET, "Setting up Symphonia format reader and decoder...");
        let seekable = source.is_seekable();
        let mss = MediaSourceStream::new(source, Default::default());

        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();
        let mut probed = symphonia::default::get_probe().format(&hint, mss, &fmt_opts, &meta_opts)?;

        let mut comments = VorbisComment::default();
        let mut pictures = 0;
        if let Some(mut metadata) = probed.metadata.get() {
            if let Some(revision) = metadata.skip_to_latest() {
                pictures += collect_metadata(revision, &mut comments);
            }
        }

        let mut format_reader = probed.format;
        if let Some(revision) = format_reader.metadata().skip_to_latest() {
            pictures += collect_metadata(revision, &mut comments);
        }

        let cues = format_reader.cues();
        let cue_sheet = (!cues.is_empty()).then(|| CueSheet {
            tracks: cues
                .iter()
                .map(|cue| CueTrack {
                    number: cue.index,
                    offset: cue.start_ts,
                })
                .collect(),
        });

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(BridgeError::UnsupportedFormat("No suitable audio track found".to_string()))?
            .clone();

        debug!(target: LOG_TARGET, "Found suitable audio track: ID={}, Codec={:?}", track.id, track.codec_params.codec);

        let params = &track.codec_params;
        let stream_info = StreamInfo {
            sample_rate: params.sample_rate.ok_or(BridgeError::MissingCodecParams("sample rate"))?,
            channels: params
                .channels
                .ok_or(BridgeError::MissingCodecParams("channels map"))?
                .count() as u32,
            bits_per_sample: params
                .bits_per_sample
                .ok_or(BridgeError::MissingCodecParams("bits per sample"))?,
            total_samples: params.n_frames.unwrap_or(0),
        };

        let decoder_opts = DecoderOptions { verify };
        let decoder = symphonia::default::get_codecs().make(params, &decoder_opts)?;

        debug!(target: LOG_TARGET, "Symphonia decoder created successfully. Stream info: {:?}, seekable: {}", stream_info, seekable);

        Ok(Self {
            format_reader,
            decoder,
            track_id: track.id,
            stream_info,
            comments: (!comments.comments.is_empty()).then_some(comments),
            cue_sheet,
            pictures,
            seekable,
            verifiable: true,
            frame: Frame {
                header: FrameHeader {
                    block_size: 0,
                    channels: 0,
                    sample_rate: 0,
                    bits_per_sample: 0,
                },
                planes: Vec::new(),
            },
        })
    }

    pub fn stream_info(&self) -> &StreamInfo {
        &self.stream_info
    }

    pub fn cue_sheet(&self) -> Option<&CueSheet> {
        self.cue_sheet.as_ref()
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    /// Replays the stream's metadata blocks: STREAMINFO first, then the
    /// comment block, cue sheet and pictures when present.
    pub fn emit_metadata<H: FlacEventHandler + ?Sized>(&self, handler: &mut H) {
        handler.on_metadata(MetadataBlock::StreamInfo(self.stream_info));
        if let Some(comments) = &self.comments {
            handler.on_metadata(MetadataBlock::VorbisComment(comments.clone()));
        }
        if let Some(cue_sheet) = &self.cue_sheet {
            handler.on_metadata(MetadataBlock::CueSheet(cue_sheet.clone()));
        }
        for _ in 0..self.pictures {
            handler.on_metadata(MetadataBlock::Other(MetadataBlockType::Picture));
        }
    }

    /// Runs a whole session: metadata, negotiation, then every frame until
    /// the stream ends or the consumer stops it.
    pub fn run<C: DecoderClient>(&mut self, bridge: &mut FlacBridge<C>) -> Result<DecodeOutcome, BridgeError> {
        self.emit_metadata(bridge);
        bridge.initialize(self.seekable)?;

        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    info!(target: LOG_TARGET, "End of stream reached at frame {}", bridge.session().next_frame());
                    self.verify(bridge);
                    return Ok(DecodeOutcome::Finished);
                }
                Err(SymphoniaError::ResetRequired) => {
                    warn!(target: LOG_TARGET, "Stream parameters changed mid-stream, ending session.");
                    return Ok(DecodeOutcome::Finished);
                }
                Err(e) => {
                    error!(target: LOG_TARGET, "Error reading next packet: {:?}", e);
                    return Err(e.into());
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }
            let compressed_bytes = packet.buf().len() as u64;

            match self.decoder.decode(&packet) {
                Ok(decoded) => copy_planes(&decoded, self.stream_info.bits_per_sample, &mut self.frame)?,
                Err(e) => match e {
                    SymphoniaError::DecodeError(_) | SymphoniaError::IoError(_) => {
                        trace!(target: LOG_TARGET, "Recoverable decode error: {}", e);
                        bridge.on_error(DecodeErrorStatus::from(&e));
                        continue;
                    }
                    other => return Err(other.into()),
                },
            }

            if bridge.on_write(&self.frame, compressed_bytes) == WriteStatus::Abort {
                if let Some(e) = bridge.fatal_error() {
                    return Err(e.clone().into());
                }
                return Ok(DecodeOutcome::Stopped);
            }

            if bridge.session().last_command() == Command::Seek {
                self.seek(bridge);
            }
        }
    }

    /// Reports a checksum mismatch when the decoder was asked to verify
    /// the stream and the decoded audio does not match its MD5 signature.
    fn verify<C: DecoderClient>(&mut self, bridge: &mut FlacBridge<C>) {
        let result = self.decoder.finalize();
        if !self.verifiable {
            debug!(target: LOG_TARGET, "Skipping MD5 verification after a seek");
            return;
        }
        match result.verify_ok {
            Some(true) => debug!(target: LOG_TARGET, "Decoded audio matches the stream's MD5 signature"),
            Some(false) => bridge.on_error(DecodeErrorStatus::CrcMismatch),
            None => {}
        }
    }

    /// Repositions the reader at the consumer's seek target and starts a
    /// new segment on the same session.
    fn seek<C: DecoderClient>(&mut self, bridge: &mut FlacBridge<C>) {
        let target = bridge.client().seek_frame();
        debug!(target: LOG_TARGET, "Seeking to frame {}", target);

        let result = self.format_reader.seek(
            SeekMode::Accurate,
            SeekTo::TimeStamp {
                ts: target,
                track_id: self.track_id,
            },
        );
        match result {
            Ok(seeked) => {
                self.decoder.reset();
                self.verifiable = false;
                bridge.session_mut().begin_segment(seeked.actual_ts);
                bridge.client_mut().command_finished();
            }
            Err(e) => {
                warn!(target: LOG_TARGET, "Seek to frame {} failed: {}", target, e);
                bridge.client_mut().seek_error();
            }
        }
    }
}

/// Reads the tag of a file without decoding any audio.
pub fn scan_tag(path: &Path) -> Result<Tag, BridgeError> {
    let decoder = FlacStreamDecoder::open(path, false)?;
    let session = Session::new().with_tag(Tag::new());
    let mut bridge = FlacBridge::new("flac", session, TagScanClient);
    decoder.emit_metadata(&mut bridge);
    Ok(bridge.session_mut().take_tag().unwrap_or_default())
}

/// Consumer for metadata-only sessions.
struct TagScanClient;

impl DecoderClient for TagScanClient {
    fn deliver_audio(&mut self, _pcm: &[u8], _bit_rate: u32) -> Command {
        Command::Stop
    }

    fn command(&self) -> Command {
        Command::None
    }
}

/// Appends a revision's tags to `comments` and returns how many pictures it carries.
fn collect_metadata(revision: &MetadataRevision, comments: &mut VorbisComment) -> usize {
    for tag in revision.tags() {
        comments.comments.push((tag.key.clone(), tag.value.to_string()));
    }
    revision.visuals().len()
}

/// Copies a decoded buffer into native-width planes, reusing their storage.
///
/// Symphonia scales 32-bit buffers to full range; the shift undoes that so
/// samples keep the stream's bit depth.
fn copy_planes(decoded: &AudioBufferRef<'_>, bits_per_sample: u32, frame: &mut Frame) -> Result<(), BridgeError> {
    let spec = decoded.spec();
    let num_channels = spec.channels.count();
    let sample_rate = spec.rate;
    frame.planes.resize_with(num_channels, Vec::new);

    macro_rules! copy {
        ($buf:expr, $conversion_expr:expr) => {{
            for (ch, plane) in frame.planes.iter_mut().enumerate() {
                plane.clear();
                plane.extend($buf.chan(ch).iter().map($conversion_expr));
            }
        }};
    }

    match decoded {
        AudioBufferRef::S8(buf) => copy!(buf, |s: &i8| i32::from(*s)),
        AudioBufferRef::S16(buf) => copy!(buf, |s: &i16| i32::from(*s)),
        AudioBufferRef::S24(buf) => copy!(buf, |s: &i24| s.inner()),
        AudioBufferRef::S32(buf) => {
            let shift = 32u32.saturating_sub(bits_per_sample).min(31);
            copy!(buf, move |s: &i32| *s >> shift)
        }
        _ => {
            warn!(target: LOG_TARGET, "Unsupported decoded sample type: {:?}", spec);
            return Err(BridgeError::UnsupportedFormat("decoder produced non-integer samples".to_string()));
        }
    }

    frame.header = FrameHeader {
        block_size: decoded.frames() as u32,
        channels: num_channels as u32,
        sample_rate,
        bits_per_sample,
    };
    Ok(())
}

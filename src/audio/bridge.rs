//! Flow control between the decoding library's callbacks and the consumer.

use crate::audio::{
    client::{Command, DecoderClient},
    diagnostics::{handle_decode_error, DecodeErrorStatus},
    error::NegotiationError,
    sample_converter,
    session::Session,
};
use crate::metadata::{handle_metadata_block, MetadataBlock};
use tracing::{debug, error, info, trace};

const LOG_TARGET: &str = "flac_bridge::audio::bridge";

/// Continuation signal returned to the decoding library per written frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Continue,
    /// Halt the decode loop now, dropping any buffered input.
    Abort,
}

impl From<Command> for WriteStatus {
    fn from(command: Command) -> Self {
        match command {
            Command::Stop => WriteStatus::Abort,
            // A seek is carried out by the driver once this frame is out.
            Command::None | Command::Start | Command::Seek => WriteStatus::Continue,
        }
    }
}

/// Header of one decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Samples per channel
    pub block_size: u32,
    pub channels: u32,
    pub sample_rate: u32,
    pub bits_per_sample: u32,
}

/// One decoded frame: a plane of native-width samples per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub header: FrameHeader,
    pub planes: Vec<Vec<i32>>,
}

/// Callbacks of the decoding library, one per event kind.
pub trait FlacEventHandler {
    fn on_metadata(&mut self, block: MetadataBlock);

    /// `compressed_bytes` is the size of the encoded frame, `0` if unknown.
    fn on_write(&mut self, frame: &Frame, compressed_bytes: u64) -> WriteStatus;

    fn on_error(&mut self, status: DecodeErrorStatus);
}

/// Instantaneous bit rate in kbit/s from the compressed size of one block.
///
/// An approximation: compressed bytes per decoded block, scaled to the
/// block's duration. Zero when the compressed size is unknown.
pub fn estimate_bit_rate(compressed_bytes: u64, sample_rate: u32, block_size: u32) -> u32 {
    if compressed_bytes == 0 || block_size == 0 {
        return 0;
    }
    let bits = u128::from(compressed_bytes) * 8 * u128::from(sample_rate);
    let rate = bits / (1000 * u128::from(block_size));
    u32::try_from(rate).unwrap_or(u32::MAX)
}

/// Hands the session's current PCM region to the consumer and records the
/// answer.
///
/// The position advances by `block_size` whatever the consumer returns.
pub fn deliver<C: DecoderClient + ?Sized>(
    session: &mut Session,
    client: &mut C,
    compressed_bytes: u64,
    sample_rate: u32,
    block_size: u32,
) -> Command {
    let bit_rate = estimate_bit_rate(compressed_bytes, sample_rate, block_size);
    let command = client.deliver_audio(session.buffer.current(), bit_rate);
    session.advance(block_size);
    session.record_command(command);
    trace!(target: LOG_TARGET, "Delivered {} frames at {} kbit/s, consumer answered {:?}", block_size, bit_rate, command);
    command
}

/// Binds one session to one consumer and answers the decoding library's
/// callbacks.
pub struct FlacBridge<C: DecoderClient> {
    plugin_name: String,
    session: Session,
    client: C,
    fatal_error: Option<NegotiationError>,
}

impl<C: DecoderClient> FlacBridge<C> {
    pub fn new(plugin_name: impl Into<String>, session: Session, client: C) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            session,
            client,
            fatal_error: None,
        }
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// The negotiation failure that aborted the session, if any.
    pub fn fatal_error(&self) -> Option<&NegotiationError> {
        self.fatal_error.as_ref()
    }

    /// Negotiates the format and tells the consumer about it.
    pub fn initialize(&mut self, seekable: bool) -> Result<(), NegotiationError> {
        let audio_format = self.session.negotiate().map_err(|e| {
            self.fatal_error = Some(e.clone());
            e
        })?;
        let total_seconds = self.session.stream_info().and_then(|info| info.duration_seconds());
        info!(target: LOG_TARGET, "{} stream initialized: {}", self.plugin_name, audio_format);
        self.client.initialized(audio_format, seekable, total_seconds);
        Ok(())
    }

    /// Tears the session down and returns the consumer.
    pub fn into_client(mut self) -> C {
        self.session.finish();
        self.client
    }
}

impl<C: DecoderClient> FlacEventHandler for FlacBridge<C> {
    fn on_metadata(&mut self, block: MetadataBlock) {
        handle_metadata_block(&mut self.session, &mut self.client, block);
    }

    fn on_write(&mut self, frame: &Frame, compressed_bytes: u64) -> WriteStatus {
        let sample_format = match self.session.sample_format() {
            Some(sample_format) => sample_format,
            None => match self.session.negotiate() {
                Ok(audio_format) => audio_format.sample_format(),
                Err(e) => {
                    error!(target: LOG_TARGET, "Aborting {} decode: {}", self.plugin_name, e);
                    self.fatal_error = Some(e);
                    return WriteStatus::Abort;
                }
            },
        };

        let header = frame.header;
        debug_assert_eq!(header.channels as usize, frame.planes.len());

        let block_size = header.block_size as usize;
        let buffer_size = block_size * self.session.frame_size();
        let buffer = self.session.buffer.acquire(buffer_size);
        sample_converter::convert_planes(buffer, sample_format, &frame.planes, 0, block_size);

        let command = deliver(
            &mut self.session,
            &mut self.client,
            compressed_bytes,
            header.sample_rate,
            header.block_size,
        );
        if command == Command::Stop {
            debug!(target: LOG_TARGET, "Consumer requested stop at frame {}", self.session.next_frame());
        }
        WriteStatus::from(command)
    }

    fn on_error(&mut self, status: DecodeErrorStatus) {
        handle_decode_error(&self.session, &mut self.client, &self.plugin_name, status);
    }
}

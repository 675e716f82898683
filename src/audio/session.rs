use crate::audio::{
    client::Command,
    error::NegotiationError,
    format::{self, AudioFormat, SampleFormat},
    pcm_buffer::PcmBuffer,
};
use crate::metadata::{StreamInfo, Tag};
use tracing::{debug, instrument, trace};

const LOG_TARGET: &str = "flac_bridge::audio::session";

/// State of one decode session, from the first metadata block to teardown.
///
/// Exclusively owns the PCM scratch buffer and the optional tag target;
/// both are released when the session is dropped or [`finish`](Self::finish)ed.
#[derive(Debug, Default)]
pub struct Session {
    stream_info: Option<StreamInfo>,
    audio_format: Option<AudioFormat>,
    sample_format: Option<SampleFormat>,
    frame_size: usize,
    first_frame: u64,
    next_frame: u64,
    pub(crate) buffer: PcmBuffer,
    tag: Option<Tag>,
    last_command: Command,
    stop_requested: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose output buffer starts with `capacity` bytes reserved.
    pub fn with_buffer_capacity(capacity: usize) -> Self {
        Self {
            buffer: PcmBuffer::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Gives comment blocks a tag to merge into.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Records a STREAMINFO block; a later block replaces an earlier one.
    pub fn set_stream_info(&mut self, info: StreamInfo) {
        if self.stream_info.is_some() {
            debug!(target: LOG_TARGET, "Replacing previously captured STREAMINFO");
        }
        self.stream_info = Some(info);
    }

    pub fn stream_info(&self) -> Option<&StreamInfo> {
        self.stream_info.as_ref()
    }

    /// Fixes the canonical format and caches the frame size.
    ///
    /// Repeating the call with unchanged metadata yields the same format.
    #[instrument(skip(self))]
    pub fn negotiate(&mut self) -> Result<AudioFormat, NegotiationError> {
        let audio_format = format::negotiate(self.stream_info.as_ref())?;
        self.sample_format = Some(audio_format.sample_format());
        self.frame_size = audio_format.frame_size();
        self.audio_format = Some(audio_format);
        trace!(target: LOG_TARGET, "Cached frame size {} bytes", self.frame_size);
        Ok(audio_format)
    }

    pub fn audio_format(&self) -> Option<AudioFormat> {
        self.audio_format
    }

    /// Sample format fixed by the last successful negotiation.
    pub fn sample_format(&self) -> Option<SampleFormat> {
        self.sample_format
    }

    /// `channels x sample width`, zero until negotiated.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn first_frame(&self) -> u64 {
        self.first_frame
    }

    pub fn next_frame(&self) -> u64 {
        self.next_frame
    }

    /// Moves the position past a frame of `block_size` samples.
    pub(crate) fn advance(&mut self, block_size: u32) {
        self.next_frame += u64::from(block_size);
    }

    /// Starts a new logical segment at `frame`, as after a seek. The
    /// buffer and negotiated format are kept.
    pub fn begin_segment(&mut self, frame: u64) {
        debug!(target: LOG_TARGET, "Starting new segment at frame {}", frame);
        self.first_frame = frame;
        self.next_frame = frame;
    }

    pub fn buffer(&self) -> &PcmBuffer {
        &self.buffer
    }

    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    pub fn tag_mut(&mut self) -> Option<&mut Tag> {
        self.tag.as_mut()
    }

    /// Removes the tag from the session, leaving no target behind.
    pub fn take_tag(&mut self) -> Option<Tag> {
        self.tag.take()
    }

    /// Remembers the consumer's answer to the latest frame.
    pub(crate) fn record_command(&mut self, command: Command) {
        if command == Command::Stop {
            self.stop_requested = true;
        }
        self.last_command = command;
    }

    pub fn last_command(&self) -> Command {
        self.last_command
    }

    /// Whether the consumer answered any frame of this session with `Stop`.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Tears the session down, freeing the buffer and dropping the tag.
    pub fn finish(&mut self) {
        debug!(target: LOG_TARGET, "Session finished at frame {}", self.next_frame);
        self.buffer.release();
        self.tag = None;
    }
}

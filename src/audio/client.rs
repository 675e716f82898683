use crate::audio::diagnostics::DecodeErrorStatus;
use crate::audio::format::AudioFormat;
use crate::metadata::{ReplayGainInfo, Tag};

/// Instruction from the consumer, read after each delivered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    #[default]
    None,
    Start,
    Stop,
    Seek,
}

/// The playback side of a decode session.
///
/// The consumer owns playback state: the core never infers a command, it
/// only reports what the consumer returned or currently holds.
pub trait DecoderClient {
    /// Called once the format is fixed, before the first frame.
    fn initialized(&mut self, _format: AudioFormat, _seekable: bool, _total_seconds: Option<f64>) {}

    /// Hands one converted frame of PCM to the consumer.
    fn deliver_audio(&mut self, pcm: &[u8], bit_rate: u32) -> Command;

    /// The consumer's pending command.
    fn command(&self) -> Command;

    /// Receives replay gain extracted from a comment block. The value is
    /// moved; the core keeps no copy.
    fn notify_replay_gain(&mut self, _info: ReplayGainInfo) {}

    /// Comment fields were merged into the session's tag.
    fn notify_tag_merge(&mut self, _tag: &Tag) {}

    /// A decode error was reported while no stop was pending.
    fn notify_warning(&mut self, _plugin: &str, _kind: DecodeErrorStatus) {}

    /// Target of a pending `Seek`, in frames from the start of the stream.
    fn seek_frame(&self) -> u64 {
        0
    }

    /// The pending command has been carried out.
    fn command_finished(&mut self) {}

    /// The pending seek could not be carried out.
    fn seek_error(&mut self) {}
}

//! Stream metadata blocks and what the session extracts from them

pub mod cue;
pub mod extractor;
pub mod replay_gain;
pub mod tag;

pub use cue::{cue_track, track_filename, track_index_from_filename};
pub use extractor::handle_metadata_block;
pub use replay_gain::{parse_replay_gain, ReplayGainInfo, ReplayGainTuple};
pub use tag::{Tag, TagItem, TagType};

/// STREAMINFO block: format parameters of the whole stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1-8)
    pub channels: u32,
    /// Bits per sample (4-32)
    pub bits_per_sample: u32,
    /// Total samples per channel in the stream (0 = unknown)
    pub total_samples: u64,
}

impl StreamInfo {
    /// Stream length in seconds, when both the sample count and rate are known.
    pub fn duration_seconds(&self) -> Option<f64> {
        if self.total_samples == 0 || self.sample_rate == 0 {
            return None;
        }
        Some(self.total_samples as f64 / self.sample_rate as f64)
    }
}

/// Vorbis comment block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VorbisComment {
    /// `NAME=value` pairs, names as found in the stream
    pub comments: Vec<(String, String)>,
}

impl VorbisComment {
    /// First value of the field `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.comments
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// One track entry of an embedded cue sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueTrack {
    pub number: u32,
    /// Offset of the track in samples from the start of the stream
    pub offset: u64,
}

/// Embedded cue sheet block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueSheet {
    pub tracks: Vec<CueTrack>,
}

impl CueSheet {
    pub fn num_tracks(&self) -> u32 {
        self.tracks.len() as u32
    }
}

/// Kinds of metadata block a stream can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataBlockType {
    StreamInfo,
    Padding,
    Application,
    SeekTable,
    VorbisComment,
    CueSheet,
    Picture,
}

/// A metadata event emitted by the decoding library.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataBlock {
    StreamInfo(StreamInfo),
    VorbisComment(VorbisComment),
    CueSheet(CueSheet),
    /// Any block the session has no use for.
    Other(MetadataBlockType),
}

impl MetadataBlock {
    pub fn block_type(&self) -> MetadataBlockType {
        match self {
            MetadataBlock::StreamInfo(_) => MetadataBlockType::StreamInfo,
            MetadataBlock::VorbisComment(_) => MetadataBlockType::VorbisComment,
            MetadataBlock::CueSheet(_) => MetadataBlockType::CueSheet,
            MetadataBlock::Other(kind) => *kind,
        }
    }
}

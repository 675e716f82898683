//! Canonical audio format and its negotiation from STREAMINFO.

use crate::audio::error::NegotiationError;
use crate::metadata::StreamInfo;
use std::fmt;
use tracing::{debug, warn};

const LOG_TARGET: &str = "flac_bridge::audio::format";

/// Highest channel count the output pipeline accepts.
pub const MAX_CHANNELS: u32 = 8;

/// Sample rates at or above this are rejected.
const SAMPLE_RATE_LIMIT: u32 = 1 << 30;

/// Sample representation of the interleaved PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    Undefined,
    S8,
    S16,
    /// 24-bit sample stored in the low bytes of a 32-bit word.
    S24P32,
    S32,
}

impl SampleFormat {
    /// Maps a STREAMINFO bit depth onto a sample format.
    pub fn from_bits_per_sample(bits_per_sample: u32) -> Self {
        match bits_per_sample {
            8 => SampleFormat::S8,
            16 => SampleFormat::S16,
            24 => SampleFormat::S24P32,
            32 => SampleFormat::S32,
            _ => SampleFormat::Undefined,
        }
    }

    /// Width in bytes of one sample; zero for `Undefined`.
    pub fn sample_size(self) -> usize {
        match self {
            SampleFormat::Undefined => 0,
            SampleFormat::S8 => 1,
            SampleFormat::S16 => 2,
            SampleFormat::S24P32 | SampleFormat::S32 => 4,
        }
    }

    pub fn is_valid(self) -> bool {
        self != SampleFormat::Undefined
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleFormat::Undefined => "?",
            SampleFormat::S8 => "8",
            SampleFormat::S16 => "16",
            SampleFormat::S24P32 => "24",
            SampleFormat::S32 => "32",
        };
        f.write_str(name)
    }
}

/// Negotiated `{rate, channels, sample format}` of one session.
///
/// Only obtainable through [`AudioFormat::new_checked`], so every value in
/// circulation has passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    sample_rate: u32,
    channels: u32,
    sample_format: SampleFormat,
}

impl AudioFormat {
    /// Validating constructor; the error carries a human readable reason.
    pub fn new_checked(
        sample_rate: u32,
        sample_format: SampleFormat,
        channels: u32,
    ) -> Result<Self, NegotiationError> {
        if sample_rate == 0 || sample_rate >= SAMPLE_RATE_LIMIT {
            return Err(NegotiationError::InvalidFormat(format!(
                "Invalid sample rate: {}",
                sample_rate
            )));
        }
        if !sample_format.is_valid() {
            return Err(NegotiationError::InvalidFormat(format!(
                "Invalid sample format: {}",
                sample_format
            )));
        }
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(NegotiationError::InvalidFormat(format!(
                "Invalid channel count: {}",
                channels
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
            sample_format,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    /// Bytes occupied by one sample of every channel.
    pub fn frame_size(&self) -> usize {
        self.channels as usize * self.sample_format.sample_size()
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.sample_rate, self.sample_format, self.channels)
    }
}

/// Derives the canonical format from captured stream metadata.
///
/// Pure: the caller decides where to cache the result. See
/// [`Session::negotiate`](crate::audio::Session::negotiate).
pub fn negotiate(stream_info: Option<&StreamInfo>) -> Result<AudioFormat, NegotiationError> {
    let info = match stream_info {
        Some(info) => info,
        None => {
            warn!(target: LOG_TARGET, "no STREAMINFO packet found");
            return Err(NegotiationError::NoStreamInfo);
        }
    };

    let sample_format = SampleFormat::from_bits_per_sample(info.bits_per_sample);
    match AudioFormat::new_checked(info.sample_rate, sample_format, info.channels) {
        Ok(format) => {
            debug!(target: LOG_TARGET, "Negotiated audio format {} from {} bits per sample", format, info.bits_per_sample);
            Ok(format)
        }
        Err(e) => {
            warn!(target: LOG_TARGET, "{}", e);
            Err(e)
        }
    }
}

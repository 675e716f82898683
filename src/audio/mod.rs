//! Conversion of decoded frames into the negotiated PCM stream

pub mod bridge;
pub mod client;
pub mod decoder;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod pcm_buffer;
pub mod sample_converter;
pub mod session;

pub use bridge::{deliver, estimate_bit_rate, FlacBridge, FlacEventHandler, Frame, FrameHeader, WriteStatus};
pub use client::{Command, DecoderClient};
pub use decoder::{scan_tag, DecodeOutcome, FlacStreamDecoder};
pub use diagnostics::{handle_decode_error, DecodeErrorStatus};
pub use error::{BridgeError, NegotiationError};
pub use format::{negotiate, AudioFormat, SampleFormat};
pub use pcm_buffer::PcmBuffer;
pub use session::Session;

use crate::audio::{
    client::{Command, DecoderClient},
    session::Session,
};
use std::fmt;
use symphonia::core::errors::Error as SymphoniaError;
use tracing::warn;

const LOG_TARGET: &str = "flac_bridge::audio::diagnostics";

/// Classified decode error reported by the decoding library. The library
/// recovers from all of these on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorStatus {
    LostSync,
    BadHeader,
    CrcMismatch,
    Unknown,
}

impl DecodeErrorStatus {
    /// Warning text naming the originating plugin.
    pub fn describe(self, plugin: &str) -> String {
        match self {
            DecodeErrorStatus::LostSync => format!("{} lost sync", plugin),
            DecodeErrorStatus::BadHeader => format!("bad {} header", plugin),
            DecodeErrorStatus::CrcMismatch => format!("{} crc mismatch", plugin),
            DecodeErrorStatus::Unknown => format!("unknown {} error", plugin),
        }
    }
}

impl fmt::Display for DecodeErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecodeErrorStatus::LostSync => "lost sync",
            DecodeErrorStatus::BadHeader => "bad header",
            DecodeErrorStatus::CrcMismatch => "crc mismatch",
            DecodeErrorStatus::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl From<&SymphoniaError> for DecodeErrorStatus {
    fn from(e: &SymphoniaError) -> Self {
        match e {
            SymphoniaError::DecodeError(msg) => {
                let msg = msg.to_ascii_lowercase();
                if msg.contains("crc") || msg.contains("checksum") {
                    DecodeErrorStatus::CrcMismatch
                } else if msg.contains("sync") {
                    DecodeErrorStatus::LostSync
                } else if msg.contains("header") {
                    DecodeErrorStatus::BadHeader
                } else {
                    DecodeErrorStatus::Unknown
                }
            }
            SymphoniaError::IoError(_) => DecodeErrorStatus::LostSync,
            _ => DecodeErrorStatus::Unknown,
        }
    }
}

/// Reports a decode error unless the consumer has asked to stop.
///
/// Never influences the decode loop. Returns whether the event was reported.
pub fn handle_decode_error<C: DecoderClient + ?Sized>(
    session: &Session,
    client: &mut C,
    plugin: &str,
    status: DecodeErrorStatus,
) -> bool {
    if session.stop_requested() || client.command() == Command::Stop {
        return false;
    }

    warn!(target: LOG_TARGET, "{}", status.describe(plugin));
    client.notify_warning(plugin, status);
    true
}

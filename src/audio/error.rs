use std::error::Error;
use std::io;
use symphonia::core::errors::Error as SymphoniaError;

/// Reasons the canonical audio format could not be fixed for a session.
/// Both are fatal: the decode loop must be aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// Negotiation was attempted before a STREAMINFO block was observed.
    NoStreamInfo,
    /// The rate/channels/sample format combination was rejected.
    InvalidFormat(String),
}

impl std::fmt::Display for NegotiationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegotiationError::NoStreamInfo => write!(f, "no STREAMINFO packet found"),
            NegotiationError::InvalidFormat(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for NegotiationError {}

/// Error types surfaced by a decode session.
#[derive(Debug)]
pub enum BridgeError {
    Negotiation(NegotiationError),
    SymphoniaError(SymphoniaError),
    IoError(io::Error),
    UnsupportedFormat(String),
    MissingCodecParams(&'static str),
    InvalidState(String),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::Negotiation(e) => write!(f, "Format negotiation failed: {}", e),
            BridgeError::SymphoniaError(e) => write!(f, "Symphonia error: {}", e),
            BridgeError::IoError(e) => write!(f, "I/O error: {}", e),
            BridgeError::UnsupportedFormat(s) => write!(f, "Unsupported format: {}", s),
            BridgeError::MissingCodecParams(s) => write!(f, "Missing codec parameters: {}", s),
            BridgeError::InvalidState(s) => write!(f, "Invalid state: {}", s),
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BridgeError::Negotiation(e) => Some(e),
            BridgeError::SymphoniaError(e) => Some(e),
            BridgeError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

// --- From Implementations for BridgeError ---

impl From<NegotiationError> for BridgeError {
    fn from(e: NegotiationError) -> Self {
        BridgeError::Negotiation(e)
    }
}

impl From<SymphoniaError> for BridgeError {
    fn from(e: SymphoniaError) -> Self {
        BridgeError::SymphoniaError(e)
    }
}

impl From<io::Error> for BridgeError {
    fn from(e: io::Error) -> Self {
        BridgeError::IoError(e)
    }
}

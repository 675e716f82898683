use tracing::trace;

const LOG_TARGET: &str = "flac_bridge::audio::pcm_buffer";

/// Scratch buffer reused for every converted frame of a session.
///
/// Capacity only grows. Contents are not preserved across a growth.
#[derive(Debug, Default)]
pub struct PcmBuffer {
    data: Vec<u8>,
    size: usize,
}

impl PcmBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer with `capacity` bytes already reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            size: 0,
        }
    }

    /// Returns a writable region of exactly `min_bytes` bytes, reallocating
    /// only when `min_bytes` exceeds the current capacity.
    pub fn acquire(&mut self, min_bytes: usize) -> &mut [u8] {
        if min_bytes > self.data.len() {
            trace!(target: LOG_TARGET, "Growing PCM buffer from {} to {} bytes", self.data.len(), min_bytes);
            // Old contents are dropped, not copied.
            self.data = vec![0; min_bytes];
        }
        self.size = min_bytes;
        &mut self.data[..min_bytes]
    }

    /// The region handed out by the most recent `acquire`.
    pub fn current(&self) -> &[u8] {
        &self.data[..self.size]
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Frees the backing memory. Used at session teardown.
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.size = 0;
    }
}

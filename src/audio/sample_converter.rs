use crate::audio::format::SampleFormat;
use tracing::{trace, warn};

const LOG_TARGET: &str = "flac_bridge::audio::sample_converter";

const S24_MASK: i32 = 0x00ff_ffff;

/// Interleaves native-width `i32` sample planes into `dest` as raw PCM of
/// `sample_format`, native byte order.
///
/// Reads samples `start..end` of every plane; planes appear in the output
/// in their given order. Returns the number of bytes written, which is
/// `(end - start) * planes.len() * sample_format.sample_size()`.
///
/// `dest` must be large enough and every plane must hold at least `end`
/// samples; both are guaranteed by the caller's frame header.
pub fn convert_planes<P: AsRef<[i32]>>(
    dest: &mut [u8],
    sample_format: SampleFormat,
    planes: &[P],
    start: usize,
    end: usize,
) -> usize {
    let num_channels = planes.len();
    let width = sample_format.sample_size();
    let num_frames = end.saturating_sub(start);
    let total = num_frames * num_channels * width;

    trace!(target: LOG_TARGET, "Interleaving {} frames x {} channels into {} bytes ({:?})", num_frames, num_channels, total, sample_format);

    // Writes one sample per (frame, channel) pair using `$encode` to turn the
    // i32 into its fixed-size byte array.
    macro_rules! interleave {
        ($encode:expr) => {{
            let mut chunks = dest[..total].chunks_exact_mut(width);
            for frame in start..end {
                for plane in planes {
                    if let Some(chunk) = chunks.next() {
                        let sample: i32 = plane.as_ref()[frame];
                        chunk.copy_from_slice(&$encode(sample));
                    }
                }
            }
        }};
    }

    match sample_format {
        SampleFormat::S8 => interleave!(|s: i32| (s as i8).to_ne_bytes()),
        SampleFormat::S16 => interleave!(|s: i32| (s as i16).to_ne_bytes()),
        SampleFormat::S24P32 => interleave!(|s: i32| (s & S24_MASK).to_ne_bytes()),
        SampleFormat::S32 => interleave!(|s: i32| s.to_ne_bytes()),
        SampleFormat::Undefined => {
            warn!(target: LOG_TARGET, "Refusing to convert into an undefined sample format");
            return 0;
        }
    }

    total
}

use crate::metadata::VorbisComment;
use tracing::trace;

const LOG_TARGET: &str = "flac_bridge::metadata::replay_gain";

/// Gain in dB and peak amplitude of either the track or the album.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReplayGainTuple {
    pub gain: f32,
    pub peak: f32,
}

/// Loudness-normalization data attached to a track.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReplayGainInfo {
    pub track: ReplayGainTuple,
    pub album: ReplayGainTuple,
}

/// Extracts replay gain from the comment fields, `None` if the block
/// carries none of the four `REPLAYGAIN_*` fields.
pub fn parse_replay_gain(comment: &VorbisComment) -> Option<ReplayGainInfo> {
    let mut info = ReplayGainInfo::default();
    let mut found = false;

    let fields: [(&str, &mut f32); 4] = [
        ("REPLAYGAIN_TRACK_GAIN", &mut info.track.gain),
        ("REPLAYGAIN_TRACK_PEAK", &mut info.track.peak),
        ("REPLAYGAIN_ALBUM_GAIN", &mut info.album.gain),
        ("REPLAYGAIN_ALBUM_PEAK", &mut info.album.peak),
    ];

    for (name, slot) in fields {
        if let Some(value) = comment.get(name).and_then(parse_leading_float) {
            trace!(target: LOG_TARGET, "{} = {}", name, value);
            *slot = value;
            found = true;
        }
    }

    found.then_some(info)
}

/// Parses the leading decimal number of `text` (`"-6.20 dB"` gives -6.2).
fn parse_leading_float(text: &str) -> Option<f32> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    let number = &text[..end];
    if !number[digits_start..].bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    number.parse().ok()
}

//! Virtual track naming for streams carrying a multi-track cue sheet.

use crate::audio::error::BridgeError;
use std::fs::File;
use std::path::Path;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

const LOG_TARGET: &str = "flac_bridge::metadata::cue";

/// Synthetic file name (`track_NNN.<ext>`) for a track of a cue sheet with
/// `total_tracks` entries.
///
/// `None` unless the sheet lists more than one track and `track_index`
/// lies in `1..total_tracks`. The last entry of a cue sheet is its
/// lead-out, hence the exclusive upper bound.
pub fn track_filename(total_tracks: u32, track_index: u32, extension: &str) -> Option<String> {
    if total_tracks <= 1 {
        return None;
    }
    if track_index == 0 || track_index >= total_tracks {
        return None;
    }
    Some(format!("track_{:03}.{}", track_index, extension))
}

/// Track number encoded in a virtual track name, `0` when there is none.
///
/// Reads the leading digits after the last `_`, optionally signed with
/// `+`. Not checked against any cue sheet: `"track_999.flac"` yields 999
/// whatever the stream holds.
pub fn track_index_from_filename(name: &str) -> u32 {
    let Some(pos) = name.rfind('_') else {
        return 0;
    };
    let rest = name[pos + 1..].trim_start();
    let digits: String = rest
        .strip_prefix('+')
        .unwrap_or(rest)
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Reads the cue sheet embedded in `path` and names track `track_number`.
pub fn cue_track(path: &Path, track_number: u32, extension: &str) -> Result<Option<String>, BridgeError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let total_tracks = probed.format.cues().len() as u32;
    debug!(target: LOG_TARGET, "{:?} carries a cue sheet with {} tracks", path, total_tracks);

    Ok(track_filename(total_tracks, track_number, extension))
}

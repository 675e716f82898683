use crate::audio::{client::DecoderClient, session::Session};
use crate::metadata::{parse_replay_gain, MetadataBlock};
use tracing::{debug, trace};

const LOG_TARGET: &str = "flac_bridge::metadata::extractor";

/// Applies one metadata block to the session.
///
/// STREAMINFO is stored (last one wins). A comment block hands any replay
/// gain straight to the consumer and merges its fields into the session's
/// tag when there is one. Other blocks are ignored.
pub fn handle_metadata_block<C: DecoderClient + ?Sized>(
    session: &mut Session,
    client: &mut C,
    block: MetadataBlock,
) {
    match block {
        MetadataBlock::StreamInfo(info) => {
            debug!(target: LOG_TARGET, "STREAMINFO: {} Hz, {} channels, {} bits", info.sample_rate, info.channels, info.bits_per_sample);
            if let (Some(tag), Some(seconds)) = (session.tag_mut(), info.duration_seconds()) {
                tag.duration_seconds = Some(seconds);
            }
            session.set_stream_info(info);
        }
        MetadataBlock::VorbisComment(comment) => {
            if let Some(replay_gain) = parse_replay_gain(&comment) {
                debug!(target: LOG_TARGET, "Forwarding replay gain {:?}", replay_gain);
                client.notify_replay_gain(replay_gain);
            }

            if let Some(tag) = session.tag_mut() {
                let added = tag.merge_comments(&comment);
                trace!(target: LOG_TARGET, "Merged {} comment fields into tag", added);
                client.notify_tag_merge(tag);
            }
        }
        other => {
            trace!(target: LOG_TARGET, "Ignoring {:?} block", other.block_type());
        }
    }
}
